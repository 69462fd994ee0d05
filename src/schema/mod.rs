//! Feed schema definition, validation and persistence.
//!
//! A schema is loaded and validated once at manager start and is immutable
//! thereafter. Per-type field checks live behind the [`feed_types`] registry.

pub mod errors;
pub mod feed_types;
pub mod loader;
pub mod types;
pub mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use feed_types::{ExchangeAccountFeed, FeedTypeValidator, TypeRegistry};
pub use loader::{load_config, load_schema, persist_schema};
pub use types::{
    storage_path_for, DenominationType, FeedSchema, FeedSchemaConfig, FieldConfig, FieldDef,
    FieldKind, FieldUpdate, FieldValue, DEFAULT_FEED_TYPE, DEFAULT_SCHEMA_VERSION,
};
pub use validator::SchemaValidator;
