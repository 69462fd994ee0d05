//! Per-feed-type validation capabilities.
//!
//! Each supported feed type provides one [`FeedTypeValidator`] implementation
//! covering schema-level field checks, canonical field generation and runtime
//! update validation. The [`TypeRegistry`] maps a type name to its validator
//! once, at schema load time; adding a feed type means registering a new
//! implementation, not touching the lifecycle manager.

mod exchange_account;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldConfig, FieldDef, FieldValue};

pub use exchange_account::ExchangeAccountFeed;

/// Validation capabilities for one feed type.
pub trait FeedTypeValidator: Send + Sync + std::fmt::Debug {
    /// The type name this validator handles, as written in schema configs.
    fn type_name(&self) -> &'static str;

    /// Checks that every field definition carries the properties its declared
    /// kind requires. Violations name the field and the missing property.
    fn validate_schema_fields(&self, fields: &[FieldConfig]) -> SchemaResult<()>;

    /// Checks that field property values are well-formed (denomination type
    /// and ratio for measured kinds).
    fn validate_schema_values(&self, fields: &[FieldConfig]) -> SchemaResult<()>;

    /// Produces canonical field definitions with derived storage paths.
    /// Expects fields that already passed the two validation passes.
    fn generate_fields(&self, fields: &[FieldConfig]) -> SchemaResult<Vec<FieldDef>>;

    /// Validates a runtime update value against a field's declared kind and
    /// returns the typed value.
    fn validate_update(&self, field: &FieldDef, value: &Value) -> SchemaResult<FieldValue>;
}

/// Registry resolving feed type names to their validators.
///
/// Resolution happens when the schema loads, never per call.
pub struct TypeRegistry {
    validators: HashMap<&'static str, Arc<dyn FeedTypeValidator>>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { validators: HashMap::new() }
    }

    /// A registry with the built-in feed types registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ExchangeAccountFeed));
        registry
    }

    pub fn register(&mut self, validator: Arc<dyn FeedTypeValidator>) {
        self.validators.insert(validator.type_name(), validator);
    }

    pub fn resolve(&self, type_name: &str) -> SchemaResult<Arc<dyn FeedTypeValidator>> {
        self.validators
            .get(type_name)
            .cloned()
            .ok_or_else(|| SchemaError::unknown_feed_type(type_name))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_resolves_exchange_account() {
        let registry = TypeRegistry::with_builtin();
        let validator = registry.resolve("exchange_account_feed").unwrap();
        assert_eq!(validator.type_name(), "exchange_account_feed");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let registry = TypeRegistry::with_builtin();
        let err = registry.resolve("weather_feed").unwrap_err();
        assert_eq!(err.code().code(), "UNKNOWN_FEED_TYPE");
        assert!(err.message().contains("weather_feed"));
    }
}
