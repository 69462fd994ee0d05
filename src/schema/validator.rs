//! Schema config validation and canonical schema generation.
//!
//! Validation is deterministic and side-effect free. Per-field structural and
//! type checks are delegated to the feed type's validator, resolved through
//! the registry exactly once per call into this module.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::errors::{SchemaError, SchemaErrorCode, SchemaResult};
use super::feed_types::TypeRegistry;
use super::types::{
    FeedSchema, FeedSchemaConfig, FieldConfig, DEFAULT_FEED_TYPE, DEFAULT_SCHEMA_VERSION,
};

/// Pattern every icon value must match: a base64 image data URI.
fn icon_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^data:image/((svg\+xml)|(png));base64,.+$")
            .expect("icon pattern is a valid regex")
    })
}

/// Validates schema configs and generates the canonical schema.
pub struct SchemaValidator<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Validates a raw schema config.
    ///
    /// Fails with a specific code per missing top-level property, with
    /// `INVALID_FEED_FIELDS` for a malformed field sequence and with
    /// `INVALID_FEED_ICON` for icon values that are not image data URIs.
    /// Per-field checks are delegated to the feed type validator.
    pub fn validate_config(&self, config: &FeedSchemaConfig) -> SchemaResult<()> {
        if config.name.as_deref().map_or(true, |n| n.is_empty()) {
            return Err(SchemaError::missing_property(SchemaErrorCode::MissingFeedName));
        }
        if config.description.as_deref().map_or(true, |d| d.is_empty()) {
            return Err(SchemaError::missing_property(SchemaErrorCode::MissingFeedDescription));
        }
        let icons = config
            .icons
            .as_ref()
            .ok_or_else(|| SchemaError::missing_property(SchemaErrorCode::MissingFeedIcons))?;
        for (size, icon) in icons {
            let uri = icon
                .as_str()
                .ok_or_else(|| SchemaError::invalid_icon(size.clone()))?;
            if !icon_pattern().is_match(uri) {
                return Err(SchemaError::invalid_icon(size.clone()));
            }
        }

        let fields = self.parse_fields(config)?;
        let validator = self.registry.resolve(feed_type_of(config))?;
        validator.validate_schema_fields(&fields)?;
        validator.validate_schema_values(&fields)?;
        Ok(())
    }

    /// Generates the canonical schema from a config.
    ///
    /// Pure and deterministic: the same config always yields the same schema,
    /// with each field carrying its derived storage path.
    pub fn generate(&self, config: &FeedSchemaConfig) -> SchemaResult<FeedSchema> {
        self.validate_config(config)?;

        let fields = self.parse_fields(config)?;
        let validator = self.registry.resolve(feed_type_of(config))?;

        let mut icons = BTreeMap::new();
        if let Some(raw) = &config.icons {
            for (size, icon) in raw {
                // validate_config guarantees string values
                if let Some(uri) = icon.as_str() {
                    icons.insert(size.clone(), uri.to_string());
                }
            }
        }

        Ok(FeedSchema {
            name: config.name.clone().unwrap_or_default(),
            description: config.description.clone().unwrap_or_default(),
            feed_type: feed_type_of(config).to_string(),
            version: config
                .version
                .clone()
                .unwrap_or_else(|| DEFAULT_SCHEMA_VERSION.to_string()),
            icons,
            fields: validator.generate_fields(&fields)?,
        })
    }

    /// Parses the raw `fields` value into typed field configs.
    ///
    /// `fields` must be present, must be a sequence, must be non-empty and
    /// must not repeat field names.
    fn parse_fields(&self, config: &FeedSchemaConfig) -> SchemaResult<Vec<FieldConfig>> {
        let raw = config
            .fields
            .as_ref()
            .ok_or_else(|| SchemaError::missing_property(SchemaErrorCode::MissingFeedFields))?;
        let entries = raw
            .as_array()
            .ok_or_else(|| SchemaError::invalid_fields("fields must be a sequence"))?;
        if entries.is_empty() {
            return Err(SchemaError::invalid_fields("fields must not be empty"));
        }

        let mut fields = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for entry in entries {
            let field: FieldConfig = serde_json::from_value(entry.clone())
                .map_err(|e| SchemaError::invalid_fields(format!("bad field definition: {}", e)))?;
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::invalid_fields(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
            fields.push(field);
        }
        Ok(fields)
    }
}

fn feed_type_of(config: &FeedSchemaConfig) -> &str {
    config.feed_type.as_deref().unwrap_or(DEFAULT_FEED_TYPE)
}
