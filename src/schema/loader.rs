//! Schema file persistence.
//!
//! The canonical schema is written once at startup to a well-known location
//! so third-party readers can fetch it alongside the feed data. Schema
//! configs are operator-authored JSON files.

use std::fs;
use std::path::Path;

use super::errors::{SchemaError, SchemaResult};
use super::types::{FeedSchema, FeedSchemaConfig};

/// Reads an operator-authored schema config file.
pub fn load_config(path: &Path) -> SchemaResult<FeedSchemaConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))
}

/// Reads a previously persisted canonical schema.
pub fn load_schema(path: &Path) -> SchemaResult<FeedSchema> {
    let content = fs::read_to_string(path)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))
}

/// Writes the canonical schema to its well-known location.
///
/// Performed at most once, at startup. Parent directories are created as
/// needed.
pub fn persist_schema(schema: &FeedSchema, path: &Path) -> SchemaResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;
    }
    let content = serde_json::to_string_pretty(schema)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))?;
    fs::write(path, content)
        .map_err(|e| SchemaError::malformed(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::feed_types::TypeRegistry;
    use crate::schema::validator::SchemaValidator;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_config() -> FeedSchemaConfig {
        serde_json::from_value(json!({
            "name": "Exchange Account",
            "description": "Balances for an exchange account",
            "icons": { "48": "data:image/png;base64,iVBORw0KGgo" },
            "fields": [
                {
                    "name": "Bitcoin",
                    "description": "BTC balance",
                    "type": "balance",
                    "units": "BTC",
                    "denomination_type": "main",
                    "denomination_ratio": 100000000u64
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_persist_then_reload_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("schemas").join("feed.json");

        let registry = TypeRegistry::with_builtin();
        let validator = SchemaValidator::new(&registry);
        let schema = validator.generate(&sample_config()).unwrap();

        persist_schema(&schema, &path).unwrap();
        let reloaded = load_schema(&path).unwrap();
        assert_eq!(schema, reloaded);

        // The persisted file still validates as a config.
        let config = load_config(&path).unwrap();
        assert!(validator.validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_file_is_malformed_schema() {
        let tmp = TempDir::new().unwrap();
        let err = load_schema(&tmp.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code().code(), "MALFORMED_SCHEMA");
    }

    #[test]
    fn test_garbage_file_is_malformed_schema() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("feed.json");
        fs::write(&path, "{not json").unwrap();
        let err = load_schema(&path).unwrap_err();
        assert_eq!(err.code().code(), "MALFORMED_SCHEMA");
    }
}
