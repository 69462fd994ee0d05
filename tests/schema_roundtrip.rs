//! Schema invariant tests.
//!
//! - Validation is deterministic and reports a specific code per violation.
//! - generate → persist → reload → re-validate round-trips structurally.
//! - Storage path derivation matches the documented examples.

use feedcast::schema::{
    load_config, load_schema, persist_schema, storage_path_for, FeedSchemaConfig, SchemaValidator,
    TypeRegistry,
};
use serde_json::json;
use tempfile::TempDir;

fn sample_config() -> FeedSchemaConfig {
    serde_json::from_value(json!({
        "name": "Exchange Account",
        "description": "Balances and P/L for an exchange account",
        "icons": {
            "48": "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg",
            "vector": "data:image/svg+xml;base64,PHN2Zz48L3N2Zz4="
        },
        "fields": [
            {
                "name": "Bitcoin",
                "description": "BTC balance",
                "type": "balance",
                "units": "BTC",
                "denomination_type": "main",
                "denomination_ratio": 100000000u64
            },
            {
                "name": "Bitcoin P/L",
                "description": "BTC profit and loss",
                "type": "pnl",
                "units": "BTC"
            },
            {
                "name": "Total",
                "description": "Total with P/L",
                "type": "pnl_and_balance",
                "units": "USD",
                "denomination_type": "base",
                "denomination_ratio": 100u64
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_generate_persist_reload_revalidate() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("schemas").join("feed.json");

    let registry = TypeRegistry::with_builtin();
    let validator = SchemaValidator::new(&registry);

    let generated = validator.generate(&sample_config()).unwrap();
    persist_schema(&generated, &path).unwrap();

    // Reload as the canonical schema: structurally equal.
    let reloaded = load_schema(&path).unwrap();
    assert_eq!(generated, reloaded);

    // Reload as a config: still validates.
    let config = load_config(&path).unwrap();
    validator.validate_config(&config).unwrap();

    // And re-generating from the persisted file is stable.
    let regenerated = validator.generate(&config).unwrap();
    assert_eq!(generated, regenerated);
}

#[test]
fn test_storage_paths_in_generated_schema() {
    let registry = TypeRegistry::with_builtin();
    let schema = SchemaValidator::new(&registry).generate(&sample_config()).unwrap();

    let paths: Vec<&str> = schema.fields.iter().map(|f| f.storage_path.as_str()).collect();
    assert_eq!(paths, vec!["/bitcoin/", "/bitcoin-p-l/", "/total/"]);
}

#[test]
fn test_storage_path_documented_examples() {
    assert_eq!(storage_path_for("Bitcoin"), "/bitcoin/");
    assert_eq!(storage_path_for("Bitcoin P/L"), "/bitcoin-p-l/");
}

#[test]
fn test_validation_is_deterministic() {
    let registry = TypeRegistry::with_builtin();
    let validator = SchemaValidator::new(&registry);
    let config = sample_config();
    for _ in 0..100 {
        assert!(validator.validate_config(&config).is_ok());
    }
}

#[test]
fn test_missing_property_codes() {
    let registry = TypeRegistry::with_builtin();
    let validator = SchemaValidator::new(&registry);

    let mut config = sample_config();
    config.icons = None;
    assert_eq!(
        validator.validate_config(&config).unwrap_err().code().code(),
        "MISSING_FEED_ICONS"
    );

    let mut config = sample_config();
    config.fields = None;
    assert_eq!(
        validator.validate_config(&config).unwrap_err().code().code(),
        "MISSING_FEED_FIELDS"
    );
}

#[test]
fn test_field_missing_required_property_names_both() {
    let registry = TypeRegistry::with_builtin();
    let mut config = sample_config();
    config.fields = Some(json!([
        {
            "name": "Bitcoin",
            "description": "BTC balance",
            "type": "balance",
            "units": "BTC",
            "denomination_type": "main"
        }
    ]));
    let err = SchemaValidator::new(&registry).validate_config(&config).unwrap_err();
    assert_eq!(err.code().code(), "INVALID_FIELD");
    assert!(err.message().contains("Bitcoin"));
    assert!(err.message().contains("denomination_ratio"));
}

#[test]
fn test_unsupported_field_type_rejected() {
    let registry = TypeRegistry::with_builtin();
    let mut config = sample_config();
    config.fields = Some(json!([
        {
            "name": "Weather",
            "description": "Not a thing",
            "type": "temperature",
            "units": "C"
        }
    ]));
    let err = SchemaValidator::new(&registry).validate_config(&config).unwrap_err();
    assert_eq!(err.code().code(), "INVALID_FEED_FIELDS");
}
