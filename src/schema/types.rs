//! Feed schema type definitions.
//!
//! A feed schema declares which fields a feed publishes and the value shape
//! expected for each. The raw `FeedSchemaConfig` is what operators write by
//! hand; `FeedSchema` is the canonical, validated form with derived storage
//! paths, persisted for third-party readers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default feed type when the config does not name one.
pub const DEFAULT_FEED_TYPE: &str = "exchange_account_feed";

/// Default schema version when the config does not name one.
pub const DEFAULT_SCHEMA_VERSION: &str = "0.0.1";

/// Supported field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A single measured amount (e.g. an account balance).
    Balance,
    /// Profit/loss, reported as absolute and relative change.
    Pnl,
    /// A balance together with its profit/loss.
    PnlAndBalance,
}

impl FieldKind {
    /// Returns the kind name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Balance => "balance",
            FieldKind::Pnl => "pnl",
            FieldKind::PnlAndBalance => "pnl_and_balance",
        }
    }

    /// Kinds that carry a measured amount require denomination properties.
    pub fn requires_denomination(&self) -> bool {
        matches!(self, FieldKind::Balance | FieldKind::PnlAndBalance)
    }
}

/// How a measured amount is denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenominationType {
    /// The display unit (e.g. BTC).
    Main,
    /// The smallest unit (e.g. satoshi).
    Base,
}

impl DenominationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "main" => Some(DenominationType::Main),
            "base" => Some(DenominationType::Base),
            _ => None,
        }
    }
}

/// A field definition as written in the schema config.
///
/// Denomination properties are plain strings/integers here; they are checked
/// and narrowed by the feed type validator before a canonical [`FieldDef`]
/// is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_ratio: Option<i64>,
}

/// A canonical field definition with its derived storage path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub units: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_type: Option<DenominationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denomination_ratio: Option<u64>,
    /// Key under which this field's value lives in the distributed record.
    pub storage_path: String,
}

/// The raw schema definition supplied by an operator.
///
/// Top-level properties are optional at this stage so that validation can
/// report a specific error per missing property instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedSchemaConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Icon values keyed by size; every value must be an image data URI.
    #[serde(default)]
    pub icons: Option<BTreeMap<String, Value>>,
    /// Must be a sequence of field definitions; kept raw so a non-sequence
    /// value can be reported as such.
    #[serde(default)]
    pub fields: Option<Value>,
    #[serde(default, rename = "type")]
    pub feed_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// The canonical, validated feed schema.
///
/// Generated once at startup, persisted to a well-known location and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub feed_type: String,
    pub version: String,
    pub icons: BTreeMap<String, String>,
    pub fields: Vec<FieldDef>,
}

impl FeedSchema {
    /// Looks up a field definition by its declared name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single field update as received on the wire.
///
/// `name` and `value` are optional so their absence can be reported with the
/// dedicated error kinds rather than a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// A validated field value, discriminated by the field's declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Balance(f64),
    Pnl { absolute: f64, relative: f64 },
    PnlAndBalance { balance: f64, absolute_pnl: f64, relative_pnl: f64 },
}

impl FieldValue {
    /// Serializes the value in the shape third-party readers expect.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Balance(n) => serde_json::json!(n),
            FieldValue::Pnl { absolute, relative } => serde_json::json!({
                "absolute": absolute,
                "relative": relative,
            }),
            FieldValue::PnlAndBalance { balance, absolute_pnl, relative_pnl } => {
                serde_json::json!({
                    "balance": balance,
                    "absolute_pnl": absolute_pnl,
                    "relative_pnl": relative_pnl,
                })
            }
        }
    }
}

/// Derives the storage path for a field name.
///
/// The name is lower-cased and trimmed, runs of characters outside `[a-z0-9]`
/// collapse to a single `-`, a trailing `-` is stripped and the result is
/// wrapped in `/`. Deterministic: the same name always yields the same path.
pub fn storage_path_for(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash {
                slug.push('-');
                pending_dash = false;
            }
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    format!("/{}/", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_documented_examples() {
        assert_eq!(storage_path_for("Bitcoin"), "/bitcoin/");
        assert_eq!(storage_path_for("Bitcoin P/L"), "/bitcoin-p-l/");
    }

    #[test]
    fn test_storage_path_collapses_runs_and_strips_trailing() {
        assert_eq!(storage_path_for("USDT  /  Total"), "/usdt-total/");
        assert_eq!(storage_path_for("Balance!!"), "/balance/");
        assert_eq!(storage_path_for("  Spaced Out  "), "/spaced-out/");
    }

    #[test]
    fn test_storage_path_is_deterministic() {
        for _ in 0..50 {
            assert_eq!(storage_path_for("Bitcoin P/L"), "/bitcoin-p-l/");
        }
    }

    #[test]
    fn test_field_kind_wire_names() {
        assert_eq!(FieldKind::Balance.as_str(), "balance");
        assert_eq!(FieldKind::Pnl.as_str(), "pnl");
        assert_eq!(FieldKind::PnlAndBalance.as_str(), "pnl_and_balance");
    }

    #[test]
    fn test_denomination_required_per_kind() {
        assert!(FieldKind::Balance.requires_denomination());
        assert!(FieldKind::PnlAndBalance.requires_denomination());
        assert!(!FieldKind::Pnl.requires_denomination());
    }

    #[test]
    fn test_field_value_shapes() {
        assert_eq!(FieldValue::Balance(12.0).to_json(), serde_json::json!(12.0));
        let pnl = FieldValue::Pnl { absolute: -3.0, relative: -0.1 };
        assert_eq!(
            pnl.to_json(),
            serde_json::json!({"absolute": -3.0, "relative": -0.1})
        );
    }

    #[test]
    fn test_field_kind_serde_round_trip() {
        let kind: FieldKind = serde_json::from_str("\"pnl_and_balance\"").unwrap();
        assert_eq!(kind, FieldKind::PnlAndBalance);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"pnl_and_balance\"");
    }
}
