//! Exchange account feed type.
//!
//! Fields report account balances and profit/loss. Measured kinds (`balance`,
//! `pnl_and_balance`) must declare how their amounts are denominated.

use serde_json::Value;

use super::FeedTypeValidator;
use crate::schema::errors::{SchemaError, SchemaResult};
use crate::schema::types::{
    storage_path_for, DenominationType, FieldConfig, FieldDef, FieldKind, FieldValue,
};

/// Validator for the `exchange_account_feed` type.
#[derive(Debug)]
pub struct ExchangeAccountFeed;

impl FeedTypeValidator for ExchangeAccountFeed {
    fn type_name(&self) -> &'static str {
        "exchange_account_feed"
    }

    fn validate_schema_fields(&self, fields: &[FieldConfig]) -> SchemaResult<()> {
        for field in fields {
            if field.name.trim().is_empty() {
                return Err(SchemaError::invalid_field("<unnamed>", "name"));
            }
            if field.kind.requires_denomination() {
                if field.denomination_type.is_none() {
                    return Err(SchemaError::invalid_field(&field.name, "denomination_type"));
                }
                if field.denomination_ratio.is_none() {
                    return Err(SchemaError::invalid_field(&field.name, "denomination_ratio"));
                }
            }
        }
        Ok(())
    }

    fn validate_schema_values(&self, fields: &[FieldConfig]) -> SchemaResult<()> {
        for field in fields {
            if !field.kind.requires_denomination() {
                continue;
            }
            if let Some(dt) = &field.denomination_type {
                if DenominationType::parse(dt).is_none() {
                    return Err(SchemaError::invalid_field_value(
                        &field.name,
                        "denomination_type must be \"main\" or \"base\"",
                    ));
                }
            }
            if let Some(ratio) = field.denomination_ratio {
                if ratio < 1 {
                    return Err(SchemaError::invalid_field_value(
                        &field.name,
                        "denomination_ratio must be a positive integer",
                    ));
                }
            }
        }
        Ok(())
    }

    fn generate_fields(&self, fields: &[FieldConfig]) -> SchemaResult<Vec<FieldDef>> {
        fields
            .iter()
            .map(|field| {
                let denomination_type = match &field.denomination_type {
                    Some(dt) => Some(DenominationType::parse(dt).ok_or_else(|| {
                        SchemaError::invalid_field_value(
                            &field.name,
                            "denomination_type must be \"main\" or \"base\"",
                        )
                    })?),
                    None => None,
                };
                let denomination_ratio = match field.denomination_ratio {
                    Some(r) if r >= 1 => Some(r as u64),
                    Some(_) => {
                        return Err(SchemaError::invalid_field_value(
                            &field.name,
                            "denomination_ratio must be a positive integer",
                        ))
                    }
                    None => None,
                };
                Ok(FieldDef {
                    name: field.name.clone(),
                    description: field.description.clone(),
                    kind: field.kind,
                    units: field.units.clone(),
                    denomination_type,
                    denomination_ratio,
                    storage_path: storage_path_for(&field.name),
                })
            })
            .collect()
    }

    fn validate_update(&self, field: &FieldDef, value: &Value) -> SchemaResult<FieldValue> {
        match field.kind {
            FieldKind::Balance => {
                let n = value.as_f64().ok_or_else(|| {
                    SchemaError::invalid_field_value(&field.name, "balance value must be a number")
                })?;
                Ok(FieldValue::Balance(n))
            }
            FieldKind::Pnl => {
                let absolute = numeric_member(value, &field.name, "absolute")?;
                let relative = numeric_member(value, &field.name, "relative")?;
                Ok(FieldValue::Pnl { absolute, relative })
            }
            FieldKind::PnlAndBalance => {
                let balance = numeric_member(value, &field.name, "balance")?;
                let absolute_pnl = numeric_member(value, &field.name, "absolute_pnl")?;
                let relative_pnl = numeric_member(value, &field.name, "relative_pnl")?;
                Ok(FieldValue::PnlAndBalance { balance, absolute_pnl, relative_pnl })
            }
        }
    }
}

fn numeric_member(value: &Value, field: &str, member: &str) -> SchemaResult<f64> {
    value
        .get(member)
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            SchemaError::invalid_field_value(
                field,
                format!("value must carry a numeric '{}'", member),
            )
        })
}
