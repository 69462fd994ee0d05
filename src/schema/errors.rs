//! Schema validation error types.
//!
//! Every validation failure carries a stable wire code plus a human-readable
//! message; callers surface the code verbatim to clients.

use std::fmt;

/// Schema-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Top-level `name` property missing.
    MissingFeedName,
    /// Top-level `description` property missing.
    MissingFeedDescription,
    /// Top-level `icons` property missing.
    MissingFeedIcons,
    /// Top-level `fields` property missing.
    MissingFeedFields,
    /// `fields` is not a non-empty sequence of field definitions.
    InvalidFeedFields,
    /// An icon value is not an image data URI.
    InvalidFeedIcon,
    /// A field definition violates its feed type's requirements.
    InvalidField,
    /// A field property has an invalid value.
    InvalidFieldValue,
    /// The schema names a feed type no validator is registered for.
    UnknownFeedType,
    /// The schema file could not be read, written or parsed.
    MalformedSchema,
}

impl SchemaErrorCode {
    /// Returns the stable wire code string.
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::MissingFeedName => "MISSING_FEED_NAME",
            SchemaErrorCode::MissingFeedDescription => "MISSING_FEED_DESCRIPTION",
            SchemaErrorCode::MissingFeedIcons => "MISSING_FEED_ICONS",
            SchemaErrorCode::MissingFeedFields => "MISSING_FEED_FIELDS",
            SchemaErrorCode::InvalidFeedFields => "INVALID_FEED_FIELDS",
            SchemaErrorCode::InvalidFeedIcon => "INVALID_FEED_ICON",
            SchemaErrorCode::InvalidField => "INVALID_FIELD",
            SchemaErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            SchemaErrorCode::UnknownFeedType => "UNKNOWN_FEED_TYPE",
            SchemaErrorCode::MalformedSchema => "MALFORMED_SCHEMA",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A schema validation error with full context.
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Field name the error applies to, when field-scoped.
    field: Option<String>,
}

impl SchemaError {
    pub fn missing_property(code: SchemaErrorCode) -> Self {
        let property = match code {
            SchemaErrorCode::MissingFeedName => "name",
            SchemaErrorCode::MissingFeedDescription => "description",
            SchemaErrorCode::MissingFeedIcons => "icons",
            SchemaErrorCode::MissingFeedFields => "fields",
            _ => "property",
        };
        Self {
            code,
            message: format!("schema config is missing '{}'", property),
            field: None,
        }
    }

    pub fn invalid_fields(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::InvalidFeedFields,
            message: reason.into(),
            field: None,
        }
    }

    pub fn invalid_icon(size: impl Into<String>) -> Self {
        let size = size.into();
        Self {
            code: SchemaErrorCode::InvalidFeedIcon,
            message: format!("icon '{}' is not an image data URI", size),
            field: None,
        }
    }

    /// A field definition is missing a property its type requires.
    pub fn invalid_field(field: impl Into<String>, missing: &str) -> Self {
        let field = field.into();
        Self {
            code: SchemaErrorCode::InvalidField,
            message: format!("field '{}' is missing '{}'", field, missing),
            field: Some(field),
        }
    }

    pub fn invalid_field_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            code: SchemaErrorCode::InvalidFieldValue,
            message: format!("field '{}': {}", field, reason.into()),
            field: Some(field),
        }
    }

    pub fn unknown_feed_type(name: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::UnknownFeedType,
            message: format!("no validator registered for feed type '{}'", name.into()),
            field: None,
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MalformedSchema,
            message: format!("schema file '{}': {}", path.into(), reason.into()),
            field: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_property_codes() {
        let err = SchemaError::missing_property(SchemaErrorCode::MissingFeedName);
        assert_eq!(err.code().code(), "MISSING_FEED_NAME");
        assert!(err.message().contains("name"));

        let err = SchemaError::missing_property(SchemaErrorCode::MissingFeedIcons);
        assert_eq!(err.code().code(), "MISSING_FEED_ICONS");
    }

    #[test]
    fn test_invalid_field_names_field_and_property() {
        let err = SchemaError::invalid_field("Bitcoin", "denomination_ratio");
        assert_eq!(err.field(), Some("Bitcoin"));
        assert!(err.message().contains("Bitcoin"));
        assert!(err.message().contains("denomination_ratio"));
    }

    #[test]
    fn test_display_carries_code() {
        let err = SchemaError::invalid_icon("48");
        let shown = format!("{}", err);
        assert!(shown.contains("INVALID_FEED_ICON"));
        assert!(shown.contains("48"));
    }
}
