//! Feed lifecycle error types.
//!
//! Three families share one enum: input validation errors, precondition
//! errors and wrapped dependency failures. Every variant carries a stable
//! wire code surfaced verbatim to callers; provider-specific errors never
//! appear here (they are logged at the boundary where they are wrapped).

use thiserror::Error;

/// Domain errors raised by the feed lifecycle manager.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Manager dependencies have not finished initializing.
    #[error("feed manager is not ready")]
    NotReady,

    /// The feed index could not be started.
    #[error("failed to start feed index")]
    DbFailedStart,

    /// The manager was constructed with an unusable configuration.
    #[error("bad feed manager config: {0}")]
    BadConfig(String),

    /// No `feed_id` was supplied.
    #[error("feed_id was not passed")]
    FeedIdMissing,

    /// `feed_id` must be a string.
    #[error("feed_id must be a string")]
    FeedIdNotString,

    /// Another operation for this feed is already in flight.
    #[error("operation already running for this feed")]
    ProcessAlreadyRunning,

    /// An active feed with this identity already exists.
    #[error("feed already exists")]
    FeedExists,

    /// The store produced no usable record for this identity.
    #[error("feed id has no record")]
    IdNoFeed,

    /// Creating the distributed record or its index row failed.
    #[error("failed to create feed")]
    FailedCreateFeed,

    /// Writing the schema header or field placeholders failed.
    #[error("failed to initialize feed fields")]
    BadSchemaSetup,

    /// `fields` must be a non-empty list.
    #[error("fields must be a non-empty list")]
    MissingFields,

    /// `fields` is not a list of field updates.
    #[error("invalid fields parameter")]
    InvalidFeedFields,

    /// A field update carries no name.
    #[error("field update is missing its name")]
    MissingFieldName,

    /// A field update carries no value.
    #[error("field update is missing its value")]
    MissingFieldValue,

    /// A field update names a field absent from the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A field update's value does not match the field's declared type.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },

    /// Update requested for a feed with no active record.
    #[error("feed does not exist")]
    FeedNotExists,

    /// Lookup requested for a feed with no active record.
    #[error("feed not found")]
    FeedNotFound,

    /// A field write failed mid-update; earlier writes remain applied.
    #[error("failed to update feed")]
    UpdateFeedFailed,

    /// Removing the index row or destroying the record failed.
    #[error("failed to delete feed")]
    FailedDeleteFeed,

    /// Re-announcing previously created feeds partially failed.
    #[error("failed to broadcast feeds: {failed} failed, {announced} announced")]
    FailedBroadcast { announced: usize, failed: usize },

    /// The reconciliation sweep could not scan one of its sides.
    #[error("failed to reconcile index and store")]
    FailedReconcile,
}

impl FeedError {
    /// Stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FeedError::NotReady => "FEEDS_NOT_READY",
            FeedError::DbFailedStart => "FAILED_TO_START_DB",
            FeedError::BadConfig(_) => "BAD_CONFIG",
            FeedError::FeedIdMissing => "FEED_ID_NOT_PASSED",
            FeedError::FeedIdNotString => "FEED_ID_NOT_STRING",
            FeedError::ProcessAlreadyRunning => "PROCESS_ALREADY_RUNNING",
            FeedError::FeedExists => "FEED_EXISTS",
            FeedError::IdNoFeed => "FEED_ID_HAS_NO_FEED",
            FeedError::FailedCreateFeed => "FAILED_TO_CREATE_FEED",
            FeedError::BadSchemaSetup => "FAILED_TO_INIT_FEED_FIELDS",
            FeedError::MissingFields => "MISSING_FIELDS",
            FeedError::InvalidFeedFields => "INVALID_FEED_FIELDS",
            FeedError::MissingFieldName => "MISSING_FIELD_NAME",
            FeedError::MissingFieldValue => "MISSING_FIELD_VALUE",
            FeedError::UnknownField(_) => "UNKNOWN_FIELD",
            FeedError::InvalidFieldValue { .. } => "INVALID_FIELD_VALUE",
            FeedError::FeedNotExists => "FEED_NOT_EXISTS",
            FeedError::FeedNotFound => "FEED_NOT_FOUND",
            FeedError::UpdateFeedFailed => "FAILED_TO_UPDATE_FEED",
            FeedError::FailedDeleteFeed => "FAILED_TO_DELETE_FEED",
            FeedError::FailedBroadcast { .. } => "FAILED_BROADCAST",
            FeedError::FailedReconcile => "FAILED_RECONCILE",
        }
    }

    /// Expected domain errors are surfaced to callers with their message;
    /// anything else becomes a generic internal error at the wire boundary.
    pub fn is_expected(&self) -> bool {
        true
    }
}

/// Result type for feed lifecycle operations.
pub type FeedResult<T> = Result<T, FeedError>;
