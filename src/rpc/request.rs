//! Request envelope and parameter extraction.
//!
//! Requests arrive as `{id, method, params}`. Methods resolve against a
//! static allow-list; parameter problems map onto the lifecycle manager's
//! own error kinds so callers see the same codes regardless of where a check
//! runs.

use serde::Deserialize;
use serde_json::Value;

use crate::feeds::{FeedError, FeedResult};
use crate::schema::FieldUpdate;

/// A wire request envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// The allow-listed lifecycle methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    CreateFeed,
    UpdateFeed,
    GetFeed,
    DeleteFeed,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "createFeed" => Some(Method::CreateFeed),
            "updateFeed" => Some(Method::UpdateFeed),
            "getFeed" => Some(Method::GetFeed),
            "deleteFeed" => Some(Method::DeleteFeed),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Method::CreateFeed => "createFeed",
            Method::UpdateFeed => "updateFeed",
            Method::GetFeed => "getFeed",
            Method::DeleteFeed => "deleteFeed",
        }
    }
}

/// Extracts `feed_id` from request params.
pub fn parse_feed_id(params: Option<&Value>) -> FeedResult<String> {
    let raw = params
        .and_then(|p| p.get("feed_id"))
        .ok_or(FeedError::FeedIdMissing)?;
    match raw {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::String(_) => Err(FeedError::FeedIdMissing),
        _ => Err(FeedError::FeedIdNotString),
    }
}

/// Extracts the `fields` update list from request params.
pub fn parse_fields(params: Option<&Value>) -> FeedResult<Vec<FieldUpdate>> {
    let raw = params
        .and_then(|p| p.get("fields"))
        .ok_or(FeedError::MissingFields)?;
    let entries = raw.as_array().ok_or(FeedError::InvalidFeedFields)?;

    let mut updates = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.is_object() {
            return Err(FeedError::InvalidFeedFields);
        }
        let update: FieldUpdate = serde_json::from_value(entry.clone())
            .map_err(|_| FeedError::InvalidFeedFields)?;
        updates.push(update);
    }
    Ok(updates)
}
