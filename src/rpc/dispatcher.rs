//! Maps wire envelopes onto feed manager operations.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::feeds::{FeedError, FeedManager};
use crate::observability::{Logger, Severity};

use super::request::{parse_feed_id, parse_fields, Envelope, Method};
use super::response::ResponseEnvelope;

/// Resolves envelopes against the method allow-list and runs the matching
/// lifecycle operation.
pub struct Dispatcher {
    manager: Arc<FeedManager>,
}

impl Dispatcher {
    pub fn new(manager: Arc<FeedManager>) -> Self {
        Self { manager }
    }

    /// Handles one raw request value and always produces a response.
    pub async fn dispatch(&self, raw: Value) -> ResponseEnvelope {
        let envelope: Envelope = match serde_json::from_value(raw) {
            Ok(envelope) => envelope,
            Err(_) => return ResponseEnvelope::invalid_method(Value::Null),
        };
        let id = envelope.id.clone().unwrap_or(Value::Null);

        let method = match envelope.method.as_deref().and_then(Method::from_name) {
            Some(method) => method,
            None => {
                Logger::log(
                    Severity::Warn,
                    "unknown_method",
                    &[("method", envelope.method.as_deref().unwrap_or("<none>"))],
                );
                return ResponseEnvelope::invalid_method(id);
            }
        };

        match self.run(method, envelope.params.as_ref()).await {
            Ok(result) => ResponseEnvelope::ok(id, result),
            Err(err) if err.is_expected() => ResponseEnvelope::domain_error(id, &err),
            Err(err) => {
                Logger::error("dispatch_failed", &err, &[("method", method.name())]);
                ResponseEnvelope::internal_error(id)
            }
        }
    }

    async fn run(&self, method: Method, params: Option<&Value>) -> Result<Value, FeedError> {
        match method {
            Method::CreateFeed => {
                let feed_id = parse_feed_id(params)?;
                let info = self.manager.create_feed(&feed_id).await?;
                encode(&info)
            }
            Method::UpdateFeed => {
                let feed_id = parse_feed_id(params)?;
                let updates = parse_fields(params)?;
                self.manager.update_feed(&feed_id, &updates).await?;
                Ok(json!({"updated": true}))
            }
            Method::GetFeed => {
                let feed_id = parse_feed_id(params)?;
                let info = self.manager.get_feed(&feed_id).await?;
                encode(&info)
            }
            Method::DeleteFeed => {
                let feed_id = parse_feed_id(params)?;
                self.manager.delete_feed(&feed_id).await?;
                Ok(json!({"deleted": true}))
            }
        }
    }
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, FeedError> {
    // Serialization of our own response types cannot reasonably fail; treat
    // it as an update failure rather than panicking if it ever does.
    serde_json::to_value(value).map_err(|_| FeedError::UpdateFeedFailed)
}
