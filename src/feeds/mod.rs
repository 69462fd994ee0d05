//! Feed lifecycle: create, update, get, delete, broadcast, reconcile.

pub mod errors;
pub mod lock;
pub mod manager;

pub use errors::{FeedError, FeedResult};
pub use lock::{FlightGuard, SingleFlight};
pub use manager::{BroadcastReport, FeedInfo, FeedManager, ReconcileReport};
