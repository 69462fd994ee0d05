//! feedcast - schema-typed data feeds published over a distributed record
//! store.
//!
//! A feed is a named, schema-typed record whose individual fields are
//! mirrored into a distributed keyed store for third-party read access. The
//! local index keeps the address material for fast existence checks and
//! lookup; the [`feeds::FeedManager`] keeps both sides consistent through
//! the create/update/delete/get lifecycle.

pub mod cli;
pub mod config;
pub mod feeds;
pub mod index;
pub mod observability;
pub mod rpc;
pub mod schema;
pub mod store;
