//! Wire-level request dispatch.
//!
//! The dispatcher's contract is fixed: envelopes `{id, method, params}` in,
//! versioned envelopes with `result` or `error{code, message}` out. Expected
//! domain errors pass through verbatim; anything else becomes a generic
//! internal error.

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use request::{Envelope, Method};
pub use response::{
    ErrorBody, ResponseEnvelope, CODE_INTERNAL_ERROR, CODE_INVALID_METHOD, PROTOCOL_VERSION,
};
pub use server::RpcServer;
