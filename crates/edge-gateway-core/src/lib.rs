//! Core types for the edge gateway.
//!
//! This crate owns the command envelope, the decoding of the opaque JSON
//! fields carried by it, and the route table with its validation rules. It
//! performs no I/O; the client crate moves envelopes, the daemon serves routes.

mod envelope;
mod key;
pub mod routes;
pub mod validate;

pub use envelope::{
    CommandEnvelope, CommandResult, DecodeError, HealthResult, ModuleHealth, decode_structured,
    non_empty,
};
pub use key::{CommandKey, KeyParseError};
pub use routes::{Method, RouteSpec, RouteTable};
pub use validate::ValidationError;
