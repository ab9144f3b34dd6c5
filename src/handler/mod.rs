//! # Relay Handler
//!
//! The enrichment-and-forward pipeline behind the HTTP endpoint. One
//! invocation in, one response out, one batched sink write at most. Nothing
//! is retained between invocations apart from metrics counters.

mod errors;
mod invocation;
mod relay;
mod response;

pub use errors::{ErrorResponse, RelayError, RelayResult};
pub use invocation::Invocation;
pub use relay::RelayHandler;
pub use response::{RelayResponse, ACCEPTED_BODY};
