//! Request-level access control.
//!
//! An [`AccessGate`] is an ordered chain of [`AccessCheck`]s evaluated
//! against the account behind a bearer token. The first failing check
//! decides the outcome.

pub mod authorizer;
pub mod checks;
pub mod errors;
pub mod gate;

pub use authorizer::Authorizer;
pub use checks::AccessCheck;
pub use errors::AccessError;
pub use gate::AccessGate;
