//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns such as
//! tracing and bearer authentication.

pub mod auth;
pub mod trace;

pub use auth::AuthGate;
pub use trace::Trace;
