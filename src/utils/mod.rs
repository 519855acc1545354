//! Utility modules shared across the relay.
//!
//! - amount: token amount normalisation
//! - http: retryable HTTP clients
//! - logging: logging setup, error contexts and error reporting
//! - macros: serde helper macros
//! - parsing: CLI and configuration value parsing

pub mod amount;
pub mod http;
pub mod logging;
pub mod macros;
pub mod parsing;

pub use amount::*;
pub use http::*;
pub use parsing::*;
