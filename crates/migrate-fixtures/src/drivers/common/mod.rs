//! Utilities shared across platform drivers.
//!
//! - [`tls`]: TLS configuration for PostgreSQL connections
//! - [`scalar`]: interpreting the first column of a result as a boolean

pub mod scalar;
pub mod tls;

pub use scalar::text_is_truthy;
pub use tls::SslMode;
