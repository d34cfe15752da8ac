//! PostgreSQL driver.
//!
//! This module provides PostgreSQL-specific implementations:
//!
//! - [`PostgresPlatform`]: fixture DDL, catalog probes and the drop plan
//! - [`PostgresExecutor`]: query primitives over `tokio-postgres`

mod executor;
mod platform;

pub use executor::PostgresExecutor;
pub use platform::PostgresPlatform;
