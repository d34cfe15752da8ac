//! Microsoft SQL Server driver.
//!
//! - [`MssqlPlatform`]: fixture DDL, `GO`-separated batch scenarios, catalog probes and the drop plan
//! - [`MssqlExecutor`]: query primitives over Tiberius

mod executor;
mod platform;

pub use executor::MssqlExecutor;
pub use platform::{MssqlPlatform, BATCH_TERMINATOR};
