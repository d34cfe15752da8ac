//! MySQL/MariaDB driver.
//!
//! - [`MysqlPlatform`]: fixture DDL, catalog probes and the drop plan
//! - [`MysqlExecutor`]: query primitives over `mysql_async`

mod executor;
mod platform;

pub use executor::MysqlExecutor;
pub use platform::MysqlPlatform;
