//! Core abstractions shared by every platform.
//!
//! - [`traits`]: the platform contract and the query primitives
//! - [`connection`]: connection descriptors with a rebindable database
//! - [`object_name`]: `schema.name` resolution
//! - [`identifier`]: identifier validation, quoting and literal escaping
//!
//! Platform adapters in `drivers/` implement these; nothing here knows about
//! a specific database engine.

pub mod connection;
pub mod identifier;
pub mod object_name;
pub mod traits;

pub use connection::ConnectionDescriptor;
pub use object_name::{resolve_object_name, ObjectRef};
pub use traits::{CapabilityFlags, CatalogProbe, Platform, QueryExecutor, SUPPORTS_BATCH_STATEMENTS};
