//! Fixture scripts and the helpers that produce them.
//!
//! - [`script`]: the [`FixtureScript`] text type and script-file output
//! - [`tokens`]: `${TokenN}` placeholder syntax
//! - [`batch`]: the batch-statement scenarios gated by capability flags

pub mod batch;
pub mod script;
pub mod tokens;

pub use batch::{BatchFixture, STANDARD_SCENARIO_OBJECTS};
pub use script::{write_script_file, FixtureScript};
pub use tokens::{token_placeholder, tokenized_name};
