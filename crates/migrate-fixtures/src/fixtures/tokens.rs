//! Token placeholder syntax.
//!
//! Placeholders are emitted verbatim; replacing them is the job of the token
//! replacement step of the engine under test.

/// Number of placeholders appended by [`tokenized_name`].
pub const DEFAULT_TOKEN_COUNT: usize = 3;

/// The placeholder for the `index`-th token, e.g. `${Token1}`.
pub fn token_placeholder(index: usize) -> String {
    format!("${{Token{}}}", index)
}

/// Append `${Token1}`..`${TokenN}` to a base name, separated by underscores.
///
/// `tokenized_name("Visitor", 3)` is `Visitor_${Token1}_${Token2}_${Token3}`.
pub fn tokenized_name(base: &str, count: usize) -> String {
    let mut name = base.to_string();
    for i in 1..=count {
        name.push('_');
        name.push_str(&token_placeholder(i));
    }
    name
}
