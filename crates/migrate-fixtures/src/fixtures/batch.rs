//! Batch-statement fixture scenarios.
//!
//! These exercise how the engine under test splits a script into batches:
//! a single statement, several statements with and without a trailing
//! terminator, terminator-like text hidden in comments or literals, and a
//! batch that fails part way. Only platforms whose
//! `CapabilityFlags::supports_batch_statements` is set can render them.

use std::fmt;

/// Objects created by the standard test scenarios and removed by the cleanup script.
pub const STANDARD_SCENARIO_OBJECTS: [&str; 3] = ["script1", "script2", "script3"];

/// One batch-statement scenario together with the object names it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFixture {
    /// One statement followed by a batch terminator.
    SingleLine { object: String },
    /// One statement without a batch terminator.
    SingleLineWithoutTerminator { object: String },
    /// Three statements; the last has no terminator.
    MultilineWithoutTerminatorInLastLine { objects: [String; 3] },
    /// Three statements with a terminator inside comments.
    MultilineWithTerminatorInCommentBlock { objects: [String; 3] },
    /// Three statements with terminator-like text inside statement bodies and literals.
    MultilineWithTerminatorInsideStatements { objects: [String; 3] },
    /// Two batches; the second one fails when executed.
    MultilineWithError { objects: [String; 2] },
}

impl BatchFixture {
    /// Short, stable name used in logs and on the command line.
    pub fn kind(&self) -> &'static str {
        match self {
            BatchFixture::SingleLine { .. } => "single-line",
            BatchFixture::SingleLineWithoutTerminator { .. } => "single-line-without-terminator",
            BatchFixture::MultilineWithoutTerminatorInLastLine { .. } => {
                "multiline-without-terminator-in-last-line"
            }
            BatchFixture::MultilineWithTerminatorInCommentBlock { .. } => {
                "multiline-with-terminator-in-comment-block"
            }
            BatchFixture::MultilineWithTerminatorInsideStatements { .. } => {
                "multiline-with-terminator-inside-statements"
            }
            BatchFixture::MultilineWithError { .. } => "multiline-with-error",
        }
    }

    /// All object names this scenario creates, in creation order.
    pub fn objects(&self) -> Vec<&str> {
        match self {
            BatchFixture::SingleLine { object }
            | BatchFixture::SingleLineWithoutTerminator { object } => vec![object.as_str()],
            BatchFixture::MultilineWithoutTerminatorInLastLine { objects }
            | BatchFixture::MultilineWithTerminatorInCommentBlock { objects }
            | BatchFixture::MultilineWithTerminatorInsideStatements { objects } => {
                objects.iter().map(String::as_str).collect()
            }
            BatchFixture::MultilineWithError { objects } => {
                objects.iter().map(String::as_str).collect()
            }
        }
    }

    /// Build a scenario from its kind name and object names.
    ///
    /// Missing names are filled from [`STANDARD_SCENARIO_OBJECTS`]. Returns
    /// `None` for an unknown kind.
    pub fn from_kind(kind: &str, names: &[String]) -> Option<Self> {
        let name = |i: usize| {
            names
                .get(i)
                .cloned()
                .unwrap_or_else(|| STANDARD_SCENARIO_OBJECTS[i].to_string())
        };
        let three = || [name(0), name(1), name(2)];

        let fixture = match kind {
            "single-line" => BatchFixture::SingleLine { object: name(0) },
            "single-line-without-terminator" => {
                BatchFixture::SingleLineWithoutTerminator { object: name(0) }
            }
            "multiline-without-terminator-in-last-line" => {
                BatchFixture::MultilineWithoutTerminatorInLastLine { objects: three() }
            }
            "multiline-with-terminator-in-comment-block" => {
                BatchFixture::MultilineWithTerminatorInCommentBlock { objects: three() }
            }
            "multiline-with-terminator-inside-statements" => {
                BatchFixture::MultilineWithTerminatorInsideStatements { objects: three() }
            }
            "multiline-with-error" => BatchFixture::MultilineWithError {
                objects: [name(0), name(1)],
            },
            _ => return None,
        };
        Some(fixture)
    }

    /// Every scenario kind name.
    pub const KINDS: [&'static str; 6] = [
        "single-line",
        "single-line-without-terminator",
        "multiline-without-terminator-in-last-line",
        "multiline-with-terminator-in-comment-block",
        "multiline-with-terminator-inside-statements",
        "multiline-with-error",
    ];
}

impl fmt::Display for BatchFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.objects().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kind_round_trips_every_kind() {
        for kind in BatchFixture::KINDS {
            let fixture = BatchFixture::from_kind(kind, &[]).unwrap();
            assert_eq!(fixture.kind(), kind);
        }
        assert!(BatchFixture::from_kind("nope", &[]).is_none());
    }

    #[test]
    fn test_from_kind_fills_standard_names() {
        let fixture =
            BatchFixture::from_kind("multiline-with-error", &["first".to_string()]).unwrap();
        assert_eq!(fixture.objects(), vec!["first", "script2"]);
    }

    #[test]
    fn test_display() {
        let fixture = BatchFixture::SingleLine { object: "test_single".into() };
        assert_eq!(fixture.to_string(), "single-line(test_single)");
    }
}
