//! Generated SQL text and script-file output.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// A generated SQL fixture.
///
/// Immutable once produced. Fixtures are regenerated on every call; tests
/// compare their literal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FixtureScript(String);

impl FixtureScript {
    /// Wrap generated SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// The SQL text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the SQL text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the script has no statement text at all.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Write the script to `path`. See [`write_script_file`].
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_script_file(path, &self.0)
    }
}

impl fmt::Display for FixtureScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FixtureScript {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<FixtureScript> for String {
    fn from(script: FixtureScript) -> Self {
        script.0
    }
}

/// Write `sql` to a new file at `path` as a single line followed by `\n`.
///
/// Creates or truncates the file. The handle is owned by this function and
/// closed when it returns, whether or not the write succeeded.
pub fn write_script_file(path: impl AsRef<Path>, sql: &str) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", sql)?;
    writer.flush()?;
    debug!("Wrote {} bytes of SQL to {:?}", sql.len() + 1, path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_script_file_appends_line_terminator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v0.00").join("test_v0_00.sql");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        write_script_file(&path, "CREATE SCHEMA reporting;").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "CREATE SCHEMA reporting;\n");
    }

    #[test]
    fn test_write_script_file_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sql");
        std::fs::write(&path, "old content that is longer than the new one").unwrap();

        FixtureScript::new("SELECT 1;").write_to(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SELECT 1;\n");
    }

    #[test]
    fn test_write_script_file_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("script.sql");
        let err = write_script_file(&path, "SELECT 1;").unwrap_err();
        assert!(matches!(err, crate::error::FixtureError::Io(_)));
    }

    #[test]
    fn test_fixture_script_accessors() {
        let script = FixtureScript::new("\nDROP TABLE script1;\n");
        assert!(!script.is_blank());
        assert_eq!(script.as_str(), "\nDROP TABLE script1;\n");
        assert_eq!(String::from(script.clone()), script.into_string());
        assert!(FixtureScript::new("  \n").is_blank());
    }
}
