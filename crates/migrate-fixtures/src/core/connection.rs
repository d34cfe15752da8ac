//! Connection descriptors.
//!
//! A [`ConnectionDescriptor`] is a parsed `key=value;key=value` connection
//! string. It stays opaque apart from the active database, which can be read
//! and rebound so catalog operations can run from a maintenance database.
//! Each platform executor translates the pairs into its driver's own config.

use std::fmt;
use std::str::FromStr;

use crate::error::{FixtureError, Result};

/// Keys that name the active database, in lookup order.
const DATABASE_KEYS: &[&str] = &["database", "initial catalog", "dbname"];

/// Key appended when the connection string carries no database yet.
const DEFAULT_DATABASE_KEY: &str = "Database";

/// A platform-native connection string with a rebindable active database.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pairs: Vec<(String, String)>,
}

impl ConnectionDescriptor {
    /// Parse a `;`-separated connection string.
    ///
    /// Keys are trimmed and matched case-insensitively; values are trimmed.
    /// A value wrapped in `"…"`, `'…'` or `{…}` may contain `;` and `=`; a
    /// doubled closing delimiter inside it stands for one literal character.
    /// Empty segments (e.g. a trailing `;`) are ignored.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Config` for blank input, a segment without `=`
    /// or an unterminated quoted value.
    pub fn parse(connection_string: &str) -> Result<Self> {
        if connection_string.trim().is_empty() {
            return Err(FixtureError::Config(
                "Connection string is empty".to_string(),
            ));
        }

        let mut pairs = Vec::new();
        let mut rest = connection_string;
        while !rest.is_empty() {
            let delimiter = rest.find(['=', ';']);
            let Some(eq) = delimiter.filter(|&i| rest[i..].starts_with('=')) else {
                let segment = rest.split(';').next().unwrap_or(rest);
                if !segment.trim().is_empty() {
                    return Err(FixtureError::Config(format!(
                        "Invalid connection string segment {:?}: expected key=value",
                        segment.trim()
                    )));
                }
                rest = rest.get(segment.len() + 1..).unwrap_or("");
                continue;
            };

            let key = rest[..eq].trim();
            if key.is_empty() {
                return Err(FixtureError::Config(format!(
                    "Invalid connection string segment {:?}: empty key",
                    rest.split(';').next().unwrap_or(rest).trim()
                )));
            }

            let (value, tail) = split_value(key, &rest[eq + 1..])?;
            pairs.push((key.to_string(), value));
            rest = tail;
        }

        Ok(Self { pairs })
    }

    /// Look up a value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Look up the first key of `keys` that is present.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Set a value, replacing an existing key in place or appending a new one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .pairs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// The active database, if the connection string names one.
    pub fn database(&self) -> Option<&str> {
        self.get_any(DATABASE_KEYS).filter(|db| !db.is_empty())
    }

    /// The active database, or a configuration error naming the connection.
    pub fn require_database(&self) -> Result<&str> {
        self.database().ok_or_else(|| {
            FixtureError::Config(format!(
                "Connection string does not name a database: {}",
                self.redacted()
            ))
        })
    }

    /// Rebind the active database.
    ///
    /// Every database key present is rewritten, so no driver can pick up a
    /// stale alias.
    pub fn set_database(&mut self, database: impl Into<String>) {
        let database = database.into();
        let mut found = false;
        for (_, v) in self
            .pairs
            .iter_mut()
            .filter(|(k, _)| DATABASE_KEYS.iter().any(|d| k.eq_ignore_ascii_case(d)))
        {
            *v = database.clone();
            found = true;
        }
        if !found {
            self.pairs.push((DEFAULT_DATABASE_KEY.to_string(), database));
        }
    }

    /// A copy of this descriptor bound to another database.
    #[must_use]
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        let mut rebound = self.clone();
        rebound.set_database(database);
        rebound
    }

    /// Render with secret values masked, for logs and error messages.
    pub fn redacted(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| {
                if is_secret_key(k) {
                    format!("{}=***", k)
                } else {
                    format!("{}={}", k, quote_value(v))
                }
            })
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Read one value from the start of `input`, returning it and the text after
/// its terminating `;`.
fn split_value<'a>(key: &str, input: &'a str) -> Result<(String, &'a str)> {
    let trimmed = input.trim_start();
    let close = match trimmed.chars().next() {
        Some('"') => '"',
        Some('\'') => '\'',
        Some('{') => '}',
        _ => {
            let (value, tail) = input.split_once(';').unwrap_or((input, ""));
            return Ok((value.trim().to_string(), tail));
        }
    };

    let mut value = String::new();
    let mut chars = trimmed[1..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != close {
            value.push(c);
            continue;
        }
        if chars.peek().map(|&(_, next)| next) == Some(close) {
            chars.next();
            value.push(close);
            continue;
        }

        let after = &trimmed[1 + i + c.len_utf8()..];
        let (junk, tail) = after.split_once(';').unwrap_or((after, ""));
        if !junk.trim().is_empty() {
            return Err(FixtureError::Config(format!(
                "Invalid connection string value for {:?}: text after closing quote",
                key
            )));
        }
        return Ok((value, tail));
    }

    Err(FixtureError::Config(format!(
        "Invalid connection string value for {:?}: unterminated quote",
        key
    )))
}

/// Quote a value when it would not survive a plain `key=value;` round trip.
fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains(';')
        || value.starts_with(['"', '\'', '{'])
        || value.trim() != value;
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn is_secret_key(key: &str) -> bool {
    ["password", "pwd"]
        .iter()
        .any(|s| key.eq_ignore_ascii_case(s))
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, quote_value(v)))
            .collect::<Vec<_>>()
            .join(";");
        f.write_str(&rendered)
    }
}

// Debug never prints secrets.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionDescriptor")
            .field(&self.redacted())
            .finish()
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
