//! Boolean interpretation of scalar query results.
//!
//! Drivers return the first column in different shapes (text, integers,
//! bits). They normalize it to text or a number and use these helpers so
//! that every platform agrees on what counts as "true".

/// Whether a textual scalar is truthy.
///
/// `NULL`, empty text, `0`, `f`, `false`, `n` and `no` are false; anything
/// else (including any non-zero number) is true.
pub fn text_is_truthy(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if let Ok(n) = value.parse::<f64>() {
        return n != 0.0;
    }
    !matches!(
        value.to_lowercase().as_str(),
        "f" | "false" | "n" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        assert!(text_is_truthy(Some("1")));
        assert!(text_is_truthy(Some("t")));
        assert!(text_is_truthy(Some("true")));
        assert!(text_is_truthy(Some("42")));
        assert!(text_is_truthy(Some("appdb")));
    }

    #[test]
    fn test_falsy_values() {
        assert!(!text_is_truthy(None));
        assert!(!text_is_truthy(Some("")));
        assert!(!text_is_truthy(Some("0")));
        assert!(!text_is_truthy(Some("0.0")));
        assert!(!text_is_truthy(Some("f")));
        assert!(!text_is_truthy(Some("FALSE")));
    }
}
