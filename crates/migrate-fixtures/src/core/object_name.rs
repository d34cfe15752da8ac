//! Schema-qualified object name resolution.

use std::fmt;

use crate::error::{FixtureError, Result};

/// Separator between schema and object name.
const QUALIFIER_SEPARATOR: char = '.';

/// A resolved `(schema, name)` pair.
///
/// Both parts are lower-cased and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Split a possibly schema-qualified object name.
///
/// If the first `.` sits after the first character, the text before it is the
/// schema and the text after it is the name. Otherwise `default_schema` is
/// used and the whole input is the name.
///
/// # Errors
///
/// Returns `FixtureError::Config` if either resolved part would be empty.
pub fn resolve_object_name(object_name: &str, default_schema: &str) -> Result<ObjectRef> {
    let (schema, name) = match object_name.find(QUALIFIER_SEPARATOR) {
        Some(idx) if idx > 0 => (&object_name[..idx], &object_name[idx + 1..]),
        _ => (default_schema, object_name),
    };

    if schema.trim().is_empty() || name.trim().is_empty() {
        return Err(FixtureError::Config(format!(
            "Cannot resolve object name {:?} (default schema {:?}): schema and name must not be empty",
            object_name, default_schema
        )));
    }

    Ok(ObjectRef {
        schema: schema.to_lowercase(),
        name: name.to_lowercase(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_is_split_and_lowered() {
        let obj = resolve_object_name("Foo.Bar", "public").unwrap();
        assert_eq!(obj.schema, "foo");
        assert_eq!(obj.name, "bar");
    }

    #[test]
    fn test_unqualified_name_uses_default_schema() {
        let obj = resolve_object_name("Bar", "public").unwrap();
        assert_eq!(obj, ObjectRef { schema: "public".into(), name: "bar".into() });

        let obj = resolve_object_name("Bar", "dbo").unwrap();
        assert_eq!(obj.schema, "dbo");
    }

    #[test]
    fn test_default_schema_is_lowered() {
        let obj = resolve_object_name("Visitor", "TestDb").unwrap();
        assert_eq!(obj.schema, "testdb");
    }

    #[test]
    fn test_qualified_and_unqualified_agree_on_default_schema() {
        assert_eq!(
            resolve_object_name("public.Visitor", "public").unwrap(),
            resolve_object_name("Visitor", "public").unwrap()
        );
    }

    #[test]
    fn test_leading_separator_is_not_a_qualifier() {
        let obj = resolve_object_name(".hidden", "public").unwrap();
        assert_eq!(obj.schema, "public");
        assert_eq!(obj.name, ".hidden");
    }

    #[test]
    fn test_only_first_separator_splits() {
        let obj = resolve_object_name("a.b.c", "public").unwrap();
        assert_eq!(obj.schema, "a");
        assert_eq!(obj.name, "b.c");
    }

    #[test]
    fn test_empty_parts_are_rejected() {
        assert!(resolve_object_name("schema.", "public").is_err());
        assert!(resolve_object_name("", "public").is_err());
        assert!(resolve_object_name("Bar", "").is_err());
    }

    #[test]
    fn test_display() {
        let obj = resolve_object_name("Sales.Orders", "dbo").unwrap();
        assert_eq!(obj.to_string(), "sales.orders");
    }
}
