//! Variable references of the form `path` or `path:key`.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Separator between the variable path and the key name.
pub const KEY_SEPARATOR: char = ':';

/// A parsed reference to either a whole variable or one key within it.
///
/// An empty `key_name` means the spec is *bare* and addresses the whole
/// variable. Specs are immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableSpec {
    variable_path: String,
    key_name: String,
}

impl VariableSpec {
    /// Parse a reference string.
    ///
    /// `"a"` is bare, `"a:b"` is keyed. A trailing separator with no key
    /// (`"a:"`) yields a bare spec. More than one separator, or an empty
    /// path, is rejected with [`Error::InvalidSpec`].
    pub fn parse(spec: &str) -> Result<Self> {
        let fragments: Vec<&str> = spec.split(KEY_SEPARATOR).collect();

        let (path, key) = match fragments.as_slice() {
            [path] => (*path, ""),
            [path, key] => (*path, *key),
            _ => {
                return Err(Error::InvalidSpec(format!(
                    "'{}': expected <variable> or <variable>{}<key>",
                    spec, KEY_SEPARATOR
                )));
            }
        };

        if path.is_empty() {
            return Err(Error::InvalidSpec(format!(
                "'{}': variable path must not be empty",
                spec
            )));
        }

        Ok(Self {
            variable_path: path.to_string(),
            key_name: key.to_string(),
        })
    }

    /// Build a spec directly from its parts.
    pub fn new(variable_path: impl Into<String>, key_name: impl Into<String>) -> Result<Self> {
        let variable_path = variable_path.into();
        let key_name = key_name.into();
        if variable_path.is_empty() {
            return Err(Error::InvalidSpec(
                "variable path must not be empty".to_string(),
            ));
        }
        if variable_path.contains(KEY_SEPARATOR) || key_name.contains(KEY_SEPARATOR) {
            return Err(Error::InvalidSpec(format!(
                "'{}{}{}': too many '{}' separators",
                variable_path, KEY_SEPARATOR, key_name, KEY_SEPARATOR
            )));
        }
        Ok(Self {
            variable_path,
            key_name,
        })
    }

    /// The addressable variable name in the store.
    pub fn path(&self) -> &str {
        &self.variable_path
    }

    /// The key within the variable, or `""` for a bare spec.
    pub fn key(&self) -> &str {
        &self.key_name
    }

    /// Whether this spec names a single key.
    pub fn is_keyed(&self) -> bool {
        !self.key_name.is_empty()
    }
}

impl FromStr for VariableSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for VariableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_keyed() {
            write!(f, "{}{}{}", self.variable_path, KEY_SEPARATOR, self.key_name)
        } else {
            write!(f, "{}", self.variable_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare() {
        let spec = VariableSpec::parse("a").unwrap();
        assert_eq!(spec.path(), "a");
        assert_eq!(spec.key(), "");
        assert!(!spec.is_keyed());
    }

    #[test]
    fn test_parse_keyed() {
        let spec = VariableSpec::parse("a:b").unwrap();
        assert_eq!(spec.path(), "a");
        assert_eq!(spec.key(), "b");
        assert!(spec.is_keyed());
    }

    #[test]
    fn test_parse_nested_path() {
        let spec = VariableSpec::parse("nomad/jobs/myjob:thisvar").unwrap();
        assert_eq!(spec.path(), "nomad/jobs/myjob");
        assert_eq!(spec.key(), "thisvar");
    }

    #[test]
    fn test_parse_too_many_separators() {
        let err = VariableSpec::parse("a:b:c").unwrap_err();
        assert!(matches!(err, Error::InvalidSpec(_)));
    }

    #[test]
    fn test_parse_empty_path() {
        assert!(matches!(
            VariableSpec::parse("").unwrap_err(),
            Error::InvalidSpec(_)
        ));
        assert!(matches!(
            VariableSpec::parse(":key").unwrap_err(),
            Error::InvalidSpec(_)
        ));
    }

    #[test]
    fn test_parse_trailing_separator_is_bare() {
        let spec = VariableSpec::parse("a:").unwrap();
        assert_eq!(spec.path(), "a");
        assert!(!spec.is_keyed());
    }

    #[test]
    fn test_from_str_and_display() {
        let spec: VariableSpec = "jobs/a:db_url".parse().unwrap();
        assert_eq!(spec.to_string(), "jobs/a:db_url");

        let bare: VariableSpec = "jobs/a".parse().unwrap();
        assert_eq!(bare.to_string(), "jobs/a");
    }

    #[test]
    fn test_new_rejects_separator_in_parts() {
        assert!(VariableSpec::new("a:b", "c").is_err());
        assert!(VariableSpec::new("a", "b:c").is_err());
        assert!(VariableSpec::new("", "c").is_err());
        assert!(VariableSpec::new("a", "c").unwrap().is_keyed());
    }
}
