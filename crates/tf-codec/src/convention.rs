//! The reserved characters of the column naming convention.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidNameError, Result};

/// Default metadata marker.
pub const DEFAULT_MARKER: char = '_';

/// Default namespace separator.
pub const DEFAULT_SEPARATOR: char = '.';

/// Reserved characters shared by the codec and the classifier.
///
/// A column starting with `marker` is metadata; the last `separator` in a
/// data column splits namespace from leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    #[serde(default = "default_marker")]
    pub marker: char,

    #[serde(default = "default_separator")]
    pub separator: char,
}

fn default_marker() -> char {
    DEFAULT_MARKER
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl Default for NamingConvention {
    fn default() -> Self {
        NamingConvention {
            marker: DEFAULT_MARKER,
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl NamingConvention {
    /// Build a convention, rejecting unusable character pairs.
    pub fn new(marker: char, separator: char) -> Result<Self> {
        let convention = NamingConvention { marker, separator };
        convention.validate()?;
        Ok(convention)
    }

    /// Check that the marker and separator can coexist.
    pub fn validate(&self) -> Result<()> {
        if self.marker == self.separator {
            return Err(InvalidNameError::Convention(format!(
                "marker and separator are both {:?}",
                self.marker
            )));
        }
        for (what, c) in [("marker", self.marker), ("separator", self.separator)] {
            if c.is_whitespace() || c.is_control() {
                return Err(InvalidNameError::Convention(format!(
                    "{} {:?} must be a visible character",
                    what, c
                )));
            }
        }
        Ok(())
    }

    /// Whether a column name is metadata under this convention.
    pub fn is_metadata(&self, name: &str) -> bool {
        name.starts_with(self.marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_convention() {
        let c = NamingConvention::default();
        assert_eq!(c.marker, '_');
        assert_eq!(c.separator, '.');
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_same_marker_and_separator_rejected() {
        let err = NamingConvention::new('.', '.').unwrap_err();
        assert!(matches!(err, InvalidNameError::Convention(_)));
    }

    #[test]
    fn test_whitespace_rejected() {
        assert!(NamingConvention::new(' ', '.').is_err());
        assert!(NamingConvention::new('_', '\t').is_err());
    }

    #[test]
    fn test_is_metadata() {
        let c = NamingConvention::default();
        assert!(c.is_metadata("_pk"));
        assert!(!c.is_metadata("activity.steps"));
        assert!(!c.is_metadata("a._b"));
    }

    #[test]
    fn test_deserialize_partial() {
        let c: NamingConvention = serde_json::from_str(r#"{"separator": "/"}"#).unwrap();
        assert_eq!(c.marker, '_');
        assert_eq!(c.separator, '/');
    }
}
