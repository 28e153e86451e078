//! Namespace codec: `<namespace><sep><leaf>` <-> `(namespace, leaf)`.
//!
//! The split point is always the *last* separator, so `a.b.c` decodes to
//! namespace `a.b` and leaf `c`. Leaves therefore never contain the
//! separator, and every namespace segment must be non-empty. With those two
//! rules `encode` and `decode` are exact inverses over valid inputs.

use crate::convention::NamingConvention;
use crate::error::{InvalidNameError, Result};

/// Encodes and decodes namespaced column names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamespaceCodec {
    convention: NamingConvention,
}

impl NamespaceCodec {
    pub fn new(convention: NamingConvention) -> Self {
        NamespaceCodec { convention }
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Join a namespace and a leaf into a column name.
    ///
    /// An empty namespace yields the bare leaf.
    pub fn encode(&self, namespace: &str, leaf: &str) -> Result<String> {
        let sep = self.convention.separator;
        if leaf.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if leaf.contains(sep) {
            return Err(InvalidNameError::SeparatorInLeaf {
                leaf: leaf.to_string(),
                separator: sep,
            });
        }

        let name = if namespace.is_empty() {
            leaf.to_string()
        } else {
            let mut name = String::with_capacity(namespace.len() + leaf.len() + sep.len_utf8());
            name.push_str(namespace);
            name.push(sep);
            name.push_str(leaf);
            name
        };

        if !namespace.is_empty() && namespace.split(sep).any(str::is_empty) {
            return Err(InvalidNameError::EmptySegment { name });
        }
        if self.convention.is_metadata(&name) {
            return Err(InvalidNameError::LeadingMarker {
                name,
                marker: self.convention.marker,
            });
        }
        Ok(name)
    }

    /// Split a data column name at its last separator.
    ///
    /// A name without a separator is bare: namespace `""`.
    pub fn decode<'a>(&self, name: &'a str) -> Result<(&'a str, &'a str)> {
        let sep = self.convention.separator;
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if self.convention.is_metadata(name) {
            return Err(InvalidNameError::LeadingMarker {
                name: name.to_string(),
                marker: self.convention.marker,
            });
        }

        match name.rfind(sep) {
            None => Ok(("", name)),
            Some(idx) => {
                let namespace = &name[..idx];
                let leaf = &name[idx + sep.len_utf8()..];
                if leaf.is_empty() {
                    return Err(InvalidNameError::Empty);
                }
                if namespace.split(sep).any(str::is_empty) {
                    return Err(InvalidNameError::EmptySegment {
                        name: name.to_string(),
                    });
                }
                Ok((namespace, leaf))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> NamespaceCodec {
        NamespaceCodec::default()
    }

    #[test]
    fn test_encode_namespaced() {
        assert_eq!(codec().encode("activity", "steps").unwrap(), "activity.steps");
    }

    #[test]
    fn test_encode_bare() {
        assert_eq!(codec().encode("", "steps").unwrap(), "steps");
    }

    #[test]
    fn test_encode_nested_namespace() {
        assert_eq!(codec().encode("a.b", "c").unwrap(), "a.b.c");
    }

    #[test]
    fn test_decode_uses_last_separator() {
        assert_eq!(codec().decode("a.b.c").unwrap(), ("a.b", "c"));
        assert_eq!(codec().decode("bio.bpm").unwrap(), ("bio", "bpm"));
        assert_eq!(codec().decode("bpm").unwrap(), ("", "bpm"));
    }

    #[test]
    fn test_encode_rejects_empty_leaf() {
        assert_eq!(codec().encode("a", ""), Err(InvalidNameError::Empty));
    }

    #[test]
    fn test_encode_rejects_separator_in_leaf() {
        let err = codec().encode("a", "b.c").unwrap_err();
        assert!(matches!(err, InvalidNameError::SeparatorInLeaf { .. }));
    }

    #[test]
    fn test_encode_rejects_empty_segments() {
        for ns in [".a", "a.", "a..b", "."] {
            let err = codec().encode(ns, "x").unwrap_err();
            assert!(
                matches!(err, InvalidNameError::EmptySegment { .. }),
                "namespace {ns:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_encode_rejects_leading_marker() {
        assert!(matches!(
            codec().encode("", "_pk"),
            Err(InvalidNameError::LeadingMarker { .. })
        ));
        assert!(matches!(
            codec().encode("_ns", "x"),
            Err(InvalidNameError::LeadingMarker { .. })
        ));
        // Marker inside a name is ordinary data.
        assert_eq!(codec().encode("a", "_x").unwrap(), "a._x");
        assert_eq!(codec().encode("", "heart_rate").unwrap(), "heart_rate");
    }

    #[test]
    fn test_decode_rejects_invalid() {
        assert_eq!(codec().decode(""), Err(InvalidNameError::Empty));
        assert_eq!(codec().decode("a."), Err(InvalidNameError::Empty));
        assert!(matches!(
            codec().decode(".a"),
            Err(InvalidNameError::EmptySegment { .. })
        ));
        assert!(matches!(
            codec().decode("a..b"),
            Err(InvalidNameError::EmptySegment { .. })
        ));
        assert!(matches!(
            codec().decode("_pk"),
            Err(InvalidNameError::LeadingMarker { .. })
        ));
    }

    #[test]
    fn test_custom_separator() {
        let codec = NamespaceCodec::new(NamingConvention::new('#', '/').unwrap());
        assert_eq!(codec.encode("bio", "heart.rate").unwrap(), "bio/heart.rate");
        assert_eq!(codec.decode("bio/heart.rate").unwrap(), ("bio", "heart.rate"));
        assert_eq!(codec.decode("_x").unwrap(), ("", "_x"));
    }

    #[test]
    fn test_multibyte_separator() {
        let codec = NamespaceCodec::new(NamingConvention::new('_', '·').unwrap());
        let name = codec.encode("ns", "leaf").unwrap();
        assert_eq!(name, "ns·leaf");
        assert_eq!(codec.decode(&name).unwrap(), ("ns", "leaf"));
    }
}
