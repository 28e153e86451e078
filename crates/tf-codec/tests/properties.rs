//! Property-based tests for the namespace codec and classifier.

use proptest::prelude::*;
use tf_codec::{Classifier, ColumnClass, MarkerSet, NamespaceCodec};

/// A single namespace segment or leaf: no separator, no leading marker.
fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_\\-]{0,8}"
}

/// Zero to three segments joined by the separator.
fn namespace() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 0..=3).prop_map(|segs| segs.join("."))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// decode(encode(ns, leaf)) == (ns, leaf)
    #[test]
    fn decode_inverts_encode(ns in namespace(), leaf in segment()) {
        let codec = NamespaceCodec::default();
        let name = codec.encode(&ns, &leaf).unwrap();
        let (dns, dleaf) = codec.decode(&name).unwrap();
        prop_assert_eq!(dns, ns.as_str());
        prop_assert_eq!(dleaf, leaf.as_str());
    }

    /// encode(decode(name)) == name for every name decode accepts.
    #[test]
    fn encode_inverts_decode(name in "[a-z_.]{0,12}") {
        let codec = NamespaceCodec::default();
        if let Ok((ns, leaf)) = codec.decode(&name) {
            prop_assert_eq!(codec.encode(ns, leaf).unwrap(), name);
        }
    }

    /// Classification is a pure function of the name.
    #[test]
    fn classification_is_idempotent(name in "_?[a-z]{0,4}(\\.[a-z]{1,4}){0,2}") {
        let classifier = Classifier::new(
            MarkerSet::default()
                .with_tag("_tag_region", "region")
                .with_tag_prefix("_t_"),
        ).unwrap();
        let first = classifier.classify(&name);
        let second = classifier.classify(&name);
        prop_assert_eq!(first, second);
    }

    /// Every non-metadata name that decodes is classified as that field.
    #[test]
    fn fields_follow_the_codec(ns in namespace(), leaf in segment()) {
        let classifier = Classifier::new(MarkerSet::default()).unwrap();
        let name = classifier.codec().encode(&ns, &leaf).unwrap();
        prop_assert_eq!(
            classifier.classify(&name).unwrap(),
            ColumnClass::Field { namespace: ns, leaf }
        );
    }

    /// A tag column reads back as the same tag, so two keys never share one.
    #[test]
    fn tag_column_classifies_back(keys in prop::collection::vec("[a-z_]{0,10}", 1..6)) {
        let classifier = Classifier::new(
            MarkerSet::default()
                .with_tag_prefix("_tag_")
                .with_tag("_tag_region", "site")
                .with_tag("_host", "host")
                .with_excluded("_tag_internal"),
        ).unwrap();
        let mut seen = std::collections::HashMap::new();
        for key in &keys {
            if let Ok(column) = classifier.tag_column(key) {
                prop_assert_eq!(classifier.classify(&column).unwrap(), ColumnClass::Tag(key.clone()));
                if let Some(other) = seen.insert(column.clone(), key.clone()) {
                    prop_assert_eq!(&other, key);
                }
            }
        }
    }

    /// With a tag prefix, every unclaimed key gets a column.
    #[test]
    fn prefix_maps_unclaimed_keys(key in segment()) {
        let classifier = Classifier::new(MarkerSet::default().with_tag_prefix("_t_")).unwrap();
        prop_assert_eq!(classifier.tag_column(&key).unwrap(), format!("_t_{}", key));
    }
}
