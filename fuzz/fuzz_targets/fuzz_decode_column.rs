//! Fuzz target for column name decoding and classification.
//!
//! Every name that decodes must encode back to itself, under any valid
//! naming convention.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tf_codec::{Classifier, MarkerSet, NamespaceCodec, NamingConvention};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    marker: char,
    separator: char,
    name: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let Ok(convention) = NamingConvention::new(input.marker, input.separator) else {
        return;
    };
    let codec = NamespaceCodec::new(convention);
    if let Ok((namespace, leaf)) = codec.decode(input.name) {
        assert_eq!(codec.encode(namespace, leaf).as_deref(), Ok(input.name));
    }

    if let Ok(classifier) = Classifier::new(MarkerSet::new(convention)) {
        let _ = classifier.classify(input.name);
    }
});
