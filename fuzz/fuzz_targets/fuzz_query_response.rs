//! Fuzz target for InfluxDB query response decoding.
//!
//! Arbitrary response bodies must decode or fail, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tf_core::influx::{decode_chunked_response, decode_query_response};
use tf_core::Precision;

fuzz_target!(|text: &str| {
    for precision in [Precision::Ns, Precision::Us, Precision::Ms, Precision::S] {
        let _ = decode_query_response(text, precision);
        let _ = decode_chunked_response(text, precision);
    }
});
