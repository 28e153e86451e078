//! Fuzz target for tsframe.toml parsing.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use tf_core::TsFrameConfig;

fuzz_target!(|text: &str| {
    if let Ok(config) = TsFrameConfig::from_toml_str(text, Path::new("fuzz.toml")) {
        let _ = config.classifier();
    }
});
