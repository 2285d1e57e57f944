#![no_main]

use libfuzzer_sys::fuzz_target;
use xfsbench::config::BenchConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and validation must never panic
        if let Ok(config) = BenchConfig::from_toml_str(input) {
            let _ = config.validate();
        }
    }
});
