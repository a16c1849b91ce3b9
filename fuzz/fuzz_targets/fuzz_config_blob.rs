//! Fuzz target: `MemoryConfigStore::load`
//!
//! Arbitrary bytes in the postcard config slot must either load a config
//! that passes validation or be rejected; never panic.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use homemesh::adapters::MemoryConfigStore;
use homemesh::app::ports::ConfigPort;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let store = MemoryConfigStore::new();
    store.write_raw(data.to_vec());
    if let Ok(cfg) = store.load() {
        assert!(cfg.validate().is_ok(), "loaded config must be valid");
    }
});
