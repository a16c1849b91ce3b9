//! Fuzz target: `codec::decode_inbound`
//!
//! Feeds arbitrary payloads from every possible sender through the
//! coordinator's receive classification.  It must never panic, and any
//! integer reply it yields must come from a reply source.
//!
//! cargo fuzz run fuzz_inbound_decoder

#![no_main]

use homemesh::mesh::codec::{self, Inbound};
use homemesh::mesh::{NodeAddr, ReplyTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&from, payload)) = data.split_first() else {
        return;
    };
    let table = ReplyTable::house();
    if let Ok(Inbound::Reply { from, .. }) = codec::decode_inbound(NodeAddr(from), payload, &table) {
        assert!(table.lookup(from).is_some(), "reply from a non-source");
        assert_eq!(payload.len(), 4, "reply must be exactly four bytes");
    }

    // Peripherals only ever see tags.
    let _ = codec::decode_tagged(payload);
});
