#![no_main]

//! Snapshot decoder fuzzer.
//!
//! Arbitrary bytes must decode to an error or to a snapshot that re-encodes to the
//! exact bytes it was read from.

use libfuzzer_sys::fuzz_target;
use xonix::RoundSnapshot;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = RoundSnapshot::from_bytes(data) else {
        return;
    };
    let encoded = snapshot.to_bytes();
    assert!(encoded.len() <= data.len());
    assert_eq!(&data[..encoded.len()], &encoded[..]);
});
