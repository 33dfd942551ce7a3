#![no_main]

use libfuzzer_sys::fuzz_target;
use tarlet::archive::{checksum, decode, encode, RawRecord};
use tarlet::{TarError, RECORD_SIZE};

fuzz_target!(|data: &[u8]| {
    if data.len() < RECORD_SIZE {
        return;
    }

    let mut raw: RawRecord = [0u8; RECORD_SIZE];
    raw.copy_from_slice(&data[..RECORD_SIZE]);

    // Decoding arbitrary bytes must never panic
    match decode(&raw) {
        Ok(header) => {
            // Whatever decodes must encode to a record that decodes again
            let reencoded = encode(&header);
            assert!(decode(&reencoded).is_ok());
            let _ = checksum(&reencoded);
        }
        Err(TarError::NullRecord) => assert_eq!(raw[148], 0),
        Err(_) => {}
    }
});
