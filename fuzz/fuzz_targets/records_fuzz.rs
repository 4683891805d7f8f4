#![no_main]
use libfuzzer_sys::fuzz_target;
use rolldelta::patch::{ByteOrder, PatchRecords};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the record reader, and every
    // accepted record must lie inside the input.
    for order in [ByteOrder::Little, ByteOrder::Big] {
        let mut records = PatchRecords::new(data, order);
        let mut consumed = 0usize;
        while let Some(record) = records.next() {
            match record {
                Ok(r) => {
                    consumed += r.encoded_len();
                    assert_eq!(consumed, records.position());
                    assert!(consumed <= data.len());
                }
                Err(_) => break,
            }
        }
    }
});
