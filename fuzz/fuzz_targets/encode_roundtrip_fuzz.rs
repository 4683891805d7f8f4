#![no_main]
use libfuzzer_sys::fuzz_target;
use rolldelta::patch::{self, ByteOrder, EncodeError, PatchRecords, Record};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the split point between source and target.
    let split = data[0] as usize * (data.len() - 1) / 255;
    let payload = &data[1..];
    let (source, target) = payload.split_at(split.min(payload.len()));

    let mut delta = Vec::new();
    match patch::encode(source, target, &mut delta) {
        Ok(stats) => {
            assert!(delta.len() < target.len());
            assert_eq!(stats.patch_len as usize, delta.len());

            let mut out = Vec::with_capacity(target.len());
            for record in PatchRecords::new(&delta, ByteOrder::Little) {
                match record.unwrap() {
                    Record::Literal(bytes) => out.extend_from_slice(bytes),
                    Record::Copy { offset, len } => {
                        let start = offset as usize;
                        out.extend_from_slice(&source[start..start + len as usize]);
                    }
                }
            }
            assert_eq!(out, target);
        }
        Err(EncodeError::InputTooSmall { .. }) => assert!(delta.is_empty()),
        Err(e) => assert!(e.is_not_worthwhile()),
    }
});
