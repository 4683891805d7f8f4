use proptest::prelude::*;
use rolldelta::patch::{self, ByteOrder, EncodeError, PatchRecords, Record};

fn apply(source: &[u8], delta: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in PatchRecords::new(delta, ByteOrder::Little) {
        match record.unwrap() {
            Record::Literal(data) => out.extend_from_slice(data),
            Record::Copy { offset, len } => {
                let start = offset as usize;
                out.extend_from_slice(&source[start..start + len as usize]);
            }
        }
    }
    out
}

fn encode(source: &[u8], target: &[u8]) -> (Result<patch::EncodeStats, EncodeError>, Vec<u8>) {
    let mut out = Vec::new();
    let result = patch::encode(source, target, &mut out);
    (result, out)
}

proptest! {
    #[test]
    fn prop_success_roundtrips_and_shrinks(
        source in proptest::collection::vec(any::<u8>(), 0..4096),
        target in proptest::collection::vec(any::<u8>(), 0..4096),
    ) {
        let (result, delta) = encode(&source, &target);
        if let Ok(stats) = result {
            prop_assert!(delta.len() < target.len(), "delta={} target={}", delta.len(), target.len());
            prop_assert_eq!(stats.patch_len as usize, delta.len());
            prop_assert_eq!(apply(&source, &delta), target);
        }
    }

    #[test]
    fn prop_derived_targets_roundtrip(
        source in proptest::collection::vec(any::<u8>(), 64..8192),
        cut in 0usize..64,
        insert in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut target = source[cut..].to_vec();
        target.splice(target.len() / 2..target.len() / 2, insert);
        let (result, delta) = encode(&source, &target);
        if result.is_ok() {
            prop_assert_eq!(apply(&source, &delta), target);
        }
    }

    #[test]
    fn prop_identical_data_always_encodes(
        source in proptest::collection::vec(any::<u8>(), 10..8192),
    ) {
        let (result, delta) = encode(&source, &source);
        prop_assert!(result.is_ok());
        prop_assert_eq!(apply(&source, &delta), source);
    }

    #[test]
    fn prop_small_inputs_write_nothing(
        source in proptest::collection::vec(any::<u8>(), 0..10),
        target in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let (result, delta) = encode(&source, &target);
        let refused = matches!(result, Err(EncodeError::InputTooSmall { .. }));
        prop_assert!(refused);
        prop_assert!(delta.is_empty());
    }

    #[test]
    fn prop_encoding_is_deterministic(
        source in proptest::collection::vec(0u8..4, 16..2048),
        target in proptest::collection::vec(0u8..4, 16..2048),
    ) {
        let (a, da) = encode(&source, &target);
        let (b, db) = encode(&source, &target);
        prop_assert_eq!(a.is_ok(), b.is_ok());
        prop_assert_eq!(da, db);
    }

    #[test]
    fn prop_records_stay_within_limits(
        source in proptest::collection::vec(0u8..3, 16..4096),
        target in proptest::collection::vec(0u8..3, 16..4096),
    ) {
        let (result, delta) = encode(&source, &target);
        if result.is_ok() {
            for record in PatchRecords::new(&delta, ByteOrder::Little) {
                let record = record.unwrap();
                prop_assert!(record.target_len() <= 0x7FFF);
                if let Record::Copy { offset, len } = record {
                    prop_assert!(len >= 9);
                    prop_assert!(offset as usize + len as usize <= source.len());
                }
            }
        }
    }
}
