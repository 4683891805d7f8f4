// Integration tests for the patch encoder.
//
// Every successful encode is checked by replaying its records against the
// source and comparing with the target, and by checking the size budget.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rolldelta::patch::{
    self, ByteOrder, EncodeError, EncodeOptions, PatchRecords, Record, WriteSink,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn apply(source: &[u8], patch: &[u8], order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::new();
    for record in PatchRecords::new(patch, order) {
        match record.expect("malformed patch") {
            Record::Literal(data) => out.extend_from_slice(data),
            Record::Copy { offset, len } => {
                let start = offset as usize;
                out.extend_from_slice(&source[start..start + len as usize]);
            }
        }
    }
    out
}

fn roundtrip(source: &[u8], target: &[u8]) -> Vec<u8> {
    let mut delta = Vec::new();
    let stats = patch::encode(source, target, &mut delta).unwrap_or_else(|e| {
        panic!(
            "encode failed (source={}, target={}): {e}",
            source.len(),
            target.len()
        )
    });
    assert_eq!(stats.patch_len as usize, delta.len());
    assert!(delta.len() < target.len());
    assert_eq!(
        stats.copied_bytes + stats.literal_bytes,
        target.len() as u64,
        "records must cover the target exactly"
    );
    assert_eq!(apply(source, &delta, ByteOrder::Little), target);
    delta
}

fn random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; size];
    rng.fill(&mut data[..]);
    data
}

fn mutate_data(source: &[u8], changes: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut target = source.to_vec();
    for _ in 0..changes {
        let pos = rng.random_range(0..target.len());
        target[pos] = rng.random();
    }
    target
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn zero_source_with_ones_tail() {
    let source = vec![0u8; 20];
    let mut target = vec![0u8; 10];
    target.extend_from_slice(&[1u8; 10]);

    let delta = roundtrip(&source, &target);
    let records: Vec<_> = PatchRecords::new(&delta, ByteOrder::Little)
        .map(Result::unwrap)
        .collect();
    assert_eq!(records.len(), 2);
    assert!(matches!(records[0], Record::Copy { len: 10, .. }));
    assert_eq!(records[1], Record::Literal(&[1u8; 10]));
}

#[test]
fn small_source_refused_and_sink_untouched() {
    let mut delta = Vec::new();
    let err = patch::encode(&[9u8; 8], &random_data(100, 1), &mut delta).unwrap_err();
    assert!(matches!(err, EncodeError::InputTooSmall { .. }));
    assert!(delta.is_empty());
    assert!(!patch::try_encode(&[9u8; 8], &random_data(100, 1), &mut delta));
    assert!(delta.is_empty());
}

#[test]
fn scattered_edits() {
    let source = random_data(256 * 1024, 42);
    let target = mutate_data(&source, 64, 43);
    let delta = roundtrip(&source, &target);
    assert!(
        delta.len() < target.len() / 20,
        "delta ({}) should be much smaller than target ({})",
        delta.len(),
        target.len()
    );
}

#[test]
fn insertion_and_deletion() {
    let source = random_data(50_000, 5);
    let mut target = source[..20_000].to_vec();
    target.extend_from_slice(b"-- inserted block of text in the middle --");
    target.extend_from_slice(&source[30_000..]);
    roundtrip(&source, &target);
}

#[test]
fn reordered_blocks() {
    let source = random_data(40_000, 6);
    let mut target = Vec::new();
    for chunk in source.chunks(5_000).rev() {
        target.extend_from_slice(chunk);
    }
    let delta = roundtrip(&source, &target);
    let copies = PatchRecords::new(&delta, ByteOrder::Little)
        .filter(|r| matches!(r, Ok(Record::Copy { .. })))
        .count();
    assert!(copies >= 8);
}

#[test]
fn self_diff_record_count() {
    for len in [10usize, 100, 32_767, 40_000, 100_000] {
        let data = random_data(len, len as u64);
        let mut delta = Vec::new();
        let stats = patch::encode(&data, &data, &mut delta).unwrap();
        assert_eq!(stats.copy_records as usize, len.div_ceil(32_767), "len {len}");
        assert_eq!(apply(&data, &delta, ByteOrder::Little), data);
    }
}

#[test]
fn disjoint_content_is_not_worthwhile() {
    let source = vec![0u8; 100_000];
    let target = vec![0xFFu8; 100_000];
    let mut delta = Vec::new();
    let err = patch::encode(&source, &target, &mut delta).unwrap_err();
    assert!(err.is_not_worthwhile());
    assert!(matches!(err, EncodeError::PatchTooLarge { .. }));
}

#[test]
fn deterministic_across_calls() {
    let source = random_data(80_000, 9);
    let target = mutate_data(&source, 200, 10);
    let mut a = Vec::new();
    let mut b = WriteSink::new(Vec::new());
    patch::encode(&source, &target, &mut a).unwrap();
    patch::encode(&source, &target, &mut b).unwrap();
    assert_eq!(a, b.into_inner());
}

#[test]
fn byte_orders_roundtrip() {
    let source = random_data(20_000, 12);
    let target = mutate_data(&source, 10, 13);
    for order in [ByteOrder::Little, ByteOrder::Big, ByteOrder::Native] {
        let mut delta = Vec::new();
        patch::encode_with_options(
            &source,
            &target,
            &mut delta,
            &EncodeOptions { byte_order: order },
        )
        .unwrap();
        assert_eq!(apply(&source, &delta, order), target, "{order:?}");
    }
}

#[test]
fn concurrent_encodes_are_independent() {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..4u64)
        .map(|i| {
            let s = random_data(30_000, 100 + i);
            let t = mutate_data(&s, 20, 200 + i);
            (s, t)
        })
        .collect();

    let expected: Vec<Vec<u8>> = pairs
        .iter()
        .map(|(s, t)| {
            let mut d = Vec::new();
            patch::encode(s, t, &mut d).unwrap();
            d
        })
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = pairs
            .iter()
            .map(|(s, t)| {
                scope.spawn(move || {
                    let mut d = Vec::new();
                    patch::encode(s, t, &mut d).unwrap();
                    d
                })
            })
            .collect();
        for (h, want) in handles.into_iter().zip(&expected) {
            assert_eq!(&h.join().unwrap(), want);
        }
    });
}

#[test]
fn edge_case_matrix() {
    let cases: Vec<(&[u8], &[u8], bool)> = vec![
        (b"", b"", false),
        (b"0123456789", b"", false),
        (b"", b"0123456789", false),
        (b"012345678", b"012345678", false),
        (b"0123456789", b"0123456789", true),
        (b"0123456789", b"9876543210", false),
        (b"aaaaaaaaaaaaaaaa", b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", true),
    ];

    for (source, target, ok) in cases {
        let mut delta = Vec::new();
        let result = patch::encode(source, target, &mut delta);
        assert_eq!(result.is_ok(), ok, "source={source:?} target={target:?}");
        if ok {
            assert_eq!(apply(source, &delta, ByteOrder::Little), target);
        }
    }
}
