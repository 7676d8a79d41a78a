//! Tests for split
//!
//! These tests verify:
//! - Part sizes for `parts` and `parts_length`
//! - Parts are disjoint and cover every key
//! - combine(split(d)) == d, shuffled or not
//! - Key renumbering per part
//! - Option validation

use std::collections::HashSet;

use compressed_dictionary::{CompressedDictionary, Compression, DictError, SplitOptions};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn numbered(n: i64) -> CompressedDictionary {
    let mut dict = CompressedDictionary::new(Compression::Gzip);
    for key in 0..n {
        dict.insert(key, &json!([key, key * key])).unwrap();
    }
    dict
}

fn sizes(dict: &CompressedDictionary, options: &SplitOptions) -> Vec<usize> {
    dict.split(options).unwrap().map(|part| part.len()).collect()
}

fn part_keys(dict: &CompressedDictionary, options: &SplitOptions) -> Vec<Vec<i64>> {
    dict.split(options)
        .unwrap()
        .map(|part| part.keys().collect())
        .collect()
}

// =============================================================================
// Size Tests
// =============================================================================

#[test]
fn test_two_parts_of_seventeen() {
    let dict = numbered(17);
    let options = SplitOptions::builder().parts(2).build();

    let parts: Vec<CompressedDictionary> = dict.split(&options).unwrap().collect();
    assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![9, 8]);

    let union: HashSet<i64> = parts.iter().flat_map(|p| p.keys()).collect();
    assert_eq!(union, (0..17).collect::<HashSet<_>>());
}

#[test]
fn test_sizes_differ_by_at_most_one() {
    let dict = numbered(23);
    let options = SplitOptions::builder().parts(5).build();

    assert_eq!(sizes(&dict, &options), vec![5, 5, 5, 4, 4]);
}

#[test]
fn test_parts_length() {
    let dict = numbered(10);
    let options = SplitOptions::builder().parts_length(4).build();

    assert_eq!(sizes(&dict, &options), vec![4, 3, 3]);
}

#[test]
fn test_single_part_is_whole_dictionary() {
    let dict = numbered(6);
    let parts: Vec<_> = dict
        .split(&SplitOptions::builder().parts(1).build())
        .unwrap()
        .collect();

    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0], dict);
}

#[test]
fn test_unshuffled_parts_are_consecutive() {
    let dict = numbered(7);
    let options = SplitOptions::builder().parts(3).build();

    assert_eq!(
        part_keys(&dict, &options),
        vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]
    );
}

#[test]
fn test_exact_size_iterator() {
    let dict = numbered(10);
    let mut splits = dict.split(&SplitOptions::builder().parts(4).build()).unwrap();

    assert_eq!(splits.len(), 4);
    splits.next();
    assert_eq!(splits.len(), 3);
}

// =============================================================================
// drop_last Tests
// =============================================================================

#[test]
fn test_drop_last_removes_smaller_tail() {
    let dict = numbered(10);
    let options = SplitOptions::builder().parts(3).drop_last(true).build();

    assert_eq!(sizes(&dict, &options), vec![4, 3]);
}

#[test]
fn test_drop_last_keeps_even_tail() {
    let dict = numbered(9);
    let options = SplitOptions::builder().parts(3).drop_last(true).build();

    assert_eq!(sizes(&dict, &options), vec![3, 3, 3]);
}

#[test]
fn test_drop_last_never_drops_single_part() {
    let dict = numbered(3);
    let options = SplitOptions::builder().parts(1).drop_last(true).build();

    assert_eq!(sizes(&dict, &options), vec![3]);
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_combine_of_split_is_identity() {
    let dict = numbered(12);

    for k in 1..=dict.len() {
        let options = SplitOptions::builder().parts(k).build();
        let parts: Vec<_> = dict.split(&options).unwrap().collect();
        let back = CompressedDictionary::combine(&parts, false).unwrap();
        assert_eq!(back, dict, "parts = {}", k);
    }
}

#[test]
fn test_combine_of_shuffled_split_is_identity() {
    let dict = numbered(12);

    for k in 1..=dict.len() {
        let options = SplitOptions::builder().parts(k).shuffle(true).build();
        let parts: Vec<_> = dict.split(&options).unwrap().collect();
        let back = CompressedDictionary::combine(&parts, false).unwrap();
        assert_eq!(back, dict, "parts = {}", k);
    }
}

// =============================================================================
// Shuffle Tests
// =============================================================================

#[test]
fn test_seeded_shuffle_is_reproducible() {
    let dict = numbered(40);
    let options = SplitOptions::builder().parts(4).shuffle(true).seed(17).build();

    assert_eq!(part_keys(&dict, &options), part_keys(&dict, &options));
}

#[test]
fn test_shuffle_changes_membership() {
    let dict = numbered(40);
    let plain = SplitOptions::builder().parts(4).build();
    let shuffled = SplitOptions::builder().parts(4).shuffle(true).seed(3).build();

    assert_ne!(part_keys(&dict, &plain), part_keys(&dict, &shuffled));
}

#[test]
fn test_shuffle_does_not_touch_source() {
    let dict = numbered(20);
    let before: Vec<i64> = dict.keys().collect();
    let options = SplitOptions::builder().parts(3).shuffle(true).build();

    let _parts: Vec<_> = dict.split(&options).unwrap().collect();

    assert_eq!(dict.keys().collect::<Vec<_>>(), before);
    assert_eq!(dict, numbered(20));
}

// =============================================================================
// reset_keys Tests
// =============================================================================

#[test]
fn test_reset_keys_per_part() {
    let dict = numbered(7);
    let options = SplitOptions::builder().parts(2).reset_keys(true).build();

    let parts: Vec<_> = dict.split(&options).unwrap().collect();

    assert_eq!(parts[0].keys().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(parts[1].keys().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(parts[1].get(0).unwrap(), json!([4, 16]));
}

// =============================================================================
// Edge Case Tests
// =============================================================================

#[test]
fn test_more_parts_than_entries_yields_empty_parts() {
    let dict = numbered(2);
    let options = SplitOptions::builder().parts(4).build();

    assert_eq!(sizes(&dict, &options), vec![1, 1, 0, 0]);
}

#[test]
fn test_empty_dictionary() {
    let dict = numbered(0);

    let by_parts = SplitOptions::builder().parts(3).build();
    assert_eq!(sizes(&dict, &by_parts), vec![0, 0, 0]);

    let by_length = SplitOptions::builder().parts_length(3).build();
    assert!(sizes(&dict, &by_length).is_empty());
}

#[test]
fn test_parts_keep_compression() {
    let mut dict = CompressedDictionary::new(Compression::Xz);
    dict.insert(0, &json!("x")).unwrap();
    dict.insert(1, &json!("y")).unwrap();

    for part in dict.split(&SplitOptions::builder().parts(2).build()).unwrap() {
        assert_eq!(part.compression(), Compression::Xz);
    }
}

#[test]
fn test_invalid_options() {
    let dict = numbered(5);

    let neither = SplitOptions::default();
    assert!(matches!(dict.split(&neither), Err(DictError::Configuration(_))));

    let both = SplitOptions::builder().parts(2).parts_length(2).build();
    assert!(matches!(dict.split(&both), Err(DictError::Configuration(_))));

    let zero_parts = SplitOptions::builder().parts(0).build();
    assert!(matches!(dict.split(&zero_parts), Err(DictError::Configuration(_))));

    let zero_length = SplitOptions::builder().parts_length(0).build();
    assert!(matches!(dict.split(&zero_length), Err(DictError::Configuration(_))));
}
