use aggsketches::hash::hash_element;
use aggsketches::hll::HyperLogLog;
use aggsketches::vector::{Column, ValidityMask};

#[test]
fn test_empty_sketch() {
    let sketch = HyperLogLog::new();
    assert_eq!(sketch.count(), 0);
}

#[test]
fn test_tiny_inserts() {
    let mut sketch = HyperLogLog::new();
    sketch.insert_element(0x0000_0000_0000_0001);
    sketch.insert_element(0x0000_0000_0000_0002);
    sketch.insert_element(0x0000_0000_0000_0001);

    let count = sketch.count();
    assert!(count >= 1, "two distinct hashes should count, got {}", count);
    assert!(count <= 10, "tiny input should stay small, got {}", count);
}

#[test]
fn test_basic_add() {
    let mut sketch = HyperLogLog::new();
    for i in 0..100u64 {
        sketch.add(&i);
    }
    let count = sketch.count() as f64;
    assert!(
        (count - 100.0).abs() < 15.0,
        "estimate should be close to 100, got {}",
        count
    );
}

#[test]
fn test_monotonicity() {
    let mut sketch = HyperLogLog::new();
    let mut previous = 0.0f64;
    for step in 0..10u64 {
        for i in step * 1000..(step + 1) * 1000 {
            sketch.add(&i);
        }
        let count = sketch.count() as f64;
        assert!(
            count >= previous * 0.99,
            "estimate shrank from {} to {} after inserting more",
            previous,
            count
        );
        previous = count;
    }
}

#[test]
fn test_merge_matches_union() {
    let mut a = HyperLogLog::new();
    for i in 1..=500u64 {
        a.add(&i);
    }
    let mut b = HyperLogLog::new();
    for i in 250..=1000u64 {
        b.add(&i);
    }

    let mut union = HyperLogLog::new();
    for i in 1..=1000u64 {
        union.add(&i);
    }

    a.merge(&b);
    assert_eq!(a.registers(), union.registers());

    let count = a.count() as f64;
    assert!(
        (count - 1000.0).abs() <= 30.0,
        "merged estimate should be within 3% of 1000, got {}",
        count
    );
}

#[test]
fn test_copy_is_exact() {
    let mut sketch = HyperLogLog::new();
    for i in 0..5000u64 {
        sketch.add(&i);
    }
    let copy = sketch.copy();
    assert_eq!(copy.registers(), sketch.registers());
    assert_eq!(copy.count(), sketch.count());
}

#[test]
fn test_update_batch_skips_nulls() {
    let values: Vec<u64> = (0..8).collect();
    let hashes: Vec<u64> = values.iter().map(hash_element).collect();
    let valid: Vec<bool> = values.iter().map(|v| v % 2 == 0).collect();

    let input = Column::flat_with_validity(values.clone(), ValidityMask::from_bools(&valid));
    let hash_col = Column::flat(hashes.clone());

    let mut sketch = HyperLogLog::new();
    sketch.update_batch(&input, &hash_col, values.len());

    let mut expected = HyperLogLog::new();
    for (i, hash) in hashes.iter().enumerate() {
        if valid[i] {
            expected.insert_element(*hash);
        }
    }
    assert_eq!(sketch.registers(), expected.registers());
}

#[test]
fn test_update_batch_constant_hash() {
    let hash = hash_element(&42u64);

    let input = Column::flat(vec![42u64]);
    let hash_col = Column::constant(hash);
    let mut sketch = HyperLogLog::new();
    sketch.update_batch(&input, &hash_col, 1024);

    let mut expected = HyperLogLog::new();
    expected.insert_element(hash);
    assert_eq!(sketch.registers(), expected.registers());

    // A NULL first row suppresses the broadcast insert entirely.
    let null_input: Column<u64> = Column::constant_null();
    let mut sketch = HyperLogLog::new();
    sketch.update_batch(&null_input, &hash_col, 1024);
    assert_eq!(sketch.count(), 0);
}

#[test]
fn test_update_batch_dictionary() {
    let values: Vec<u64> = vec![7, 8, 9];
    let hashes: Vec<u64> = values.iter().map(hash_element).collect();

    // Logical rows all resolve to physical row 1.
    let input = Column::dictionary(values, vec![1, 1, 1, 1]);
    let hash_col = Column::dictionary(hashes, vec![1, 1, 1, 1]);

    let mut sketch = HyperLogLog::new();
    sketch.update_batch(&input, &hash_col, 4);

    let mut expected = HyperLogLog::new();
    expected.insert_element(hash_element(&8u64));
    assert_eq!(sketch.registers(), expected.registers());
}
