// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use aggsketches::agg::{
    self, AggregateOperation, BitAndAggregate, BitOrAggregate, BitXorAggregate,
};
use aggsketches::vector::{Column, ValidityMask};

fn fold_column<A: AggregateOperation<BindData = ()>>(
    input: &Column<A::Input>,
    count: usize,
) -> Option<A::Output> {
    let mut state = A::initialize();
    agg::unary_update::<A>(input, &(), count, &mut state).unwrap();
    A::finalize(&state)
}

#[test]
fn test_and_or_xor_sequence() {
    let input = Column::flat(vec![0b1110i32, 0b1011, 0b1101]);
    assert_eq!(fold_column::<BitAndAggregate<i32>>(&input, 3), Some(0b1000));
    assert_eq!(fold_column::<BitOrAggregate<i32>>(&input, 3), Some(0b1111));
    assert_eq!(fold_column::<BitXorAggregate<i32>>(&input, 3), Some(0b1000));
}

#[test]
fn test_all_null_input_yields_null() {
    let validity = ValidityMask::from_bools(&[false, false, false]);
    let input = Column::flat_with_validity(vec![1i64, 2, 3], validity);
    assert_eq!(fold_column::<BitOrAggregate<i64>>(&input, 3), None);

    let constant: Column<i64> = Column::constant_null();
    assert_eq!(fold_column::<BitOrAggregate<i64>>(&constant, 100), None);
}

#[test]
fn test_nulls_never_change_state() {
    let validity = ValidityMask::from_bools(&[true, false, true]);
    let input = Column::flat_with_validity(vec![0b1110i32, 0, 0b1011], validity);
    assert_eq!(fold_column::<BitAndAggregate<i32>>(&input, 3), Some(0b1010));
}

#[test]
fn test_xor_constant_broadcast_parity() {
    // Into an unset state: 5 ^ 5 ^ 5 = 5.
    let constant = Column::constant(5i32);
    assert_eq!(fold_column::<BitXorAggregate<i32>>(&constant, 3), Some(5));

    // Into a state already holding 3: 3 ^ 5 ^ 5 ^ 5 = 6.
    let mut state = BitXorAggregate::<i32>::initialize();
    BitXorAggregate::<i32>::operation(&mut state, &3, &()).unwrap();
    agg::unary_update::<BitXorAggregate<i32>>(&constant, &(), 3, &mut state).unwrap();
    assert_eq!(BitXorAggregate::<i32>::finalize(&state), Some(6));
}

#[test]
fn test_and_or_constant_broadcast_idempotent() {
    let constant = Column::constant(0b0111i16);
    for count in [1usize, 2, 5] {
        assert_eq!(
            fold_column::<BitAndAggregate<i16>>(&constant, count),
            Some(0b0111),
            "count {}",
            count
        );
        assert_eq!(
            fold_column::<BitOrAggregate<i16>>(&constant, count),
            Some(0b0111),
            "count {}",
            count
        );
    }
}

#[test]
fn test_combine_matrix() {
    type Or = BitOrAggregate<u32>;

    // Unset source into set target: no-op.
    let source = Or::initialize();
    let mut target = Or::initialize();
    Or::operation(&mut target, &4, &()).unwrap();
    agg::combine_states::<Or>(&source, &mut target).unwrap();
    assert_eq!(Or::finalize(&target), Some(4));

    // Set source into unset target: target adopts the value.
    let mut source = Or::initialize();
    Or::operation(&mut source, &2, &()).unwrap();
    let mut target = Or::initialize();
    agg::combine_states::<Or>(&source, &mut target).unwrap();
    assert_eq!(Or::finalize(&target), Some(2));

    // Both set: fold.
    agg::combine_states::<Or>(&source, &mut target).unwrap();
    let mut other = Or::initialize();
    Or::operation(&mut other, &8, &()).unwrap();
    agg::combine_states::<Or>(&other, &mut target).unwrap();
    assert_eq!(Or::finalize(&target), Some(10));
}

#[test]
fn test_scatter_into_groups() {
    type Or = BitOrAggregate<u64>;
    let input = Column::flat(vec![1u64, 2, 4, 8]);
    let mut states = agg::initialize_states::<Or>(2);
    agg::unary_scatter::<Or>(&input, &(), 4, &mut states, &[0, 1, 0, 1]).unwrap();

    let results = agg::finalize_states::<Or>(&states);
    assert_eq!(results, vec![Some(5), Some(10)]);
}

#[test]
fn test_finalize_and_destroy_states() {
    type And = BitAndAggregate<i8>;
    let mut states = agg::initialize_states::<And>(3);
    And::operation(&mut states[0], &0b0110, &()).unwrap();
    And::operation(&mut states[2], &0b0011, &()).unwrap();
    And::operation(&mut states[2], &0b0001, &()).unwrap();

    assert_eq!(
        agg::finalize_states::<And>(&states),
        vec![Some(0b0110), None, Some(0b0001)]
    );

    // Scalar states own no heap memory; destroy is a harmless no-op.
    agg::destroy_states::<And>(&mut states);
    agg::destroy_states::<And>(&mut states);
}

#[test]
fn test_wide_integer_widths() {
    let big = 1i128 << 100;
    let input = Column::flat(vec![big | 1, big | 2]);
    assert_eq!(fold_column::<BitAndAggregate<i128>>(&input, 2), Some(big));
    assert_eq!(fold_column::<BitXorAggregate<i128>>(&input, 2), Some(3));

    let input = Column::flat(vec![u128::MAX, u128::MAX - 1]);
    assert_eq!(
        fold_column::<BitOrAggregate<u128>>(&input, 2),
        Some(u128::MAX)
    );
}
