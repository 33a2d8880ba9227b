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

//! Aggregate functions and the state protocol they implement.
//!
//! The executor owns one state per group and drives each through the same
//! lifecycle: initialize, fold input batches in with update (or a constant
//! fold for broadcast inputs), combine partial states across partitions,
//! finalize into one result per group, destroy. States are never shared
//! between writers; combine is the only point where two states meet, and
//! it reads the source immutably.

mod bitstring;
mod bitstring_agg;
mod bitwise;
mod registry;

pub use bitstring::{
    BitStringAndAggregate, BitStringOrAggregate, BitStringXorAggregate,
};
pub use bitstring_agg::{BitAggState, BitStringAggOperation, BitstringAggBindData, RangeType};
pub use bitwise::{
    BitAndAggregate, BitOrAggregate, BitState, BitXorAggregate, ScalarBits,
};
pub use registry::{
    bit_and, bit_or, bit_xor, bitstring_agg, AggregateFunctionSet, AggregateSignature,
    PhysicalType,
};

use crate::error::Result;
use crate::vector::Column;

/// The capability set of a unary aggregate function.
///
/// `operation` folds one valid row into a state; `combine` folds a partial
/// state into another. A state that owns heap memory duplicates it on
/// combine, so the source remains intact and `destroy` can run on every
/// state exactly once (it is also idempotent).
pub trait AggregateOperation {
    type State;
    type Input: Clone;
    type Output;
    type BindData;

    /// A fresh, unset state.
    fn initialize() -> Self::State;

    /// Folds one input value into the state.
    fn operation(
        state: &mut Self::State,
        input: &Self::Input,
        bind: &Self::BindData,
    ) -> Result<()>;

    /// Folds a value that is broadcast over `count` rows.
    ///
    /// The default treats the fold as idempotent and applies it once;
    /// operators where repetition matters override this.
    fn constant_operation(
        state: &mut Self::State,
        input: &Self::Input,
        _count: u64,
        bind: &Self::BindData,
    ) -> Result<()> {
        Self::operation(state, input, bind)
    }

    /// Folds `source` into `target`. `source` is read-only.
    fn combine(source: &Self::State, target: &mut Self::State) -> Result<()>;

    /// Emits the result, or `None` for SQL NULL when the state never saw
    /// a row.
    fn finalize(state: &Self::State) -> Option<Self::Output>;

    /// Releases state-owned resources and resets the state to unset.
    fn destroy(_state: &mut Self::State) {}

    /// Whether NULL input rows are skipped before they reach `operation`.
    fn ignore_null() -> bool {
        true
    }
}

/// Allocates `count` fresh states.
pub fn initialize_states<A: AggregateOperation>(count: usize) -> Vec<A::State> {
    (0..count).map(|_| A::initialize()).collect()
}

/// Folds a batch into a single state.
///
/// A broadcast-constant input becomes one `constant_operation` carrying the
/// row count, applied iff the first row is valid.
pub fn unary_update<A: AggregateOperation>(
    input: &Column<A::Input>,
    bind: &A::BindData,
    count: usize,
    state: &mut A::State,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    if input.is_constant() {
        if !A::ignore_null() || input.row_is_valid(0) {
            A::constant_operation(state, input.value(0), count as u64, bind)?;
        }
        return Ok(());
    }
    for row in 0..count {
        if !A::ignore_null() || input.row_is_valid(row) {
            A::operation(state, input.value(row), bind)?;
        }
    }
    Ok(())
}

/// Folds a batch into per-group states selected row by row.
pub fn unary_scatter<A: AggregateOperation>(
    input: &Column<A::Input>,
    bind: &A::BindData,
    count: usize,
    states: &mut [A::State],
    groups: &[usize],
) -> Result<()> {
    debug_assert!(groups.len() >= count);
    for row in 0..count {
        if !A::ignore_null() || input.row_is_valid(row) {
            A::operation(&mut states[groups[row]], input.value(row), bind)?;
        }
    }
    Ok(())
}

/// Folds a partial state into the coordinator's state.
pub fn combine_states<A: AggregateOperation>(
    source: &A::State,
    target: &mut A::State,
) -> Result<()> {
    A::combine(source, target)
}

/// Emits one result per state; `None` is SQL NULL.
pub fn finalize_states<A: AggregateOperation>(states: &[A::State]) -> Vec<Option<A::Output>> {
    states.iter().map(|state| A::finalize(state)).collect()
}

/// Destroys every state. Safe to call on states already destroyed.
pub fn destroy_states<A: AggregateOperation>(states: &mut [A::State]) {
    for state in states {
        A::destroy(state);
    }
}
