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

//! Bitwise aggregates over BIT values.
//!
//! Same protocol as the scalar family, but the state's value is a
//! variable-length bitstring the state owns. The first folded row copies
//! the input (inline by value, otherwise into a fresh buffer); subsequent
//! rows fold in place. Both operands of a fold must have the same bit
//! length; the SQL layer enforces that before execution.

use std::marker::PhantomData;

use crate::agg::bitwise::BitState;
use crate::agg::AggregateOperation;
use crate::common::bits;
use crate::common::BitString;
use crate::error::Result;

/// One of the three in-place bitstring folds.
pub trait BitStringFold {
    /// Whether repeating the fold with the same input changes the result.
    const PARITY_SENSITIVE: bool = false;

    fn fold(input: &BitString, target: &mut BitString);
}

pub struct BitStringAndFold;

impl BitStringFold for BitStringAndFold {
    fn fold(input: &BitString, target: &mut BitString) {
        bits::bitwise_and(input, target);
    }
}

pub struct BitStringOrFold;

impl BitStringFold for BitStringOrFold {
    fn fold(input: &BitString, target: &mut BitString) {
        bits::bitwise_or(input, target);
    }
}

pub struct BitStringXorFold;

impl BitStringFold for BitStringXorFold {
    const PARITY_SENSITIVE: bool = true;

    fn fold(input: &BitString, target: &mut BitString) {
        bits::bitwise_xor(input, target);
    }
}

/// The bitstring bitwise aggregate over fold `OP`.
pub struct BitStringBitwiseAggregate<OP>(PhantomData<OP>);

pub type BitStringAndAggregate = BitStringBitwiseAggregate<BitStringAndFold>;
pub type BitStringOrAggregate = BitStringBitwiseAggregate<BitStringOrFold>;
pub type BitStringXorAggregate = BitStringBitwiseAggregate<BitStringXorFold>;

impl<OP: BitStringFold> AggregateOperation for BitStringBitwiseAggregate<OP> {
    type State = BitState<BitString>;
    type Input = BitString;
    type Output = BitString;
    type BindData = ();

    fn initialize() -> BitState<BitString> {
        BitState {
            is_set: false,
            value: BitString::default(),
        }
    }

    fn operation(state: &mut BitState<BitString>, input: &BitString, _bind: &()) -> Result<()> {
        if !state.is_set {
            state.value = input.clone();
            state.is_set = true;
        } else {
            OP::fold(input, &mut state.value);
        }
        Ok(())
    }

    fn constant_operation(
        state: &mut BitState<BitString>,
        input: &BitString,
        count: u64,
        bind: &(),
    ) -> Result<()> {
        if OP::PARITY_SENSITIVE {
            for _ in 0..count {
                Self::operation(state, input, bind)?;
            }
            Ok(())
        } else {
            Self::operation(state, input, bind)
        }
    }

    fn combine(source: &BitState<BitString>, target: &mut BitState<BitString>) -> Result<()> {
        if !source.is_set {
            return Ok(());
        }
        if !target.is_set {
            // Duplicate rather than steal: the source still owns its buffer
            // and will be destroyed normally.
            target.value = source.value.clone();
            target.is_set = true;
        } else {
            OP::fold(&source.value, &mut target.value);
        }
        Ok(())
    }

    fn finalize(state: &BitState<BitString>) -> Option<BitString> {
        state.is_set.then(|| state.value.clone())
    }

    fn destroy(state: &mut BitState<BitString>) {
        state.value = BitString::default();
        state.is_set = false;
    }
}
