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

//! Scalar bitwise aggregates: `bit_and`, `bit_or`, `bit_xor` over every
//! integer width.

use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, BitXor};

use crate::agg::AggregateOperation;
use crate::error::Result;

/// Integer types the scalar bitwise aggregates fold over.
pub trait ScalarBits:
    Copy
    + Default
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
{
}

impl<T> ScalarBits for T where
    T: Copy
        + Default
        + BitAnd<Output = T>
        + BitOr<Output = T>
        + BitXor<Output = T>
{
}

/// Per-group state of a scalar bitwise aggregate.
///
/// `value` is meaningless until `is_set`; the first folded row assigns it.
#[derive(Debug, Clone)]
pub struct BitState<T> {
    pub(crate) is_set: bool,
    pub(crate) value: T,
}

/// One of the three bitwise folds.
pub trait BitwiseFold {
    /// Whether repeating the fold with the same input changes the result.
    const PARITY_SENSITIVE: bool = false;

    fn fold<T: ScalarBits>(value: T, input: T) -> T;
}

pub struct BitAndFold;

impl BitwiseFold for BitAndFold {
    fn fold<T: ScalarBits>(value: T, input: T) -> T {
        value & input
    }
}

pub struct BitOrFold;

impl BitwiseFold for BitOrFold {
    fn fold<T: ScalarBits>(value: T, input: T) -> T {
        value | input
    }
}

pub struct BitXorFold;

impl BitwiseFold for BitXorFold {
    const PARITY_SENSITIVE: bool = true;

    fn fold<T: ScalarBits>(value: T, input: T) -> T {
        value ^ input
    }
}

/// The scalar bitwise aggregate over fold `OP` and input type `T`.
pub struct BitwiseAggregate<OP, T>(PhantomData<(OP, T)>);

pub type BitAndAggregate<T> = BitwiseAggregate<BitAndFold, T>;
pub type BitOrAggregate<T> = BitwiseAggregate<BitOrFold, T>;
pub type BitXorAggregate<T> = BitwiseAggregate<BitXorFold, T>;

impl<OP: BitwiseFold, T: ScalarBits> AggregateOperation for BitwiseAggregate<OP, T> {
    type State = BitState<T>;
    type Input = T;
    type Output = T;
    type BindData = ();

    fn initialize() -> BitState<T> {
        // If there are no matching rows, finalize returns NULL.
        BitState {
            is_set: false,
            value: T::default(),
        }
    }

    fn operation(state: &mut BitState<T>, input: &T, _bind: &()) -> Result<()> {
        if !state.is_set {
            state.value = *input;
            state.is_set = true;
        } else {
            state.value = OP::fold(state.value, *input);
        }
        Ok(())
    }

    fn constant_operation(state: &mut BitState<T>, input: &T, count: u64, bind: &()) -> Result<()> {
        if OP::PARITY_SENSITIVE {
            for _ in 0..count {
                Self::operation(state, input, bind)?;
            }
            Ok(())
        } else {
            Self::operation(state, input, bind)
        }
    }

    fn combine(source: &BitState<T>, target: &mut BitState<T>) -> Result<()> {
        if !source.is_set {
            // source is NULL, nothing to do.
            return Ok(());
        }
        if !target.is_set {
            // target is NULL, use source value directly.
            target.value = source.value;
            target.is_set = true;
        } else {
            target.value = OP::fold(target.value, source.value);
        }
        Ok(())
    }

    fn finalize(state: &BitState<T>) -> Option<T> {
        state.is_set.then(|| state.value)
    }
}
