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

//! `bitstring_agg`: materializes a dense bitmap over `[min, max]` with one
//! bit per value, set when the value occurred.
//!
//! The bitmap's width is decided before any row arrives. The bounds come
//! from bind data: either the caller passed them as extra arguments
//! (evaluated once at bind time, after which the execution signature is
//! unary), or they are propagated from the child column's statistics.

use std::fmt;
use std::marker::PhantomData;

use crate::agg::AggregateOperation;
use crate::common::bits;
use crate::common::BitString;
use crate::error::{Error, Result};
use crate::stats::{NodeStatistics, NumericStatistics};

/// Hard cap on the bitmap width.
const MAX_BIT_RANGE: u64 = 1_000_000_000;

fn range_too_large() -> Error {
    Error::out_of_range("Range too large for bitstring aggregation")
}

/// Input types the range bitmap can index over.
///
/// The arithmetic runs in the type's native width and narrows to the bit
/// index; a failed narrowing is an out-of-range error, never a wrap.
pub trait RangeType: Copy + Default + PartialOrd + fmt::Display {
    /// Number of bits covering `[min, max]`, i.e. `max - min + 1`.
    fn range(min: Self, max: Self) -> Result<u64>;

    /// Bit index of `value`, i.e. `value - min`.
    fn offset(value: Self, min: Self) -> Result<u64>;
}

macro_rules! impl_range_type_signed {
    ($($ty:ty),*) => {$(
        impl RangeType for $ty {
            fn range(min: Self, max: Self) -> Result<u64> {
                let range = (max as i128) - (min as i128) + 1;
                u64::try_from(range).map_err(|_| range_too_large())
            }

            fn offset(value: Self, min: Self) -> Result<u64> {
                u64::try_from((value as i128) - (min as i128)).map_err(|_| range_too_large())
            }
        }
    )*};
}

macro_rules! impl_range_type_unsigned {
    ($($ty:ty),*) => {$(
        impl RangeType for $ty {
            fn range(min: Self, max: Self) -> Result<u64> {
                let range = (max as u128)
                    .checked_sub(min as u128)
                    .and_then(|diff| diff.checked_add(1))
                    .ok_or_else(range_too_large)?;
                u64::try_from(range).map_err(|_| range_too_large())
            }

            fn offset(value: Self, min: Self) -> Result<u64> {
                let offset = (value as u128).checked_sub(min as u128).ok_or_else(range_too_large)?;
                u64::try_from(offset).map_err(|_| range_too_large())
            }
        }
    )*};
}

impl_range_type_signed!(i8, i16, i32, i64);
impl_range_type_unsigned!(u8, u16, u32, u64);

impl RangeType for i128 {
    fn range(min: Self, max: Self) -> Result<u64> {
        if max < min {
            return Err(range_too_large());
        }
        // The difference always fits an unsigned 128-bit word.
        let diff = max.wrapping_sub(min) as u128;
        let range = diff.checked_add(1).ok_or_else(range_too_large)?;
        u64::try_from(range).map_err(|_| range_too_large())
    }

    fn offset(value: Self, min: Self) -> Result<u64> {
        if value < min {
            return Err(range_too_large());
        }
        u64::try_from(value.wrapping_sub(min) as u128).map_err(|_| range_too_large())
    }
}

impl RangeType for u128 {
    fn range(min: Self, max: Self) -> Result<u64> {
        let range = max
            .checked_sub(min)
            .and_then(|diff| diff.checked_add(1))
            .ok_or_else(range_too_large)?;
        u64::try_from(range).map_err(|_| range_too_large())
    }

    fn offset(value: Self, min: Self) -> Result<u64> {
        let offset = value.checked_sub(min).ok_or_else(range_too_large)?;
        u64::try_from(offset).map_err(|_| range_too_large())
    }
}

/// The `(min, max)` pair resolved while binding the aggregate.
///
/// Created during binder analysis, read-only during execution.
#[derive(Debug, Clone, PartialEq)]
pub struct BitstringAggBindData<T> {
    min: T,
    max: T,
}

impl<T: RangeType> BitstringAggBindData<T> {
    /// Binds the three-argument form: the bounds were evaluated from the
    /// second and third arguments, which are then erased from the call.
    pub fn bind_explicit_range(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Binds the unary form from the child column's statistics.
    pub fn bind_from_statistics(
        stats: &NumericStatistics<T>,
        node: &NodeStatistics,
    ) -> Result<Self> {
        match (stats.min(), stats.max()) {
            (Some(min), Some(max)) if node.has_max_cardinality() => Ok(Self { min, max }),
            _ => Err(Error::missing_statistics(
                "Could not retrieve required statistics. Alternatively, try by providing the \
                 statistics explicitly: BITSTRING_AGG(col, min, max)",
            )),
        }
    }

    /// Lower bound of the bitmap.
    pub fn min(&self) -> T {
        self.min
    }

    /// Upper bound of the bitmap.
    pub fn max(&self) -> T {
        self.max
    }
}

/// Per-group state: the bitmap plus the bounds it was sized for.
#[derive(Debug, Clone)]
pub struct BitAggState<T> {
    pub(crate) is_set: bool,
    pub(crate) value: BitString,
    pub(crate) min: T,
    pub(crate) max: T,
}

/// The range-bitmap aggregate over input type `T`.
pub struct BitStringAggOperation<T>(PhantomData<T>);

impl<T: RangeType> AggregateOperation for BitStringAggOperation<T> {
    type State = BitAggState<T>;
    type Input = T;
    type Output = BitString;
    type BindData = BitstringAggBindData<T>;

    fn initialize() -> BitAggState<T> {
        BitAggState {
            is_set: false,
            value: BitString::default(),
            min: T::default(),
            max: T::default(),
        }
    }

    fn operation(
        state: &mut BitAggState<T>,
        input: &T,
        bind: &BitstringAggBindData<T>,
    ) -> Result<()> {
        if !state.is_set {
            state.min = bind.min;
            state.max = bind.max;
            let bit_range = T::range(bind.min, bind.max)?;
            if bit_range > MAX_BIT_RANGE {
                return Err(Error::out_of_range(
                    "The range between min and max value is too large for bitstring aggregation",
                ));
            }
            let len = (bit_range as usize).div_ceil(8) + 1;
            let mut value = BitString::zeroed(len);
            bits::set_empty_bitstring(&mut value, bit_range as usize);
            state.value = value;
            state.is_set = true;
        }
        if *input >= state.min && *input <= state.max {
            let offset = T::offset(*input, state.min)?;
            bits::set_bit(&mut state.value, offset as usize, 1);
            Ok(())
        } else {
            Err(Error::out_of_range(format!(
                "Value {} is outside of provided min and max range ({} <-> {})",
                input, state.min, state.max
            )))
        }
    }

    fn combine(source: &BitAggState<T>, target: &mut BitAggState<T>) -> Result<()> {
        if !source.is_set {
            return Ok(());
        }
        if !target.is_set {
            target.min = source.min;
            target.max = source.max;
            target.value = source.value.clone();
            target.is_set = true;
        } else {
            // Both bitmaps come from the same bound expression.
            debug_assert!(source.min == target.min && source.max == target.max);
            bits::bitwise_or(&source.value, &mut target.value);
        }
        Ok(())
    }

    fn finalize(state: &BitAggState<T>) -> Option<BitString> {
        state.is_set.then(|| state.value.clone())
    }

    fn destroy(state: &mut BitAggState<T>) {
        state.value = BitString::default();
        state.is_set = false;
    }
}
