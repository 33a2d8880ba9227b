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

//! The column batch interface the executor feeds into sketches and
//! aggregates: dense values, a selection vector mapping logical to physical
//! rows, a validity bitmap, and a vector-kind tag singling out broadcast
//! constants.

/// Physical layout of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    /// One physical value per logical row (possibly through a selection).
    Flat,
    /// A single physical value broadcast to every logical row.
    Constant,
}

/// Row validity bitmap. An absent mask means every row is valid.
#[derive(Debug, Clone)]
pub struct ValidityMask {
    mask: Option<Box<[u64]>>,
    capacity: usize,
}

impl ValidityMask {
    /// Creates a mask where every row is valid.
    pub fn all_valid(capacity: usize) -> Self {
        Self {
            mask: None,
            capacity,
        }
    }

    /// Creates a mask from per-row validity flags.
    pub fn from_bools(valid: &[bool]) -> Self {
        let mut mask = Self::all_valid(valid.len());
        for (row, ok) in valid.iter().enumerate() {
            if !ok {
                mask.set_invalid(row);
            }
        }
        mask
    }

    /// Returns true when the physical row is valid.
    pub fn row_is_valid(&self, row: usize) -> bool {
        debug_assert!(row < self.capacity);
        match &self.mask {
            None => true,
            Some(words) => (words[row / 64] >> (row % 64)) & 1 == 1,
        }
    }

    /// Marks the physical row invalid, materializing the bitmap on first use.
    pub fn set_invalid(&mut self, row: usize) {
        debug_assert!(row < self.capacity);
        let capacity = self.capacity;
        let words = self
            .mask
            .get_or_insert_with(|| vec![u64::MAX; capacity.div_ceil(64)].into_boxed_slice());
        words[row / 64] &= !(1u64 << (row % 64));
    }

    /// Returns true when no row is invalid.
    pub fn all_rows_valid(&self) -> bool {
        match &self.mask {
            None => true,
            Some(words) => (0..self.capacity).all(|row| (words[row / 64] >> (row % 64)) & 1 == 1),
        }
    }

    /// Number of physical rows the mask covers.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Logical-to-physical row mapping. An absent payload is the identity.
#[derive(Debug, Clone)]
pub struct SelectionVector {
    sel: Option<Box<[u32]>>,
}

impl SelectionVector {
    /// The identity selection.
    pub fn identity() -> Self {
        Self { sel: None }
    }

    /// A selection materialized from explicit physical indexes.
    pub fn new(indexes: Vec<u32>) -> Self {
        Self {
            sel: Some(indexes.into_boxed_slice()),
        }
    }

    /// Resolves a logical row to its physical index.
    pub fn get_index(&self, row: usize) -> usize {
        match &self.sel {
            None => row,
            Some(sel) => sel[row] as usize,
        }
    }
}

/// A typed input column.
#[derive(Debug, Clone)]
pub struct Column<T> {
    kind: VectorKind,
    values: Vec<T>,
    sel: SelectionVector,
    validity: ValidityMask,
}

impl<T> Column<T> {
    /// A flat column with all rows valid.
    pub fn flat(values: Vec<T>) -> Self {
        let capacity = values.len();
        Self {
            kind: VectorKind::Flat,
            values,
            sel: SelectionVector::identity(),
            validity: ValidityMask::all_valid(capacity),
        }
    }

    /// A flat column with an explicit validity mask over the physical rows.
    pub fn flat_with_validity(values: Vec<T>, validity: ValidityMask) -> Self {
        debug_assert_eq!(values.len(), validity.capacity());
        Self {
            kind: VectorKind::Flat,
            values,
            sel: SelectionVector::identity(),
            validity,
        }
    }

    /// A flat column read through a selection vector.
    pub fn dictionary(values: Vec<T>, sel: Vec<u32>) -> Self {
        let capacity = values.len();
        Self {
            kind: VectorKind::Flat,
            values,
            sel: SelectionVector::new(sel),
            validity: ValidityMask::all_valid(capacity),
        }
    }

    /// A broadcast constant.
    pub fn constant(value: T) -> Self {
        Self {
            kind: VectorKind::Constant,
            values: vec![value],
            sel: SelectionVector::identity(),
            validity: ValidityMask::all_valid(1),
        }
    }

    /// A broadcast NULL constant.
    pub fn constant_null() -> Self
    where
        T: Default,
    {
        let mut validity = ValidityMask::all_valid(1);
        validity.set_invalid(0);
        Self {
            kind: VectorKind::Constant,
            values: vec![T::default()],
            sel: SelectionVector::identity(),
            validity,
        }
    }

    /// The column's physical layout.
    pub fn kind(&self) -> VectorKind {
        self.kind
    }

    /// Returns true for a broadcast constant.
    pub fn is_constant(&self) -> bool {
        self.kind == VectorKind::Constant
    }

    /// Resolves a logical row to its physical index.
    pub fn sel_index(&self, row: usize) -> usize {
        match self.kind {
            VectorKind::Constant => 0,
            VectorKind::Flat => self.sel.get_index(row),
        }
    }

    /// Returns true when the logical row is valid.
    pub fn row_is_valid(&self, row: usize) -> bool {
        self.validity.row_is_valid(self.sel_index(row))
    }

    /// Returns the value at the logical row.
    pub fn value(&self, row: usize) -> &T {
        &self.values[self.sel_index(row)]
    }
}
