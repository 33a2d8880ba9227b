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

//! Read-only statistics interfaces consulted at bind time.
//!
//! The statistics themselves are produced elsewhere; aggregates only ever
//! read them while binding, before any row arrives.

/// Min/max statistics of a numeric child column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericStatistics<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: Copy> NumericStatistics<T> {
    /// Statistics with known bounds.
    pub fn new(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Statistics with unknown bounds.
    pub fn unknown() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// The minimum value, when known.
    pub fn min(&self) -> Option<T> {
        self.min
    }

    /// The maximum value, when known.
    pub fn max(&self) -> Option<T> {
        self.max
    }
}

/// Cardinality statistics of the plan node feeding an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStatistics {
    has_max_cardinality: bool,
    max_cardinality: u64,
}

impl NodeStatistics {
    /// A node with a known cardinality bound.
    pub fn with_max_cardinality(max_cardinality: u64) -> Self {
        Self {
            has_max_cardinality: true,
            max_cardinality,
        }
    }

    /// A node whose cardinality is unbounded.
    pub fn unbounded() -> Self {
        Self {
            has_max_cardinality: false,
            max_cardinality: 0,
        }
    }

    /// Whether the node's cardinality is bounded.
    pub fn has_max_cardinality(&self) -> bool {
        self.has_max_cardinality
    }

    /// The cardinality bound; only meaningful when bounded.
    pub fn max_cardinality(&self) -> u64 {
        self.max_cardinality
    }
}
