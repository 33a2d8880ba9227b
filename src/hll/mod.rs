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

//! HyperLogLog sketch for cardinality estimation.
//!
//! The sketch keeps `M` one-byte registers inline; each register stores the
//! maximum leading-zero count (plus one) ever observed among the hashes
//! routed to it. Estimation uses the tail-cut estimator from Ertl,
//! "New cardinality estimation algorithms for HyperLogLog sketches".
//!
//! Two on-disk layouts exist. The current format stores the register array
//! as-is. The legacy format is a dense image with four times the register
//! count; converting between the two is lossy downward and solved by a
//! short iterative search upward.
//!
//! The constants below are part of the storage format: sketches only
//! merge and deserialize correctly between peers built with the same
//! parameters.

mod legacy;
mod serialization;
mod sketch;

pub use serialization::{should_serialize, HllStorageType};
pub use sketch::HyperLogLog;

/// Number of register-index bits taken from the low end of the hash.
pub const P: usize = 12;
/// Width of the residual the leading-zero count runs over.
pub const Q: usize = 64 - P;
/// Number of registers.
pub const M: usize = 1 << P;
/// Estimator bias constant, 1 / (2 ln 2).
pub const ALPHA: f64 = 0.721347520444481703680;
