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

//! Element hashing for sketch inserts.
//!
//! Sketch accuracy depends on hash quality, so elements are run through
//! 128-bit MurmurHash3 and folded to the 64 bits the register layout
//! consumes. The seed is fixed: sketches only merge correctly when all
//! writers hash with the same seed.

use std::hash::Hash;

const DEFAULT_SEED: u32 = 9001;

/// Hashes an element to the 64-bit value consumed by the sketches.
pub fn hash_element<H: Hash>(value: &H) -> u64 {
    let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
    value.hash(&mut hasher);
    let (lo, hi) = hasher.finish128();
    lo ^ hi
}
