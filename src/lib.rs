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

//! Cardinality sketches and bitwise aggregate functions for vectorized
//! analytical execution.
//!
//! Two tightly coupled pieces live here:
//!
//! - [`hll`]: a HyperLogLog sketch with merge, estimation, and a storage
//!   format that stays readable by peers still on the legacy dense layout.
//! - [`agg`]: the bitwise and bitstring aggregate family (`bit_and`,
//!   `bit_or`, `bit_xor`, `bitstring_agg`) built on a shared
//!   initialize / update / combine / finalize / destroy state protocol.
//!
//! Input batches arrive through the [`vector`] column interface; bitstring
//! values and primitives live in [`common::bits`].
//!
//! None of the states or sketches are internally synchronized. The executor
//! guarantees a single writer per state; parallelism is expressed by
//! building per-partition states and combining them.

mod codec;

pub mod agg;
pub mod common;
pub mod error;
pub mod hash;
pub mod hll;
pub mod stats;
pub mod vector;
