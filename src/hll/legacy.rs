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

//! The legacy dense sketch image and the conversions to and from it.
//!
//! Old writers stored a redis-style dense image: a 16-byte header followed
//! by 16384 six-bit registers. The current sketch has a quarter of the
//! registers, so downscaling takes the maximum of each block of four.
//! Upscaling is underdetermined; it anchors the first register of each
//! block (which makes a later downscale exact) and searches a shared
//! default value for the rest until the two images estimate within a
//! factor of two of each other.

use byteorder::{ByteOrder, LE};

use crate::error::{Error, Result};
use crate::hll::sketch::estimate_from_counts;
use crate::hll::{HyperLogLog, M};

/// Register-index bits of the legacy image.
const V1_P: usize = 14;
/// Legacy register count.
const V1_M: usize = 1 << V1_P;
/// Residual width of the legacy image.
const V1_Q: usize = 64 - V1_P;
/// Bits per packed register.
const V1_REGISTER_BITS: usize = 6;
const V1_REGISTER_MASK: u8 = (1 << V1_REGISTER_BITS) - 1;

const HEADER_SIZE: usize = 16;
const MAGIC: &[u8; 4] = b"HYLL";
const ENCODING_DENSE: u8 = 0;
/// Cached-cardinality word with the stale bit set; readers must recount.
const CARD_STALE: u64 = 1 << 63;

/// Registers the current sketch folds into one legacy block.
const MULT: usize = V1_M / M;

/// Largest zero count a legacy register can hold.
const fn maximum_zeros() -> u8 {
    (V1_Q + 1) as u8
}

/// Estimate quotient both directions of the conversion must stay within.
const ACCEPTABLE_Q_ERROR: f64 = 2.0;

/// A materialized legacy image. Only exists transiently while converting
/// to or from the serialized form.
pub(super) struct HllV1 {
    image: Box<[u8]>,
}

impl HllV1 {
    pub fn new() -> Self {
        let mut image = vec![0u8; Self::get_size()].into_boxed_slice();
        image[..4].copy_from_slice(MAGIC);
        image[4] = ENCODING_DENSE;
        LE::write_u64(&mut image[8..16], CARD_STALE);
        Self { image }
    }

    /// Byte size of the image: header plus the packed register payload.
    pub const fn get_size() -> usize {
        HEADER_SIZE + V1_M * V1_REGISTER_BITS / 8
    }

    pub fn data(&self) -> &[u8] {
        &self.image
    }

    /// Adopts an image read back from storage.
    pub fn from_image(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != Self::get_size() {
            return Err(Error::deserial(format!(
                "legacy sketch image must be {} bytes, got {}",
                Self::get_size(),
                bytes.len()
            )));
        }
        if &bytes[..4] != MAGIC {
            return Err(Error::deserial("legacy sketch image has a bad magic"));
        }
        if bytes[4] != ENCODING_DENSE {
            return Err(Error::deserial(format!(
                "legacy sketch image has unsupported encoding {}",
                bytes[4]
            )));
        }
        let result = Self {
            image: bytes.to_vec().into_boxed_slice(),
        };
        for index in 0..V1_M {
            let value = result.get_register(index);
            if value > maximum_zeros() {
                return Err(Error::deserial(format!(
                    "legacy register value {value} out of range, maximum is {}",
                    maximum_zeros()
                )));
            }
        }
        Ok(result)
    }

    fn get_register(&self, index: usize) -> u8 {
        debug_assert!(index < V1_M);
        let bit = index * V1_REGISTER_BITS;
        let byte = HEADER_SIZE + bit / 8;
        let shift = bit % 8;
        let mut value = self.image[byte] >> shift;
        if shift + V1_REGISTER_BITS > 8 {
            value |= self.image[byte + 1] << (8 - shift);
        }
        value & V1_REGISTER_MASK
    }

    fn set_register(&mut self, index: usize, value: u8) {
        debug_assert!(index < V1_M);
        debug_assert!(value <= V1_REGISTER_MASK);
        let bit = index * V1_REGISTER_BITS;
        let byte = HEADER_SIZE + bit / 8;
        let shift = bit % 8;
        self.image[byte] &= !(V1_REGISTER_MASK << shift);
        self.image[byte] |= value << shift;
        if shift + V1_REGISTER_BITS > 8 {
            let spill = 8 - shift;
            self.image[byte + 1] &= !(V1_REGISTER_MASK >> spill);
            self.image[byte + 1] |= value >> spill;
        }
    }

    /// Compresses the legacy registers into `new`, losing some accuracy:
    /// each target register becomes the maximum of its block of `MULT`.
    pub fn to_new(&self, new: &mut HyperLogLog) {
        for i in 0..M {
            let mut max_old = 0u8;
            for j in 0..MULT {
                max_old = max_old.max(self.get_register(i * MULT + j));
            }
            new.update(i, max_old);
        }
    }

    /// Expands `new` into the legacy register layout.
    ///
    /// Duplicating every register `MULT` times would inflate the estimate
    /// badly. Instead the first register of each block anchors the exact
    /// value, and the remaining slots take `min(anchor, default_val)` where
    /// `default_val` starts at the anchor average and is nudged by a
    /// shrinking epsilon until both images estimate within range. Dense
    /// sketches can exhaust the schedule without landing inside the range;
    /// the anchors still make the reverse conversion exact, so the search
    /// result is kept as-is.
    pub fn from_new(&mut self, new: &HyperLogLog) {
        let new_count = new.count();
        if new_count == 0 {
            return;
        }

        let mut sum: u64 = 0;
        for i in 0..M {
            let anchor = new.get_register(i).min(maximum_zeros());
            self.set_register(i * MULT, anchor);
            sum += anchor as u64;
        }
        let avg = (sum / M as u64) as u8;

        let mut default_val = avg;
        for epsilon in (1..=4u8).rev() {
            for i in 0..M {
                let anchor = new.get_register(i).min(maximum_zeros());
                for j in 1..MULT {
                    self.set_register(i * MULT + j, anchor.min(default_val));
                }
            }
            if is_within_acceptable_range(new_count, self.count()) {
                break;
            }
            if self.count() > new_count {
                default_val = default_val.saturating_sub(epsilon);
            } else {
                default_val += epsilon;
            }
        }
    }

    fn count(&self) -> u64 {
        // Registers hold six bits, so a foreign image can exceed the
        // legitimate maximum; size the histogram for the full value space.
        let mut counts = [0u32; 1 << V1_REGISTER_BITS];
        for index in 0..V1_M {
            counts[self.get_register(index) as usize] += 1;
        }
        estimate_from_counts(&counts, V1_M as f64, V1_Q)
    }
}

fn is_within_acceptable_range(new_count: u64, old_count: u64) -> bool {
    if new_count == old_count {
        return true;
    }
    let new = new_count as f64;
    let old = old_count as f64;
    new.max(old) / new.min(old) < ACCEPTABLE_Q_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_size() {
        assert_eq!(HllV1::get_size(), 12304);
    }

    #[test]
    fn test_register_packing_round_trip() {
        let mut old = HllV1::new();
        // Hit every shift alignment of the six-bit packing.
        for (index, value) in [(0, 63), (1, 1), (2, 42), (3, 7), (16383, 51), (8191, 33)] {
            old.set_register(index, value);
        }
        for (index, value) in [(0, 63), (1, 1), (2, 42), (3, 7), (16383, 51), (8191, 33)] {
            assert_eq!(old.get_register(index), value, "register {index}");
        }
        // Neighbors of written registers stay untouched.
        assert_eq!(old.get_register(4), 0);
        assert_eq!(old.get_register(8190), 0);
    }

    #[test]
    fn test_set_register_overwrites() {
        let mut old = HllV1::new();
        old.set_register(5, 63);
        old.set_register(5, 9);
        assert_eq!(old.get_register(5), 9);
    }

    #[test]
    fn test_from_image_rejects_garbage() {
        assert!(HllV1::from_image(&[0u8; 10]).is_err());
        let mut bytes = vec![0u8; HllV1::get_size()];
        assert!(HllV1::from_image(&bytes).is_err());
        bytes[..4].copy_from_slice(b"HYLL");
        bytes[4] = 1;
        assert!(HllV1::from_image(&bytes).is_err());
        bytes[4] = 0;
        assert!(HllV1::from_image(&bytes).is_ok());
    }

    #[test]
    fn test_empty_sketch_leaves_image_empty() {
        let new = HyperLogLog::new();
        let mut old = HllV1::new();
        old.from_new(&new);
        for index in 0..V1_M {
            assert_eq!(old.get_register(index), 0);
        }
    }

    #[test]
    fn test_round_trip_within_quotient() {
        let mut new = HyperLogLog::new();
        for i in 0..10_000u64 {
            new.add(&i);
        }
        let mut old = HllV1::new();
        old.from_new(&new);

        let mut back = HyperLogLog::new();
        old.to_new(&mut back);

        let original = new.count() as f64;
        let recovered = back.count() as f64;
        let quotient = original.max(recovered) / original.min(recovered);
        assert!(quotient < 2.0, "quotient {quotient}");
    }

    #[test]
    fn test_anchor_slots_survive_round_trip() {
        let mut new = HyperLogLog::new();
        for i in 0..5_000u64 {
            new.add(&i);
        }
        let mut old = HllV1::new();
        old.from_new(&new);

        let mut back = HyperLogLog::new();
        old.to_new(&mut back);
        for i in 0..M {
            assert_eq!(
                back.get_register(i),
                new.get_register(i).min(maximum_zeros()),
                "register {i}"
            );
        }
    }
}
