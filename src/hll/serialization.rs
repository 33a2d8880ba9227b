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

//! Storage format for the sketch.
//!
//! Two tagged fields: field 100 carries the storage type, field 101 the
//! payload bytes. Current writers emit the raw register array; when the
//! target format predates that layout, the sketch is expanded into the
//! legacy dense image instead so old readers keep working.

use crate::codec::{SketchBytes, SketchSlice};
use crate::error::{Error, Result};
use crate::hll::legacy::HllV1;
use crate::hll::{HyperLogLog, M, Q};

/// Field id of the storage-type byte.
const FIELD_TYPE: u8 = 100;
/// Field id of the payload.
const FIELD_DATA: u8 = 101;

/// Oldest storage format version that understands the register-array layout.
const REGISTER_ARRAY_MIN_VERSION: u32 = 3;

/// How a serialized sketch is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HllStorageType {
    /// The legacy dense image.
    HllV1 = 1,
    /// The raw register array.
    HllV2 = 2,
}

/// Returns true when a target with the given format version stores the
/// register-array layout.
pub fn should_serialize(format_version: u32) -> bool {
    format_version >= REGISTER_ARRAY_MIN_VERSION
}

impl HyperLogLog {
    /// Serializes the sketch for a target with the given format version.
    pub fn serialize(&self, format_version: u32) -> Vec<u8> {
        if should_serialize(format_version) {
            let mut bytes = SketchBytes::with_capacity(M + 8);
            bytes.write_u8(FIELD_TYPE);
            bytes.write_u8(HllStorageType::HllV2 as u8);
            bytes.write_u8(FIELD_DATA);
            bytes.write_u32_le(M as u32);
            bytes.write(self.registers());
            bytes.into_bytes()
        } else {
            let mut old = HllV1::new();
            old.from_new(self);

            let mut bytes = SketchBytes::with_capacity(HllV1::get_size() + 8);
            bytes.write_u8(FIELD_TYPE);
            bytes.write_u8(HllStorageType::HllV1 as u8);
            bytes.write_u8(FIELD_DATA);
            bytes.write_u32_le(HllV1::get_size() as u32);
            bytes.write(old.data());
            bytes.into_bytes()
        }
    }

    /// Reads a sketch back from its serialized form.
    pub fn deserialize(data: &[u8]) -> Result<HyperLogLog> {
        let mut slice = SketchSlice::new(data);

        let tag = slice
            .read_u8()
            .map_err(|e| Error::insufficient_data("type").set_source(e))?;
        if tag != FIELD_TYPE {
            return Err(Error::deserial(format!(
                "expected storage type field {FIELD_TYPE}, got {tag}"
            )));
        }
        let storage_type = slice
            .read_u8()
            .map_err(|e| Error::insufficient_data("type").set_source(e))?;

        let tag = slice
            .read_u8()
            .map_err(|e| Error::insufficient_data("data").set_source(e))?;
        if tag != FIELD_DATA {
            return Err(Error::deserial(format!(
                "expected data field {FIELD_DATA}, got {tag}"
            )));
        }
        let len = slice
            .read_u32_le()
            .map_err(|e| Error::insufficient_data("data").set_source(e))? as usize;

        let mut result = HyperLogLog::new();
        match storage_type {
            t if t == HllStorageType::HllV1 as u8 => {
                if len != HllV1::get_size() {
                    return Err(Error::deserial(format!(
                        "legacy payload must be {} bytes, got {len}",
                        HllV1::get_size()
                    )));
                }
                let mut image = vec![0u8; len];
                slice
                    .read_exact(&mut image)
                    .map_err(|e| Error::insufficient_data("data").set_source(e))?;
                let old = HllV1::from_image(&image)?;
                old.to_new(&mut result);
            }
            t if t == HllStorageType::HllV2 as u8 => {
                if len != M {
                    return Err(Error::deserial(format!(
                        "register payload must be {M} bytes, got {len}"
                    )));
                }
                slice
                    .read_exact(result.registers_mut())
                    .map_err(|e| Error::insufficient_data("data").set_source(e))?;
                if let Some(&bad) = result.registers().iter().find(|&&r| r as usize > Q + 1) {
                    return Err(Error::deserial(format!(
                        "register value {bad} out of range, maximum is {}",
                        Q + 1
                    )));
                }
            }
            other => {
                return Err(Error::deserial(format!(
                    "Unknown HyperLogLog storage type: {other}"
                )));
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_cutoff() {
        assert!(!should_serialize(0));
        assert!(!should_serialize(2));
        assert!(should_serialize(3));
        assert!(should_serialize(100));
    }
}
