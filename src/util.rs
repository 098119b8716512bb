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

use crate::AvroResult;
use crate::error::Details;
use serde_json::{Map, Value};
use std::sync::{
    Once,
    atomic::{AtomicUsize, Ordering},
};

/// Maximum number of bytes that can be allocated when decoding
/// Avro-encoded values. This is a protection against ill-formed
/// data, whose length field might be interpreted as enormous.
/// See [`max_allocation_bytes`] to change this limit.
pub const DEFAULT_MAX_ALLOCATION_BYTES: usize = 512 * 1024 * 1024;
static MAX_ALLOCATION_BYTES: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_ALLOCATION_BYTES);
static MAX_ALLOCATION_BYTES_ONCE: Once = Once::new();

/// Set a new maximum number of bytes that can be allocated when decoding data.
/// Once called, the limit cannot be changed.
///
/// **NOTE** This function must be called before decoding **any** data. The
/// library leverages [`std::sync::Once`] to set the limit either when calling
/// this method, or when decoding for the first time.
pub fn max_allocation_bytes(num_bytes: usize) -> usize {
    MAX_ALLOCATION_BYTES_ONCE.call_once(|| {
        MAX_ALLOCATION_BYTES.store(num_bytes, Ordering::Release);
    });
    MAX_ALLOCATION_BYTES.load(Ordering::Acquire)
}

pub fn safe_len(len: usize) -> AvroResult<usize> {
    let max_bytes = max_allocation_bytes(DEFAULT_MAX_ALLOCATION_BYTES);

    if len <= max_bytes {
        Ok(len)
    } else {
        Err(Details::MemoryAllocation {
            desired: len,
            maximum: max_bytes,
        }
        .into())
    }
}

/// Convenience accessors for string-valued attributes of a schema node.
pub(crate) trait MapHelper {
    fn string(&self, key: &str) -> Option<String>;

    fn name(&self) -> Option<String> {
        self.string("name")
    }
}

impl MapHelper for Map<String, Value> {
    fn string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
    }
}

pub fn zig_i32(n: i32, buffer: &mut Vec<u8>) {
    zig_i64(n as i64, buffer)
}

pub fn zig_i64(n: i64, buffer: &mut Vec<u8>) {
    encode_variable(((n << 1) ^ (n >> 63)) as u64, buffer)
}

pub fn zag_i32(bytes: &[u8]) -> AvroResult<(i32, &[u8])> {
    let (i, rest) = zag_i64(bytes)?;
    let n = i32::try_from(i).map_err(|e| Details::ZagI32(e, i))?;
    Ok((n, rest))
}

pub fn zag_i64(bytes: &[u8]) -> AvroResult<(i64, &[u8])> {
    let (z, rest) = decode_variable(bytes)?;
    let n = if z & 0x1 == 0 {
        (z >> 1) as i64
    } else {
        !(z >> 1) as i64
    };
    Ok((n, rest))
}

fn encode_variable(mut z: u64, buffer: &mut Vec<u8>) {
    loop {
        if z <= 0x7F {
            buffer.push((z & 0x7F) as u8);
            break;
        } else {
            buffer.push(0x80 | (z & 0x7F) as u8);
            z >>= 7;
        }
    }
}

fn decode_variable(bytes: &[u8]) -> AvroResult<(u64, &[u8])> {
    let mut i = 0u64;

    for j in 0.. {
        if j > 9 {
            // if j * 7 > 64
            return Err(Details::IntegerOverflow.into());
        }
        let byte = *bytes.get(j).ok_or(Details::UnexpectedEndOfData {
            needed: 1,
            found: 0,
        })?;
        i |= u64::from(byte & 0x7F) << (j * 7);
        if (byte >> 7) == 0 {
            return Ok((i, &bytes[j + 1..]));
        }
    }

    unreachable!("the loop above always returns")
}

/// Split off exactly `n` bytes from the front of `bytes`.
pub(crate) fn take_bytes(bytes: &[u8], n: usize) -> AvroResult<(&[u8], &[u8])> {
    if bytes.len() < n {
        Err(Details::UnexpectedEndOfData {
            needed: n,
            found: bytes.len(),
        }
        .into())
    } else {
        Ok(bytes.split_at(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zigzag() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        zig_i32(42i32, &mut a);
        zig_i64(42i64, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zig_i64() {
        let mut s = Vec::new();

        zig_i64(0, &mut s);
        assert_eq!(s, [0]);

        s.clear();
        zig_i64(-1, &mut s);
        assert_eq!(s, [1]);

        s.clear();
        zig_i64(1, &mut s);
        assert_eq!(s, [2]);

        s.clear();
        zig_i64(-64, &mut s);
        assert_eq!(s, [127]);

        s.clear();
        zig_i64(64, &mut s);
        assert_eq!(s, [128, 1]);

        s.clear();
        zig_i64(300, &mut s);
        assert_eq!(s, [0xD8, 0x04]);

        s.clear();
        zig_i64(i64::MAX, &mut s);
        assert_eq!(s, [254, 255, 255, 255, 255, 255, 255, 255, 255, 1]);

        s.clear();
        zig_i64(i64::MIN, &mut s);
        assert_eq!(s, [255, 255, 255, 255, 255, 255, 255, 255, 255, 1]);
    }

    #[test]
    fn test_zag_round_trip() {
        for n in [0i64, 1, -1, 64, -64, 300, i64::MIN, i64::MAX] {
            let mut s = Vec::new();
            zig_i64(n, &mut s);
            let (decoded, rest) = zag_i64(&s).unwrap();
            assert_eq!(decoded, n);
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn test_zag_leaves_remainder() {
        let bytes = [0x02, 0xAB, 0xCD];
        let (n, rest) = zag_i64(&bytes).unwrap();
        assert_eq!(n, 1);
        assert_eq!(rest, [0xAB, 0xCD]);
    }

    #[test]
    fn test_zag_overflow() {
        let causes_left_shift_overflow: &[u8] =
            &[0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1, 0xe1];
        assert!(zag_i64(causes_left_shift_overflow).is_err());
    }

    #[test]
    fn test_zag_truncated() {
        // Continuation bit set, but no further bytes.
        assert!(zag_i64(&[0x80]).is_err());
    }

    #[test]
    fn test_safe_len() {
        assert_eq!(42usize, safe_len(42usize).unwrap());
        assert!(safe_len(1024 * 1024 * 1024).is_err());
    }
}
