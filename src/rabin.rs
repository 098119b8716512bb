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

//! Implementation of the [CRC-64-AVRO Rabin fingerprint](https://avro.apache.org/docs/++version++/specification/#schema-fingerprints),
//! computed over a schema's Parsing Canonical Form.

use std::sync::OnceLock;

/// The seed, which is also the fingerprint of the empty input.
const EMPTY: u64 = 0xc15d_213a_a4d7_a795;

static FINGERPRINT_TABLE: OnceLock<[u64; 256]> = OnceLock::new();

fn fingerprint_table() -> &'static [u64; 256] {
    FINGERPRINT_TABLE.get_or_init(|| {
        let mut table = [0u64; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let mut fp = i as u64;
            for _ in 0..8 {
                fp = (fp >> 1) ^ (EMPTY & (fp & 1).wrapping_neg());
            }
            *entry = fp;
        }
        table
    })
}

/// Compute the 64-bit Rabin fingerprint of `data`.
pub fn fingerprint(data: &[u8]) -> u64 {
    let table = fingerprint_table();
    let mut fp = EMPTY;
    for byte in data {
        fp = (fp >> 8) ^ table[((fp ^ u64::from(*byte)) & 0xff) as usize];
    }
    fp
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // Expected values from the fingerprint table in the Avro specification.
    #[test]
    fn test_known_fingerprints() {
        assert_eq!(fingerprint(br#""int""#), 0x7275_d51a_3f39_5c8f);
        assert_eq!(fingerprint(br#""long""#), 0xd054_e144_93f4_1db7);
        assert_eq!(fingerprint(br#""string""#), 0x8f01_4872_6345_03c7);
        assert_eq!(fingerprint(br#""boolean""#), 0x9f42_fc78_a4d4_f764);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fingerprint(b""), EMPTY);
    }
}
