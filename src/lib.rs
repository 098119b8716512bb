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

//! **avrokit** compiles [Apache Avro](https://avro.apache.org/) schemas
//! into reusable [`Codec`]s that convert values between three
//! representations: the native [`Value`] type, the compact Avro binary
//! encoding, and the Avro JSON ("textual") encoding.
//!
//! Compilation happens through a [`SymbolTable`]: named types (records,
//! enums, fixeds) defined by one schema are registered under their full
//! names and can be referenced, including self-referentially, by any
//! schema compiled against the same table.
//!
//! ```
//! use avrokit::{Error, SymbolTable, Value};
//!
//! let table = SymbolTable::new();
//! let codec = table.new_codec(
//!     r#"{"type": "record", "name": "test.User", "fields": [
//!         {"name": "id", "type": "long"},
//!         {"name": "email", "type": ["null", "string"]}
//!     ]}"#,
//! )?;
//!
//! let user = Value::Record(vec![
//!     ("id".to_string(), Value::Long(7)),
//!     ("email".to_string(), Value::Null),
//! ]);
//! let encoded = codec.binary_from_native(&user)?;
//! let (decoded, rest) = codec.native_from_binary(&encoded)?;
//! assert!(rest.is_empty());
//! assert_eq!(decoded, user);
//! # Ok::<(), Error>(())
//! ```
//!
//! Every codec also carries the
//! [Parsing Canonical Form](https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas)
//! of its schema, used for equality and for the [`Codec::rabin`] and
//! [`Codec::fingerprint`] schema fingerprints.

mod codec;
mod compile;
mod decode;
mod encode;
pub mod error;
mod logical;
pub mod rabin;
pub mod schema;
mod symbol_table;
pub mod util;
mod validator;
pub mod value;

pub use codec::Codec;
pub use error::{Error, ErrorKind};
pub use schema::{Name, Namespace, NamespaceRef, SchemaFingerprint, parsing_canonical_form};
pub use symbol_table::SymbolTable;
pub use value::{Value, ValueKind};

/// A convenience type alias for `Result`s with `Error`s.
pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use crate::{SymbolTable, Value};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_binary_round_trip() {
        let table = SymbolTable::new();
        let codec = table
            .new_codec(
                r#"
            {
                "type": "record",
                "name": "test",
                "fields": [
                    {"name": "a", "type": "long"},
                    {"name": "b", "type": "string"}
                ]
            }
        "#,
            )
            .unwrap();

        let record = Value::Record(vec![
            ("a".to_string(), Value::Long(27)),
            ("b".to_string(), Value::String("foo".to_string())),
        ]);

        let encoded = codec.binary_from_native(&record).unwrap();
        let (decoded, rest) = codec.native_from_binary(&encoded).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_illformed_length() {
        let table = SymbolTable::new();
        let codec = table.new_codec(r#""bytes""#).unwrap();

        // The length prefix decodes to 2^40, far beyond the allocation cap.
        let illformed: &[u8] = &[0x80, 0x80, 0x80, 0x80, 0x80, 0x40];
        assert!(codec.native_from_binary(illformed).is_err());

        // A plausible length with no data behind it.
        let truncated: &[u8] = &[0x3e, 0x15, 0xff];
        assert!(codec.native_from_binary(truncated).is_err());
    }
}
