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

use crate::{
    AvroResult, decode, encode,
    error::Details,
    logical::LogicalType,
    rabin,
    schema::{Name, SchemaFingerprint},
    symbol_table::Registry,
    value::Value,
};
use digest::Digest;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

/// The compiled codecs visible to a conversion, keyed by full type name.
pub(crate) type RegistryMap = HashMap<String, Arc<Inner>>;

/// One compiled Avro type. Each variant carries exactly the state its
/// conversions need; nested named-type references are kept as [`Kind::Ref`]
/// and resolved through the symbol table by name, so recursive type graphs
/// never form reference cycles.
pub(crate) enum Kind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Logical(Logical),
    Record(RecordKind),
    Enum(EnumKind),
    Fixed(usize),
    Array(Arc<Inner>),
    Map(Arc<Inner>),
    Union(UnionKind),
    Ref(String),
}

/// A logical type layered over a base `int`/`long` codec: the semantic
/// transform composes with the base conversions, leaving the wire shape
/// untouched.
pub(crate) struct Logical {
    pub(crate) logical: LogicalType,
    pub(crate) base: Arc<Inner>,
}

/// Record fields are filled in only after the record's name has been
/// registered, so self-referential fields can resolve it.
pub(crate) struct RecordKind {
    pub(crate) fields: OnceLock<Vec<RecordField>>,
}

impl RecordKind {
    pub(crate) fn fields<'k>(&'k self, type_name: &Name) -> AvroResult<&'k [RecordField]> {
        self.fields
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| Details::UnresolvedTypeReference(type_name.fullname()).into())
    }
}

pub(crate) struct RecordField {
    pub(crate) name: String,
    pub(crate) codec: Arc<Inner>,
}

pub(crate) struct EnumKind {
    pub(crate) symbols: Vec<String>,
    index_by_symbol: HashMap<String, usize>,
}

impl EnumKind {
    pub(crate) fn new(symbols: Vec<String>) -> Self {
        let index_by_symbol = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            symbols,
            index_by_symbol,
        }
    }

    pub(crate) fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index_by_symbol.get(symbol).copied()
    }
}

pub(crate) struct UnionKind {
    pub(crate) branches: Vec<Arc<Inner>>,
}

/// The innards shared by every handle to a compiled codec.
pub(crate) struct Inner {
    pub(crate) type_name: Name,
    pub(crate) schema_original: String,
    pub(crate) schema_canonical: String,
    pub(crate) kind: Kind,
}

impl Inner {
    /// Follow a by-name reference through the registry; any other kind
    /// resolves to itself.
    pub(crate) fn resolve<'n>(&'n self, names: &'n RegistryMap) -> AvroResult<&'n Inner> {
        match &self.kind {
            Kind::Ref(fullname) => names
                .get(fullname)
                .map(|codec| codec.as_ref())
                .ok_or_else(|| Details::UnresolvedTypeReference(fullname.clone()).into()),
            _ => Ok(self),
        }
    }
}

/// A compiled converter for one Avro type.
///
/// A `Codec` is produced by [`SymbolTable::new_codec`](crate::SymbolTable::new_codec)
/// and offers the four conversions between the native [`Value`]
/// representation, the Avro binary encoding and the Avro JSON ("textual")
/// encoding. Once compiled it is immutable and safe to share across threads.
///
/// Two codecs compare equal iff their schemas have the same Parsing
/// Canonical Form.
#[derive(Clone)]
pub struct Codec {
    inner: Arc<Inner>,
    registry: Arc<Registry>,
    schema_original: String,
    schema_canonical: String,
}

impl Codec {
    pub(crate) fn new(
        inner: Arc<Inner>,
        registry: Arc<Registry>,
        schema_original: String,
        schema_canonical: String,
    ) -> Self {
        Self {
            inner,
            registry,
            schema_original,
            schema_canonical,
        }
    }

    /// The qualified name of the compiled type: the full name for named
    /// types, the literal identifier (e.g. `long.timestamp-millis`) for
    /// built-ins.
    pub fn type_name(&self) -> &Name {
        &self.inner.type_name
    }

    /// The exact schema text this codec was compiled from.
    pub fn schema_original(&self) -> &str {
        &self.schema_original
    }

    /// The Parsing Canonical Form of the schema.
    pub fn schema_canonical(&self) -> &str {
        &self.schema_canonical
    }

    /// Encode a native value into the Avro binary format.
    pub fn binary_from_native(&self, value: &Value) -> AvroResult<Vec<u8>> {
        let names = self.registry.read();
        let mut buffer = Vec::new();
        encode::encode_binary(&self.inner, value, &names, &mut buffer)?;
        Ok(buffer)
    }

    /// Decode a native value from the Avro binary format, returning the
    /// value together with the unconsumed remainder of `bytes`.
    pub fn native_from_binary<'a>(&self, bytes: &'a [u8]) -> AvroResult<(Value, &'a [u8])> {
        let names = self.registry.read();
        decode::decode_binary(&self.inner, bytes, &names)
    }

    /// Encode a native value into the Avro JSON encoding.
    pub fn textual_from_native(&self, value: &Value) -> AvroResult<Vec<u8>> {
        let names = self.registry.read();
        let json = encode::json_from_native(&self.inner, value, &names)?;
        serde_json::to_vec(&json).map_err(|e| Details::SerializeJson(e).into())
    }

    /// Decode a native value from the Avro JSON encoding.
    pub fn native_from_textual(&self, text: &[u8]) -> AvroResult<Value> {
        let json: JsonValue =
            serde_json::from_slice(text).map_err(Details::ParseTextualJson)?;
        let names = self.registry.read();
        decode::native_from_json(&self.inner, &json, &names)
    }

    /// Compute the fingerprint of the canonical form with any
    /// [`Digest`] implementation (MD5, SHA-256, ...).
    pub fn fingerprint<D: Digest>(&self) -> SchemaFingerprint {
        let mut d = D::new();
        d.update(self.schema_canonical.as_bytes());
        SchemaFingerprint {
            bytes: d.finalize().to_vec(),
        }
    }

    /// The CRC-64-AVRO Rabin fingerprint of the canonical form.
    pub fn rabin(&self) -> u64 {
        rabin::fingerprint(self.schema_canonical.as_bytes())
    }
}

impl Debug for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("type_name", &self.inner.type_name)
            .field("schema_canonical", &self.schema_canonical)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Codec {
    /// Codec equality is schema equality: byte-identical canonical forms.
    fn eq(&self, other: &Self) -> bool {
        self.schema_canonical == other.schema_canonical
    }
}
