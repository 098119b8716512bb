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

use crate::codec::{Codec, Inner, Kind, Logical, RegistryMap};
use crate::compile::Compiler;
use crate::error::Details;
use crate::logical::LogicalType;
use crate::schema::{Name, parsing_canonical_form};
use crate::AvroResult;
use log::debug;
use serde_json::Value as JsonValue;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The shared mapping from fully-qualified type name to compiled codec.
/// It starts out holding the built-ins, grows monotonically as schemas are
/// compiled, and is kept alive by every [`Codec`] produced against it so
/// by-name references stay resolvable.
pub(crate) struct Registry {
    codecs: RwLock<RegistryMap>,
}

impl Registry {
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryMap> {
        self.codecs.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryMap> {
        self.codecs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A group of compiled codecs with support for embedding types by
/// reference: schemas passed to [`new_codec`](Self::new_codec) may contain
/// fields whose types name previously registered schemas.
///
/// Compilation mutates the table, so concurrent `new_codec` calls against
/// one table must be serialized by the caller. The codecs it hands out are
/// immutable and freely shareable.
pub struct SymbolTable {
    registry: Arc<Registry>,
}

impl SymbolTable {
    /// Construct a new instance populated only with the built-in codecs:
    /// the eight primitives plus the logical types under their
    /// `<base>.<logical>` composite names.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry {
                codecs: RwLock::new(builtin_codecs()),
            }),
        }
    }

    /// Parse `schema_text` and compile it into a [`Codec`] for operating on
    /// data serialized with that schema.
    ///
    /// Named types the schema defines are registered in the table and can
    /// be referenced by later `new_codec` calls. If compilation fails, any
    /// registration it performed is rolled back and no codec is returned.
    pub fn new_codec(&self, schema_text: &str) -> AvroResult<Codec> {
        let schema: JsonValue =
            serde_json::from_str(schema_text).map_err(Details::ParseSchemaJson)?;

        let mut compiler = Compiler::new(&self.registry);
        let compiled = compiler
            .build(&schema, None)
            .and_then(|inner| Ok((inner, parsing_canonical_form(&schema)?)));

        match compiled {
            Ok((inner, schema_canonical)) => {
                debug!("Compiled schema as {}", inner.type_name);
                Ok(Codec::new(
                    inner,
                    Arc::clone(&self.registry),
                    schema_text.to_string(),
                    schema_canonical,
                ))
            }
            Err(error) => {
                compiler.rollback();
                Err(error)
            }
        }
    }

    /// Find the existing codec for `full_name` without compiling anything,
    /// or `None` if the name is unrecognized.
    pub fn get_codec(&self, full_name: &str) -> Option<Codec> {
        let codecs = self.registry.read();
        codecs.get(full_name).map(|inner| {
            Codec::new(
                Arc::clone(inner),
                Arc::clone(&self.registry),
                inner.schema_original.clone(),
                inner.schema_canonical.clone(),
            )
        })
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("codecs", &self.registry.read().len())
            .finish()
    }
}

/// The fixed set of built-in codecs every table starts with. A pure
/// factory: each table owns an independent copy.
fn builtin_codecs() -> RegistryMap {
    let mut codecs = RegistryMap::new();

    for (name, kind) in [
        ("null", Kind::Null),
        ("boolean", Kind::Boolean),
        ("int", Kind::Int),
        ("long", Kind::Long),
        ("float", Kind::Float),
        ("double", Kind::Double),
        ("bytes", Kind::Bytes),
        ("string", Kind::String),
    ] {
        codecs.insert(
            name.to_string(),
            Arc::new(Inner {
                type_name: Name::unchecked(name),
                schema_original: format!("\"{name}\""),
                schema_canonical: format!("\"{name}\""),
                kind,
            }),
        );
    }

    use strum::IntoEnumIterator;
    for logical in LogicalType::iter() {
        let base_name = logical.base_type();
        let base = codecs
            .get(base_name)
            .cloned()
            .expect("primitive codecs are registered first");
        let key = format!("{base_name}.{logical}");
        codecs.insert(
            key.clone(),
            Arc::new(Inner {
                type_name: Name::unchecked(&key),
                schema_original: base.schema_original.clone(),
                schema_canonical: base.schema_canonical.clone(),
                kind: Kind::Logical(Logical { logical, base }),
            }),
        );
    }

    codecs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_complete() {
        let codecs = builtin_codecs();
        for name in [
            "null",
            "boolean",
            "int",
            "long",
            "float",
            "double",
            "bytes",
            "string",
            "long.timestamp-millis",
            "long.timestamp-micros",
            "int.time-millis",
            "long.time-micros",
            "int.date",
        ] {
            assert!(codecs.contains_key(name), "missing builtin {name}");
        }
        assert_eq!(codecs.len(), 13);
    }

    #[test]
    fn test_tables_are_independent() {
        let a = SymbolTable::new();
        let b = SymbolTable::new();
        a.new_codec(r#"{"type":"fixed","name":"ns.F","size":4}"#)
            .unwrap();
        assert!(a.get_codec("ns.F").is_some());
        assert!(b.get_codec("ns.F").is_none());
    }
}
