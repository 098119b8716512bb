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

//! The schema compiler: a recursive descent over a parsed schema tree that
//! produces a graph of codecs, consulting and growing the symbol table as
//! named types are referenced or defined.

use crate::AvroResult;
use crate::codec::{EnumKind, Inner, Kind, RecordField, RecordKind, UnionKind};
use crate::error::Details;
use crate::schema::{self, Name, NamespaceRef};
use crate::symbol_table::Registry;
use crate::util::MapHelper;
use crate::validator::{validate_enum_symbol_name, validate_record_field_name};
use log::warn;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

pub(crate) struct Compiler<'a> {
    registry: &'a Registry,
    /// Names registered by this compilation, removed again on failure.
    registered: Vec<String>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            registered: Vec::new(),
        }
    }

    /// Remove every name this compilation registered, so a failed top-level
    /// compilation leaves the table as it found it.
    pub(crate) fn rollback(&mut self) {
        if self.registered.is_empty() {
            return;
        }
        let mut codecs = self.registry.write();
        for name in self.registered.drain(..) {
            codecs.remove(&name);
        }
    }

    /// Compile one schema node into a codec.
    pub(crate) fn build(
        &mut self,
        schema: &JsonValue,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        match schema {
            JsonValue::String(reference) => self.build_reference(reference, enclosing_namespace),
            JsonValue::Object(complex) => self.build_complex(complex, enclosing_namespace),
            JsonValue::Array(_) => self.build_union(schema, enclosing_namespace),
            _ => Err(Details::ParseSchemaFromValidJson.into()),
        }
    }

    /// A string node: either a primitive name or a reference to a
    /// previously registered named type.
    fn build_reference(
        &mut self,
        reference: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        if schema::is_primitive(reference) {
            return self.lookup_builtin(reference);
        }

        let fullname =
            Name::new_with_enclosing_namespace(reference, enclosing_namespace)?.fullname();
        let existing = self.registry.read().get(&fullname).cloned();
        match existing {
            Some(codec) => Ok(named_reference(&codec, fullname)),
            None => Err(Details::UnresolvedTypeReference(fullname).into()),
        }
    }

    fn lookup_builtin(&self, key: &str) -> AvroResult<Arc<Inner>> {
        self.registry
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Details::UnresolvedTypeReference(key.to_string()).into())
    }

    fn build_complex(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let type_value = complex.get("type").ok_or(Details::GetTypeField)?;
        match type_value {
            JsonValue::String(t) => match t.as_str() {
                "record" => self.build_record(complex, enclosing_namespace),
                "enum" => self.build_enum(complex, enclosing_namespace),
                "fixed" => self.build_fixed(complex, enclosing_namespace),
                "array" => self.build_array(complex, enclosing_namespace),
                "map" => self.build_map(complex, enclosing_namespace),
                primitive if schema::is_primitive(primitive) => {
                    self.build_primitive(primitive, complex.get("logicalType"))
                }
                reference => self.build_reference(reference, enclosing_namespace),
            },
            // e.g. {"type": {"type": "string"}}
            nested => self.build(nested, enclosing_namespace),
        }
    }

    /// A primitive, possibly tagged with a logical type. An unregistered
    /// logical type never invalidates the schema: the codec falls back to
    /// the bare base type.
    fn build_primitive(
        &mut self,
        primitive: &str,
        logical_type: Option<&JsonValue>,
    ) -> AvroResult<Arc<Inner>> {
        match logical_type {
            Some(JsonValue::String(logical)) => {
                let key = format!("{primitive}.{logical}");
                let existing = self.registry.read().get(&key).cloned();
                match existing {
                    Some(codec) => Ok(codec),
                    None => {
                        warn!("Ignoring unknown logical type '{logical}' for type `{primitive}`");
                        self.lookup_builtin(primitive)
                    }
                }
            }
            Some(other) => {
                warn!("Ignoring non-string logical type {other} for type `{primitive}`");
                self.lookup_builtin(primitive)
            }
            None => self.lookup_builtin(primitive),
        }
    }

    fn build_record(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let name = Name::parse(complex, enclosing_namespace)?;
        let fullname = name.fullname();
        let (schema_original, schema_canonical) = schema_texts(complex, enclosing_namespace)?;

        let fields_json = complex
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or(Details::GetRecordFieldsJson)?;

        // Register before compiling the fields, so self-referential and
        // mutually recursive records resolve through the table.
        let record_namespace = name.namespace().map(str::to_string);
        let placeholder = Arc::new(Inner {
            type_name: name,
            schema_original,
            schema_canonical,
            kind: Kind::Record(RecordKind {
                fields: OnceLock::new(),
            }),
        });
        if let Some(existing) = self.register(&fullname, &placeholder)? {
            return Ok(named_reference(&existing, fullname));
        }

        let mut seen = HashSet::with_capacity(fields_json.len());
        let mut fields = Vec::with_capacity(fields_json.len());
        for field_json in fields_json {
            let field_map = field_json
                .as_object()
                .ok_or_else(|| Details::GetRecordFieldJson(field_json.clone()))?;
            let field_name = field_map.name().ok_or(Details::GetNameField)?;
            validate_record_field_name(&field_name)?;
            if !seen.insert(field_name.clone()) {
                return Err(Details::FieldNameDuplicate(field_name).into());
            }
            let field_type = field_map.get("type").ok_or(Details::GetTypeField)?;
            let codec = self.build(field_type, record_namespace.as_deref())?;
            fields.push(RecordField {
                name: field_name,
                codec,
            });
        }

        if let Kind::Record(record) = &placeholder.kind {
            let _ = record.fields.set(fields);
        }
        Ok(placeholder)
    }

    fn build_enum(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let name = Name::parse(complex, enclosing_namespace)?;
        let fullname = name.fullname();
        let (schema_original, schema_canonical) = schema_texts(complex, enclosing_namespace)?;

        let symbols_json = complex
            .get("symbols")
            .ok_or(Details::GetEnumSymbolsField)?
            .as_array()
            .ok_or(Details::GetEnumSymbols)?;
        if symbols_json.is_empty() {
            return Err(Details::GetEnumSymbols.into());
        }

        let mut seen = HashSet::with_capacity(symbols_json.len());
        let mut symbols = Vec::with_capacity(symbols_json.len());
        for symbol_json in symbols_json {
            let symbol = symbol_json.as_str().ok_or(Details::GetEnumSymbols)?;
            validate_enum_symbol_name(symbol)?;
            if !seen.insert(symbol) {
                return Err(Details::EnumSymbolDuplicate(symbol.to_string()).into());
            }
            symbols.push(symbol.to_string());
        }

        let codec = Arc::new(Inner {
            type_name: name,
            schema_original,
            schema_canonical,
            kind: Kind::Enum(EnumKind::new(symbols)),
        });
        if let Some(existing) = self.register(&fullname, &codec)? {
            return Ok(named_reference(&existing, fullname));
        }
        Ok(codec)
    }

    fn build_fixed(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let name = Name::parse(complex, enclosing_namespace)?;
        let fullname = name.fullname();
        let (schema_original, schema_canonical) = schema_texts(complex, enclosing_namespace)?;

        let size = complex
            .get("size")
            .and_then(|v| v.as_u64())
            .ok_or(Details::GetFixedSizeField)? as usize;

        let codec = Arc::new(Inner {
            type_name: name,
            schema_original,
            schema_canonical,
            kind: Kind::Fixed(size),
        });
        if let Some(existing) = self.register(&fullname, &codec)? {
            return Ok(named_reference(&existing, fullname));
        }
        Ok(codec)
    }

    fn build_array(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let items = complex.get("items").ok_or(Details::GetArrayItemsField)?;
        let (schema_original, schema_canonical) = schema_texts(complex, enclosing_namespace)?;
        let items_codec = self.build(items, enclosing_namespace)?;
        Ok(Arc::new(Inner {
            type_name: Name::unchecked("array"),
            schema_original,
            schema_canonical,
            kind: Kind::Array(items_codec),
        }))
    }

    fn build_map(
        &mut self,
        complex: &Map<String, JsonValue>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let values = complex.get("values").ok_or(Details::GetMapValuesField)?;
        let (schema_original, schema_canonical) = schema_texts(complex, enclosing_namespace)?;
        let values_codec = self.build(values, enclosing_namespace)?;
        Ok(Arc::new(Inner {
            type_name: Name::unchecked("map"),
            schema_original,
            schema_canonical,
            kind: Kind::Map(values_codec),
        }))
    }

    /// A JSON array of branch schemas.
    fn build_union(
        &mut self,
        node: &JsonValue,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Arc<Inner>> {
        let branches_json = match node.as_array() {
            Some(branches) => branches,
            None => return Err(Details::ParseSchemaFromValidJson.into()),
        };
        if branches_json.is_empty() {
            return Err(Details::EmptyUnion.into());
        }

        let mut seen = HashSet::with_capacity(branches_json.len());
        let mut branches = Vec::with_capacity(branches_json.len());
        for branch_json in branches_json {
            if matches!(branch_json, JsonValue::Array(_)) {
                return Err(Details::GetNestedUnion.into());
            }
            let branch = self.build(branch_json, enclosing_namespace)?;
            let key = branch.type_name.fullname();
            if !seen.insert(key.clone()) {
                return Err(Details::GetUnionDuplicate(key).into());
            }
            branches.push(branch);
        }

        Ok(Arc::new(Inner {
            type_name: Name::unchecked("union"),
            schema_original: serde_json::to_string(node).map_err(Details::SerializeJson)?,
            schema_canonical: schema::pcf(node, enclosing_namespace)?,
            kind: Kind::Union(UnionKind { branches }),
        }))
    }

    /// Bind `fullname` to a freshly compiled named codec. Re-registering an
    /// identical definition yields the codec already in the table; a
    /// different definition under the same name is a collision.
    fn register(&mut self, fullname: &str, codec: &Arc<Inner>) -> AvroResult<Option<Arc<Inner>>> {
        let mut codecs = self.registry.write();
        if let Some(existing) = codecs.get(fullname) {
            return if existing.schema_canonical == codec.schema_canonical {
                Ok(Some(Arc::clone(existing)))
            } else {
                Err(Details::NameCollision(fullname.to_string()).into())
            };
        }
        codecs.insert(fullname.to_string(), Arc::clone(codec));
        self.registered.push(fullname.to_string());
        Ok(None)
    }
}

/// The compact schema text and canonical form attached to a compiled node.
fn schema_texts(
    complex: &Map<String, JsonValue>,
    enclosing_namespace: NamespaceRef,
) -> AvroResult<(String, String)> {
    let original = serde_json::to_string(complex).map_err(Details::SerializeJson)?;
    let canonical = schema::pcf_map(complex, enclosing_namespace)?;
    Ok((original, canonical))
}

/// A by-name stand-in for a registered named codec. References resolve
/// through the symbol table when a conversion runs, which keeps recursive
/// type graphs free of reference cycles.
fn named_reference(existing: &Arc<Inner>, fullname: String) -> Arc<Inner> {
    Arc::new(Inner {
        type_name: existing.type_name.clone(),
        schema_original: existing.schema_original.clone(),
        schema_canonical: existing.schema_canonical.clone(),
        kind: Kind::Ref(fullname),
    })
}
