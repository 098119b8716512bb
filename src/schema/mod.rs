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

//! Schema names and the Parsing Canonical Form.

mod name;

pub use name::{Name, Namespace, NamespaceRef};

use crate::AvroResult;
use crate::error::Details;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// The eight Avro primitive type names.
pub(crate) const PRIMITIVE_TYPES: &[&str] = &[
    "null", "boolean", "int", "long", "float", "double", "bytes", "string",
];

pub(crate) fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

fn is_named_type(typ: Option<&str>) -> bool {
    matches!(typ, Some("record") | Some("enum") | Some("fixed"))
}

fn is_schema_keyword(typ: &str) -> bool {
    matches!(typ, "record" | "enum" | "fixed" | "array" | "map")
}

/// Represents an Avro schema fingerprint.
///
/// More information about Avro schema fingerprints can be found in the
/// [Avro Schema Fingerprint documentation](https://avro.apache.org/docs/++version++/specification/#schema-fingerprints)
pub struct SchemaFingerprint {
    pub bytes: Vec<u8>,
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in &self.bytes {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Transforms a valid Avro schema tree into [the Parsing Canonical Form].
///
/// Only the normative attributes (`name`, `type`, `fields`, `symbols`,
/// `items`, `values`, `size`) survive, every name and type reference is
/// fully qualified against its enclosing namespace, and attributes are
/// emitted in a fixed order. Two schemas are equal iff their canonical
/// forms are byte-identical.
///
/// [the Parsing Canonical Form]: https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
pub fn parsing_canonical_form(schema: &JsonValue) -> AvroResult<String> {
    pcf(schema, None)
}

pub(crate) fn pcf(schema: &JsonValue, enclosing_namespace: NamespaceRef) -> AvroResult<String> {
    match schema {
        JsonValue::Object(map) => pcf_map(map, enclosing_namespace),
        JsonValue::String(s) => Ok(pcf_reference(s, enclosing_namespace)),
        JsonValue::Array(v) => pcf_array(v, enclosing_namespace),
        _ => Err(Details::ParseSchemaFromValidJson.into()),
    }
}

pub(crate) fn pcf_map(
    schema: &Map<String, JsonValue>,
    enclosing_namespace: NamespaceRef,
) -> AvroResult<String> {
    let typ = schema.get("type").and_then(|v| v.as_str());

    // Fully qualify the name of a named type and propagate its namespace to
    // nested definitions ([FULLNAMES] rule).
    let (fullname, child_namespace) = if is_named_type(typ) {
        let name = Name::parse(schema, enclosing_namespace)?;
        let namespace = name.namespace().map(str::to_string);
        (Some(name.fullname()), namespace)
    } else {
        (None, enclosing_namespace.map(str::to_string))
    };
    let child_namespace = child_namespace.as_deref();

    let mut fields = Vec::new();
    for (k, v) in schema {
        // Strip out non-normative attributes ([STRIP] rule).
        if field_ordering_position(k).is_none() {
            continue;
        }

        let value = match k.as_str() {
            "name" => match (&fullname, v.as_str()) {
                (Some(n), _) => pcf_string(n),
                // a record field's name is a plain identifier, not a type name
                (None, Some(s)) => pcf_string(s),
                (None, None) => return Err(Details::GetNameField.into()),
            },
            "type" => match v {
                JsonValue::String(s) if is_schema_keyword(s) => pcf_string(s),
                _ => pcf(v, child_namespace)?,
            },
            // enum symbols are literals, never type references
            "symbols" => {
                let symbols = v.as_array().ok_or(Details::GetEnumSymbols)?;
                let mut quoted = Vec::with_capacity(symbols.len());
                for symbol in symbols {
                    quoted.push(pcf_string(symbol.as_str().ok_or(Details::GetEnumSymbols)?));
                }
                format!("[{}]", quoted.join(","))
            }
            // Strip quotes surrounding the `size` value, if present ([INTEGERS] rule).
            "size" => {
                let size = match v.as_str() {
                    Some(s) => s.parse::<i64>().map_err(|_| Details::GetFixedSizeField)?,
                    None => v.as_i64().ok_or(Details::GetFixedSizeField)?,
                };
                size.to_string()
            }
            // `fields`, `items`, `values`: recurse with the inherited namespace.
            _ => pcf(v, child_namespace)?,
        };
        fields.push((k.as_str(), format!("{}:{value}", pcf_string(k))));
    }

    // Reduce a lone `{"type":"int"}` to its simple form ([PRIMITIVES] rule).
    if fields.len() == 1 && fields[0].0 == "type" {
        if let Some(JsonValue::String(s)) = schema.get("type") {
            return Ok(pcf_reference(s, enclosing_namespace));
        }
    }

    // Sort the attributes into their canonical ordering ([ORDER] rule).
    fields.sort_unstable_by_key(|(k, _)| field_ordering_position(k));
    let inter = fields
        .into_iter()
        .map(|(_, v)| v)
        .collect::<Vec<_>>()
        .join(",");
    Ok(format!("{{{inter}}}"))
}

fn pcf_array(arr: &[JsonValue], enclosing_namespace: NamespaceRef) -> AvroResult<String> {
    let mut inter = Vec::with_capacity(arr.len());
    for a in arr {
        inter.push(pcf(a, enclosing_namespace)?);
    }
    Ok(format!("[{}]", inter.join(",")))
}

/// A string schema node: a primitive name stays as-is, anything else is a
/// type reference qualified against the enclosing namespace.
fn pcf_reference(s: &str, enclosing_namespace: NamespaceRef) -> String {
    if is_primitive(s) || s.contains('.') {
        return pcf_string(s);
    }
    match enclosing_namespace {
        Some(ns) if !ns.is_empty() => pcf_string(&format!("{ns}.{s}")),
        _ => pcf_string(s),
    }
}

fn pcf_string(s: &str) -> String {
    format!(r#""{s}""#)
}

const CANONICAL_FIELDS: &[&str] = &["name", "type", "fields", "symbols", "items", "values", "size"];

// Defines the ordering and inclusion of attributes in the canonical form.
fn field_ordering_position(field: &str) -> Option<usize> {
    CANONICAL_FIELDS
        .iter()
        .position(|&f| f == field)
        .map(|pos| pos + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    type TestResult = anyhow::Result<()>;

    fn canonical(schema: &str) -> AvroResult<String> {
        let tree: JsonValue = serde_json::from_str(schema).unwrap();
        parsing_canonical_form(&tree)
    }

    #[test]
    fn test_primitive_reduction() -> TestResult {
        assert_eq!(canonical(r#""long""#)?, r#""long""#);
        assert_eq!(canonical(r#"{"type":"long"}"#)?, r#""long""#);
        assert_eq!(
            canonical(r#"{"type":"int","logicalType":"date"}"#)?,
            r#""int""#
        );
        Ok(())
    }

    #[test]
    fn test_record_attribute_order_and_stripping() -> TestResult {
        let verbose = r#"
            {
                "doc": "An example",
                "fields": [
                    {"name": "x", "type": "long", "default": 42, "doc": "a field"}
                ],
                "aliases": ["ns.Old"],
                "name": "ns.R",
                "type": "record"
            }
        "#;
        assert_eq!(
            canonical(verbose)?,
            r#"{"name":"ns.R","type":"record","fields":[{"name":"x","type":"long"}]}"#
        );
        Ok(())
    }

    #[test]
    fn test_namespace_inheritance() -> TestResult {
        let schema = r#"
            {
                "type": "record",
                "name": "Outer",
                "namespace": "ns",
                "fields": [
                    {"name": "self_ref", "type": "Outer"},
                    {"name": "nested", "type": {"type": "record", "name": "Inner", "fields": [
                        {"name": "y", "type": "int"}
                    ]}}
                ]
            }
        "#;
        assert_eq!(
            canonical(schema)?,
            concat!(
                r#"{"name":"ns.Outer","type":"record","fields":["#,
                r#"{"name":"self_ref","type":"ns.Outer"},"#,
                r#"{"name":"nested","type":{"name":"ns.Inner","type":"record","fields":[{"name":"y","type":"int"}]}}]}"#
            )
        );
        Ok(())
    }

    #[test]
    fn test_enum_symbols_are_not_qualified() -> TestResult {
        let schema = r#"{"type":"enum","name":"ns.E","symbols":["A","B"]}"#;
        assert_eq!(
            canonical(schema)?,
            r#"{"name":"ns.E","type":"enum","symbols":["A","B"]}"#
        );
        Ok(())
    }

    #[test]
    fn test_fixed_size_loses_quotes() -> TestResult {
        let schema = r#"{"type":"fixed","name":"ns.F","size":"16"}"#;
        assert_eq!(
            canonical(schema)?,
            r#"{"name":"ns.F","type":"fixed","size":16}"#
        );
        Ok(())
    }

    #[test]
    fn test_union_form() -> TestResult {
        assert_eq!(canonical(r#"["null","string"]"#)?, r#"["null","string"]"#);
        Ok(())
    }

    #[test]
    fn test_invalid_node_is_rejected() {
        assert!(parsing_canonical_form(&json!(42)).is_err());
    }

    #[test]
    fn test_fingerprint_display() {
        let fingerprint = SchemaFingerprint {
            bytes: vec![0xde, 0xad, 0x00, 0xef],
        };
        assert_eq!(fingerprint.to_string(), "dead00ef");
    }
}
