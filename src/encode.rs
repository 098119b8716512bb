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

//! Encoding of native values into the Avro binary and JSON formats.

use crate::codec::{Inner, Kind, RecordField, RegistryMap, UnionKind};
use crate::error::Details;
use crate::util::{zig_i32, zig_i64};
use crate::value::Value;
use crate::{AvroResult, Error};
use serde_json::{Map, Value as JsonValue};

/// Encode `value` with `codec` into the Avro binary format, appending to
/// `buffer`.
pub(crate) fn encode_binary(
    codec: &Inner,
    value: &Value,
    names: &RegistryMap,
    buffer: &mut Vec<u8>,
) -> AvroResult<()> {
    let codec = codec.resolve(names)?;
    match &codec.kind {
        Kind::Null => match value {
            Value::Null => Ok(()),
            _ => Err(mismatch(codec, value)),
        },
        Kind::Boolean => match value {
            Value::Boolean(b) => {
                buffer.push(u8::from(*b));
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Int => {
            zig_i32(int_from_value(codec, value)?, buffer);
            Ok(())
        }
        Kind::Long => {
            zig_i64(long_from_value(codec, value)?, buffer);
            Ok(())
        }
        Kind::Float => match *value {
            Value::Float(x) => {
                buffer.extend_from_slice(&x.to_le_bytes());
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Double => match *value {
            Value::Double(x) => {
                buffer.extend_from_slice(&x.to_le_bytes());
                Ok(())
            }
            Value::Float(x) => {
                buffer.extend_from_slice(&f64::from(x).to_le_bytes());
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Bytes => match value {
            Value::Bytes(bytes) => {
                encode_bytes(bytes, buffer);
                Ok(())
            }
            Value::String(s) => {
                encode_bytes(s.as_bytes(), buffer);
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::String => match value {
            Value::String(s) => {
                encode_bytes(s.as_bytes(), buffer);
                Ok(())
            }
            Value::Bytes(bytes) => {
                std::str::from_utf8(bytes).map_err(Details::ConvertToUtf8Error)?;
                encode_bytes(bytes, buffer);
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Fixed(size) => match value {
            Value::Fixed(_, bytes) | Value::Bytes(bytes) => {
                if bytes.len() != *size {
                    return Err(Details::FixedSizeMismatch {
                        size: *size,
                        got: bytes.len(),
                    }
                    .into());
                }
                buffer.extend_from_slice(bytes);
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Enum(e) => {
            let symbol = match value {
                Value::Enum(_, symbol) | Value::String(symbol) => symbol,
                _ => return Err(mismatch(codec, value)),
            };
            let index = e
                .index_of(symbol)
                .ok_or_else(|| Details::GetEnumSymbol(symbol.clone()))?;
            zig_i32(index as i32, buffer);
            Ok(())
        }
        Kind::Array(items) => match value {
            Value::Array(values) => {
                if !values.is_empty() {
                    zig_i64(values.len() as i64, buffer);
                    for item in values {
                        encode_binary(items, item, names, buffer)?;
                    }
                }
                zig_i64(0, buffer);
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Map(values_codec) => match value {
            Value::Map(entries) => {
                if !entries.is_empty() {
                    zig_i64(entries.len() as i64, buffer);
                    for (key, item) in entries {
                        encode_bytes(key.as_bytes(), buffer);
                        encode_binary(values_codec, item, names, buffer)?;
                    }
                }
                zig_i64(0, buffer);
                Ok(())
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Union(union) => match value {
            Value::Union(index, branch_value) => {
                let branch = union.branches.get(*index as usize).ok_or(
                    Details::GetUnionVariant {
                        index: i64::from(*index),
                        num_variants: union.branches.len(),
                    },
                )?;
                zig_i64(i64::from(*index), buffer);
                encode_binary(branch, branch_value, names, buffer)
            }
            // A bare null picks the union's null branch, if there is one.
            Value::Null => match null_branch(union, names)? {
                Some(index) => {
                    zig_i64(index as i64, buffer);
                    Ok(())
                }
                None => Err(mismatch(codec, value)),
            },
            _ => Err(mismatch(codec, value)),
        },
        Kind::Record(record) => {
            let fields = record.fields(&codec.type_name)?;
            for field in fields {
                let field_value = record_field_value(codec, field, value)?;
                encode_binary(&field.codec, field_value, names, buffer)?;
            }
            Ok(())
        }
        Kind::Logical(logical) => {
            let raw = logical.logical.raw_from_semantic(value)?;
            encode_binary(&logical.base, &raw, names, buffer)
        }
        Kind::Ref(_) => unreachable!("references are resolved before dispatch"),
    }
}

/// Encode `value` with `codec` into the Avro JSON encoding.
pub(crate) fn json_from_native(
    codec: &Inner,
    value: &Value,
    names: &RegistryMap,
) -> AvroResult<JsonValue> {
    let codec = codec.resolve(names)?;
    match &codec.kind {
        Kind::Null => match value {
            Value::Null => Ok(JsonValue::Null),
            _ => Err(mismatch(codec, value)),
        },
        Kind::Boolean => match value {
            Value::Boolean(b) => Ok(JsonValue::Bool(*b)),
            _ => Err(mismatch(codec, value)),
        },
        Kind::Int => Ok(JsonValue::from(int_from_value(codec, value)?)),
        Kind::Long => Ok(JsonValue::from(long_from_value(codec, value)?)),
        Kind::Float => match *value {
            Value::Float(x) => Ok(json_from_float(f64::from(x))),
            _ => Err(mismatch(codec, value)),
        },
        Kind::Double => match *value {
            Value::Double(x) => Ok(json_from_float(x)),
            Value::Float(x) => Ok(json_from_float(f64::from(x))),
            _ => Err(mismatch(codec, value)),
        },
        Kind::Bytes => match value {
            Value::Bytes(bytes) => Ok(JsonValue::String(latin1_from_bytes(bytes))),
            Value::String(s) => Ok(JsonValue::String(latin1_from_bytes(s.as_bytes()))),
            _ => Err(mismatch(codec, value)),
        },
        Kind::String => match value {
            Value::String(s) => Ok(JsonValue::String(s.clone())),
            Value::Bytes(bytes) => {
                let s = std::str::from_utf8(bytes).map_err(Details::ConvertToUtf8Error)?;
                Ok(JsonValue::String(s.to_owned()))
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Fixed(size) => match value {
            Value::Fixed(_, bytes) | Value::Bytes(bytes) => {
                if bytes.len() != *size {
                    return Err(Details::FixedSizeMismatch {
                        size: *size,
                        got: bytes.len(),
                    }
                    .into());
                }
                Ok(JsonValue::String(latin1_from_bytes(bytes)))
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Enum(e) => {
            let symbol = match value {
                Value::Enum(_, symbol) | Value::String(symbol) => symbol,
                _ => return Err(mismatch(codec, value)),
            };
            if e.index_of(symbol).is_none() {
                return Err(Details::GetEnumSymbol(symbol.clone()).into());
            }
            Ok(JsonValue::String(symbol.clone()))
        }
        Kind::Array(items) => match value {
            Value::Array(values) => {
                let mut array = Vec::with_capacity(values.len());
                for item in values {
                    array.push(json_from_native(items, item, names)?);
                }
                Ok(JsonValue::Array(array))
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Map(values_codec) => match value {
            Value::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (key, item) in entries {
                    object.insert(key.clone(), json_from_native(values_codec, item, names)?);
                }
                Ok(JsonValue::Object(object))
            }
            _ => Err(mismatch(codec, value)),
        },
        Kind::Union(union) => match value {
            Value::Union(index, branch_value) => {
                let branch = union.branches.get(*index as usize).ok_or(
                    Details::GetUnionVariant {
                        index: i64::from(*index),
                        num_variants: union.branches.len(),
                    },
                )?;
                // The null branch stays unwrapped; everything else becomes a
                // single-key object keyed by the branch's type name.
                if matches!(branch.resolve(names)?.kind, Kind::Null) {
                    return json_from_native(branch, branch_value, names);
                }
                let mut object = Map::with_capacity(1);
                object.insert(
                    branch.type_name.fullname(),
                    json_from_native(branch, branch_value, names)?,
                );
                Ok(JsonValue::Object(object))
            }
            Value::Null => match null_branch(union, names)? {
                Some(_) => Ok(JsonValue::Null),
                None => Err(mismatch(codec, value)),
            },
            _ => Err(mismatch(codec, value)),
        },
        Kind::Record(record) => {
            let fields = record.fields(&codec.type_name)?;
            let mut object = Map::with_capacity(fields.len());
            for field in fields {
                let field_value = record_field_value(codec, field, value)?;
                object.insert(
                    field.name.clone(),
                    json_from_native(&field.codec, field_value, names)?,
                );
            }
            Ok(JsonValue::Object(object))
        }
        Kind::Logical(logical) => {
            let raw = logical.logical.raw_from_semantic(value)?;
            json_from_native(&logical.base, &raw, names)
        }
        Kind::Ref(_) => unreachable!("references are resolved before dispatch"),
    }
}

pub(crate) fn encode_bytes(bytes: &[u8], buffer: &mut Vec<u8>) {
    zig_i64(bytes.len() as i64, buffer);
    buffer.extend_from_slice(bytes);
}

/// Map every byte onto the unicode code point of the same value, the
/// escaped-latin-1 convention Avro tooling uses for `bytes` and `fixed`
/// in the JSON encoding.
pub(crate) fn latin1_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn int_from_value(codec: &Inner, value: &Value) -> AvroResult<i32> {
    match *value {
        Value::Int(i) => Ok(i),
        Value::Long(l) => i32::try_from(l).map_err(|_| {
            Details::OutOfRangeValue {
                target: "int",
                value: l,
            }
            .into()
        }),
        _ => Err(mismatch(codec, value)),
    }
}

fn long_from_value(codec: &Inner, value: &Value) -> AvroResult<i64> {
    match *value {
        Value::Long(l) => Ok(l),
        Value::Int(i) => Ok(i64::from(i)),
        _ => Err(mismatch(codec, value)),
    }
}

fn json_from_float(x: f64) -> JsonValue {
    if x.is_nan() {
        JsonValue::String("NaN".to_owned())
    } else if x.is_infinite() {
        JsonValue::String(if x > 0.0 { "INF" } else { "-INF" }.to_owned())
    } else {
        match serde_json::Number::from_f64(x) {
            Some(n) => JsonValue::Number(n),
            // non-finite values were handled above
            None => JsonValue::String("NaN".to_owned()),
        }
    }
}

/// Index of the union's null branch, if any.
pub(crate) fn null_branch(union: &UnionKind, names: &RegistryMap) -> AvroResult<Option<usize>> {
    for (index, branch) in union.branches.iter().enumerate() {
        if matches!(branch.resolve(names)?.kind, Kind::Null) {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Look a record field up in the native value; both the ordered pair list
/// and a plain map are accepted.
fn record_field_value<'v>(
    codec: &Inner,
    field: &RecordField,
    value: &'v Value,
) -> AvroResult<&'v Value> {
    match value {
        Value::Record(pairs) => pairs
            .iter()
            .find(|(name, _)| *name == field.name)
            .map(|(_, v)| v)
            .ok_or_else(|| Details::GetField(field.name.clone()).into()),
        Value::Map(entries) => entries
            .get(&field.name)
            .ok_or_else(|| Details::GetField(field.name.clone()).into()),
        _ => Err(mismatch(codec, value)),
    }
}

fn mismatch(codec: &Inner, value: &Value) -> Error {
    Details::EncodeValueMismatch {
        codec: codec.type_name.fullname(),
        value: value.into(),
    }
    .into()
}
