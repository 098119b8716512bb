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

//! Decoding of native values from the Avro binary and JSON formats.

use crate::codec::{Inner, Kind, RegistryMap};
use crate::encode::null_branch;
use crate::error::Details;
use crate::util::{safe_len, take_bytes, zag_i32, zag_i64};
use crate::value::Value;
use crate::{AvroResult, Error};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Decode one value of `codec` from the front of `bytes`, returning the
/// value and the unconsumed remainder.
pub(crate) fn decode_binary<'a>(
    codec: &Inner,
    bytes: &'a [u8],
    names: &RegistryMap,
) -> AvroResult<(Value, &'a [u8])> {
    let codec = codec.resolve(names)?;
    match &codec.kind {
        Kind::Null => Ok((Value::Null, bytes)),
        Kind::Boolean => {
            let (taken, rest) = take_bytes(bytes, 1)?;
            match taken[0] {
                0u8 => Ok((Value::Boolean(false), rest)),
                1u8 => Ok((Value::Boolean(true), rest)),
                other => Err(Details::BoolValue(other).into()),
            }
        }
        Kind::Int => {
            let (n, rest) = zag_i32(bytes)?;
            Ok((Value::Int(n), rest))
        }
        Kind::Long => {
            let (n, rest) = zag_i64(bytes)?;
            Ok((Value::Long(n), rest))
        }
        Kind::Float => {
            let (taken, rest) = take_bytes(bytes, 4)?;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(taken);
            Ok((Value::Float(f32::from_le_bytes(buf)), rest))
        }
        Kind::Double => {
            let (taken, rest) = take_bytes(bytes, 8)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(taken);
            Ok((Value::Double(f64::from_le_bytes(buf)), rest))
        }
        Kind::Bytes => {
            let (taken, rest) = decode_length_prefixed(bytes)?;
            Ok((Value::Bytes(taken.to_vec()), rest))
        }
        Kind::String => {
            let (s, rest) = decode_str(bytes)?;
            Ok((Value::String(s), rest))
        }
        Kind::Fixed(size) => {
            let (taken, rest) = take_bytes(bytes, *size)?;
            Ok((Value::Fixed(*size, taken.to_vec()), rest))
        }
        Kind::Enum(e) => {
            let (index, rest) = zag_i64(bytes)?;
            if index < 0 {
                return Err(Details::GetEnumUnknownIndexValue.into());
            }
            let index = index as usize;
            match e.symbols.get(index) {
                Some(symbol) => Ok((Value::Enum(index as u32, symbol.clone()), rest)),
                None => Err(Details::GetEnumValue {
                    index,
                    nsymbols: e.symbols.len(),
                }
                .into()),
            }
        }
        Kind::Array(items) => {
            let mut values = Vec::new();
            let mut rest = bytes;
            loop {
                let (count, r) = decode_block_count(rest)?;
                rest = r;
                if count == 0 {
                    break;
                }
                for _ in 0..count {
                    let (item, r) = decode_binary(items, rest, names)?;
                    values.push(item);
                    rest = r;
                }
            }
            Ok((Value::Array(values), rest))
        }
        Kind::Map(values_codec) => {
            let mut entries = HashMap::new();
            let mut rest = bytes;
            loop {
                let (count, r) = decode_block_count(rest)?;
                rest = r;
                if count == 0 {
                    break;
                }
                for _ in 0..count {
                    let (key, r) = decode_str(rest)?;
                    let (item, r) = decode_binary(values_codec, r, names)?;
                    entries.insert(key, item);
                    rest = r;
                }
            }
            Ok((Value::Map(entries), rest))
        }
        Kind::Union(union) => {
            let (index, rest) = zag_i64(bytes)?;
            let branch = usize::try_from(index)
                .ok()
                .and_then(|i| union.branches.get(i))
                .ok_or(Details::GetUnionVariant {
                    index,
                    num_variants: union.branches.len(),
                })?;
            let (value, rest) = decode_binary(branch, rest, names)?;
            Ok((Value::Union(index as u32, Box::new(value)), rest))
        }
        Kind::Record(record) => {
            let fields = record.fields(&codec.type_name)?;
            let mut pairs = Vec::with_capacity(fields.len());
            let mut rest = bytes;
            for field in fields {
                let (value, r) = decode_binary(&field.codec, rest, names)?;
                pairs.push((field.name.clone(), value));
                rest = r;
            }
            Ok((Value::Record(pairs), rest))
        }
        Kind::Logical(logical) => {
            let (raw, rest) = decode_binary(&logical.base, bytes, names)?;
            Ok((logical.logical.semantic_from_raw(raw)?, rest))
        }
        Kind::Ref(_) => unreachable!("references are resolved before dispatch"),
    }
}

/// Decode a value of `codec` from its Avro JSON encoding.
pub(crate) fn native_from_json(
    codec: &Inner,
    json: &JsonValue,
    names: &RegistryMap,
) -> AvroResult<Value> {
    let codec = codec.resolve(names)?;
    match &codec.kind {
        Kind::Null => match json {
            JsonValue::Null => Ok(Value::Null),
            _ => Err(mismatch(codec, json)),
        },
        Kind::Boolean => match json.as_bool() {
            Some(b) => Ok(Value::Boolean(b)),
            None => Err(mismatch(codec, json)),
        },
        Kind::Int => json
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int)
            .ok_or_else(|| mismatch(codec, json)),
        Kind::Long => json.as_i64().map(Value::Long).ok_or_else(|| mismatch(codec, json)),
        Kind::Float => float_from_json(codec, json).map(|x| Value::Float(x as f32)),
        Kind::Double => float_from_json(codec, json).map(Value::Double),
        Kind::Bytes => match json.as_str() {
            Some(s) => Ok(Value::Bytes(bytes_from_latin1(s)?)),
            None => Err(mismatch(codec, json)),
        },
        Kind::String => match json.as_str() {
            Some(s) => Ok(Value::String(s.to_owned())),
            None => Err(mismatch(codec, json)),
        },
        Kind::Fixed(size) => match json.as_str() {
            Some(s) => {
                let bytes = bytes_from_latin1(s)?;
                if bytes.len() != *size {
                    return Err(Details::FixedSizeMismatch {
                        size: *size,
                        got: bytes.len(),
                    }
                    .into());
                }
                Ok(Value::Fixed(*size, bytes))
            }
            None => Err(mismatch(codec, json)),
        },
        Kind::Enum(e) => match json.as_str() {
            Some(symbol) => match e.index_of(symbol) {
                Some(index) => Ok(Value::Enum(index as u32, symbol.to_owned())),
                None => Err(Details::GetEnumSymbol(symbol.to_owned()).into()),
            },
            None => Err(mismatch(codec, json)),
        },
        Kind::Array(items) => match json.as_array() {
            Some(values) => {
                let mut array = Vec::with_capacity(values.len());
                for item in values {
                    array.push(native_from_json(items, item, names)?);
                }
                Ok(Value::Array(array))
            }
            None => Err(mismatch(codec, json)),
        },
        Kind::Map(values_codec) => match json.as_object() {
            Some(object) => {
                let mut entries = HashMap::with_capacity(object.len());
                for (key, item) in object {
                    entries.insert(key.clone(), native_from_json(values_codec, item, names)?);
                }
                Ok(Value::Map(entries))
            }
            None => Err(mismatch(codec, json)),
        },
        Kind::Union(union) => match json {
            // The null branch is encoded without wrapping.
            JsonValue::Null => match null_branch(union, names)? {
                Some(index) => Ok(Value::Union(index as u32, Box::new(Value::Null))),
                None => Err(Details::GetUnionVariantName("null".to_owned()).into()),
            },
            JsonValue::Object(object) if object.len() == 1 => {
                let (key, item) = object
                    .iter()
                    .next()
                    .expect("a one-entry object has an entry");
                let (index, branch) = union
                    .branches
                    .iter()
                    .enumerate()
                    .find(|(_, branch)| branch.type_name.fullname() == *key)
                    .ok_or_else(|| Details::GetUnionVariantName(key.clone()))?;
                let value = native_from_json(branch, item, names)?;
                Ok(Value::Union(index as u32, Box::new(value)))
            }
            _ => Err(mismatch(codec, json)),
        },
        Kind::Record(record) => match json.as_object() {
            Some(object) => {
                let fields = record.fields(&codec.type_name)?;
                let mut pairs = Vec::with_capacity(fields.len());
                for field in fields {
                    let item = object
                        .get(&field.name)
                        .ok_or_else(|| Details::GetField(field.name.clone()))?;
                    pairs.push((
                        field.name.clone(),
                        native_from_json(&field.codec, item, names)?,
                    ));
                }
                if object.len() != fields.len() {
                    for key in object.keys() {
                        if !fields.iter().any(|field| field.name == *key) {
                            return Err(Details::UnexpectedField(key.clone()).into());
                        }
                    }
                }
                Ok(Value::Record(pairs))
            }
            None => Err(mismatch(codec, json)),
        },
        Kind::Logical(logical) => {
            let raw = native_from_json(&logical.base, json, names)?;
            logical.logical.semantic_from_raw(raw)
        }
        Kind::Ref(_) => unreachable!("references are resolved before dispatch"),
    }
}

/// A block count for array/map decoding. A negative count is followed by
/// the block's size in bytes, which a slice-based decoder can skip over.
fn decode_block_count(bytes: &[u8]) -> AvroResult<(i64, &[u8])> {
    let (count, rest) = zag_i64(bytes)?;
    if count >= 0 {
        safe_len(count as usize)?;
        return Ok((count, rest));
    }
    let (_block_size, rest) = zag_i64(rest)?;
    let count = count
        .checked_neg()
        .ok_or(Details::NegativeLength(count))?;
    safe_len(count as usize)?;
    Ok((count, rest))
}

fn decode_length_prefixed(bytes: &[u8]) -> AvroResult<(&[u8], &[u8])> {
    let (len, rest) = zag_i64(bytes)?;
    if len < 0 {
        return Err(Details::NegativeLength(len).into());
    }
    let len = safe_len(len as usize)?;
    take_bytes(rest, len)
}

fn decode_str(bytes: &[u8]) -> AvroResult<(String, &[u8])> {
    let (taken, rest) = decode_length_prefixed(bytes)?;
    let s = String::from_utf8(taken.to_vec()).map_err(Details::ConvertToUtf8)?;
    Ok((s, rest))
}

fn float_from_json(codec: &Inner, json: &JsonValue) -> AvroResult<f64> {
    match json {
        JsonValue::Number(n) => n.as_f64().ok_or_else(|| mismatch(codec, json)),
        // The spellings Avro tooling uses for non-finite values.
        JsonValue::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "INF" | "Infinity" => Ok(f64::INFINITY),
            "-INF" | "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(mismatch(codec, json)),
        },
        _ => Err(mismatch(codec, json)),
    }
}

fn bytes_from_latin1(s: &str) -> AvroResult<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Details::ByteFromChar(c).into()))
        .collect()
}

fn mismatch(codec: &Inner, json: &JsonValue) -> Error {
    Details::TextualValueMismatch(json.clone(), codec.type_name.fullname()).into()
}
