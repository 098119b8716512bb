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

use crate::value::ValueKind;

/// Errors returned while compiling schemas or converting values.
///
/// Use [`details`](Self::details) or [`into_details`](Self::into_details) to
/// inspect the precise failure, or [`kind`](Self::kind) to branch on the
/// broad class of error.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

/// The broad class an error belongs to.
///
/// * `Parse`: the schema text is not valid JSON.
/// * `Name`: a name or namespace token violates the Avro name grammar.
/// * `Schema`: the schema is structurally invalid (missing attributes,
///   duplicate names, ambiguous unions, unresolved references, collisions).
/// * `Range`: a semantic value does not fit its underlying primitive.
/// * `Data`: a value handed to (or decoded by) a conversion function
///   violates the codec's contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Name,
    Schema,
    Range,
    Data,
}

#[derive(thiserror::Error, Debug)]
pub enum Details {
    #[error("Failed to parse schema from JSON: {0}")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Failed to parse textual data as JSON: {0}")]
    ParseTextualJson(#[source] serde_json::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializeJson(#[source] serde_json::Error),

    #[error("Invalid schema name: {0}. It must match the regex {1}")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace: {0}. It must match the regex {1}")]
    InvalidNamespace(String, &'static str),

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Must be a JSON string, object or array")]
    ParseSchemaFromValidJson,

    #[error("No `name` field")]
    GetNameField,

    #[error("No `type` field found in schema")]
    GetTypeField,

    #[error("The `fields` of a record must be a JSON array")]
    GetRecordFieldsJson,

    #[error("A record field must be a JSON object, got: {0}")]
    GetRecordFieldJson(serde_json::Value),

    #[error("Two fields named {0} in the same record")]
    FieldNameDuplicate(String),

    #[error("No `symbols` field in enum")]
    GetEnumSymbolsField,

    #[error("The `symbols` of an enum must be a non-empty array of strings")]
    GetEnumSymbols,

    #[error("Enum symbol {0} appears more than once")]
    EnumSymbolDuplicate(String),

    #[error("No valid `size` field in fixed schema")]
    GetFixedSizeField,

    #[error("No `items` in array")]
    GetArrayItemsField,

    #[error("No `values` in map")]
    GetMapValuesField,

    #[error("Unions cannot be empty")]
    EmptyUnion,

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Union contains duplicate type {0}")]
    GetUnionDuplicate(String),

    #[error("Unresolved type reference: {0}")]
    UnresolvedTypeReference(String),

    #[error("A schema named {0} is already registered with a different definition")]
    NameCollision(String),

    #[error("Value {value} is out of range for the {target} encoding")]
    OutOfRangeValue { target: &'static str, value: i64 },

    #[error("Invalid u8 for bool: {0}")]
    BoolValue(u8),

    #[error("Int value out of range: {1}")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Integer overflow when decoding a variable-length integer")]
    IntegerOverflow,

    #[error("Unexpected end of binary data: needed {needed} more bytes, found {found}")]
    UnexpectedEndOfData { needed: usize, found: usize },

    #[error("Negative length prefix: {0}")]
    NegativeLength(i64),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Invalid utf-8 string")]
    ConvertToUtf8Error(#[source] std::str::Utf8Error),

    #[error("Character {0:?} is outside the latin-1 range and cannot be decoded into a byte")]
    ByteFromChar(char),

    #[error("Fixed codec expects exactly {size} bytes, got {got}")]
    FixedSizeMismatch { size: usize, got: usize },

    #[error("Enum symbol not found: {0}")]
    GetEnumSymbol(String),

    #[error("Enum index {index} out of bounds: {nsymbols}")]
    GetEnumValue { index: usize, nsymbols: usize },

    #[error("Unable to decode enum index")]
    GetEnumUnknownIndexValue,

    #[error("Union index {index} out of bounds: {num_variants}")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error("No union branch named {0}")]
    GetUnionVariantName(String),

    #[error("Missing field in record: {0}")]
    GetField(String),

    #[error("Field {0} does not exist in the record schema")]
    UnexpectedField(String),

    #[error("Value of kind {value:?} is not compatible with the {codec} codec")]
    EncodeValueMismatch { codec: String, value: ValueKind },

    #[error("JSON value {0} does not match the {1} codec")]
    TextualValueMismatch(serde_json::Value, String),

    #[error("Expected Value::Date or Value::Int, got: {0:?}")]
    GetDate(ValueKind),

    #[error("Expected Value::TimeMillis or Value::Int, got: {0:?}")]
    GetTimeMillis(ValueKind),

    #[error("Expected Value::TimeMicros, Value::Long or Value::Int, got: {0:?}")]
    GetTimeMicros(ValueKind),

    #[error("Expected Value::TimestampMillis, Value::Long or Value::Int, got: {0:?}")]
    GetTimestampMillis(ValueKind),

    #[error("Expected Value::TimestampMicros, Value::Long or Value::Int, got: {0:?}")]
    GetTimestampMicros(ValueKind),
}

impl Details {
    pub fn kind(&self) -> ErrorKind {
        use Details::*;
        match self {
            ParseSchemaJson(_) => ErrorKind::Parse,
            InvalidSchemaName(..) | InvalidNamespace(..) | EnumSymbolName(_) | FieldName(_) => {
                ErrorKind::Name
            }
            ParseSchemaFromValidJson
            | GetNameField
            | GetTypeField
            | GetRecordFieldsJson
            | GetRecordFieldJson(_)
            | FieldNameDuplicate(_)
            | GetEnumSymbolsField
            | GetEnumSymbols
            | EnumSymbolDuplicate(_)
            | GetFixedSizeField
            | GetArrayItemsField
            | GetMapValuesField
            | EmptyUnion
            | GetNestedUnion
            | GetUnionDuplicate(_)
            | UnresolvedTypeReference(_)
            | NameCollision(_) => ErrorKind::Schema,
            OutOfRangeValue { .. } => ErrorKind::Range,
            _ => ErrorKind::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_size() {
        // The boxed details keep the public error a single pointer wide.
        assert_eq!(
            std::mem::size_of::<Error>(),
            std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(Details::GetNameField.kind(), ErrorKind::Schema);
        assert_eq!(
            Details::EnumSymbolName("bad-name".to_owned()).kind(),
            ErrorKind::Name
        );
        assert_eq!(
            Details::OutOfRangeValue {
                target: "int",
                value: i64::MAX,
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(Details::BoolValue(2).kind(), ErrorKind::Data);
    }
}
