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

//! The built-in logical types: semantic reinterpretations of the `int` and
//! `long` wire encodings. Each one converts between a semantic [`Value`]
//! variant and the raw primitive value, and delegates the actual wire work
//! to its base codec.

use crate::AvroResult;
use crate::error::Details;
use crate::value::{Value, ValueKind};
use strum_macros::{Display, EnumIter};

/// The logical types registered out of the box, keyed in the symbol table
/// as `<base>.<logical>` (e.g. `long.timestamp-millis`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "kebab_case")]
pub(crate) enum LogicalType {
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
}

impl LogicalType {
    /// The primitive type carrying this logical type on the wire.
    pub(crate) fn base_type(self) -> &'static str {
        match self {
            LogicalType::Date | LogicalType::TimeMillis => "int",
            LogicalType::TimeMicros
            | LogicalType::TimestampMillis
            | LogicalType::TimestampMicros => "long",
        }
    }

    /// Convert a semantic native value into the raw primitive value the
    /// base codec encodes. `Int`/`Long` inputs are accepted where they fit;
    /// an `int`-backed logical type rejects a `long` outside the `i32`
    /// range.
    pub(crate) fn raw_from_semantic(self, value: &Value) -> AvroResult<Value> {
        match self {
            LogicalType::Date => match *value {
                Value::Date(d) | Value::Int(d) => Ok(Value::Int(d)),
                Value::Long(l) => narrow(l, "date"),
                ref other => Err(Details::GetDate(other.into()).into()),
            },
            LogicalType::TimeMillis => match *value {
                Value::TimeMillis(t) | Value::Int(t) => Ok(Value::Int(t)),
                Value::Long(l) => narrow(l, "time-millis"),
                ref other => Err(Details::GetTimeMillis(other.into()).into()),
            },
            LogicalType::TimeMicros => match *value {
                Value::TimeMicros(t) | Value::Long(t) => Ok(Value::Long(t)),
                Value::Int(i) => Ok(Value::Long(i as i64)),
                ref other => Err(Details::GetTimeMicros(other.into()).into()),
            },
            LogicalType::TimestampMillis => match *value {
                Value::TimestampMillis(t) | Value::Long(t) => Ok(Value::Long(t)),
                Value::Int(i) => Ok(Value::Long(i as i64)),
                ref other => Err(Details::GetTimestampMillis(other.into()).into()),
            },
            LogicalType::TimestampMicros => match *value {
                Value::TimestampMicros(t) | Value::Long(t) => Ok(Value::Long(t)),
                Value::Int(i) => Ok(Value::Long(i as i64)),
                ref other => Err(Details::GetTimestampMicros(other.into()).into()),
            },
        }
    }

    /// Reinterpret the raw primitive value produced by the base codec as
    /// the semantic native value.
    pub(crate) fn semantic_from_raw(self, raw: Value) -> AvroResult<Value> {
        let kind = ValueKind::from(&raw);
        match (self, raw) {
            (LogicalType::Date, Value::Int(d)) => Ok(Value::Date(d)),
            (LogicalType::TimeMillis, Value::Int(t)) => Ok(Value::TimeMillis(t)),
            (LogicalType::TimeMicros, Value::Long(t)) => Ok(Value::TimeMicros(t)),
            (LogicalType::TimestampMillis, Value::Long(t)) => Ok(Value::TimestampMillis(t)),
            (LogicalType::TimestampMicros, Value::Long(t)) => Ok(Value::TimestampMicros(t)),
            (LogicalType::Date, _) => Err(Details::GetDate(kind).into()),
            (LogicalType::TimeMillis, _) => Err(Details::GetTimeMillis(kind).into()),
            (LogicalType::TimeMicros, _) => Err(Details::GetTimeMicros(kind).into()),
            (LogicalType::TimestampMillis, _) => Err(Details::GetTimestampMillis(kind).into()),
            (LogicalType::TimestampMicros, _) => Err(Details::GetTimestampMicros(kind).into()),
        }
    }
}

fn narrow(value: i64, target: &'static str) -> AvroResult<Value> {
    i32::try_from(value)
        .map(Value::Int)
        .map_err(|_| Details::OutOfRangeValue { target, value }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kebab_case_names() {
        assert_eq!(LogicalType::Date.to_string(), "date");
        assert_eq!(LogicalType::TimestampMillis.to_string(), "timestamp-millis");
        assert_eq!(LogicalType::TimeMicros.to_string(), "time-micros");
    }

    #[test]
    fn test_semantic_round_trip() {
        let raw = LogicalType::Date.raw_from_semantic(&Value::Date(1)).unwrap();
        assert_eq!(raw, Value::Int(1));
        assert_eq!(
            LogicalType::Date.semantic_from_raw(raw).unwrap(),
            Value::Date(1)
        );
    }

    #[test]
    fn test_narrowing_out_of_range() {
        let err = LogicalType::TimeMillis
            .raw_from_semantic(&Value::Long(i64::MAX))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_wrong_value_kind() {
        let err = LogicalType::TimestampMicros
            .raw_from_semantic(&Value::String("now".to_owned()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
    }
}
