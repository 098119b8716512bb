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

use std::collections::HashMap;
use strum_macros::EnumDiscriminants;

/// A native in-memory representation of any value a compiled
/// [`Codec`](crate::Codec) can convert.
///
/// The semantic variants (`Date`, `TimeMillis`, `TimeMicros`,
/// `TimestampMillis`, `TimestampMicros`) share the wire encoding of their
/// underlying `int`/`long` primitive; only the native domain differs.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(Hash, Ord, PartialOrd))]
pub enum Value {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// An `int` Avro value.
    Int(i32),
    /// A `long` Avro value.
    Long(i64),
    /// A `float` Avro value.
    Float(f32),
    /// A `double` Avro value.
    Double(f64),
    /// A `bytes` Avro value.
    Bytes(Vec<u8>),
    /// A `string` Avro value.
    String(String),
    /// A `fixed` Avro value: the declared size and exactly that many bytes.
    Fixed(usize, Vec<u8>),
    /// An `enum` Avro value: the zero-based symbol index and the symbol.
    Enum(u32, String),
    /// A `union` Avro value: the zero-based branch index and the branch value.
    Union(u32, Box<Value>),
    /// An `array` Avro value.
    Array(Vec<Value>),
    /// A `map` Avro value.
    Map(HashMap<String, Value>),
    /// A `record` Avro value: field name/value pairs in schema order.
    Record(Vec<(String, Value)>),
    /// Number of days since the unix epoch, encoded as an Avro `int`.
    Date(i32),
    /// Time of day in milliseconds after midnight, encoded as an Avro `int`.
    TimeMillis(i32),
    /// Time of day in microseconds after midnight, encoded as an Avro `long`.
    TimeMicros(i64),
    /// An instant in milliseconds since the unix epoch, encoded as an Avro `long`.
    TimestampMillis(i64),
    /// An instant in microseconds since the unix epoch, encoded as an Avro `long`.
    TimestampMicros(i64),
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(ValueKind::from(&Value::Null), ValueKind::Null);
        assert_eq!(ValueKind::from(&Value::Long(3)), ValueKind::Long);
        assert_eq!(
            ValueKind::from(&Value::Enum(0, "A".to_owned())),
            ValueKind::Enum
        );
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(Value::from(true), Value::Boolean(true));
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from("hi"), Value::String("hi".to_owned()));
    }
}
