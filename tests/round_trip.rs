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

use avrokit::{Codec, ErrorKind, SymbolTable, Value};
use hex_literal::hex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;

type TestResult = anyhow::Result<()>;

/// Encode/decode through both wire formats and expect the original back.
fn assert_round_trip(codec: &Codec, value: &Value) -> TestResult {
    let encoded = codec.binary_from_native(value)?;
    let (decoded, rest) = codec.native_from_binary(&encoded)?;
    assert!(rest.is_empty());
    assert_eq!(&decoded, value, "binary round trip");

    let text = codec.textual_from_native(value)?;
    let decoded = codec.native_from_textual(&text)?;
    assert_eq!(&decoded, value, "textual round trip");

    Ok(())
}

#[test]
fn test_primitive_round_trips() -> TestResult {
    let table = SymbolTable::new();
    let cases: &[(&str, &[Value])] = &[
        (r#""null""#, &[Value::Null]),
        (
            r#""boolean""#,
            &[Value::Boolean(true), Value::Boolean(false)],
        ),
        (
            r#""int""#,
            &[
                Value::Int(0),
                Value::Int(-1),
                Value::Int(42),
                Value::Int(i32::MIN),
                Value::Int(i32::MAX),
            ],
        ),
        (
            r#""long""#,
            &[
                Value::Long(0),
                Value::Long(300),
                Value::Long(i64::MIN),
                Value::Long(i64::MAX),
            ],
        ),
        (
            r#""float""#,
            &[Value::Float(0.0), Value::Float(-1.5), Value::Float(3.25)],
        ),
        (
            r#""double""#,
            &[Value::Double(0.0), Value::Double(2.5), Value::Double(-1e300)],
        ),
        (
            r#""bytes""#,
            &[
                Value::Bytes(vec![]),
                Value::Bytes(vec![0x00, 0x10, 0x7f, 0x80, 0xff]),
            ],
        ),
        (
            r#""string""#,
            &[
                Value::String(String::new()),
                Value::String("héllo, wörld".to_string()),
            ],
        ),
    ];

    for (schema, values) in cases {
        let codec = table.new_codec(schema)?;
        for value in *values {
            assert_round_trip(&codec, value)?;
        }
    }

    Ok(())
}

#[test]
fn test_logical_round_trips() -> TestResult {
    let table = SymbolTable::new();
    let cases: &[(&str, Value)] = &[
        (r#"{"type":"int","logicalType":"date"}"#, Value::Date(19000)),
        (
            r#"{"type":"int","logicalType":"date"}"#,
            // days before the epoch are representable
            Value::Date(-3),
        ),
        (
            r#"{"type":"int","logicalType":"time-millis"}"#,
            Value::TimeMillis(86_399_999),
        ),
        (
            r#"{"type":"long","logicalType":"time-micros"}"#,
            Value::TimeMicros(86_399_999_999),
        ),
        (
            r#"{"type":"long","logicalType":"timestamp-millis"}"#,
            Value::TimestampMillis(1_640_995_200_000),
        ),
        (
            r#"{"type":"long","logicalType":"timestamp-micros"}"#,
            Value::TimestampMicros(1_640_995_200_000_000),
        ),
    ];

    for (schema, value) in cases {
        let codec = table.new_codec(schema)?;
        assert_round_trip(&codec, value)?;
    }

    Ok(())
}

#[test]
fn test_timestamp_wire_format_matches_plain_long() -> TestResult {
    let table = SymbolTable::new();
    let ts = table.new_codec(r#"{"type":"long","logicalType":"timestamp-millis"}"#)?;
    let long = table.new_codec(r#""long""#)?;

    assert_eq!(
        ts.binary_from_native(&Value::TimestampMillis(300))?,
        long.binary_from_native(&Value::Long(300))?
    );
    assert_eq!(
        ts.textual_from_native(&Value::TimestampMillis(300))?,
        long.textual_from_native(&Value::Long(300))?
    );

    Ok(())
}

#[test]
fn test_time_millis_rejects_out_of_range_longs() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"{"type":"int","logicalType":"time-millis"}"#)?;

    let err = codec
        .binary_from_native(&Value::Long(i64::from(i32::MAX) + 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    Ok(())
}

#[test]
fn test_enum_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(
        r#"{"type": "enum", "name": "ns.Suit", "symbols": ["diamonds", "spades", "clubs", "hearts"]}"#,
    )?;

    assert_round_trip(&codec, &Value::Enum(1, "spades".to_string()))?;

    // the index is the zig-zag encoded position
    assert_eq!(
        codec.binary_from_native(&Value::Enum(2, "clubs".to_string()))?,
        hex!("04")
    );
    assert_eq!(
        codec.textual_from_native(&Value::Enum(2, "clubs".to_string()))?,
        br#""clubs""#
    );

    // unknown symbols and indexes are data errors
    let err = codec
        .binary_from_native(&Value::String("joker".to_string()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);
    let err = codec.native_from_binary(&hex!("0a")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_fixed_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"{"type": "fixed", "name": "ns.Quad", "size": 4}"#)?;

    assert_round_trip(&codec, &Value::Fixed(4, vec![0xde, 0xad, 0xbe, 0xef]))?;

    // no length prefix on the wire
    assert_eq!(
        codec.binary_from_native(&Value::Fixed(4, vec![1, 2, 3, 4]))?,
        hex!("01 02 03 04")
    );

    let err = codec
        .binary_from_native(&Value::Bytes(vec![1, 2, 3]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_array_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"{"type": "array", "items": "long"}"#)?;

    assert_round_trip(&codec, &Value::Array(vec![]))?;
    assert_round_trip(
        &codec,
        &Value::Array(vec![Value::Long(1), Value::Long(-2), Value::Long(300)]),
    )?;

    // one block of three items, then the terminating zero-count block
    assert_eq!(
        codec.binary_from_native(&Value::Array(vec![
            Value::Long(1),
            Value::Long(-2),
            Value::Long(300),
        ]))?,
        hex!("06 02 03 d8 04 00")
    );

    Ok(())
}

#[test]
fn test_array_decode_accepts_negative_block_counts() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"{"type": "array", "items": "long"}"#)?;

    // A writer may emit a negative count followed by the block size in bytes.
    // count -2 (zig-zag 0x03), size 2 (0x04), items 1 and 2, end block.
    let (decoded, rest) = codec.native_from_binary(&hex!("03 04 02 04 00"))?;
    assert!(rest.is_empty());
    assert_eq!(decoded, Value::Array(vec![Value::Long(1), Value::Long(2)]));

    Ok(())
}

#[test]
fn test_map_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"{"type": "map", "values": "int"}"#)?;

    assert_round_trip(&codec, &Value::Map(HashMap::new()))?;

    let mut entries = HashMap::new();
    entries.insert("a".to_string(), Value::Int(1));
    entries.insert("b".to_string(), Value::Int(2));
    assert_round_trip(&codec, &Value::Map(entries))?;

    Ok(())
}

#[test]
fn test_union_textual_encoding() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"["null", "string"]"#)?;

    // A non-null branch is wrapped in a single-key object...
    assert_eq!(
        codec.textual_from_native(&Value::Union(1, Box::new(Value::String("hi".to_string()))))?,
        br#"{"string":"hi"}"#
    );
    // ...but the null branch is the bare JSON null.
    assert_eq!(
        codec.textual_from_native(&Value::Union(0, Box::new(Value::Null)))?,
        b"null"
    );
    // A bare native null also encodes through the null branch.
    assert_eq!(codec.textual_from_native(&Value::Null)?, b"null");

    assert_eq!(
        codec.native_from_textual(br#"{"string":"hi"}"#)?,
        Value::Union(1, Box::new(Value::String("hi".to_string())))
    );
    assert_eq!(
        codec.native_from_textual(b"null")?,
        Value::Union(0, Box::new(Value::Null))
    );

    let err = codec
        .native_from_textual(br#"{"int": 3}"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_union_binary_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#"["null", "string", "long"]"#)?;

    assert_round_trip(&codec, &Value::Union(0, Box::new(Value::Null)))?;
    assert_round_trip(
        &codec,
        &Value::Union(1, Box::new(Value::String("hi".to_string()))),
    )?;
    assert_round_trip(&codec, &Value::Union(2, Box::new(Value::Long(-7))))?;

    // branch index, then the branch encoding
    assert_eq!(
        codec.binary_from_native(&Value::Union(2, Box::new(Value::Long(1))))?,
        hex!("04 02")
    );

    // an out-of-range index on decode is a data error
    let err = codec.native_from_binary(&hex!("06")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_union_with_named_branch_uses_the_fullname() -> TestResult {
    let table = SymbolTable::new();
    table.new_codec(r#"{"type": "fixed", "name": "ns.Quad", "size": 2}"#)?;
    let codec = table.new_codec(r#"["null", "ns.Quad"]"#)?;

    let value = Value::Union(1, Box::new(Value::Fixed(2, vec![0x41, 0x42])));
    assert_eq!(
        codec.textual_from_native(&value)?,
        br#"{"ns.Quad":"AB"}"#
    );
    assert_eq!(codec.native_from_textual(br#"{"ns.Quad":"AB"}"#)?, value);

    Ok(())
}

#[test]
fn test_bytes_textual_uses_latin1_escapes() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#""bytes""#)?;

    let value = Value::Bytes(vec![0x41, 0x00, 0xff]);
    let text = codec.textual_from_native(&value)?;
    assert_eq!(codec.native_from_textual(&text)?, value);

    // characters above U+00FF cannot be bytes
    let err = codec.native_from_textual("\"\u{0100}\"".as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_record_textual_keeps_field_order() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(
        r#"
        {
            "type": "record",
            "name": "ns.R",
            "fields": [
                {"name": "z", "type": "int"},
                {"name": "a", "type": "string"}
            ]
        }
    "#,
    )?;

    let value = Value::Record(vec![
        ("z".to_string(), Value::Int(1)),
        ("a".to_string(), Value::String("x".to_string())),
    ]);
    assert_eq!(
        codec.textual_from_native(&value)?,
        br#"{"z":1,"a":"x"}"#
    );
    assert_round_trip(&codec, &value)?;

    // every declared field must be present
    let err = codec.native_from_textual(br#"{"z": 1}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    // unknown fields are rejected
    let err = codec
        .native_from_textual(br#"{"z": 1, "a": "x", "q": 0}"#)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_nested_composite_round_trip() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(
        r#"
        {
            "type": "record",
            "name": "ns.Envelope",
            "fields": [
                {"name": "tags", "type": {"type": "array", "items": "string"}},
                {"name": "attrs", "type": {"type": "map", "values": "long"}},
                {"name": "payload", "type": ["null", "bytes"]},
                {"name": "stamp", "type": {"type": "long", "logicalType": "timestamp-millis"}}
            ]
        }
    "#,
    )?;

    let mut attrs = HashMap::new();
    attrs.insert("retries".to_string(), Value::Long(3));

    let value = Value::Record(vec![
        (
            "tags".to_string(),
            Value::Array(vec![Value::String("a".to_string())]),
        ),
        ("attrs".to_string(), Value::Map(attrs)),
        (
            "payload".to_string(),
            Value::Union(1, Box::new(Value::Bytes(vec![1, 2, 3]))),
        ),
        (
            "stamp".to_string(),
            Value::TimestampMillis(1_640_995_200_000),
        ),
    ]);

    assert_round_trip(&codec, &value)
}

#[test]
fn test_truncated_input_is_a_data_error() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#""double""#)?;

    let err = codec.native_from_binary(&hex!("00 01 02")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Data);

    Ok(())
}

#[test]
fn test_decoding_leaves_the_remainder() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#""int""#)?;

    let (value, rest) = codec.native_from_binary(&hex!("06 ff ee"))?;
    assert_eq!(value, Value::Int(3));
    assert_eq!(rest, hex!("ff ee"));

    Ok(())
}
