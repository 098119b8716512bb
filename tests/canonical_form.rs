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

use avrokit::SymbolTable;
use md5::Md5;
use pretty_assertions::assert_eq;
use sha2::Sha256;

type TestResult = anyhow::Result<()>;

#[test]
fn test_record_canonical_form() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(
        r#"{"type":"record","name":"ns.R","fields":[{"name":"x","type":"long"}]}"#,
    )?;

    assert_eq!(
        codec.schema_canonical(),
        r#"{"name":"ns.R","type":"record","fields":[{"name":"x","type":"long"}]}"#
    );

    Ok(())
}

#[test]
fn test_canonical_form_is_deterministic() -> TestResult {
    // Attribute order, whitespace, doc and aliases must not matter.
    let verbose = r#"
        {
            "doc": "a user",
            "fields": [
                {"name": "id", "type": "long", "doc": "the id", "default": 0}
            ],
            "aliases": ["ns.OldUser"],
            "namespace": "ns",
            "name": "User",
            "type": "record"
        }
    "#;
    let compact = r#"{"type":"record","name":"ns.User","fields":[{"name":"id","type":"long"}]}"#;

    let table = SymbolTable::new();
    let a = table.new_codec(verbose)?;
    // identical canonical form, so the re-registration is accepted
    let b = table.new_codec(compact)?;

    assert_eq!(a.schema_canonical(), b.schema_canonical());
    assert_eq!(a, b);
    assert_eq!(a.rabin(), b.rabin());

    Ok(())
}

#[test]
fn test_logical_type_annotations_are_stripped() -> TestResult {
    let table = SymbolTable::new();
    let plain = table.new_codec(r#""long""#)?;
    let tagged = table.new_codec(r#"{"type":"long","logicalType":"timestamp-millis"}"#)?;

    assert_eq!(plain.schema_canonical(), tagged.schema_canonical());

    Ok(())
}

#[test]
fn test_known_rabin_fingerprints() -> TestResult {
    let table = SymbolTable::new();

    // Values from the fingerprint examples in the Avro specification.
    assert_eq!(table.new_codec(r#""int""#)?.rabin(), 0x7275_d51a_3f39_5c8f);
    assert_eq!(
        table.new_codec(r#""string""#)?.rabin(),
        0x8f01_4872_6345_03c7
    );

    Ok(())
}

#[test]
fn test_digest_fingerprints() -> TestResult {
    let table = SymbolTable::new();
    let codec = table.new_codec(r#""int""#)?;

    assert_eq!(
        codec.fingerprint::<Md5>().to_string(),
        "ef524ea1b91e73173d938ade36c1db32"
    );
    assert_eq!(codec.fingerprint::<Sha256>().bytes.len(), 32);

    Ok(())
}

#[test]
fn test_codecs_with_different_schemas_are_not_equal() -> TestResult {
    let table = SymbolTable::new();
    let a = table.new_codec(r#""int""#)?;
    let b = table.new_codec(r#""long""#)?;

    assert_ne!(a, b);

    Ok(())
}
