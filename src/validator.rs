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

//! Name grammar checks following the
//! [Avro specification](https://avro.apache.org/docs/++version++/specification/#names):
//! a name token is letters, digits and underscores, and must not start with
//! a digit.

use crate::AvroResult;
use crate::error::Details;
use regex_lite::Regex;
use std::sync::OnceLock;

fn schema_name_regex() -> &'static Regex {
    static SCHEMA_NAME_ONCE: OnceLock<Regex> = OnceLock::new();
    SCHEMA_NAME_ONCE.get_or_init(|| {
        Regex::new(
            // An optional namespace (with optional dots) followed by a name without any dots in it.
            r"^((?P<namespace>([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_]*)$",
        )
        .expect("Regex is valid")
    })
}

fn namespace_regex() -> &'static Regex {
    static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
    NAMESPACE_ONCE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$")
            .expect("Regex is valid")
    })
}

fn name_token_regex() -> &'static Regex {
    static NAME_TOKEN_ONCE: OnceLock<Regex> = OnceLock::new();
    NAME_TOKEN_ONCE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Regex is valid"))
}

/// Validates a (possibly dotted) schema name and returns the start byte of
/// the simple-name part.
pub(crate) fn validate_schema_name(schema_name: &str) -> AvroResult<usize> {
    let regex = schema_name_regex();
    let caps = regex
        .captures(schema_name)
        .ok_or_else(|| Details::InvalidSchemaName(schema_name.to_string(), regex.as_str()))?;
    Ok(caps
        .name("name")
        .expect("Regex has no group named `name`")
        .start())
}

pub(crate) fn validate_namespace(ns: &str) -> AvroResult<()> {
    let regex = namespace_regex();
    if !regex.is_match(ns) {
        Err(Details::InvalidNamespace(ns.to_string(), regex.as_str()).into())
    } else {
        Ok(())
    }
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    if !name_token_regex().is_match(symbol) {
        return Err(Details::EnumSymbolName(symbol.to_string()).into());
    }

    Ok(())
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    if !name_token_regex().is_match(field_name) {
        return Err(Details::FieldName(field_name.to_string()).into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validator_with_valid_name() {
        assert_eq!(validate_schema_name("example").unwrap(), 0);
        assert_eq!(validate_schema_name("com.example.record1").unwrap(), 12);
    }

    #[test]
    fn test_name_validator_with_invalid_name() {
        assert!(validate_schema_name("com-example").is_err());
        assert!(validate_schema_name("ns.0.record1").is_err());
        assert!(validate_schema_name("ns..record1").is_err());
        assert!(validate_schema_name("1digit").is_err());
    }

    /// Names and namespaces can be constructed entirely by underscores.
    #[test]
    fn test_funny_valid_names_and_namespaces() {
        for funny_name in ["_", "_._", "__._", "_.__", "_._._"] {
            assert!(validate_schema_name(funny_name).is_ok());
        }
    }

    #[test]
    fn test_namespace_validator() {
        assert!(validate_namespace("com.example").is_ok());
        assert!(validate_namespace("com-example").is_err());
    }

    #[test]
    fn test_enum_symbol_validator() {
        assert!(validate_enum_symbol_name("spades").is_ok());
        assert!(validate_enum_symbol_name("com-example").is_err());
    }

    #[test]
    fn test_record_field_validator() {
        assert!(validate_record_field_name("test").is_ok());
        assert!(validate_record_field_name("com-example").is_err());
    }
}
