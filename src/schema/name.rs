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

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use crate::{
    AvroResult, Error,
    error::Details,
    util::MapHelper,
    validator::{validate_namespace, validate_schema_name},
};

/// Represents the namespace of a named Avro schema.
pub type Namespace = Option<String>;
/// Borrowed form of [`Namespace`].
pub type NamespaceRef<'a> = Option<&'a str>;

/// Represents names for `record`, `enum` and `fixed` Avro schemas.
///
/// Each of these schemas has a `fullname` composed of two parts:
///   * a simple name
///   * an optional namespace
///
/// A schema node that omits its own namespace inherits the namespace of the
/// enclosing named type; a `name` attribute that already contains a `.` is
/// fully qualified and ignores both.
///
/// More information about schema names can be found in the
/// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct Name {
    name: String,
    namespace: Namespace,
}

impl Name {
    /// Create a new `Name`, parsing the optional namespace out of a dotted
    /// `name` string.
    pub fn new(name: &str) -> AvroResult<Self> {
        Self::new_with_enclosing_namespace(name, None)
    }

    /// Create a new `Name`, using `enclosing_namespace` when `name` carries
    /// no namespace of its own.
    pub fn new_with_enclosing_namespace(
        name: &str,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Self> {
        let index_of_name = validate_schema_name(name)?;

        if index_of_name == 0 {
            let namespace = match enclosing_namespace {
                Some(ns) if !ns.is_empty() => {
                    validate_namespace(ns)?;
                    Some(ns.to_string())
                }
                _ => None,
            };
            Ok(Self {
                name: name.to_string(),
                namespace,
            })
        } else if index_of_name == 1 {
            // A leading dot means the null namespace.
            Ok(Self {
                name: name[1..].to_string(),
                namespace: None,
            })
        } else {
            Ok(Self {
                name: name[index_of_name..].to_string(),
                namespace: Some(name[..index_of_name - 1].to_string()),
            })
        }
    }

    /// Parse a schema node's `name`/`namespace` attributes into a `Name`.
    pub(crate) fn parse(
        complex: &Map<String, Value>,
        enclosing_namespace: NamespaceRef,
    ) -> AvroResult<Self> {
        let name_field = complex.name().ok_or(Details::GetNameField)?;
        let own_namespace = complex.string("namespace");
        Self::new_with_enclosing_namespace(
            &name_field,
            own_namespace.as_deref().or(enclosing_namespace),
        )
    }

    /// A `Name` for built-in codecs (primitives, the `base.logical`
    /// composites and unnamed complex kinds). These identifiers are not
    /// subject to the schema name grammar.
    pub(crate) fn unchecked(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> NamespaceRef<'_> {
        self.namespace.as_deref()
    }

    /// Return the `fullname` of this `Name`: `namespace.name` when a
    /// namespace is present, the bare name otherwise.
    ///
    /// More information about fullnames can be found in the
    /// [Avro specification](https://avro.apache.org/docs/++version++/specification/#names)
    pub fn fullname(&self) -> String {
        match self.namespace.as_deref() {
            Some(namespace) => format!("{namespace}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl TryFrom<&str> for Name {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Name");
        debug.field("name", &self.name);
        if let Some(ref namespace) = self.namespace {
            debug.field("namespace", namespace);
            debug.finish()
        } else {
            debug.finish_non_exhaustive()
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.fullname())
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.fullname())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        use serde::de::Error;
        let s = String::deserialize(deserializer)?;
        Name::new(&s).map_err(D::Error::custom)
    }
}
