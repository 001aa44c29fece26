//!
//! # Module Document Schema
//!
//! Serializable mirror of a [crate::Module], shared by all three text formats.
//! Components are referred to by name rather than key,
//! and every collection keeps its insertion order.
//!
//! ```yaml
//! name: fabric
//! components:
//!   lut2:
//!     class: LUT
//!     ports:
//!       in: { kind: INPUT, n_pins: 2 }
//!       out: { kind: OUTPUT, n_pins: 1 }
//!   top:
//!     ports:
//!       a: { kind: INPUT, n_pins: 2 }
//!     references:
//!       lut2: { component: lut2 }
//!     connections:
//!       - kind: DIRECT
//!         sources: [a]
//!         sinks: [{ path: lut2.in, start: 0, end: 2 }]
//! ```
//!

// Std-Lib
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

// Crates.io
use schemars::gen::SchemaGenerator;
use schemars::schema::{RootSchema, Schema};
use schemars::{schema_for, JsonSchema};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// Local imports
use crate::{ComponentClass, ConnectionKind, PortClass, PortKind};

/// Create the [schemars] JSON-Schema of [ModuleDoc]
pub fn schema() -> RootSchema {
    schema_for!(ModuleDoc)
}

/// # Module Document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModuleDoc {
    /// Module Name
    pub name: String,
    /// Component definitions, by name
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub components: OrderedMap<ComponentDoc>,
}

/// # Component Document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ComponentDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub class: Option<ComponentClass>,
    /// Ports, by name
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub ports: OrderedMap<PortDoc>,
    /// Component references, by alias
    #[serde(default, skip_serializing_if = "OrderedMap::is_empty")]
    pub references: OrderedMap<ReferenceDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionDoc>,
}

/// # Port Document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PortDoc {
    #[schemars(with = "String")]
    pub kind: PortKind,
    #[serde(default = "one")]
    pub n_pins: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub class: Option<PortClass>,
}

/// # Component Reference Document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReferenceDoc {
    /// Name of the referenced component
    pub component: String,
    /// Instance count. Omitted when one.
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub n_instances: usize,
}

/// # Connection Document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDoc {
    #[schemars(with = "String")]
    pub kind: ConnectionKind,
    pub sources: Vec<PinRangeDoc>,
    pub sinks: Vec<PinRangeDoc>,
}

/// # Pin Range Document
///
/// Either a path string, optionally with a `[bit]` or `[start:end]` suffix,
/// or an explicit `{path, start, end}` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PinRangeDoc {
    Path(String),
    Range {
        path: String,
        start: usize,
        end: usize,
    },
}

fn one() -> usize {
    1
}
fn is_one(n: &usize) -> bool {
    *n == 1
}

///
/// # Ordered Map
///
/// String-keyed map which serializes in insertion order.
/// Duplicate keys fail deserialization.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<T>(pub Vec<(String, T)>);
impl<T> OrderedMap<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// Get the value for `key`
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
    /// Append `key: val`. Replaces, without moving, any existing value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, val: T) {
        let key = key.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = val,
            None => self.0.push((key, val)),
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.0.iter().map(|(k, v)| (k, v))
    }
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(k, _)| k)
    }
}
impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<K: Into<String>, T> FromIterator<(K, T)> for OrderedMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
impl<T: Serialize> Serialize for OrderedMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}
struct OrderedMapVisitor<T>(PhantomData<T>);
impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<T> {
    type Value = OrderedMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map with unique string keys")
    }
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, T)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, val)) = access.next_entry::<String, T>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(de::Error::custom(format!("duplicate key \"{}\"", key)));
            }
            entries.push((key, val));
        }
        Ok(OrderedMap(entries))
    }
}
impl<T: JsonSchema> JsonSchema for OrderedMap<T> {
    fn is_referenceable() -> bool {
        false
    }
    fn schema_name() -> String {
        format!("Map_of_{}", T::schema_name())
    }
    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        BTreeMap::<String, T>::json_schema(gen)
    }
}
