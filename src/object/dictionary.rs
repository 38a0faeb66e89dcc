//! Dictionary values: key → object edge maps.
//!
//! A key whose value is a direct null is indistinguishable from an absent
//! key: lookups filter such entries and `replace` with a direct null removes
//! the key instead of storing it. Insertion order is irrelevant; listing and
//! serialization sort keys for deterministic output.

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::error::Result;
use crate::object::array::copy_edge;
use crate::object::{name, Object, TypeCode};

/// Key → object edge map.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    items: IndexMap<String, Object>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is present with a non-null value.
    pub fn has_key(&self, key: &str) -> bool {
        self.items.get(key).map_or(false, |v| !is_direct_null(v))
    }

    /// Value for `key`; a null object when the key is absent.
    pub fn get(&self, key: &str) -> Object {
        match self.items.get(key) {
            Some(v) if !is_direct_null(v) => v.clone(),
            _ => Object::null(),
        }
    }

    /// All keys with non-null values, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .items
            .iter()
            .filter(|(_, v)| !is_direct_null(v))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Replace the value of `key`, adding it if absent. A direct null value
    /// removes the key: a stored null has no observable difference from
    /// absence, so storage does not retain it.
    pub(crate) fn replace(&mut self, key: &str, value: &Object) {
        if is_direct_null(value) {
            self.items.shift_remove(key);
        } else {
            self.items.insert(key.to_string(), value.clone());
        }
    }

    /// Remove `key`, doing nothing if it is absent.
    pub(crate) fn remove(&mut self, key: &str) {
        self.items.shift_remove(key);
    }

    /// Insert as parsed, keeping null values. Accessors filter them out, so
    /// this only affects what a re-serialization of untouched input shows.
    pub(crate) fn insert_raw(&mut self, key: String, value: Object) {
        self.items.insert(key, value);
    }

    pub(crate) fn unparse(&self) -> Result<String> {
        let mut out = String::from("<< ");
        let mut keys: Vec<&String> = self.items.keys().collect();
        keys.sort();
        for key in keys {
            let value = &self.items[key.as_str()];
            if is_direct_null(value) {
                continue;
            }
            value.resolve()?;
            out.push_str(&name::unparse(key));
            out.push(' ');
            let og = value.obj_gen();
            if og.is_indirect() {
                out.push_str(&og.to_string());
            } else {
                out.push_str(&value.unparse()?);
            }
            out.push(' ');
        }
        out.push_str(">>");
        Ok(out)
    }

    pub(crate) fn to_json(&self, version: i32) -> Result<Json> {
        let mut out = serde_json::Map::new();
        let mut keys: Vec<&String> = self.items.keys().collect();
        keys.sort();
        for key in keys {
            let value = &self.items[key.as_str()];
            if is_direct_null(value) {
                continue;
            }
            let json_key = if version == 1 {
                name::unparse(key)
            } else {
                format!("/{}", key)
            };
            let og = value.obj_gen();
            let json_value = if og.is_indirect() {
                Json::String(og.to_string())
            } else {
                value.to_json(version)?
            };
            out.insert(json_key, json_value);
        }
        Ok(Json::Object(out))
    }

    pub(crate) fn copy_value(&self, shallow: bool) -> Result<Dictionary> {
        if shallow {
            return Ok(self.clone());
        }
        let mut items = IndexMap::with_capacity(self.items.len());
        for (k, v) in &self.items {
            items.insert(k.clone(), copy_edge(v)?);
        }
        Ok(Dictionary { items })
    }

    pub(crate) fn disconnect(&self) {
        for value in self.items.values() {
            if !value.obj_gen().is_indirect() {
                value.disconnect();
            }
        }
    }
}

fn is_direct_null(value: &Object) -> bool {
    value.raw_type_code() == TypeCode::Null && !value.obj_gen().is_indirect()
}
