//! Array values: dense or sparse sequences of object edges.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::error::Result;
use crate::object::{Object, TypeCode};

/// Ordered sequence of object edges.
///
/// Two representations share one interface. The dense form is an ordinary
/// vector, used for arrays built from a complete element list. The sparse
/// form stores only non-null entries in an index map plus a separate logical
/// length; it is the damage-tolerant shape for arrays where most slots are
/// implicit nulls. Reading an absent sparse slot yields null, never an error,
/// and `len` always reports the logical length including implicit nulls.
#[derive(Debug, Clone)]
pub struct Array {
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    Dense(Vec<Object>),
    Sparse {
        elements: BTreeMap<usize, Object>,
        size: usize,
    },
}

impl Default for Array {
    fn default() -> Self {
        Array::new(Vec::new())
    }
}

impl Array {
    /// Create a dense array from a complete element list.
    pub fn new(items: Vec<Object>) -> Self {
        Array {
            repr: Repr::Dense(items),
        }
    }

    /// Create a sparse array. Direct nulls in the input become implicit:
    /// they contribute to the logical length but are not stored.
    pub fn sparse(items: Vec<Object>) -> Self {
        let mut elements = BTreeMap::new();
        let mut size = 0;
        for item in items {
            if item.raw_type_code() != TypeCode::Null || item.obj_gen().is_indirect() {
                elements.insert(size, item);
            }
            size += 1;
        }
        Array {
            repr: Repr::Sparse { elements, size },
        }
    }

    /// Whether this array uses the sparse representation.
    pub fn is_sparse(&self) -> bool {
        matches!(self.repr, Repr::Sparse { .. })
    }

    /// Logical length, including implicit nulls in the sparse form.
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Dense(items) => items.len(),
            Repr::Sparse { size, .. } => *size,
        }
    }

    /// Whether the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `n`. Out-of-range indices and absent sparse slots yield a
    /// null object so optional fields can be probed uniformly.
    pub fn get(&self, n: usize) -> Object {
        if n >= self.len() {
            return Object::null();
        }
        match &self.repr {
            Repr::Dense(items) => items[n].clone(),
            Repr::Sparse { elements, .. } => {
                elements.get(&n).cloned().unwrap_or_else(Object::null)
            }
        }
    }

    /// Positions that hold a stored (non-implicit) entry.
    pub fn stored_indices(&self) -> Vec<usize> {
        match &self.repr {
            Repr::Dense(items) => (0..items.len()).collect(),
            Repr::Sparse { elements, .. } => elements.keys().copied().collect(),
        }
    }

    pub(crate) fn set(&mut self, n: usize, item: &Object) -> bool {
        if n >= self.len() {
            return false;
        }
        match &mut self.repr {
            Repr::Dense(items) => items[n] = item.clone(),
            Repr::Sparse { elements, .. } => {
                elements.insert(n, item.clone());
            }
        }
        true
    }

    pub(crate) fn insert(&mut self, n: usize, item: &Object) -> bool {
        let len = self.len();
        if n > len {
            return false;
        }
        if n == len {
            // Insert beyond the last element is an append.
            self.push(item);
            return true;
        }
        match &mut self.repr {
            Repr::Dense(items) => items.insert(n, item.clone()),
            Repr::Sparse { elements, size } => {
                // Shift stored keys at or above the insertion point up by
                // one, walking from the top down so keys never collide.
                let keys: Vec<usize> = elements.range(n..).map(|(&k, _)| k).collect();
                for &k in keys.iter().rev() {
                    let v = elements.remove(&k).unwrap();
                    elements.insert(k + 1, v);
                }
                elements.insert(n, item.clone());
                *size += 1;
            }
        }
        true
    }

    pub(crate) fn push(&mut self, item: &Object) {
        match &mut self.repr {
            Repr::Dense(items) => items.push(item.clone()),
            Repr::Sparse { elements, size } => {
                elements.insert(*size, item.clone());
                *size += 1;
            }
        }
    }

    pub(crate) fn erase(&mut self, n: usize) -> bool {
        if n >= self.len() {
            return false;
        }
        match &mut self.repr {
            Repr::Dense(items) => {
                items.remove(n);
            }
            Repr::Sparse { elements, size } => {
                elements.remove(&n);
                let keys: Vec<usize> = elements.range(n + 1..).map(|(&k, _)| k).collect();
                for &k in keys.iter() {
                    let v = elements.remove(&k).unwrap();
                    elements.insert(k - 1, v);
                }
                *size -= 1;
            }
        }
        true
    }

    /// All elements as a vector, with implicit nulls materialized.
    pub fn to_vec(&self) -> Vec<Object> {
        match &self.repr {
            Repr::Dense(items) => items.clone(),
            Repr::Sparse { elements, size } => {
                let mut out = Vec::with_capacity(*size);
                for (&k, item) in elements {
                    out.resize_with(k, Object::null);
                    out.push(item.clone());
                }
                out.resize_with(*size, Object::null);
                out
            }
        }
    }

    pub(crate) fn unparse(&self) -> Result<String> {
        let mut out = String::from("[ ");
        match &self.repr {
            Repr::Dense(items) => {
                for item in items {
                    unparse_item(&mut out, item)?;
                }
            }
            Repr::Sparse { elements, size } => {
                let mut next = 0;
                for (&k, item) in elements {
                    for _ in next..k {
                        out.push_str("null ");
                    }
                    unparse_item(&mut out, item)?;
                    next = k + 1;
                }
                for _ in next..*size {
                    out.push_str("null ");
                }
            }
        }
        out.push(']');
        Ok(out)
    }

    pub(crate) fn to_json(&self, version: i32) -> Result<Json> {
        let mut out = Vec::with_capacity(self.len());
        match &self.repr {
            Repr::Dense(items) => {
                for item in items {
                    out.push(json_item(item, version)?);
                }
            }
            Repr::Sparse { elements, size } => {
                let mut next = 0;
                for (&k, item) in elements {
                    for _ in next..k {
                        out.push(Json::Null);
                    }
                    out.push(json_item(item, version)?);
                    next = k + 1;
                }
                for _ in next..*size {
                    out.push(Json::Null);
                }
            }
        }
        Ok(Json::Array(out))
    }

    pub(crate) fn copy_value(&self, shallow: bool) -> Result<Array> {
        if shallow {
            return Ok(self.clone());
        }
        let repr = match &self.repr {
            Repr::Dense(items) => {
                let mut copied = Vec::with_capacity(items.len());
                for item in items {
                    copied.push(copy_edge(item)?);
                }
                Repr::Dense(copied)
            }
            Repr::Sparse { elements, size } => {
                let mut copied = BTreeMap::new();
                for (&k, item) in elements {
                    copied.insert(k, copy_edge(item)?);
                }
                Repr::Sparse {
                    elements: copied,
                    size: *size,
                }
            }
        };
        Ok(Array { repr })
    }

    pub(crate) fn disconnect(&self) {
        match &self.repr {
            Repr::Dense(items) => {
                for item in items {
                    if !item.obj_gen().is_indirect() {
                        item.disconnect();
                    }
                }
            }
            Repr::Sparse { elements, .. } => {
                for item in elements.values() {
                    if !item.obj_gen().is_indirect() {
                        item.disconnect();
                    }
                }
            }
        }
    }
}

fn unparse_item(out: &mut String, item: &Object) -> Result<()> {
    item.resolve()?;
    let og = item.obj_gen();
    if og.is_indirect() {
        out.push_str(&og.to_string());
        out.push(' ');
    } else {
        out.push_str(&item.unparse()?);
        out.push(' ');
    }
    Ok(())
}

fn json_item(item: &Object, version: i32) -> Result<Json> {
    let og = item.obj_gen();
    if og.is_indirect() {
        Ok(Json::String(og.to_string()))
    } else {
        item.to_json(version)
    }
}

/// Deep copy of one edge: indirect targets and reference edges stay shared,
/// direct children are duplicated.
pub(crate) fn copy_edge(item: &Object) -> Result<Object> {
    if item.obj_gen().is_indirect() || item.raw_type_code() == TypeCode::Reference {
        Ok(item.clone())
    } else {
        item.copy(false)
    }
}
