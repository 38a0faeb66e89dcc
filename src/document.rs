//! Owning documents: the indirect-object table and its lifecycle.
//!
//! A [`Document`] owns the table of indirect objects keyed by
//! [`ObjGen`]. Table entries are stable identities: replacing an entry's
//! content is observed by every outstanding handle and by every reference
//! edge, because edges look the table up on each access. When the last
//! handle to a document drops, the reachable direct subgraph is
//! disconnected once and every table entry is marked destroyed, so
//! surviving handles fail fast instead of dangling.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};
use crate::object::obj_gen::ObjGen;
use crate::object::reference::Reference;
use crate::object::{Object, TypeCode, Value};

/// Resolver hook: the deferred-parsing entry point. Called at most once per
/// unresolved id on first access; returns the parsed object, or `None` when
/// the id has no definition.
pub type Resolver = dyn Fn(&Document, ObjGen) -> Option<Object>;

/// Shared handle to an owning document.
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Document {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

pub(crate) struct DocumentInner {
    table: RefCell<HashMap<ObjGen, Object>>,
    next_id: Cell<u32>,
    resolving: RefCell<HashSet<ObjGen>>,
    resolver: RefCell<Option<Rc<Resolver>>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document {
            inner: Rc::new(DocumentInner {
                table: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
                resolving: RefCell::new(HashSet::new()),
                resolver: RefCell::new(None),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<DocumentInner>) -> Self {
        Document { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<DocumentInner> {
        Rc::downgrade(&self.inner)
    }

    /// Install the hook that produces objects for unresolved ids. The hook
    /// may navigate the document, but must not touch the id it is being
    /// asked for; that is a re-entrant resolution and fails fast.
    pub fn set_resolver(&self, resolver: impl Fn(&Document, ObjGen) -> Option<Object> + 'static) {
        self.inner.resolver.replace(Some(Rc::new(resolver)));
    }

    /// The table entry for `og`, creating an unresolved placeholder if the
    /// id has not been seen yet. A direct pair yields a plain null.
    pub fn get_object(&self, og: ObjGen) -> Object {
        if !og.is_indirect() {
            return Object::null();
        }
        if let Some(existing) = self.inner.table.borrow().get(&og) {
            return existing.clone();
        }
        let placeholder = Object::from_value(Value::Unresolved);
        placeholder.set_owner(self.downgrade(), og);
        self.inner.table.borrow_mut().insert(og, placeholder.clone());
        self.reserve_id(og.id);
        placeholder
    }

    /// Whether the table has an entry for `og`.
    pub fn contains(&self, og: ObjGen) -> bool {
        self.inner.table.borrow().contains_key(&og)
    }

    /// Number of table entries.
    pub fn object_count(&self) -> usize {
        self.inner.table.borrow().len()
    }

    /// A weak reference edge to `og`, resolved against this document on
    /// every access.
    pub fn reference(&self, og: ObjGen) -> Object {
        let edge = Object::from_value(Value::Reference(Reference::new(self.downgrade(), og)));
        edge.set_owner(self.downgrade(), ObjGen::default());
        edge
    }

    /// Adopt a direct object into the table under a fresh id. Adopting an
    /// already-indirect member of this document returns it unchanged;
    /// objects owned elsewhere must be copied over first.
    pub fn make_indirect(&self, obj: &Object) -> Result<Object> {
        if let Some(owner) = obj.document_inner() {
            if !Rc::ptr_eq(&owner, &self.inner) {
                return Err(Error::ForeignObject);
            }
            if obj.obj_gen().is_indirect() {
                return Ok(obj.clone());
            }
        }
        let og = ObjGen::new(self.take_next_id(), 0);
        obj.set_owner(self.downgrade(), og);
        self.inner.table.borrow_mut().insert(og, obj.clone());
        log::debug!("adopted object as {og}");
        Ok(obj.clone())
    }

    /// Replace the content of the entry for `og`, preserving its identity
    /// so every outstanding handle and edge observes the new value.
    pub fn replace_object(&self, og: ObjGen, obj: &Object) -> Result<()> {
        if let Some(owner) = obj.document_inner() {
            if !Rc::ptr_eq(&owner, &self.inner) {
                return Err(Error::ForeignObject);
            }
        }
        let entry = self.get_object(og);
        entry.assign(obj);
        Ok(())
    }

    /// Exchange the contents of two table entries. Identities and ids stay
    /// put, so edges to `a` now see `b`'s old value and vice versa.
    pub fn swap_objects(&self, a: ObjGen, b: ObjGen) {
        let ea = self.get_object(a);
        let eb = self.get_object(b);
        ea.swap_with(&eb);
    }

    /// Parse one object from `input`, with `n g R` sequences becoming
    /// reference edges into this document.
    pub fn parse_object(&self, input: &[u8]) -> Result<Object> {
        crate::parser::parse_with_document(input, self)
    }

    /// Resolve the entry for `og`, consulting the resolver hook. Missing
    /// definitions become null: an id the document never defines reads as
    /// the null object rather than an error.
    pub(crate) fn resolve_og(&self, og: ObjGen) -> Result<()> {
        if !self.inner.resolving.borrow_mut().insert(og) {
            return Err(Error::ReentrantResolve(og));
        }
        let result = self.do_resolve(og);
        self.inner.resolving.borrow_mut().remove(&og);
        result
    }

    fn do_resolve(&self, og: ObjGen) -> Result<()> {
        let entry = self.get_object(og);
        if entry.raw_type_code() != TypeCode::Unresolved {
            return Ok(());
        }
        let hook = self.inner.resolver.borrow().clone();
        if let Some(hook) = hook {
            if let Some(obj) = hook(self, og) {
                log::debug!("resolved {og}");
                entry.assign(&obj);
                return Ok(());
            }
        }
        log::warn!("{og} is not defined; treating it as null");
        entry.assign(&Object::null());
        Ok(())
    }

    fn reserve_id(&self, id: u32) {
        if id >= self.inner.next_id.get() {
            self.inner.next_id.set(id + 1);
        }
    }

    fn take_next_id(&self) -> u32 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        id
    }
}

impl Drop for DocumentInner {
    fn drop(&mut self) {
        let table = std::mem::take(&mut *self.table.borrow_mut());
        log::debug!("tearing down document with {} indirect objects", table.len());
        for obj in table.values() {
            obj.disconnect();
        }
        for obj in table.values() {
            obj.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_creation() {
        let doc = Document::new();
        let og = ObjGen::new(4, 0);
        assert!(!doc.contains(og));
        let obj = doc.get_object(og);
        assert!(obj.is_unresolved());
        assert!(doc.contains(og));
        assert_eq!(doc.object_count(), 1);
        // same identity on repeated lookup
        assert!(Object::ptr_eq(&obj, &doc.get_object(og)));
    }

    #[test]
    fn test_direct_pair_yields_null() {
        let doc = Document::new();
        assert!(doc.get_object(ObjGen::default()).is_null());
        assert_eq!(doc.object_count(), 0);
    }

    #[test]
    fn test_make_indirect_assigns_fresh_ids() {
        let doc = Document::new();
        let a = doc.make_indirect(&Object::integer(1)).unwrap();
        let b = doc.make_indirect(&Object::integer(2)).unwrap();
        assert_eq!(a.obj_gen(), ObjGen::new(1, 0));
        assert_eq!(b.obj_gen(), ObjGen::new(2, 0));
        // adopting again is a no-op
        let again = doc.make_indirect(&a).unwrap();
        assert!(Object::ptr_eq(&a, &again));
    }

    #[test]
    fn test_ids_skip_past_known_objects() {
        let doc = Document::new();
        doc.get_object(ObjGen::new(7, 0));
        let adopted = doc.make_indirect(&Object::integer(1)).unwrap();
        assert_eq!(adopted.obj_gen(), ObjGen::new(8, 0));
    }

    #[test]
    fn test_make_indirect_rejects_foreign() {
        let doc_a = Document::new();
        let doc_b = Document::new();
        let obj = doc_a.make_indirect(&Object::integer(1)).unwrap();
        assert!(matches!(doc_b.make_indirect(&obj), Err(Error::ForeignObject)));
    }

    #[test]
    fn test_replace_object_preserves_identity() {
        let doc = Document::new();
        let og = ObjGen::new(3, 0);
        let handle = doc.get_object(og);
        doc.replace_object(og, &Object::integer(42)).unwrap();
        assert_eq!(handle.as_i64(), Some(42));
    }

    #[test]
    fn test_swap_objects() {
        let doc = Document::new();
        let a = doc.make_indirect(&Object::integer(1)).unwrap();
        let b = doc.make_indirect(&Object::name("N")).unwrap();
        doc.swap_objects(a.obj_gen(), b.obj_gen());
        assert_eq!(a.as_name(), Some("N".to_string()));
        assert_eq!(b.as_i64(), Some(1));
        assert_eq!(a.obj_gen(), ObjGen::new(1, 0));
    }

    #[test]
    fn test_unresolved_without_definition_becomes_null() {
        let doc = Document::new();
        let obj = doc.get_object(ObjGen::new(9, 0));
        assert_eq!(obj.unparse().unwrap(), "null");
        assert!(!obj.is_unresolved());
    }

    #[test]
    fn test_resolver_hook_supplies_values() {
        let doc = Document::new();
        doc.set_resolver(|_, og| (og.id == 5).then(|| Object::integer(55)));
        assert_eq!(doc.get_object(ObjGen::new(5, 0)).as_i64(), Some(55));
        assert!(doc.get_object(ObjGen::new(6, 0)).is_null());
    }

    #[test]
    fn test_reentrant_resolution_fails_fast() {
        let doc = Document::new();
        doc.set_resolver(|doc, og| {
            // illegal: reads the very id being resolved
            let entry = doc.get_object(og);
            entry.resolve().err().map(|_| Object::integer(1))
        });
        let obj = doc.get_object(ObjGen::new(2, 0));
        // the hook observed the re-entrancy error and produced a value
        assert_eq!(obj.as_i64(), Some(1));
    }
}
