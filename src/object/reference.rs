//! Indirect-reference edges and the destroyed sentinel.

use std::rc::Weak;

use crate::document::{Document, DocumentInner};
use crate::object::obj_gen::ObjGen;
use crate::object::{Object, Value};

/// Weak edge to an indirect object: an owning document plus `(id, gen)`.
///
/// The edge is a lookup, not a pointer: `get` consults the document table on
/// every call, so a replacement of the target is observed by every holder of
/// the edge. A dead document substitutes the shared destroyed sentinel, so
/// all dangling edges collapse to one value whose operations fail fast.
#[derive(Debug, Clone)]
pub struct Reference {
    owner: Weak<DocumentInner>,
    og: ObjGen,
}

impl Reference {
    pub(crate) fn new(owner: Weak<DocumentInner>, og: ObjGen) -> Self {
        Reference { owner, og }
    }

    /// Identity of the referenced object.
    pub fn obj_gen(&self) -> ObjGen {
        self.og
    }

    /// Look up the referenced object.
    pub fn get(&self) -> Object {
        match self.owner.upgrade() {
            Some(inner) => Document::from_inner(inner).get_object(self.og),
            None => destroyed(),
        }
    }
}

thread_local! {
    static DESTROYED: Object = Object::from_value(Value::Destroyed);
}

/// The shared sentinel standing in for objects whose document is gone.
pub(crate) fn destroyed() -> Object {
    DESTROYED.with(Object::clone)
}
