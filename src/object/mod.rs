//! The object layer: one uniform handle over every PDF value kind.
//!
//! [`Object`] is a stable identity wrapping a replaceable [`Value`]. Handles
//! are cheap to clone and share the identity, so replacing the content via
//! [`Object::assign`] is immediately visible to every holder: reference
//! behavior without shared mutable aliasing of the payloads themselves.
//! Kind-specific behavior lives in exhaustive matches over [`Value`], keeping
//! impossible states unrepresentable rather than dispatching virtually.
//!
//! Indirect edges ([`reference::Reference`]) are resolved transparently: the
//! typed accessors, navigation, and serialization all forward to the target,
//! while [`Object::raw_type_code`] exposes the literal arm for callers that
//! need to detect an edge without resolving it.

pub mod array;
pub mod dictionary;
pub mod name;
pub mod obj_gen;
pub mod reference;
pub mod stream;
pub mod string;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bytes::Bytes;
use serde_json::Value as Json;

use crate::cursor::Cursor;
use crate::document::{Document, DocumentInner};
use crate::error::{Error, Result};

use array::Array;
use dictionary::Dictionary;
use obj_gen::ObjGen;
use reference::Reference;
use stream::{Stream, StreamDataProvider, TokenFilter};

/// The closed set of value kinds, exactly one of which is live per object.
#[derive(Debug, Clone)]
pub enum Value {
    /// Placeholder for an id handed out before its object exists
    Reserved,
    /// The null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real value, kept as its source text so re-serialization preserves
    /// the writer's representation
    Real(String),
    /// String (byte array)
    String(Vec<u8>),
    /// Name, stored decoded without the leading slash
    Name(String),
    /// Array of object edges
    Array(Array),
    /// Dictionary of key → object edges
    Dictionary(Dictionary),
    /// Stream: dictionary plus byte payload
    Stream(Stream),
    /// Content-stream operator
    Operator(String),
    /// Inline-image data embedded in a content stream
    InlineImage(Bytes),
    /// Table entry whose value has not been produced yet
    Unresolved,
    /// Value belonging to a document that has been torn down
    Destroyed,
    /// Weak edge to an indirect object
    Reference(Reference),
}

impl Value {
    fn type_code(&self) -> TypeCode {
        match self {
            Value::Reserved => TypeCode::Reserved,
            Value::Null => TypeCode::Null,
            Value::Boolean(_) => TypeCode::Boolean,
            Value::Integer(_) => TypeCode::Integer,
            Value::Real(_) => TypeCode::Real,
            Value::String(_) => TypeCode::String,
            Value::Name(_) => TypeCode::Name,
            Value::Array(_) => TypeCode::Array,
            Value::Dictionary(_) => TypeCode::Dictionary,
            Value::Stream(_) => TypeCode::Stream,
            Value::Operator(_) => TypeCode::Operator,
            Value::InlineImage(_) => TypeCode::InlineImage,
            Value::Unresolved => TypeCode::Unresolved,
            Value::Destroyed => TypeCode::Destroyed,
            Value::Reference(_) => TypeCode::Reference,
        }
    }
}

/// Discriminant of a [`Value`] arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TypeCode {
    Reserved,
    Null,
    Boolean,
    Integer,
    Real,
    String,
    Name,
    Array,
    Dictionary,
    Stream,
    Operator,
    InlineImage,
    Unresolved,
    Destroyed,
    Reference,
}

impl TypeCode {
    /// Human-readable kind name, useful for diagnostics and tests.
    pub fn name(self) -> &'static str {
        match self {
            TypeCode::Reserved => "reserved",
            TypeCode::Null => "null",
            TypeCode::Boolean => "boolean",
            TypeCode::Integer => "integer",
            TypeCode::Real => "real",
            TypeCode::String => "string",
            TypeCode::Name => "name",
            TypeCode::Array => "array",
            TypeCode::Dictionary => "dictionary",
            TypeCode::Stream => "stream",
            TypeCode::Operator => "operator",
            TypeCode::InlineImage => "inline-image",
            TypeCode::Unresolved => "unresolved",
            TypeCode::Destroyed => "destroyed",
            TypeCode::Reference => "indirect-reference",
        }
    }
}

pub(crate) struct ObjectInner {
    value: RefCell<Value>,
    owner: RefCell<Weak<DocumentInner>>,
    og: Cell<ObjGen>,
    parsed_offset: Cell<i64>,
    description: RefCell<Option<String>>,
}

/// Stable-identity handle to one object.
///
/// Cloning a handle clones the identity, not the content: all clones observe
/// content replacement. Identity comparison is [`Object::ptr_eq`].
pub struct Object {
    inner: Rc<ObjectInner>,
}

impl Clone for Object {
    fn clone(&self) -> Self {
        Object {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Default for Object {
    fn default() -> Self {
        Object::null()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let og = self.inner.og.get();
        if og.is_indirect() {
            write!(f, "Object({} {})", self.raw_type_code().name(), og)
        } else {
            write!(f, "Object({})", self.raw_type_code().name())
        }
    }
}

impl Object {
    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    pub(crate) fn from_value(value: Value) -> Object {
        Object {
            inner: Rc::new(ObjectInner {
                value: RefCell::new(value),
                owner: RefCell::new(Weak::new()),
                og: Cell::new(ObjGen::default()),
                parsed_offset: Cell::new(-1),
                description: RefCell::new(None),
            }),
        }
    }

    /// Create a null object.
    pub fn null() -> Object {
        Object::from_value(Value::Null)
    }

    /// Create a boolean object.
    pub fn boolean(value: bool) -> Object {
        Object::from_value(Value::Boolean(value))
    }

    /// Create an integer object.
    pub fn integer(value: i64) -> Object {
        Object::from_value(Value::Integer(value))
    }

    /// Create a real object from a float, trimming trailing zeros.
    pub fn real(value: f64) -> Object {
        Object::from_value(Value::Real(format_real(value)))
    }

    /// Create a real object from its source text (e.g. `".5"`, `"-1.20"`),
    /// preserving the representation across round trips.
    pub fn real_from_literal(literal: impl Into<String>) -> Object {
        Object::from_value(Value::Real(literal.into()))
    }

    /// Create a string object from raw bytes.
    pub fn string(data: impl Into<Vec<u8>>) -> Object {
        Object::from_value(Value::String(data.into()))
    }

    /// Create a name object. The name is given decoded, without the slash.
    pub fn name(name: impl Into<String>) -> Object {
        Object::from_value(Value::Name(name.into()))
    }

    /// Create a content-stream operator object.
    pub fn operator(value: impl Into<String>) -> Object {
        Object::from_value(Value::Operator(value.into()))
    }

    /// Create an inline-image object from its embedded data.
    pub fn inline_image(data: impl Into<Bytes>) -> Object {
        Object::from_value(Value::InlineImage(data.into()))
    }

    /// Create a dense array object.
    pub fn array(items: Vec<Object>) -> Object {
        Object::from_value(Value::Array(Array::new(items)))
    }

    /// Create a sparse array object; direct nulls become implicit.
    pub fn sparse_array(items: Vec<Object>) -> Object {
        Object::from_value(Value::Array(Array::sparse(items)))
    }

    /// Create a dictionary object from key/value pairs.
    pub fn dictionary(entries: Vec<(&str, Object)>) -> Object {
        let mut dict = Dictionary::new();
        for (key, value) in entries {
            dict.replace(key, &value);
        }
        Object::from_value(Value::Dictionary(dict))
    }

    pub(crate) fn from_dictionary(dict: Dictionary) -> Object {
        Object::from_value(Value::Dictionary(dict))
    }

    /// Create a stream object with in-memory data. The dictionary's
    /// `/Length` entry is kept in step with the data.
    pub fn stream(dict: Object, data: impl Into<Bytes>) -> Result<Object> {
        require_dictionary(&dict, "stream creation")?;
        let data = data.into();
        dict.replace_key("Length", &Object::integer(data.len() as i64))?;
        Ok(Object::from_value(Value::Stream(Stream::with_data(dict, data))))
    }

    /// Create a stream object whose data stays in its source until a
    /// provider is attached; `offset` and `length` record where it lives.
    pub fn deferred_stream(dict: Object, offset: u64, length: u64) -> Result<Object> {
        require_dictionary(&dict, "stream creation")?;
        Ok(Object::from_value(Value::Stream(Stream::deferred(
            dict, offset, length,
        ))))
    }

    /// Create a reserved placeholder object.
    pub fn reserved() -> Object {
        Object::from_value(Value::Reserved)
    }

    // ------------------------------------------------------------------
    // Identity and metadata
    // ------------------------------------------------------------------

    /// Whether two handles share one identity.
    pub fn ptr_eq(a: &Object, b: &Object) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn set_owner(&self, owner: Weak<DocumentInner>, og: ObjGen) {
        self.inner.owner.replace(owner);
        self.inner.og.set(og);
    }

    pub(crate) fn document_inner(&self) -> Option<Rc<DocumentInner>> {
        self.inner.owner.borrow().upgrade()
    }

    /// The owning document, if it is still alive.
    pub fn document(&self) -> Option<Document> {
        self.document_inner().map(Document::from_inner)
    }

    /// Indirect identity. Reference edges report their target's identity;
    /// everything else reports its own (the default pair when direct).
    pub fn obj_gen(&self) -> ObjGen {
        if let Value::Reference(r) = &*self.inner.value.borrow() {
            return r.obj_gen();
        }
        self.inner.og.get()
    }

    /// Whether this object (or the target of this edge) is indirect.
    pub fn is_indirect(&self) -> bool {
        self.obj_gen().is_indirect()
    }

    /// Byte offset this object was parsed at, or -1 when unknown.
    pub fn parsed_offset(&self) -> i64 {
        self.inner.parsed_offset.get()
    }

    /// Record the parse offset. Only the first recording sticks.
    pub fn set_parsed_offset(&self, offset: i64) {
        if self.inner.parsed_offset.get() < 0 {
            self.inner.parsed_offset.set(offset);
        }
    }

    /// Diagnostic description: an explicit one if set, otherwise derived
    /// from the indirect identity.
    pub fn description(&self) -> Option<String> {
        if let Some(d) = self.inner.description.borrow().clone() {
            return Some(d);
        }
        let og = self.inner.og.get();
        og.is_indirect()
            .then(|| format!("object {} {}", og.id, og.gen))
    }

    /// Attach a diagnostic description.
    pub fn set_description(&self, description: impl Into<String>) {
        self.inner.description.replace(Some(description.into()));
    }

    // ------------------------------------------------------------------
    // Type introspection
    // ------------------------------------------------------------------

    /// The literal value arm, without resolving or forwarding. This is how
    /// callers detect a reference edge or placeholder as such.
    pub fn raw_type_code(&self) -> TypeCode {
        self.inner.value.borrow().type_code()
    }

    /// The resolved kind: unresolved table entries resolve first, reference
    /// edges report their target's kind.
    pub fn type_code(&self) -> TypeCode {
        let _ = self.resolve();
        let next = match &*self.inner.value.borrow() {
            Value::Reference(r) => r.get(),
            v => return v.type_code(),
        };
        if Object::ptr_eq(&next, self) {
            return TypeCode::Reference;
        }
        next.type_code()
    }

    /// Human-readable name of the resolved kind.
    pub fn type_name(&self) -> &'static str {
        self.type_code().name()
    }

    /// Whether the resolved value is null.
    pub fn is_null(&self) -> bool {
        self.type_code() == TypeCode::Null
    }

    /// Whether this is an unresolved table entry (not yet resolved).
    pub fn is_unresolved(&self) -> bool {
        self.raw_type_code() == TypeCode::Unresolved
    }

    /// Whether this value belongs to a torn-down document.
    pub fn is_destroyed(&self) -> bool {
        self.raw_type_code() == TypeCode::Destroyed
    }

    // ------------------------------------------------------------------
    // Typed casts (resolving)
    // ------------------------------------------------------------------

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.with_resolved(|_, v| match v {
            Value::Boolean(b) => Some(*b),
            _ => None,
        })
    }

    /// Try to cast to integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.with_resolved(|_, v| match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        })
    }

    /// Numeric value of an integer or real.
    pub fn as_f64(&self) -> Option<f64> {
        self.with_resolved(|_, v| match v {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(s) => s.parse().ok(),
            _ => None,
        })
    }

    /// Try to cast to string bytes.
    pub fn as_string(&self) -> Option<Vec<u8>> {
        self.with_resolved(|_, v| match v {
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// String value decoded to UTF-8 text (UTF-16BE aware).
    pub fn as_utf8(&self) -> Option<String> {
        self.with_resolved(|_, v| match v {
            Value::String(s) => Some(string::utf8_value(s)),
            _ => None,
        })
    }

    /// Try to cast to a name (decoded, without the slash).
    pub fn as_name(&self) -> Option<String> {
        self.with_resolved(|_, v| match v {
            Value::Name(n) => Some(n.clone()),
            _ => None,
        })
    }

    /// Try to cast to an operator.
    pub fn as_operator(&self) -> Option<String> {
        self.with_resolved(|_, v| match v {
            Value::Operator(op) => Some(op.clone()),
            _ => None,
        })
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve an unresolved table entry against its owning document. A dead
    /// owner turns the entry into a destroyed value; anything already
    /// concrete is left alone.
    pub fn resolve(&self) -> Result<()> {
        if !matches!(&*self.inner.value.borrow(), Value::Unresolved) {
            return Ok(());
        }
        let og = self.inner.og.get();
        let owner = self.inner.owner.borrow().upgrade();
        match owner {
            Some(inner) => Document::from_inner(inner).resolve_og(og),
            None => {
                self.inner.value.replace(Value::Destroyed);
                Ok(())
            }
        }
    }

    /// The object itself, or the target of a reference chain.
    pub(crate) fn resolved_target(&self) -> Object {
        let _ = self.resolve();
        let next = match &*self.inner.value.borrow() {
            Value::Reference(r) => r.get(),
            _ => return self.clone(),
        };
        if Object::ptr_eq(&next, self) {
            return next;
        }
        next.resolved_target()
    }

    fn with_resolved<R>(&self, f: impl FnOnce(&Object, &Value) -> R) -> R {
        let target = self.resolved_target();
        let value = target.inner.value.borrow();
        f(&target, &value)
    }

    // ------------------------------------------------------------------
    // Generalized navigation
    // ------------------------------------------------------------------

    /// Element count for uniform optional/list-like navigation: null is an
    /// empty array, an array is itself, and anything else (a dictionary
    /// included) is a one-element array containing itself.
    pub fn size(&self) -> usize {
        self.with_resolved(|_, v| match v {
            Value::Null => 0,
            Value::Array(a) => a.len(),
            _ => 1,
        })
    }

    /// Element at `index` under the same generalized view. Out-of-range
    /// navigation yields a null object, never an error; callers distinguish
    /// absence from failure via [`Object::size`].
    pub fn at(&self, index: usize) -> Object {
        let target = self.resolved_target();
        let element = {
            let value = target.inner.value.borrow();
            match &*value {
                Value::Array(a) => Some(a.get(index)),
                Value::Null => Some(Object::null()),
                _ if index == 0 => None,
                _ => Some(Object::null()),
            }
        };
        element.unwrap_or(target)
    }

    /// Iterate the generalized view of this value.
    pub fn items(&self) -> Items {
        Items {
            object: self.clone(),
            index: 0,
            len: self.size(),
        }
    }

    /// A write-back navigation cursor rooted at this object.
    pub fn cursor(&self) -> Cursor {
        Cursor::root(self.clone())
    }

    // ------------------------------------------------------------------
    // Dictionary operations
    // ------------------------------------------------------------------

    /// Whether the dictionary has `key` with a non-null value.
    pub fn has_key(&self, key: &str) -> Result<bool> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Dictionary(d) => Ok(d.has_key(key)),
            other => Err(mismatch("has_key", "dictionary", other)),
        })
    }

    /// Value for `key`; a null object when the key is absent.
    pub fn get_key(&self, key: &str) -> Result<Object> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Dictionary(d) => Ok(d.get(key)),
            other => Err(mismatch("get_key", "dictionary", other)),
        })
    }

    /// All keys with non-null values, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Dictionary(d) => Ok(d.keys()),
            other => Err(mismatch("keys", "dictionary", other)),
        })
    }

    /// Replace the value of `key` (a direct null removes the key).
    pub fn replace_key(&self, key: &str, value: &Object) -> Result<()> {
        self.resolve()?;
        let target = self.resolved_target();
        target.check_insert(value)?;
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Dictionary(d) => {
                d.replace(key, value);
                Ok(())
            }
            other => Err(mismatch("replace_key", "dictionary", other)),
        }
    }

    /// Remove `key`, doing nothing if it is absent.
    pub fn remove_key(&self, key: &str) -> Result<()> {
        self.resolve()?;
        let target = self.resolved_target();
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Dictionary(d) => {
                d.remove(key);
                Ok(())
            }
            other => Err(mismatch("remove_key", "dictionary", other)),
        }
    }

    // ------------------------------------------------------------------
    // Array operations
    // ------------------------------------------------------------------

    /// Replace the element at `index`. `Ok(false)` when out of range.
    pub fn set_item(&self, index: usize, value: &Object) -> Result<bool> {
        self.resolve()?;
        let target = self.resolved_target();
        target.check_insert(value)?;
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Array(a) => Ok(a.set(index, value)),
            other => Err(mismatch("set_item", "array", other)),
        }
    }

    /// Insert before `index`; inserting at the length appends. `Ok(false)`
    /// when the index is otherwise out of range.
    pub fn insert_item(&self, index: usize, value: &Object) -> Result<bool> {
        self.resolve()?;
        let target = self.resolved_target();
        target.check_insert(value)?;
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Array(a) => Ok(a.insert(index, value)),
            other => Err(mismatch("insert_item", "array", other)),
        }
    }

    /// Append an element.
    pub fn append_item(&self, value: &Object) -> Result<()> {
        self.resolve()?;
        let target = self.resolved_target();
        target.check_insert(value)?;
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Array(a) => {
                a.push(value);
                Ok(())
            }
            other => Err(mismatch("append_item", "array", other)),
        }
    }

    /// Remove the element at `index`. `Ok(false)` when out of range.
    pub fn erase_item(&self, index: usize) -> Result<bool> {
        self.resolve()?;
        let target = self.resolved_target();
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Array(a) => Ok(a.erase(index)),
            other => Err(mismatch("erase_item", "array", other)),
        }
    }

    /// All array elements, with implicit nulls materialized.
    pub fn array_items(&self) -> Result<Vec<Object>> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Array(a) => Ok(a.to_vec()),
            other => Err(mismatch("array_items", "array", other)),
        })
    }

    /// Edges inserted into a container must belong to the container's
    /// document, if both have one. Foreign edges go through an explicit
    /// adoption or copy first.
    fn check_insert(&self, item: &Object) -> Result<()> {
        if let (Some(mine), Some(theirs)) = (self.document_inner(), item.document_inner()) {
            if !Rc::ptr_eq(&mine, &theirs) {
                return Err(Error::ForeignObject);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stream operations
    // ------------------------------------------------------------------

    /// The stream dictionary.
    pub fn stream_dict(&self) -> Result<Object> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Stream(s) => Ok(s.dict()),
            other => Err(mismatch("stream_dict", "stream", other)),
        })
    }

    /// Raw (still encoded) stream bytes, if present in memory or available
    /// from a provider.
    pub fn stream_data(&self) -> Result<Option<Bytes>> {
        self.resolve()?;
        self.with_resolved(|_, v| match v {
            Value::Stream(s) => Ok(s.raw_data()),
            other => Err(mismatch("stream_data", "stream", other)),
        })
    }

    /// Replace the stream's data, updating `/Length` and recording the
    /// filter chain the new data is encoded with (null removes the entry).
    pub fn replace_stream_data(
        &self,
        data: impl Into<Bytes>,
        filter: &Object,
        decode_parms: &Object,
    ) -> Result<()> {
        let data = data.into();
        let target = self.resolved_target();
        let dict = {
            let mut current = target.inner.value.borrow_mut();
            match &mut *current {
                Value::Stream(s) => {
                    s.set_data(data.clone());
                    s.dict()
                }
                other => return Err(mismatch("replace_stream_data", "stream", other)),
            }
        };
        dict.replace_key("Length", &Object::integer(data.len() as i64))?;
        dict.replace_key("Filter", filter)?;
        dict.replace_key("DecodeParms", decode_parms)?;
        Ok(())
    }

    /// Attach a data provider supplying the stream bytes on demand.
    pub fn replace_stream_provider(&self, provider: Rc<dyn StreamDataProvider>) -> Result<()> {
        let target = self.resolved_target();
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Stream(s) => {
                s.set_provider(provider);
                Ok(())
            }
            other => Err(mismatch("replace_stream_provider", "stream", other)),
        }
    }

    /// Attach a token filter for an external rewriting pipeline.
    pub fn add_token_filter(&self, filter: Rc<RefCell<dyn TokenFilter>>) -> Result<()> {
        let target = self.resolved_target();
        let mut current = target.inner.value.borrow_mut();
        match &mut *current {
            Value::Stream(s) => {
                s.add_token_filter(filter);
                Ok(())
            }
            other => Err(mismatch("add_token_filter", "stream", other)),
        }
    }

    // ------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------

    /// Serialize to the object grammar. Placeholder kinds (unresolved,
    /// destroyed, reserved) never have a textual form and fail fast.
    pub fn unparse(&self) -> Result<String> {
        self.resolve()?;
        let value = self.inner.value.borrow();
        match &*value {
            Value::Reference(r) => r.get().unparse(),
            Value::Reserved => Err(placeholder("unparse", "reserved")),
            Value::Unresolved => Err(placeholder("unparse", "unresolved")),
            Value::Destroyed => Err(placeholder("unparse", "destroyed")),
            Value::Null => Ok("null".to_string()),
            Value::Boolean(b) => Ok(if *b { "true" } else { "false" }.to_string()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Real(s) => Ok(s.clone()),
            Value::String(s) => Ok(string::unparse(s)),
            Value::Name(n) => Ok(name::unparse(n)),
            Value::Operator(op) => Ok(op.clone()),
            Value::InlineImage(data) => Ok(String::from_utf8_lossy(data).into_owned()),
            Value::Array(a) => a.unparse(),
            Value::Dictionary(d) => d.unparse(),
            Value::Stream(s) => {
                let og = self.inner.og.get();
                if og.is_indirect() {
                    Ok(og.to_string())
                } else {
                    s.unparse_body()
                }
            }
        }
    }

    /// JSON form of this value. Version 1 normalizes names and decodes
    /// strings to UTF-8; version 2 and up preserve raw bytes. Operators and
    /// inline images have no JSON form and map to null, as they only occur
    /// inside content streams.
    pub fn to_json(&self, version: i32) -> Result<Json> {
        self.resolve()?;
        let value = self.inner.value.borrow();
        match &*value {
            Value::Reference(r) => r.get().to_json(version),
            Value::Reserved => Err(placeholder("get JSON from", "reserved")),
            Value::Unresolved => Err(placeholder("get JSON from", "unresolved")),
            Value::Destroyed => Err(placeholder("get JSON from", "destroyed")),
            Value::Null => Ok(Json::Null),
            Value::Boolean(b) => Ok(Json::Bool(*b)),
            Value::Integer(i) => Ok(Json::from(*i)),
            Value::Real(s) => Ok(real_to_json(s)),
            Value::String(s) => Ok(string::to_json(s, version)),
            Value::Name(n) => Ok(name::to_json(n, version)),
            Value::Operator(_) => Ok(Json::Null),
            Value::InlineImage(_) => Ok(Json::Null),
            Value::Array(a) => a.to_json(version),
            Value::Dictionary(d) => d.to_json(version),
            Value::Stream(s) => s.to_json(version),
        }
    }

    // ------------------------------------------------------------------
    // Copy, assign, disconnect
    // ------------------------------------------------------------------

    /// Copy this object into a fresh, unowned identity.
    ///
    /// `shallow` copies the payload structure only: a copied container keeps
    /// the very same child edges. A deep copy (`shallow == false`)
    /// duplicates every direct child recursively, since a direct object
    /// belongs to one owner and duplicating its container must duplicate it
    /// too, while indirect children stay shared. Copying a reference edge of
    /// either depth returns the target itself: indirect targets are never
    /// duplicated here.
    pub fn copy(&self, shallow: bool) -> Result<Object> {
        self.resolve()?;
        let value = self.inner.value.borrow();
        let copied = match &*value {
            Value::Reference(r) => return Ok(r.get()),
            Value::Reserved => return Err(placeholder("copy", "reserved")),
            Value::Unresolved => return Err(placeholder("copy", "unresolved")),
            Value::Destroyed => return Err(placeholder("copy", "destroyed")),
            Value::Array(a) => Value::Array(a.copy_value(shallow)?),
            Value::Dictionary(d) => Value::Dictionary(d.copy_value(shallow)?),
            Value::Stream(s) => Value::Stream(s.copy_value(shallow)?),
            other => other.clone(),
        };
        Ok(Object::from_value(copied))
    }

    /// Replace this object's content with `other`'s. Identity is preserved:
    /// every outstanding handle to this object observes the new content.
    /// Container payloads are taken over structurally, so the two objects
    /// share child edges afterwards; deep-copy first when that matters.
    pub fn assign(&self, other: &Object) {
        if Object::ptr_eq(self, other) {
            return;
        }
        let value = other.inner.value.borrow().clone();
        self.inner.value.replace(value);
    }

    /// Exchange the contents of two objects. Identities and indirect ids
    /// stay where they are; only the payloads move.
    pub fn swap_with(&self, other: &Object) {
        if Object::ptr_eq(self, other) {
            return;
        }
        let mut a = self.inner.value.borrow_mut();
        let mut b = other.inner.value.borrow_mut();
        std::mem::swap(&mut *a, &mut *b);
    }

    /// Sever this subgraph from its owning document: recurse through direct
    /// container edges (indirect children belong to the document's own
    /// teardown and are skipped; reference edges are never followed), then
    /// clear the owner and indirect identity. Idempotent.
    pub fn disconnect(&self) {
        {
            let mut value = self.inner.value.borrow_mut();
            match &mut *value {
                Value::Array(a) => a.disconnect(),
                Value::Dictionary(d) => d.disconnect(),
                Value::Stream(s) => s.disconnect(),
                _ => {}
            }
        }
        self.inner.owner.replace(Weak::new());
        self.inner.og.set(ObjGen::default());
    }

    pub(crate) fn destroy(&self) {
        self.inner.value.replace(Value::Destroyed);
    }
}

/// Iterator over the generalized element view of an object.
pub struct Items {
    object: Object,
    index: usize,
    len: usize,
}

impl Iterator for Items {
    type Item = Object;

    fn next(&mut self) -> Option<Object> {
        if self.index >= self.len {
            return None;
        }
        let item = self.object.at(self.index);
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

fn mismatch(operation: &'static str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        operation,
        expected,
        found: found.type_code().name(),
    }
}

fn placeholder(operation: &'static str, kind: &'static str) -> Error {
    Error::Placeholder { operation, kind }
}

fn require_dictionary(dict: &Object, operation: &'static str) -> Result<()> {
    if dict.raw_type_code() != TypeCode::Dictionary {
        return Err(Error::TypeMismatch {
            operation,
            expected: "dictionary",
            found: dict.raw_type_code().name(),
        });
    }
    Ok(())
}

/// Format a float the way the writer emits reals: integral values without a
/// point, fractional values with up to five places and trailing zeros
/// trimmed.
fn format_real(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let formatted = format!("{:.5}", value);
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// JSON number for a real's source text. The grammar allows `.5` and `-.5`,
/// JSON does not, so patch the leading dot rather than reformatting.
fn real_to_json(literal: &str) -> Json {
    let fixed = if literal.is_empty() {
        "0".to_string()
    } else if literal.starts_with('.') {
        format!("0{}", literal)
    } else if let Some(rest) = literal.strip_prefix("-.") {
        format!("-0.{}", rest)
    } else {
        literal.to_string()
    };
    match fixed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
        Some(n) => Json::Number(n),
        None => Json::Null,
    }
}
