//! # pdf_objects
//!
//! The object layer of a PDF manipulation library: a directed graph of
//! heterogeneous value kinds behind one uniform, stable-identity handle.
//!
//! ## Core pieces
//!
//! - **[`Object`]**: a cheap-to-clone handle wrapping a replaceable value.
//!   All clones share one identity, so in-place replacement
//!   ([`Object::assign`]) is visible everywhere at once.
//! - **Containers**: arrays (dense or sparse) and dictionaries hold `Object`
//!   edges and enforce single-document ownership of inserted edges.
//! - **[`Document`]**: owns the indirect-object table. Indirect edges are
//!   weak `(id, generation)` lookups resolved on every access; when the
//!   document is gone they collapse to a shared destroyed sentinel instead
//!   of dangling.
//! - **[`Cursor`]**: experimental navigation handle that remembers its
//!   parent slot and writes back on assignment.
//! - **[`lexer`] / [`parser`]**: tokenizer and object parser for the
//!   object grammar, with and without a document context.
//!
//! ## Quick start
//!
//! ```ignore
//! use pdf_objects::{Document, Object};
//!
//! let doc = Document::new();
//! let page = doc.parse_object(b"<< /Type /Page /MediaBox [0 0 612 792] >>")?;
//!
//! // navigation treats null, scalars, and arrays uniformly
//! for entry in page.get_key("MediaBox")?.items() {
//!     println!("{}", entry.unparse()?);
//! }
//!
//! // mutate through a write-back cursor
//! page.cursor().at_key("MediaBox")?.at(2).set(&Object::integer(595))?;
//! # Ok::<(), pdf_objects::Error>(())
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Core object model
pub mod cursor;
pub mod document;
pub mod object;

// Object grammar
pub mod lexer;
pub mod parser;

// Re-exports
pub use cursor::Cursor;
pub use document::{Document, Resolver};
pub use error::{Error, Result};
pub use object::array::Array;
pub use object::dictionary::Dictionary;
pub use object::obj_gen::ObjGen;
pub use object::reference::Reference;
pub use object::stream::{Stream, StreamDataProvider, TokenFilter};
pub use object::{Object, TypeCode, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
