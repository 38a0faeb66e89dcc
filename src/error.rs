//! Error types for the object layer.
//!
//! Two families live here. Logic errors (kind mismatch, lifecycle misuse,
//! foreign edges, re-entrant resolution) indicate a programming error in the
//! caller and are never recovered at this layer. Parse errors carry the byte
//! offset of the offending token and describe bad input, not bad code.

use crate::object::obj_gen::ObjGen;

/// Result type alias for object-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, navigating, or serializing
/// the object graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An operation was invoked on the wrong kind of object
    #[error("{operation} requires a {expected}, found {found}")]
    TypeMismatch {
        /// Operation that was attempted
        operation: &'static str,
        /// Kind the operation requires
        expected: &'static str,
        /// Kind that was actually found
        found: &'static str,
    },

    /// A bookkeeping placeholder (unresolved, destroyed, reserved) escaped
    /// into an operation that only concrete values support
    #[error("attempted to {operation} a {kind} object")]
    Placeholder {
        /// Operation that was attempted
        operation: &'static str,
        /// Placeholder kind the object was in
        kind: &'static str,
    },

    /// An edge owned by a different document was inserted into a container
    #[error("attempting to add an object from a different document; copy it into this document first")]
    ForeignObject,

    /// Resolution of an object re-entered itself
    #[error("reentrant resolution of object {0}")]
    ReentrantResolve(ObjGen),

    /// Parse error at a specific byte offset
    #[error("failed to parse object at byte {offset}: {reason}")]
    Parse {
        /// Byte offset where the error occurred
        offset: usize,
        /// Reason for the parse failure
        reason: String,
    },

    /// Unexpected end of input
    #[error("end of input reached unexpectedly")]
    UnexpectedEof,

    /// Container nesting exceeded the parser limit
    #[error("recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(usize),

    /// A cursor write-back targeted an array slot that does not exist
    #[error("index {index} is out of bounds for write-back (len {len})")]
    OutOfBounds {
        /// Index the write-back targeted
        index: usize,
        /// Logical length of the array
        len: usize,
    },
}
