//! Stable error code strings
//!
//! These strings identify processing error kinds in API responses and
//! logs. They match the error names of the JSON-LD API registry so a
//! caller can dispatch on them without parsing messages.
//!
//! # Example Usage
//!
//! ```json
//! {
//!   "error": "context A includes B includes A",
//!   "code": "recursive context inclusion"
//! }
//! ```

/// Context expression is structurally invalid
pub const INVALID_CONTEXT: &str = "invalid context";

/// A context transitively includes itself
pub const RECURSIVE_CONTEXT_INCLUSION: &str = "recursive context inclusion";

/// A protected term was redefined with a different definition
pub const PROTECTED_TERM_REDEFINITION: &str = "protected term redefinition";

/// Term definitions reference each other in a cycle
pub const CYCLIC_IRI_MAPPING: &str = "cyclic IRI mapping";

/// A term's @id is not a valid IRI mapping
pub const INVALID_IRI_MAPPING: &str = "invalid IRI mapping";

/// An @type value is not a string or array of strings
pub const INVALID_TYPE_VALUE: &str = "invalid type value";

/// A value object carries conflicting or unknown entries
pub const INVALID_VALUE_OBJECT: &str = "invalid value object";

/// A list was nested directly inside a list
pub const LIST_OF_LISTS: &str = "list of lists";

/// A node acquired two different @index values
pub const CONFLICTING_INDEXES: &str = "conflicting indexes";

/// The document loader could not dereference a document
pub const LOADING_DOCUMENT_FAILED: &str = "loading document failed";

/// The document loader could not dereference a remote context
pub const LOADING_REMOTE_CONTEXT_FAILED: &str = "loading remote context failed";

/// A JSON-LD 1.1 feature was used under json-ld-1.0 processing mode
pub const UNSUPPORTED_PROCESSING_MODE: &str = "processing mode conflict";

/// Canonicalization exceeded its iteration budget
pub const TOXIC_GRAPH: &str = "toxic graph";
