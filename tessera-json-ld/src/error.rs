use thiserror::Error;

/// JSON-LD processing error
///
/// Every variant maps to a stable code string (see [`JsonLdError::code`])
/// so callers can dispatch without parsing messages. Processing is
/// fail-fast: the first error aborts the call with no partial output.
#[derive(Error, Debug, Clone)]
pub enum JsonLdError {
    #[error("invalid context: {message}")]
    InvalidContext { message: String },

    #[error("recursive context inclusion: {iri} (chain: {chain:?})")]
    RecursiveContextInclusion { iri: String, chain: Vec<String> },

    #[error("protected term '{term}' redefined")]
    ProtectedTermRedefinition { term: String },

    #[error("cyclic IRI mapping through term '{term}'")]
    CyclicIriMapping { term: String },

    #[error("invalid IRI mapping for term '{term}'")]
    InvalidIriMapping { term: String },

    #[error("invalid @type value: {message}")]
    InvalidTypeValue { message: String },

    #[error("invalid value object: {message}")]
    InvalidValueObject { message: String },

    #[error("list of lists is not representable in RDF")]
    ListOfLists,

    #[error("conflicting @index values '{existing}' and '{incoming}'")]
    ConflictingIndexes { existing: String, incoming: String },

    #[error("loading document failed: {message}")]
    LoadingDocumentFailed { message: String },

    #[error("loading remote context {iri} failed: {message}")]
    LoadingRemoteContextFailed { iri: String, message: String },

    #[error("{feature} requires json-ld-1.1 processing mode")]
    UnsupportedProcessingMode { feature: String },

    #[error(transparent)]
    Canon(#[from] tessera_canon::CanonError),
}

impl JsonLdError {
    /// Stable code string for this error kind
    pub fn code(&self) -> &'static str {
        use tessera_vocab::errors;
        match self {
            Self::InvalidContext { .. } => errors::INVALID_CONTEXT,
            Self::RecursiveContextInclusion { .. } => errors::RECURSIVE_CONTEXT_INCLUSION,
            Self::ProtectedTermRedefinition { .. } => errors::PROTECTED_TERM_REDEFINITION,
            Self::CyclicIriMapping { .. } => errors::CYCLIC_IRI_MAPPING,
            Self::InvalidIriMapping { .. } => errors::INVALID_IRI_MAPPING,
            Self::InvalidTypeValue { .. } => errors::INVALID_TYPE_VALUE,
            Self::InvalidValueObject { .. } => errors::INVALID_VALUE_OBJECT,
            Self::ListOfLists => errors::LIST_OF_LISTS,
            Self::ConflictingIndexes { .. } => errors::CONFLICTING_INDEXES,
            Self::LoadingDocumentFailed { .. } => errors::LOADING_DOCUMENT_FAILED,
            Self::LoadingRemoteContextFailed { .. } => errors::LOADING_REMOTE_CONTEXT_FAILED,
            Self::UnsupportedProcessingMode { .. } => errors::UNSUPPORTED_PROCESSING_MODE,
            Self::Canon(_) => errors::TOXIC_GRAPH,
        }
    }
}

pub type Result<T> = std::result::Result<T, JsonLdError>;
