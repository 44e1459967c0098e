//! Top-level API options

use crate::context::ProcessingMode;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tessera_canon::CanonVersion;

/// What [`crate::normalize`] returns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Canonical N-Quads text
    #[default]
    NQuads,
    /// Hex-encoded SHA-256 of the canonical N-Quads
    Digest,
}

/// Options shared by the top-level operations
#[derive(Clone, Debug)]
pub struct JsonLdOptions {
    /// Base IRI for resolving relative references
    pub base: Option<String>,
    /// Context applied before the document's own, if any
    pub expand_context: Option<JsonValue>,
    /// Grammar revision; 1.1 features fail under 1.0
    pub processing_mode: ProcessingMode,
    /// Canonicalization algorithm variant
    pub canon_version: CanonVersion,
    /// Hash-step ceiling before canonicalization gives up on a graph
    pub iteration_budget: usize,
    /// Rendering of normalization output
    pub output_format: OutputFormat,
    /// Per-fetch ceiling for remote context dereferencing
    pub loader_timeout: Duration,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        Self {
            base: None,
            expand_context: None,
            processing_mode: ProcessingMode::default(),
            canon_version: CanonVersion::default(),
            iteration_budget: 100_000,
            output_format: OutputFormat::default(),
            loader_timeout: Duration::from_secs(10),
        }
    }
}
