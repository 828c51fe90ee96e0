//! ---
//! daq_section: "01-hierarchical-document"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Schemaless hierarchical document tree for bus transport."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! Hierarchical document layer for the DAQ-Mon control bus.
//!
//! A [`Document`] is a mutable tree of named nodes addressed by dotted paths.
//! A node holds either a scalar value or an ordered set of named (possibly
//! repeated) children. The message codec builds documents through this crate
//! and the transport carries them as opaque encoded bytes.
#![warn(missing_docs)]

pub mod document;
pub mod scalar;

/// Shared result type for document operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// Errors raised by the document layer.
///
/// Reads never fail; only key validation and wire serialization can.
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    /// A map key was empty or contained the path separator character.
    #[error("invalid document key `{key}`: keys must be non-empty and must not contain `.`")]
    InvalidKey {
        /// The offending key as supplied by the caller.
        key: String,
    },
    /// The decoded wire payload did not have an object at its root.
    #[error("wire payload root is not a document node")]
    MalformedRoot,
    /// Wrapper for CBOR serialization or deserialization problems.
    #[error("wire error: {0}")]
    Wire(#[from] serde_cbor::Error),
    /// Wrapper for JSON serialization or deserialization problems.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub use document::{Document, Node, PATH_SEPARATOR};
pub use scalar::{FromScalar, ToScalar};
