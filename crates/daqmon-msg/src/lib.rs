//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Typed message catalogue and codec for the control bus."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! Message layer for the DAQ-Mon publish/subscribe control bus.
//!
//! Producers and consumers exchange discrete, type-tagged messages encoded
//! into a hierarchical [`Document`](daqmon_doc::Document). Each message is
//! an [`Envelope`] composed with zero or more payload facets; the
//! [`catalogue`] maps type tags back to concrete messages for dispatch.
//!
//! Decoding is deliberately permissive: an absent or malformed payload
//! section falls back to that facet's default so that wire evolution never
//! breaks older peers. Only an unrecognized type tag or an invalid map key
//! surfaces as an error.
#![warn(missing_docs)]

pub mod beamline;
pub mod catalogue;
pub mod envelope;
pub mod facet;
pub mod level;
pub mod maps;
pub mod messages;
pub mod metrics;
pub mod observe;
pub mod rules;
pub mod status;

/// Shared result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors surfaced by the message codec.
///
/// Field-level decode problems are never errors; they recover to per-field
/// defaults. The only decode failure is an unrecognized type tag, and the
/// only encode failure is a map key the document layer rejects.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The inbound document carried a type tag not present in the catalogue.
    #[error("unrecognized message type tag {0:#06x}")]
    UnknownMsgType(u32),
    /// Wrapper for document-layer failures (key validation, wire bytes).
    #[error(transparent)]
    Document(#[from] daqmon_doc::DocError),
}

pub use catalogue::{decode_message, Message, MsgType};
pub use envelope::{Envelope, MessageCodec};
pub use facet::DecodeIssue;
pub use level::Level;
pub use observe::{log_message, CodecDirection, CodecMetricsExporter};
