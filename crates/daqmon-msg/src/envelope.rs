//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Transport envelope and the message encode/decode contract."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use chrono::Utc;
use daqmon_doc::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalogue::MsgType;
use crate::Result;

/// Transport-level fields common to every bus message.
///
/// The envelope owns identity and timing; the type tag itself belongs to
/// the concrete message and is stamped by [`Envelope::write`]. A fresh
/// envelope carries a new v4 correlation id and the current time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Bus identity of the sender.
    pub src_id: String,
    /// Bus identity of the addressee; empty for broadcasts.
    pub dest_id: String,
    /// Correlates a response with the request that caused it.
    pub correlation_id: Uuid,
    /// Creation time, seconds since epoch.
    pub timestamp: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            src_id: String::new(),
            dest_id: String::new(),
            correlation_id: Uuid::new_v4(),
            timestamp: u32::try_from(Utc::now().timestamp()).unwrap_or(0),
        }
    }
}

impl Envelope {
    /// Construct an envelope addressed from `src_id` to `dest_id`.
    pub fn addressed(src_id: impl Into<String>, dest_id: impl Into<String>) -> Self {
        Self {
            src_id: src_id.into(),
            dest_id: dest_id.into(),
            ..Self::default()
        }
    }

    /// Write the envelope fields and the owning message's type tag.
    pub fn write(&self, msg_type: MsgType, doc: &mut Document) {
        doc.put("msg_type", msg_type.tag());
        doc.put("src", self.src_id.as_str());
        doc.put("dest", self.dest_id.as_str());
        doc.put("cid", self.correlation_id.to_string());
        doc.put("ts", self.timestamp);
    }

    /// Read the envelope fields with per-field defaults.
    ///
    /// A malformed correlation id falls back to the nil UUID.
    pub fn read(&mut self, doc: &Document) {
        self.src_id = doc.get("src", String::new());
        self.dest_id = doc.get("dest", String::new());
        self.correlation_id = doc
            .get("cid", String::new())
            .parse()
            .unwrap_or_else(|_| Uuid::nil());
        self.timestamp = doc.get("ts", 0u32);
    }
}

/// Encode/decode contract implemented by every catalogue message.
///
/// `write` emits envelope fields first, then each facet in declared order;
/// `read` mirrors that order. `read` never fails: payload problems recover
/// to facet defaults, and only encode can reject an invalid map key.
pub trait MessageCodec {
    /// The message's fixed type tag.
    fn msg_type(&self) -> MsgType;
    /// Encode this message into `doc`.
    fn write(&self, doc: &mut Document) -> Result<()>;
    /// Decode `doc` into this message, replacing all prior contents.
    fn read(&mut self, doc: &Document);
}
