//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Structured logging and metrics for codec activity."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use prometheus::{IntCounter, Opts, Registry};
use tracing::debug;

use crate::catalogue::MsgType;
use crate::envelope::Envelope;

/// Direction of codec activity, used for consistent logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecDirection {
    /// A message was encoded for transmission.
    Encode,
    /// A document was decoded into a message.
    Decode,
}

/// Emit a structured log entry for one encode or decode.
pub fn log_message(direction: CodecDirection, msg_type: MsgType, envelope: &Envelope) {
    debug!(
        msg_type = ?msg_type,
        tag = msg_type.tag(),
        correlation_id = %envelope.correlation_id,
        src = %envelope.src_id,
        direction = ?direction,
        "codec activity"
    );
}

/// Prometheus counter handles for codec activity.
///
/// The codec itself is pure; bus endpoints own an exporter and record what
/// they encode, decode, and reject.
pub struct CodecMetricsExporter {
    encoded: IntCounter,
    decoded: IntCounter,
    facet_fallbacks: IntCounter,
    unknown_type: IntCounter,
}

impl CodecMetricsExporter {
    /// Register codec metrics with the provided registry.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let encoded = IntCounter::with_opts(Opts::new(
            "bus_messages_encoded_total",
            "Messages encoded for the control bus",
        ))?;
        let decoded = IntCounter::with_opts(Opts::new(
            "bus_messages_decoded_total",
            "Documents decoded from the control bus",
        ))?;
        let facet_fallbacks = IntCounter::with_opts(Opts::new(
            "bus_facet_fallbacks_total",
            "Payload sections recovered to their defaults during decode",
        ))?;
        let unknown_type = IntCounter::with_opts(Opts::new(
            "bus_unknown_msg_type_total",
            "Inbound documents rejected for an unrecognized type tag",
        ))?;

        registry.register(Box::new(encoded.clone()))?;
        registry.register(Box::new(decoded.clone()))?;
        registry.register(Box::new(facet_fallbacks.clone()))?;
        registry.register(Box::new(unknown_type.clone()))?;

        Ok(Self {
            encoded,
            decoded,
            facet_fallbacks,
            unknown_type,
        })
    }

    /// Record an encoded message.
    pub fn observe_encoded(&self) {
        self.encoded.inc();
    }

    /// Record a decoded message.
    pub fn observe_decoded(&self) {
        self.decoded.inc();
    }

    /// Record a payload section that fell back to its default.
    pub fn observe_facet_fallback(&self) {
        self.facet_fallbacks.inc();
    }

    /// Record a rejected document with an unrecognized type tag.
    pub fn observe_unknown_type(&self) {
        self.unknown_type.inc();
    }
}
