//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Flat status payload facets broadcast by the monitor daemon."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! Flat-record status facets. Every field defaults independently on decode;
//! no facet-level failure path exists.

use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

/// Connection state towards the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the daemon currently holds a connection.
    pub connected: bool,
    /// Remote host name.
    pub host: String,
    /// Remote port.
    pub port: u16,
}

impl ConnectionStatus {
    /// Write the `connected/host/port` fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("connected", self.connected);
        doc.put("host", self.host.as_str());
        doc.put("port", self.port);
    }

    /// Read the `connected/host/port` fields with per-field defaults.
    pub fn decode(doc: &Document) -> Self {
        Self {
            connected: doc.get("connected", false),
            host: doc.get("host", String::new()),
            port: doc.get("port", 0u16),
        }
    }
}

/// Recording state of the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    /// Whether a run is being recorded.
    pub recording: bool,
    /// Run number of the active or last run.
    pub run_number: u32,
    /// Run start time, seconds since epoch.
    pub timestamp: u32,
}

impl RunStatus {
    /// Write the `recording/run_number/timestamp` fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("recording", self.recording);
        doc.put("run_number", self.run_number);
        doc.put("timestamp", self.timestamp);
    }

    /// Read the `recording/run_number/timestamp` fields.
    pub fn decode(doc: &Document) -> Self {
        Self {
            recording: doc.get("recording", false),
            run_number: doc.get("run_number", 0u32),
            timestamp: doc.get("timestamp", 0u32),
        }
    }
}

/// Pause state of the acquisition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseStatus {
    /// Whether acquisition is paused.
    pub paused: bool,
}

impl PauseStatus {
    /// Write the `paused` field.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("paused", self.paused);
    }

    /// Read the `paused` field.
    pub fn decode(doc: &Document) -> Self {
        Self {
            paused: doc.get("paused", false),
        }
    }
}

/// Scan state and index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Whether a scan is in progress.
    pub scanning: bool,
    /// Index of the current scan point.
    pub scan_index: u32,
}

impl ScanStatus {
    /// Write the `scanning/scan_index` fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("scanning", self.scanning);
        doc.put("scan_index", self.scan_index);
    }

    /// Read the `scanning/scan_index` fields.
    pub fn decode(doc: &Document) -> Self {
        Self {
            scanning: doc.get("scanning", false),
            scan_index: doc.get("scan_index", 0u32),
        }
    }
}
