//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Beam, run, and stream metrics payload facets."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use std::collections::BTreeMap;

use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

use crate::facet::{or_default, DecodeIssue};

/// Live beam metrics sampled by the monitor daemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamMetrics {
    /// Neutron count rate, events per second.
    pub count_rate: f64,
    /// Charge per pulse.
    pub pulse_charge: f64,
    /// Pulse frequency in Hz.
    pub pulse_freq: f64,
    /// Rate of pixel mapping errors.
    pub pixel_error_rate: f64,
    /// Stream bandwidth, bits per second.
    pub stream_bps: u64,
    /// Count rate per beam monitor, keyed by monitor id.
    pub monitor_count_rate: BTreeMap<u32, f64>,
}

impl BeamMetrics {
    /// Write the scalar metrics and the `monitors.<id>` map.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("count_rate", self.count_rate);
        doc.put("pulse_charge", self.pulse_charge);
        doc.put("pulse_freq", self.pulse_freq);
        doc.put("pixel_error_rate", self.pixel_error_rate);
        doc.put("stream_bps", self.stream_bps);

        for (id, rate) in &self.monitor_count_rate {
            doc.put(&format!("monitors.{id}"), *rate);
        }
    }

    /// Read the scalar metrics and monitor map.
    ///
    /// The monitor map is parsed as a unit: a single non-numeric key or
    /// value drops the whole map to empty, while the sibling scalars still
    /// decode normally.
    pub fn decode(doc: &Document) -> Self {
        Self {
            count_rate: doc.get("count_rate", 0.0),
            pulse_charge: doc.get("pulse_charge", 0.0),
            pulse_freq: doc.get("pulse_freq", 0.0),
            pixel_error_rate: doc.get("pixel_error_rate", 0.0),
            stream_bps: doc.get("stream_bps", 0u64),
            monitor_count_rate: or_default("monitors", try_monitors(doc)),
        }
    }
}

fn try_monitors(doc: &Document) -> std::result::Result<BTreeMap<u32, f64>, DecodeIssue> {
    let section = doc
        .child("monitors")
        .ok_or(DecodeIssue::MissingSection("monitors"))?;

    let mut rates = BTreeMap::new();
    for (name, node) in section.children() {
        let id: u32 = name
            .parse()
            .map_err(|_| DecodeIssue::BadKey(name.to_string()))?;
        let rate: f64 = node
            .as_scalar()
            .ok_or_else(|| DecodeIssue::BadValue(name.to_string()))?;
        rates.insert(id, rate);
    }
    Ok(rates)
}

/// Aggregate counters accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Total run time in seconds.
    pub total_time: f64,
    /// Total detected events.
    pub total_counts: u64,
    /// Total accumulated charge.
    pub total_charge: f64,
    /// Events rejected due to pixel mapping errors.
    pub pixel_error_count: u64,
    /// Duplicate pulses observed.
    pub dup_pulse_count: u64,
    /// Pulses vetoed upstream.
    pub pulse_veto_count: u64,
    /// Events with detector bank mapping errors.
    pub mapping_error_count: u64,
    /// Pulses missing RTDL information.
    pub missing_rtdl_count: u64,
}

impl RunMetrics {
    /// Write the run counter fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("total_time", self.total_time);
        doc.put("total_counts", self.total_counts);
        doc.put("total_charge", self.total_charge);
        doc.put("pixel_error_count", self.pixel_error_count);
        doc.put("dup_pulse_count", self.dup_pulse_count);
        doc.put("pulse_veto_count", self.pulse_veto_count);
        doc.put("mapping_error_count", self.mapping_error_count);
        doc.put("missing_rtdl_count", self.missing_rtdl_count);
    }

    /// Read the run counter fields with per-field defaults.
    pub fn decode(doc: &Document) -> Self {
        Self {
            total_time: doc.get("total_time", 0.0),
            total_counts: doc.get("total_counts", 0u64),
            total_charge: doc.get("total_charge", 0.0),
            pixel_error_count: doc.get("pixel_error_count", 0u64),
            dup_pulse_count: doc.get("dup_pulse_count", 0u64),
            pulse_veto_count: doc.get("pulse_veto_count", 0u64),
            mapping_error_count: doc.get("mapping_error_count", 0u64),
            missing_rtdl_count: doc.get("missing_rtdl_count", 0u64),
        }
    }
}

/// Defect counters accumulated over the event stream.
///
/// Field names on the wire keep the short forms established by the stream
/// parser's statistics block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamMetrics {
    /// Packets with an invalid type code.
    pub invalid_pkt_type: u64,
    /// Packets failing structural validation.
    pub invalid_pkt: u64,
    /// Packets with invalid timestamps.
    pub invalid_pkt_time: u64,
    /// Duplicate packets.
    pub duplicate_packet: u64,
    /// Pulses outside the frequency tolerance.
    pub pulse_freq_tol: u64,
    /// Cycle counter errors.
    pub cycle_err: u64,
    /// Events referencing an invalid bank id.
    pub invalid_bank_id: u64,
    /// Bank/source association mismatches.
    pub bank_source_mismatch: u64,
    /// Duplicate source descriptors.
    pub duplicate_source: u64,
    /// Duplicate bank descriptors.
    pub duplicate_bank: u64,
    /// Pixel mapping table misses.
    pub pixel_map_err: u64,
    /// Pixels landing in the wrong bank.
    pub pixel_bank_mismatch: u64,
    /// Pixels with an invalid time-of-flight.
    pub pixel_invalid_tof: u64,
    /// Pixels with an unknown id.
    pub pixel_unknown_id: u64,
    /// Total pixel errors.
    pub pixel_errors: u64,
    /// Device descriptor packets with invalid XML.
    pub bad_ddp_xml: u64,
    /// Run information packets with invalid XML.
    pub bad_runinfo_xml: u64,
}

impl StreamMetrics {
    /// Write the stream counter fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("pkt_type", self.invalid_pkt_type);
        doc.put("inv_pkt", self.invalid_pkt);
        doc.put("pkt_time", self.invalid_pkt_time);
        doc.put("dup_pkt", self.duplicate_packet);
        doc.put("pulse_freq", self.pulse_freq_tol);
        doc.put("cycle", self.cycle_err);
        doc.put("inv_bank", self.invalid_bank_id);
        doc.put("bank_src", self.bank_source_mismatch);
        doc.put("dup_src", self.duplicate_source);
        doc.put("dup_bank", self.duplicate_bank);
        doc.put("pix_map", self.pixel_map_err);
        doc.put("pix_bank", self.pixel_bank_mismatch);
        doc.put("pix_tof", self.pixel_invalid_tof);
        doc.put("pix_id", self.pixel_unknown_id);
        doc.put("pix_err", self.pixel_errors);
        doc.put("ddp_xml", self.bad_ddp_xml);
        doc.put("runinfo_xml", self.bad_runinfo_xml);
    }

    /// Read the stream counter fields with per-field defaults.
    pub fn decode(doc: &Document) -> Self {
        Self {
            invalid_pkt_type: doc.get("pkt_type", 0u64),
            invalid_pkt: doc.get("inv_pkt", 0u64),
            invalid_pkt_time: doc.get("pkt_time", 0u64),
            duplicate_packet: doc.get("dup_pkt", 0u64),
            pulse_freq_tol: doc.get("pulse_freq", 0u64),
            cycle_err: doc.get("cycle", 0u64),
            invalid_bank_id: doc.get("inv_bank", 0u64),
            bank_source_mismatch: doc.get("bank_src", 0u64),
            duplicate_source: doc.get("dup_src", 0u64),
            duplicate_bank: doc.get("dup_bank", 0u64),
            pixel_map_err: doc.get("pix_map", 0u64),
            pixel_bank_mismatch: doc.get("pix_bank", 0u64),
            pixel_invalid_tof: doc.get("pix_tof", 0u64),
            pixel_unknown_id: doc.get("pix_id", 0u64),
            pixel_errors: doc.get("pix_err", 0u64),
            bad_ddp_xml: doc.get("ddp_xml", 0u64),
            bad_runinfo_xml: doc.get("runinfo_xml", 0u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_beam_metrics() -> BeamMetrics {
        let mut monitors = BTreeMap::new();
        monitors.insert(1, 1040.5);
        monitors.insert(2, 86.25);
        BeamMetrics {
            count_rate: 125_000.0,
            pulse_charge: 24.6,
            pulse_freq: 60.0,
            pixel_error_rate: 0.02,
            stream_bps: 48_000_000,
            monitor_count_rate: monitors,
        }
    }

    #[test]
    fn beam_metrics_round_trip() {
        let metrics = sample_beam_metrics();
        let mut doc = Document::new();
        metrics.encode(&mut doc);
        assert_eq!(BeamMetrics::decode(&doc), metrics);
    }

    #[test]
    fn bad_monitor_key_drops_whole_map_only() {
        let metrics = sample_beam_metrics();
        let mut doc = Document::new();
        metrics.encode(&mut doc);
        doc.put("monitors.beam", 12.0);

        let decoded = BeamMetrics::decode(&doc);
        assert!(decoded.monitor_count_rate.is_empty());
        assert_eq!(decoded.count_rate, metrics.count_rate);
        assert_eq!(decoded.stream_bps, metrics.stream_bps);
    }

    #[test]
    fn bad_monitor_value_drops_whole_map() {
        let mut doc = Document::new();
        doc.put("monitors.1", 10.0);
        doc.put("monitors.2", "fast");

        assert!(BeamMetrics::decode(&doc).monitor_count_rate.is_empty());
    }

    #[test]
    fn stringly_monitor_entries_parse() {
        let mut doc = Document::new();
        doc.put("monitors.3", "17.5");
        let decoded = BeamMetrics::decode(&doc);
        assert_eq!(decoded.monitor_count_rate.get(&3), Some(&17.5));
    }

    #[test]
    fn run_metrics_round_trip() {
        let metrics = RunMetrics {
            total_time: 3600.5,
            total_counts: 9_000_000,
            total_charge: 88_000.0,
            pixel_error_count: 12,
            dup_pulse_count: 3,
            pulse_veto_count: 40,
            mapping_error_count: 7,
            missing_rtdl_count: 1,
        };
        let mut doc = Document::new();
        metrics.encode(&mut doc);
        assert_eq!(RunMetrics::decode(&doc), metrics);
    }

    #[test]
    fn stream_metrics_round_trip() {
        let metrics = StreamMetrics {
            invalid_pkt_type: 1,
            invalid_pkt: 2,
            invalid_pkt_time: 3,
            duplicate_packet: 4,
            pulse_freq_tol: 5,
            cycle_err: 6,
            invalid_bank_id: 7,
            bank_source_mismatch: 8,
            duplicate_source: 9,
            duplicate_bank: 10,
            pixel_map_err: 11,
            pixel_bank_mismatch: 12,
            pixel_invalid_tof: 13,
            pixel_unknown_id: 14,
            pixel_errors: 15,
            bad_ddp_xml: 16,
            bad_runinfo_xml: 17,
        };
        let mut doc = Document::new();
        metrics.encode(&mut doc);
        assert_eq!(StreamMetrics::decode(&doc), metrics);
    }

    #[test]
    fn empty_document_decodes_zeroed_metrics() {
        let doc = Document::new();
        assert_eq!(RunMetrics::decode(&doc), RunMetrics::default());
        assert_eq!(StreamMetrics::decode(&doc), StreamMetrics::default());
        assert_eq!(BeamMetrics::decode(&doc), BeamMetrics::default());
    }
}
