//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Map-shaped payload facets: errors, facts, process variables."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! Map facets encode keys as path segments under a fixed root
//! (`errors.<key>`, `pvs.<name>`), so keys must be valid single path
//! segments. Encode validates every key up front and fails fast instead of
//! producing a corrupt document.

use std::collections::{BTreeMap, BTreeSet};

use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

use crate::facet::{or_default, DecodeIssue};
use crate::Result;

/// Error descriptions keyed by the offending fact or field name.
pub type ErrorMap = BTreeMap<String, String>;

/// Set of fact names available as rule inputs.
pub type FactSet = BTreeSet<String>;

/// Last-known sample of one process variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PVData {
    /// Sampled value.
    pub value: f64,
    /// Device status word at sample time.
    pub status: i32,
    /// Sample time, seconds since epoch.
    pub timestamp: u32,
}

impl PVData {
    /// Construct a sample from its parts.
    pub fn new(value: f64, status: i32, timestamp: u32) -> Self {
        Self {
            value,
            status,
            timestamp,
        }
    }
}

/// Process-variable samples keyed by PV name.
pub type PvMap = BTreeMap<String, PVData>;

/// Write an error map under `errors.<key>`.
///
/// All keys are validated before the first write, so a rejected key leaves
/// the document untouched.
pub fn write_error_map(doc: &mut Document, errors: &ErrorMap) -> Result<()> {
    for key in errors.keys() {
        Document::validate_key(key)?;
    }
    for (key, description) in errors {
        let path = Document::join("errors", key)?;
        doc.put(&path, description.as_str());
    }
    Ok(())
}

/// Read an error map from `errors.<key>` entries; absent section reads empty.
pub fn read_error_map(doc: &Document) -> ErrorMap {
    or_default("errors", try_string_map(doc, "errors"))
}

/// Write a fact set as unnamed children of `facts`.
pub fn write_fact_set(doc: &mut Document, facts: &FactSet) {
    for fact in facts {
        doc.add_scalar("facts", fact.as_str());
    }
}

/// Read a fact set from the `facts` section; absent section reads empty.
pub fn read_fact_set(doc: &Document) -> FactSet {
    or_default("facts", try_fact_set(doc))
}

/// Write PV samples under `pvs.<name>{status,value,timestamp}`.
///
/// All names are validated before the first write, so a rejected name
/// leaves the document untouched.
pub fn write_pv_map(doc: &mut Document, pvs: &PvMap) -> Result<()> {
    for name in pvs.keys() {
        Document::validate_key(name)?;
    }
    for (name, sample) in pvs {
        let path = Document::join("pvs", name)?;
        let mut node = Document::new();
        node.put("status", sample.status);
        node.put("value", sample.value);
        node.put("timestamp", sample.timestamp);
        doc.put_child(&path, node);
    }
    Ok(())
}

/// Read PV samples from the `pvs` section.
///
/// Each entry's fields default independently; an absent section reads
/// empty.
pub fn read_pv_map(doc: &Document) -> PvMap {
    or_default("pvs", try_pv_map(doc))
}

fn try_string_map(
    doc: &Document,
    root: &'static str,
) -> std::result::Result<BTreeMap<String, String>, DecodeIssue> {
    let section = doc.child(root).ok_or(DecodeIssue::MissingSection(root))?;

    Ok(section
        .children()
        .into_iter()
        .map(|(name, node)| {
            (
                name.to_string(),
                node.as_scalar::<String>().unwrap_or_default(),
            )
        })
        .collect())
}

fn try_fact_set(doc: &Document) -> std::result::Result<FactSet, DecodeIssue> {
    let section = doc
        .child("facts")
        .ok_or(DecodeIssue::MissingSection("facts"))?;

    Ok(section
        .children()
        .into_iter()
        .map(|(_, node)| node.as_scalar::<String>().unwrap_or_default())
        .collect())
}

fn try_pv_map(doc: &Document) -> std::result::Result<PvMap, DecodeIssue> {
    let section = doc
        .child("pvs")
        .ok_or(DecodeIssue::MissingSection("pvs"))?;

    Ok(section
        .children()
        .into_iter()
        .map(|(name, node)| {
            (
                name.to_string(),
                PVData {
                    status: node.get("status", 0i32),
                    value: node.get("value", 0.0),
                    timestamp: node.get("timestamp", 0u32),
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daqmon_doc::DocError;
    use crate::CodecError;

    #[test]
    fn error_map_round_trip() {
        let mut errors = ErrorMap::new();
        errors.insert("beam_on".to_string(), "unknown fact".to_string());
        errors.insert("expr_3".to_string(), "unbalanced parenthesis".to_string());

        let mut doc = Document::new();
        write_error_map(&mut doc, &errors).expect("encode errors");
        assert_eq!(read_error_map(&doc), errors);
    }

    #[test]
    fn error_map_rejects_separator_keys_before_writing() {
        let mut errors = ErrorMap::new();
        errors.insert("chopper.speed".to_string(), "bad".to_string());

        let mut doc = Document::new();
        let err = write_error_map(&mut doc, &errors).expect_err("key must be rejected");
        assert!(matches!(
            err,
            CodecError::Document(DocError::InvalidKey { .. })
        ));
    }

    #[test]
    fn rejected_error_key_leaves_document_untouched() {
        let mut errors = ErrorMap::new();
        errors.insert("alpha_ok".to_string(), "fine".to_string());
        errors.insert("zz.bad".to_string(), "separator".to_string());

        let mut doc = Document::new();
        assert!(write_error_map(&mut doc, &errors).is_err());
        assert!(doc.child("errors").is_none());
    }

    #[test]
    fn rejected_pv_name_leaves_document_untouched() {
        let mut pvs = PvMap::new();
        pvs.insert("temp1".to_string(), PVData::new(293.4, 0, 1_700_000_000));
        pvs.insert("zz.bad".to_string(), PVData::default());

        let mut doc = Document::new();
        assert!(write_pv_map(&mut doc, &pvs).is_err());
        assert!(doc.child("pvs").is_none());
    }

    #[test]
    fn fact_set_round_trip_and_tolerance() {
        let mut facts = FactSet::new();
        facts.insert("beam_on".to_string());
        facts.insert("sms_connected".to_string());

        let mut doc = Document::new();
        write_fact_set(&mut doc, &facts);
        assert_eq!(read_fact_set(&doc), facts);

        assert!(read_fact_set(&Document::new()).is_empty());
    }

    #[test]
    fn pv_entry_fields_default_independently() {
        let mut doc = Document::new();
        doc.put("pvs.temp1.value", 293.4);
        doc.put("pvs.temp1.status", 1i32);
        // no timestamp written

        let pvs = read_pv_map(&doc);
        let sample = pvs.get("temp1").expect("entry decoded");
        assert_eq!(sample.value, 293.4);
        assert_eq!(sample.status, 1);
        assert_eq!(sample.timestamp, 0);
    }

    #[test]
    fn pv_map_round_trip() {
        let mut pvs = PvMap::new();
        pvs.insert("temp1".to_string(), PVData::new(293.4, 0, 1_700_000_000));
        pvs.insert("chopper_speed".to_string(), PVData::new(60.0, 3, 1_700_000_005));

        let mut doc = Document::new();
        write_pv_map(&mut doc, &pvs).expect("encode pvs");
        assert_eq!(read_pv_map(&doc), pvs);
    }
}
