//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Beam line and run information payload facets."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

use crate::facet::{or_default, DecodeIssue};

/// Identification of the beam line the daemon monitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamInfo {
    /// Facility name.
    pub facility: String,
    /// Beam line identifier.
    pub beam_id: String,
    /// Beam line short name.
    pub beam_sname: String,
    /// Beam line long name.
    pub beam_lname: String,
}

impl BeamInfo {
    /// Write the beam identification fields.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("facility", self.facility.as_str());
        doc.put("beam_id", self.beam_id.as_str());
        doc.put("beam_sname", self.beam_sname.as_str());
        doc.put("beam_lname", self.beam_lname.as_str());
    }

    /// Read the beam identification fields with per-field defaults.
    pub fn decode(doc: &Document) -> Self {
        Self {
            facility: doc.get("facility", String::new()),
            beam_id: doc.get("beam_id", String::new()),
            beam_sname: doc.get("beam_sname", String::new()),
            beam_lname: doc.get("beam_lname", String::new()),
        }
    }
}

/// One experiment team member attached to a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User identifier in the proposal system.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role within the experiment team.
    pub role: String,
}

/// Proposal, sample, and team information for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// Proposal identifier.
    pub proposal_id: String,
    /// Run title.
    pub run_title: String,
    /// Run number.
    pub run_num: u32,
    /// Sample identifier.
    pub sample_id: String,
    /// Sample name.
    pub sample_name: String,
    /// Sample environment description.
    pub sample_environment: String,
    /// Sample chemical formula.
    pub sample_formula: String,
    /// Sample nature description.
    pub sample_nature: String,
    /// Experiment team, in transport order.
    pub users: Vec<UserInfo>,
}

impl RunInfo {
    /// Write the run scalars and the `users.user[]` section.
    pub fn encode(&self, doc: &mut Document) {
        doc.put("proposal_id", self.proposal_id.as_str());
        doc.put("run_title", self.run_title.as_str());
        doc.put("run_num", self.run_num);
        doc.put("sample_id", self.sample_id.as_str());
        doc.put("sample_name", self.sample_name.as_str());
        doc.put("sample_environment", self.sample_environment.as_str());
        doc.put("sample_formula", self.sample_formula.as_str());
        doc.put("sample_nature", self.sample_nature.as_str());

        for user in &self.users {
            let mut node = Document::new();
            node.put("id", user.id.as_str());
            node.put("name", user.name.as_str());
            node.put("role", user.role.as_str());
            doc.add_child("users.user", node);
        }
    }

    /// Read the run scalars and team list; an absent `users` section reads
    /// as an empty team.
    pub fn decode(doc: &Document) -> Self {
        Self {
            proposal_id: doc.get("proposal_id", String::new()),
            run_title: doc.get("run_title", String::new()),
            run_num: doc.get("run_num", 0u32),
            sample_id: doc.get("sample_id", String::new()),
            sample_name: doc.get("sample_name", String::new()),
            sample_environment: doc.get("sample_environment", String::new()),
            sample_formula: doc.get("sample_formula", String::new()),
            sample_nature: doc.get("sample_nature", String::new()),
            users: or_default("users", try_users(doc)),
        }
    }
}

fn try_users(doc: &Document) -> std::result::Result<Vec<UserInfo>, DecodeIssue> {
    let section = doc
        .child("users")
        .ok_or(DecodeIssue::MissingSection("users"))?;

    Ok(section
        .children()
        .into_iter()
        .filter(|(name, _)| *name == "user")
        .map(|(_, node)| UserInfo {
            id: node.get("id", String::new()),
            name: node.get("name", String::new()),
            role: node.get("role", String::new()),
        })
        .collect())
}
