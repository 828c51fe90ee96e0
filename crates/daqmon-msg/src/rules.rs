//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Rule and signal configuration payload facet."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

use crate::facet::{or_default, DecodeIssue};
use crate::level::Level;

/// One rule as configured in the rule engine: a trigger fact and the
/// boolean expression that asserts it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Name of the fact the rule asserts.
    pub fact: String,
    /// Boolean expression text evaluated by the rule engine.
    pub expr: String,
}

/// A named alarm signal bound to a fact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Signal name shown to operators.
    pub name: String,
    /// Fact whose assertion raises the signal.
    pub fact: String,
    /// Subsystem the signal originates from.
    pub source: String,
    /// Severity of the signal.
    pub level: Level,
    /// Human-readable signal message.
    pub msg: String,
}

/// Rule and signal configuration facet.
///
/// Shared structure between the current-config report and the set-config
/// request; each message owns its own copy. Documents encoded by either
/// message decode identically through this facet, which is the contract the
/// set/ack exchange depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePayload {
    /// Configured rules, in transport order.
    pub rules: Vec<RuleInfo>,
    /// Configured signals, in transport order.
    pub signals: Vec<SignalInfo>,
}

impl RulePayload {
    /// Write the `rules.rule[]` and `signals.signal[]` sections.
    ///
    /// Empty lists encode to absent sections, symmetric with decode
    /// tolerance.
    pub fn encode(&self, doc: &mut Document) {
        for rule in &self.rules {
            let mut node = Document::new();
            node.put("fact", rule.fact.as_str());
            node.put("expr", rule.expr.as_str());
            doc.add_child("rules.rule", node);
        }

        for signal in &self.signals {
            let mut node = Document::new();
            node.put("name", signal.name.as_str());
            node.put("fact", signal.fact.as_str());
            node.put("source", signal.source.as_str());
            node.put("level", signal.level.to_wire());
            node.put("message", signal.msg.as_str());
            doc.add_child("signals.signal", node);
        }
    }

    /// Rebuild the facet from a document, replacing all prior contents.
    pub fn decode(doc: &Document) -> Self {
        Self {
            rules: or_default("rules", try_rules(doc)),
            signals: or_default("signals", try_signals(doc)),
        }
    }
}

fn try_rules(doc: &Document) -> std::result::Result<Vec<RuleInfo>, DecodeIssue> {
    let section = doc
        .child("rules")
        .ok_or(DecodeIssue::MissingSection("rules"))?;

    Ok(section
        .children()
        .into_iter()
        .filter(|(name, _)| *name == "rule")
        .map(|(_, node)| RuleInfo {
            fact: node.get("fact", String::new()),
            expr: node.get("expr", String::new()),
        })
        .collect())
}

fn try_signals(doc: &Document) -> std::result::Result<Vec<SignalInfo>, DecodeIssue> {
    let section = doc
        .child("signals")
        .ok_or(DecodeIssue::MissingSection("signals"))?;

    Ok(section
        .children()
        .into_iter()
        .filter(|(name, _)| *name == "signal")
        .map(|(_, node)| SignalInfo {
            name: node.get("name", String::new()),
            fact: node.get("fact", String::new()),
            source: node.get("source", String::new()),
            level: Level::from_wire(node.get("level", 0u16)),
            msg: node.get("message", String::new()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> RulePayload {
        RulePayload {
            rules: vec![
                RuleInfo {
                    fact: "beam_on".to_string(),
                    expr: "pulse_freq > 59".to_string(),
                },
                RuleInfo {
                    fact: "run_stalled".to_string(),
                    expr: "recording && count_rate == 0".to_string(),
                },
            ],
            signals: vec![SignalInfo {
                name: "stalled".to_string(),
                fact: "run_stalled".to_string(),
                source: "sms".to_string(),
                level: Level::Error,
                msg: "no events while recording".to_string(),
            }],
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let payload = sample_payload();
        let mut doc = Document::new();
        payload.encode(&mut doc);
        assert_eq!(RulePayload::decode(&doc), payload);
    }

    #[test]
    fn absent_sections_decode_empty() {
        let doc = Document::new();
        let payload = RulePayload::decode(&doc);
        assert!(payload.rules.is_empty());
        assert!(payload.signals.is_empty());
    }

    #[test]
    fn missing_record_fields_default_individually() {
        let mut doc = Document::new();
        let mut node = Document::new();
        node.put("fact", "beam_on");
        doc.add_child("rules.rule", node);

        let payload = RulePayload::decode(&doc);
        assert_eq!(payload.rules.len(), 1);
        assert_eq!(payload.rules[0].fact, "beam_on");
        assert_eq!(payload.rules[0].expr, "");
    }

    #[test]
    fn empty_payload_encodes_to_empty_document() {
        let mut doc = Document::new();
        RulePayload::default().encode(&mut doc);
        assert!(doc.child("rules").is_none());
        assert!(doc.child("signals").is_none());
    }

    #[test]
    fn unknown_signal_level_survives_the_wire() {
        let mut doc = Document::new();
        let payload = RulePayload {
            rules: Vec::new(),
            signals: vec![SignalInfo {
                level: Level::Unknown(9),
                ..SignalInfo::default()
            }],
        };
        payload.encode(&mut doc);
        assert_eq!(RulePayload::decode(&doc).signals[0].level, Level::Unknown(9));
    }
}
