//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Concrete bus messages composing the envelope with payload facets."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! The message catalogue.
//!
//! Every message composes the [`Envelope`] with zero, one, or two payload
//! facets held as plain named fields; `write`/`read` invoke each facet
//! explicitly in declared order. Marker messages carry the envelope alone.

use daqmon_doc::Document;
use serde::{Deserialize, Serialize};

use crate::beamline::{BeamInfo, RunInfo};
use crate::catalogue::MsgType;
use crate::envelope::{Envelope, MessageCodec};
use crate::maps::{
    read_error_map, read_fact_set, read_pv_map, write_error_map, write_fact_set, write_pv_map,
    ErrorMap, FactSet, PvMap,
};
use crate::metrics::{BeamMetrics, RunMetrics, StreamMetrics};
use crate::rules::RulePayload;
use crate::status::{ConnectionStatus, PauseStatus, RunStatus, ScanStatus};
use crate::Result;

macro_rules! simple_message {
    ($(#[$doc:meta])* $name:ident => $tag:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Transport envelope.
            pub envelope: Envelope,
        }

        impl MessageCodec for $name {
            fn msg_type(&self) -> MsgType {
                $tag
            }

            fn write(&self, doc: &mut Document) -> Result<()> {
                self.envelope.write($tag, doc);
                Ok(())
            }

            fn read(&mut self, doc: &Document) {
                self.envelope.read(doc);
            }
        }
    };
}

simple_message!(
    /// Requests the current rule and signal configuration.
    GetRuleDefinitions => MsgType::GetRuleDefinitions
);

simple_message!(
    /// Requests that the daemon restore its default rules and signals.
    RestoreDefaultRuleDefinitions => MsgType::RestoreDefaultRuleDefinitions
);

simple_message!(
    /// Requests a snapshot of all currently defined process variables.
    GetProcessVariables => MsgType::GetProcessVariables
);

simple_message!(
    /// Requests the facts available as rule inputs.
    GetInputFacts => MsgType::GetInputFacts
);

/// Reports the rule and signal configuration currently in effect.
///
/// Sent in response to [`GetRuleDefinitions`], and as the acknowledgement
/// of a [`SetRuleDefinitions`] request: the daemon echoes the configuration
/// it actually applied through the same payload facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinitions {
    /// Transport envelope.
    pub envelope: Envelope,
    /// Rule and signal configuration.
    pub payload: RulePayload,
}

impl MessageCodec for RuleDefinitions {
    fn msg_type(&self) -> MsgType {
        MsgType::RuleDefinitions
    }

    fn write(&self, doc: &mut Document) -> Result<()> {
        self.envelope.write(MsgType::RuleDefinitions, doc);
        self.payload.encode(doc);
        Ok(())
    }

    fn read(&mut self, doc: &Document) {
        self.envelope.read(doc);
        self.payload = RulePayload::decode(doc);
    }
}

/// Replaces the daemon's rule and signal configuration.
///
/// Structurally compatible with [`RuleDefinitions`]: both carry the same
/// payload facet, and the `set_default` flag rides alongside it with its
/// own default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetRuleDefinitions {
    /// Transport envelope.
    pub envelope: Envelope,
    /// Rule and signal configuration to apply.
    pub payload: RulePayload,
    /// Also store the configuration as the new default set.
    pub set_default: bool,
}

impl MessageCodec for SetRuleDefinitions {
    fn msg_type(&self) -> MsgType {
        MsgType::SetRuleDefinitions
    }

    fn write(&self, doc: &mut Document) -> Result<()> {
        self.envelope.write(MsgType::SetRuleDefinitions, doc);
        self.payload.encode(doc);
        doc.put("set_default", self.set_default);
        Ok(())
    }

    fn read(&mut self, doc: &Document) {
        self.envelope.read(doc);
        self.payload = RulePayload::decode(doc);
        self.set_default = doc.get("set_default", false);
    }
}

/// Reports rule configuration errors keyed by the offending name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleErrors {
    /// Transport envelope.
    pub envelope: Envelope,
    /// Error descriptions keyed by fact or field name.
    pub errors: ErrorMap,
}

impl MessageCodec for RuleErrors {
    fn msg_type(&self) -> MsgType {
        MsgType::RuleErrors
    }

    fn write(&self, doc: &mut Document) -> Result<()> {
        self.envelope.write(MsgType::RuleErrors, doc);
        write_error_map(doc, &self.errors)
    }

    fn read(&mut self, doc: &Document) {
        self.envelope.read(doc);
        self.errors = read_error_map(doc);
    }
}

/// Reports the facts available as rule inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFacts {
    /// Transport envelope.
    pub envelope: Envelope,
    /// Available fact names.
    pub facts: FactSet,
}

impl MessageCodec for InputFacts {
    fn msg_type(&self) -> MsgType {
        MsgType::InputFacts
    }

    fn write(&self, doc: &mut Document) -> Result<()> {
        self.envelope.write(MsgType::InputFacts, doc);
        write_fact_set(doc, &self.facts);
        Ok(())
    }

    fn read(&mut self, doc: &Document) {
        self.envelope.read(doc);
        self.facts = read_fact_set(doc);
    }
}

/// Reports the last-known samples of all defined process variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessVariables {
    /// Transport envelope.
    pub envelope: Envelope,
    /// PV samples keyed by name.
    pub pvs: PvMap,
}

impl MessageCodec for ProcessVariables {
    fn msg_type(&self) -> MsgType {
        MsgType::ProcessVariables
    }

    fn write(&self, doc: &mut Document) -> Result<()> {
        self.envelope.write(MsgType::ProcessVariables, doc);
        write_pv_map(doc, &self.pvs)
    }

    fn read(&mut self, doc: &Document) {
        self.envelope.read(doc);
        self.pvs = read_pv_map(doc);
    }
}

macro_rules! facet_message {
    ($(#[$doc:meta])* $name:ident, $field:ident : $facet:ty => $tag:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            /// Transport envelope.
            pub envelope: Envelope,
            /// Payload facet.
            pub $field: $facet,
        }

        impl $name {
            /// Wrap a payload in a fresh envelope.
            pub fn new($field: $facet) -> Self {
                Self {
                    envelope: Envelope::default(),
                    $field,
                }
            }
        }

        impl From<$facet> for $name {
            fn from($field: $facet) -> Self {
                Self::new($field)
            }
        }

        impl MessageCodec for $name {
            fn msg_type(&self) -> MsgType {
                $tag
            }

            fn write(&self, doc: &mut Document) -> Result<()> {
                self.envelope.write($tag, doc);
                self.$field.encode(doc);
                Ok(())
            }

            fn read(&mut self, doc: &Document) {
                self.envelope.read(doc);
                self.$field = <$facet>::decode(doc);
            }
        }
    };
}

facet_message!(
    /// Broadcast of the daemon's connection status towards the data source.
    ConnectionStatusMessage, status: ConnectionStatus => MsgType::ConnectionStatus
);

facet_message!(
    /// Broadcast of the current run recording state.
    RunStatusMessage, status: RunStatus => MsgType::RunStatus
);

facet_message!(
    /// Broadcast of the acquisition pause state.
    PauseStatusMessage, status: PauseStatus => MsgType::PauseStatus
);

facet_message!(
    /// Broadcast of the scan state and index.
    ScanStatusMessage, status: ScanStatus => MsgType::ScanStatus
);

facet_message!(
    /// Broadcast of beam line identification.
    BeamInfoMessage, info: BeamInfo => MsgType::BeamInfo
);

facet_message!(
    /// Broadcast of proposal, sample, and team information.
    RunInfoMessage, info: RunInfo => MsgType::RunInfo
);

facet_message!(
    /// Broadcast of live beam metrics.
    BeamMetricsMessage, metrics: BeamMetrics => MsgType::BeamMetrics
);

facet_message!(
    /// Broadcast of per-run aggregate counters.
    RunMetricsMessage, metrics: RunMetrics => MsgType::RunMetrics
);

facet_message!(
    /// Broadcast of event-stream defect counters.
    StreamMetricsMessage, metrics: StreamMetrics => MsgType::StreamMetrics
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{RuleInfo, SignalInfo};
    use crate::Level;

    #[test]
    fn simple_messages_carry_only_the_envelope() {
        let msg = GetInputFacts::default();
        let mut doc = Document::new();
        msg.write(&mut doc).expect("write marker message");

        assert_eq!(doc.get("msg_type", 0u32), MsgType::GetInputFacts.tag());
        assert!(doc.child("facts").is_none());

        let mut decoded = GetInputFacts::default();
        decoded.read(&doc);
        assert_eq!(decoded.envelope, msg.envelope);
    }

    #[test]
    fn set_rule_definitions_decodes_as_rule_definitions() {
        let request = SetRuleDefinitions {
            payload: RulePayload {
                rules: vec![RuleInfo {
                    fact: "f1".to_string(),
                    expr: "e1".to_string(),
                }],
                signals: vec![SignalInfo {
                    name: "s1".to_string(),
                    fact: "f1".to_string(),
                    source: "src".to_string(),
                    level: Level::from_wire(2),
                    msg: "warn".to_string(),
                }],
            },
            set_default: true,
            ..SetRuleDefinitions::default()
        };

        let mut doc = Document::new();
        request.write(&mut doc).expect("write request");

        let mut response = RuleDefinitions::default();
        response.read(&doc);
        assert_eq!(response.payload, request.payload);
    }

    #[test]
    fn set_default_flag_defaults_false_independently() {
        let mut doc = Document::new();
        RuleDefinitions::default().write(&mut doc).expect("write");

        let mut decoded = SetRuleDefinitions::default();
        decoded.read(&doc);
        assert!(!decoded.set_default);
    }

    #[test]
    fn run_status_message_round_trip() {
        let msg = RunStatusMessage::new(RunStatus {
            recording: true,
            run_number: 4821,
            timestamp: 1_700_000_000,
        });
        let mut doc = Document::new();
        msg.write(&mut doc).expect("write run status");

        let mut decoded = RunStatusMessage::default();
        decoded.read(&doc);
        assert_eq!(decoded, msg);
    }
}
