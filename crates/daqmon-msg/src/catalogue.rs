//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Type-tag registry and dispatch for inbound documents."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! The message catalogue: a stateless mapping from type tag to decode
//! routine, built once at first use and queried once per inbound document.

use std::collections::BTreeMap;

use daqmon_doc::Document;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::envelope::MessageCodec;
use crate::messages::{
    BeamInfoMessage, BeamMetricsMessage, ConnectionStatusMessage, GetInputFacts,
    GetProcessVariables, GetRuleDefinitions, InputFacts, PauseStatusMessage, ProcessVariables,
    RestoreDefaultRuleDefinitions, RuleDefinitions, RuleErrors, RunInfoMessage,
    RunMetricsMessage, RunStatusMessage, ScanStatusMessage, SetRuleDefinitions,
    StreamMetricsMessage,
};
use crate::{CodecError, Result};

/// Wire type tags, one per message kind, fixed at compile time.
///
/// The tag is the dispatch key: the transport reads it before any payload
/// parsing and the catalogue resolves it to the matching decode routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum MsgType {
    /// Request the current rule and signal configuration.
    GetRuleDefinitions = 0x0401,
    /// Request restoration of the default rules and signals.
    RestoreDefaultRuleDefinitions = 0x0402,
    /// Request a snapshot of all defined process variables.
    GetProcessVariables = 0x0403,
    /// Request the facts available as rule inputs.
    GetInputFacts = 0x0404,
    /// Current rule and signal configuration report.
    RuleDefinitions = 0x0405,
    /// Rule and signal configuration request.
    SetRuleDefinitions = 0x0406,
    /// Rule configuration error report.
    RuleErrors = 0x0407,
    /// Available rule input facts.
    InputFacts = 0x0408,
    /// Process-variable snapshot.
    ProcessVariables = 0x0409,
    /// Data-source connection status broadcast.
    ConnectionStatus = 0x0410,
    /// Run recording status broadcast.
    RunStatus = 0x0411,
    /// Acquisition pause status broadcast.
    PauseStatus = 0x0412,
    /// Scan status broadcast.
    ScanStatus = 0x0413,
    /// Beam line identification broadcast.
    BeamInfo = 0x0414,
    /// Run information broadcast.
    RunInfo = 0x0415,
    /// Live beam metrics broadcast.
    BeamMetrics = 0x0416,
    /// Per-run aggregate counter broadcast.
    RunMetrics = 0x0417,
    /// Event-stream defect counter broadcast.
    StreamMetrics = 0x0418,
}

impl MsgType {
    /// Every tag in the catalogue, in declaration order.
    pub const ALL: [MsgType; 18] = [
        MsgType::GetRuleDefinitions,
        MsgType::RestoreDefaultRuleDefinitions,
        MsgType::GetProcessVariables,
        MsgType::GetInputFacts,
        MsgType::RuleDefinitions,
        MsgType::SetRuleDefinitions,
        MsgType::RuleErrors,
        MsgType::InputFacts,
        MsgType::ProcessVariables,
        MsgType::ConnectionStatus,
        MsgType::RunStatus,
        MsgType::PauseStatus,
        MsgType::ScanStatus,
        MsgType::BeamInfo,
        MsgType::RunInfo,
        MsgType::BeamMetrics,
        MsgType::RunMetrics,
        MsgType::StreamMetrics,
    ];

    /// The numeric wire tag.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Resolve a wire tag back to its catalogue entry.
    pub fn from_tag(tag: u32) -> Option<Self> {
        MsgType::ALL.iter().copied().find(|kind| kind.tag() == tag)
    }
}

type DecodeFn = fn(&Document) -> Message;

macro_rules! catalogue {
    ($($variant:ident => $msg:ty),* $(,)?) => {
        /// A decoded bus message of any catalogue kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Message {
            $(
                #[doc = concat!("A `", stringify!($variant), "` message.")]
                $variant($msg),
            )*
        }

        impl Message {
            /// The type tag of the wrapped message.
            pub fn msg_type(&self) -> MsgType {
                match self {
                    $(Message::$variant(inner) => inner.msg_type(),)*
                }
            }

            /// Encode the wrapped message into `doc`.
            pub fn encode(&self, doc: &mut Document) -> Result<()> {
                match self {
                    $(Message::$variant(inner) => inner.write(doc),)*
                }
            }
        }

        $(
            impl From<$msg> for Message {
                fn from(inner: $msg) -> Self {
                    Message::$variant(inner)
                }
            }
        )*

        static DECODERS: Lazy<BTreeMap<u32, DecodeFn>> = Lazy::new(|| {
            let mut table: BTreeMap<u32, DecodeFn> = BTreeMap::new();
            $(
                table.insert(MsgType::$variant.tag(), (|doc: &Document| {
                    let mut inner = <$msg>::default();
                    inner.read(doc);
                    Message::$variant(inner)
                }) as DecodeFn);
            )*
            table
        });
    };
}

catalogue! {
    GetRuleDefinitions => GetRuleDefinitions,
    RestoreDefaultRuleDefinitions => RestoreDefaultRuleDefinitions,
    GetProcessVariables => GetProcessVariables,
    GetInputFacts => GetInputFacts,
    RuleDefinitions => RuleDefinitions,
    SetRuleDefinitions => SetRuleDefinitions,
    RuleErrors => RuleErrors,
    InputFacts => InputFacts,
    ProcessVariables => ProcessVariables,
    ConnectionStatus => ConnectionStatusMessage,
    RunStatus => RunStatusMessage,
    PauseStatus => PauseStatusMessage,
    ScanStatus => ScanStatusMessage,
    BeamInfo => BeamInfoMessage,
    RunInfo => RunInfoMessage,
    BeamMetrics => BeamMetricsMessage,
    RunMetrics => RunMetricsMessage,
    StreamMetrics => StreamMetricsMessage,
}

/// Decode an inbound document into its catalogue message.
///
/// The only failure mode is an unrecognized (or missing) type tag; payload
/// problems recover to facet defaults inside the message's own `read`.
pub fn decode_message(doc: &Document) -> Result<Message> {
    let tag = doc.get("msg_type", 0u32);
    match DECODERS.get(&tag) {
        Some(decode) => Ok(decode(doc)),
        None => {
            tracing::warn!(tag, "unrecognized message type received on bus");
            Err(CodecError::UnknownMsgType(tag))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn tags_are_pairwise_distinct() {
        let unique: BTreeSet<u32> = MsgType::ALL.iter().map(|kind| kind.tag()).collect();
        assert_eq!(unique.len(), MsgType::ALL.len());
    }

    #[test]
    fn every_tag_has_exactly_one_decoder() {
        assert_eq!(DECODERS.len(), MsgType::ALL.len());
        for kind in MsgType::ALL {
            assert!(DECODERS.contains_key(&kind.tag()));
            assert_eq!(MsgType::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn unknown_tag_is_an_explicit_error() {
        let mut doc = Document::new();
        doc.put("msg_type", 0x7fff_u32);
        assert!(matches!(
            decode_message(&doc),
            Err(CodecError::UnknownMsgType(0x7fff))
        ));
    }

    #[test]
    fn missing_tag_is_reported_as_tag_zero() {
        assert!(matches!(
            decode_message(&Document::new()),
            Err(CodecError::UnknownMsgType(0))
        ));
    }

    #[test]
    fn dispatch_reconstructs_the_concrete_type() {
        let msg = GetProcessVariables::default();
        let mut doc = Document::new();
        msg.write(&mut doc).expect("write marker message");

        match decode_message(&doc).expect("dispatch") {
            Message::GetProcessVariables(inner) => assert_eq!(inner.envelope, msg.envelope),
            other => panic!("dispatched to wrong variant: {other:?}"),
        }
    }
}
