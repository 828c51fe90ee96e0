//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Signal severity level carried as a small unsigned integer."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

/// Severity of an alarm signal.
///
/// Carried on the wire as its small unsigned integer. An out-of-range wire
/// value is preserved losslessly in [`Level::Unknown`] rather than clamped
/// or rejected, so a newer peer's levels survive a relay through an older
/// one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Informational signal.
    #[default]
    Info,
    /// Warning signal.
    Warning,
    /// Error signal.
    Error,
    /// Fatal signal.
    Fatal,
    /// A wire value outside the known range, preserved as-is.
    Unknown(u16),
}

impl Level {
    /// Decode a level from its wire integer.
    pub fn from_wire(raw: u16) -> Self {
        match raw {
            0 => Level::Info,
            1 => Level::Warning,
            2 => Level::Error,
            3 => Level::Fatal,
            other => Level::Unknown(other),
        }
    }

    /// Encode this level as its wire integer.
    pub fn to_wire(self) -> u16 {
        match self {
            Level::Info => 0,
            Level::Warning => 1,
            Level::Error => 2,
            Level::Fatal => 3,
            Level::Unknown(raw) => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_round_trip() {
        for raw in 0..4u16 {
            assert_eq!(Level::from_wire(raw).to_wire(), raw);
        }
    }

    #[test]
    fn out_of_range_levels_are_preserved() {
        let level = Level::from_wire(7);
        assert_eq!(level, Level::Unknown(7));
        assert_eq!(level.to_wire(), 7);
    }
}
