//! ---
//! daq_section: "02-bus-message-codec"
//! daq_subsection: "module"
//! daq_type: "source"
//! daq_scope: "code"
//! daq_description: "Try-decode combinator shared by all payload facets."
//! daq_version: "v0.0.0-prealpha"
//! daq_owner: "tbd"
//! ---
//! Facet decode tolerance.
//!
//! Payload facets are independent encode/decode units composed into
//! messages. Facet decode itself never fails: each tolerant section is
//! implemented as a `try_*` routine returning `Result<T, DecodeIssue>`, and
//! [`or_default`] substitutes the section default on any issue. This keeps
//! the recovery path explicit and testable instead of hiding it in a
//! catch-all.

/// Why a facet section could not be decoded as written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeIssue {
    /// The expected subtree is absent; symmetric with an empty section,
    /// which encodes to no subtree at all.
    #[error("section `{0}` is absent")]
    MissingSection(&'static str),
    /// An entry key could not be parsed in its expected form.
    #[error("entry key `{0}` is malformed")]
    BadKey(String),
    /// An entry value could not be parsed in its expected form.
    #[error("entry value under key `{0}` is malformed")]
    BadValue(String),
}

/// Resolve a tolerant section decode, substituting the default on any issue.
pub(crate) fn or_default<T: Default>(
    section: &'static str,
    outcome: Result<T, DecodeIssue>,
) -> T {
    match outcome {
        Ok(value) => value,
        Err(DecodeIssue::MissingSection(_)) => {
            tracing::trace!(section, "optional section absent, using default");
            T::default()
        }
        Err(issue) => {
            tracing::debug!(section, %issue, "malformed section, falling back to default");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_values_pass_through() {
        let decoded: Vec<u32> = or_default("rules", Ok(vec![1, 2]));
        assert_eq!(decoded, vec![1, 2]);
    }

    #[test]
    fn issues_substitute_the_default() {
        let decoded: Vec<u32> =
            or_default("monitors", Err(DecodeIssue::BadKey("beam".to_string())));
        assert!(decoded.is_empty());
    }
}
