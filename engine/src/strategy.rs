//! Reconciliation strategies.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User-selected policy for combining a local and a server cart.
///
/// Wire names match the storefront protocol. An *absent* strategy defaults
/// to [`ReconcileStrategy::KeepLocalDiscardServer`]; an *unrecognized* name
/// is a configuration error and is rejected at the parsing boundary with
/// [`Error::InvalidStrategy`] rather than silently mapped to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileStrategy {
    /// Keep the local cart as-is, the server copy is overwritten
    #[default]
    KeepLocalDiscardServer,
    /// Take the server cart as-is, local changes are dropped
    UseServerDiscardLocal,
    /// Combine both, server fields win and quantities take the max
    Merge,
}

impl ReconcileStrategy {
    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileStrategy::KeepLocalDiscardServer => "keepLocalDiscardServer",
            ReconcileStrategy::UseServerDiscardLocal => "useServerDiscardLocal",
            ReconcileStrategy::Merge => "merge",
        }
    }
}

impl std::fmt::Display for ReconcileStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcileStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keepLocalDiscardServer" => Ok(ReconcileStrategy::KeepLocalDiscardServer),
            "useServerDiscardLocal" => Ok(ReconcileStrategy::UseServerDiscardLocal),
            "merge" => Ok(ReconcileStrategy::Merge),
            other => Err(Error::InvalidStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!(
            "keepLocalDiscardServer".parse::<ReconcileStrategy>().unwrap(),
            ReconcileStrategy::KeepLocalDiscardServer
        );
        assert_eq!(
            "useServerDiscardLocal".parse::<ReconcileStrategy>().unwrap(),
            ReconcileStrategy::UseServerDiscardLocal
        );
        assert_eq!(
            "merge".parse::<ReconcileStrategy>().unwrap(),
            ReconcileStrategy::Merge
        );
    }

    #[test]
    fn unknown_name_is_a_configuration_error() {
        let err = "deleteServer".parse::<ReconcileStrategy>().unwrap_err();
        assert_eq!(err, Error::InvalidStrategy("deleteServer".to_string()));
    }

    #[test]
    fn absent_strategy_defaults_to_keep_local() {
        assert_eq!(
            ReconcileStrategy::default(),
            ReconcileStrategy::KeepLocalDiscardServer
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ReconcileStrategy::Merge).unwrap();
        assert_eq!(json, r#""merge""#);

        let parsed: ReconcileStrategy =
            serde_json::from_str(r#""useServerDiscardLocal""#).unwrap();
        assert_eq!(parsed, ReconcileStrategy::UseServerDiscardLocal);

        assert!(serde_json::from_str::<ReconcileStrategy>(r#""nope""#).is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(
            ReconcileStrategy::KeepLocalDiscardServer.to_string(),
            "keepLocalDiscardServer"
        );
    }
}
