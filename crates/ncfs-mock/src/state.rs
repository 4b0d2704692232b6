//! Simulated server states.

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Condition of the simulated remote.
///
/// Each state names what the einstein home currently holds; transitions
/// between them are driven by the fixture table. `Error` is the sentinel
/// entered after an unmatched request or a transition with no successor.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, IntoStaticStr,
)]
pub enum ServerState {
    #[strum(serialize = "ERROR")]
    Error,
    #[default]
    #[strum(serialize = "EMPTY")]
    Empty,
    #[strum(serialize = "HOME")]
    Home,
    #[strum(serialize = "SUBDIR")]
    Subdir,
    #[strum(serialize = "NEWDIR")]
    Newdir,
    #[strum(serialize = "SUBDIR-NEWDIR")]
    SubdirNewdir,
    #[strum(serialize = "FILE-RESTORED")]
    FileRestored,
    #[strum(serialize = "GRANT-ADDED")]
    GrantAdded,
    #[strum(serialize = "GRANT-UPDATED")]
    GrantUpdated,
    #[strum(serialize = "RECYCLE")]
    Recycle,
    #[strum(serialize = "REFERENCE")]
    Reference,
    #[strum(serialize = "METADATA")]
    Metadata,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ServerState::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_names_round_trip() {
        for state in ServerState::iter() {
            assert_eq!(state.as_str().parse::<ServerState>(), Ok(state));
            assert_eq!(state.to_string(), state.as_str());
        }
    }

    #[test]
    fn test_compound_names() {
        assert_eq!(ServerState::SubdirNewdir.as_str(), "SUBDIR-NEWDIR");
        assert_eq!(ServerState::FileRestored.as_str(), "FILE-RESTORED");
        assert_eq!("GRANT-ADDED".parse().ok(), Some(ServerState::GrantAdded));
        assert!("nope".parse::<ServerState>().is_err());
    }

    #[test]
    fn test_starts_empty() {
        assert_eq!(ServerState::default(), ServerState::Empty);
        assert!(ServerState::Error.is_error());
    }
}
