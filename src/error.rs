//! Errors surfaced to callers of the game service
//!
//! Every variant carries the offending field or value so that a UI can
//! render an actionable message. Validation errors are always produced
//! before anything is written to the store.

use serde::Serialize;
use thiserror::Error;

use crate::{names, room_code::RoomCode, store::StoreError};

/// Errors returned by session transitions and the game service
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Error {
    /// A name, number or code failed basic validation
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// The offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
    /// No room exists under the given code
    #[error("room {code} not found")]
    SessionNotFound {
        /// The requested room code
        code: RoomCode,
    },
    /// Another player in the room already uses this name
    #[error("name {name} is already taken")]
    NameTaken {
        /// The requested name
        name: String,
    },
    /// The room no longer accepts new players
    #[error("room {code} has already started")]
    SessionAlreadyStarted {
        /// The room code
        code: RoomCode,
    },
    /// The player already submitted a number this round
    #[error("{name} already submitted a number this round")]
    AlreadySubmitted {
        /// The submitting player
        name: String,
    },
    /// There is no open round to submit into
    #[error("no open round in room {code}")]
    RoundClosed {
        /// The room code
        code: RoomCode,
    },
    /// The submitted number is outside the allowed range
    #[error("number {number} is out of range")]
    OutOfRange {
        /// The submitted number
        number: i64,
    },
    /// Other writers kept winning the race for the room
    #[error("room {code} was modified concurrently {attempts} times")]
    ConcurrentModification {
        /// The room code
        code: RoomCode,
        /// Attempts made before giving up
        attempts: usize,
    },
    /// The backing store could not be reached
    #[error("session store unavailable: {reason}")]
    StoreUnavailable {
        /// Adapter-provided detail
        reason: String,
    },
    /// The room has reached its player cap
    #[error("room is full ({capacity} players)")]
    SessionFull {
        /// The configured cap
        capacity: usize,
    },
    /// The game in this room is over
    #[error("game in room {code} is finished")]
    SessionFinished {
        /// The room code
        code: RoomCode,
    },
    /// Too few players to start the first round
    #[error("{required} players are required to start, {present} present")]
    NotEnoughPlayers {
        /// Players needed
        required: usize,
        /// Players currently in the room
        present: usize,
    },
    /// The current round has not been resolved yet
    #[error("round in room {code} is still in progress")]
    RoundInProgress {
        /// The room code
        code: RoomCode,
    },
    /// No player with this name is in the room
    #[error("no player named {name}")]
    PlayerNotFound {
        /// The requested name
        name: String,
    },
    /// The player has no lives left
    #[error("{name} has been eliminated")]
    PlayerEliminated {
        /// The eliminated player
        name: String,
    },
}

/// Discriminant of [`Error`] without the associated data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[allow(missing_docs)]
pub enum ErrorKind {
    InvalidInput,
    SessionNotFound,
    NameTaken,
    SessionAlreadyStarted,
    AlreadySubmitted,
    RoundClosed,
    OutOfRange,
    ConcurrentModification,
    StoreUnavailable,
    SessionFull,
    SessionFinished,
    NotEnoughPlayers,
    RoundInProgress,
    PlayerNotFound,
    PlayerEliminated,
}

impl Error {
    /// Returns the kind of this error, useful for matching in UI code
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::SessionNotFound { .. } => ErrorKind::SessionNotFound,
            Self::NameTaken { .. } => ErrorKind::NameTaken,
            Self::SessionAlreadyStarted { .. } => ErrorKind::SessionAlreadyStarted,
            Self::AlreadySubmitted { .. } => ErrorKind::AlreadySubmitted,
            Self::RoundClosed { .. } => ErrorKind::RoundClosed,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            Self::StoreUnavailable { .. } => ErrorKind::StoreUnavailable,
            Self::SessionFull { .. } => ErrorKind::SessionFull,
            Self::SessionFinished { .. } => ErrorKind::SessionFinished,
            Self::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
            Self::RoundInProgress { .. } => ErrorKind::RoundInProgress,
            Self::PlayerNotFound { .. } => ErrorKind::PlayerNotFound,
            Self::PlayerEliminated { .. } => ErrorKind::PlayerEliminated,
        }
    }

    /// Builds an [`Error::InvalidInput`] for the given field
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Maps a store error for the given room into a caller-facing error
    ///
    /// Version conflicts are normally consumed by the coordinator; one that
    /// leaks out here is reported as a single failed attempt.
    pub fn from_store(code: &RoomCode, error: StoreError) -> Self {
        match error {
            StoreError::NotFound => Self::SessionNotFound { code: code.clone() },
            StoreError::VersionConflict { .. } | StoreError::CodeTaken => {
                Self::ConcurrentModification {
                    code: code.clone(),
                    attempts: 1,
                }
            }
            StoreError::Unavailable(reason) => Self::StoreUnavailable { reason },
        }
    }
}

impl From<names::Error> for Error {
    fn from(error: names::Error) -> Self {
        Self::invalid_input("name", error.to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::store::Version;

    fn code() -> RoomCode {
        "ABC123".parse().unwrap()
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::NameTaken {
                name: "Ann".to_owned()
            }
            .to_string(),
            "name Ann is already taken"
        );
        assert_eq!(
            Error::OutOfRange { number: 101 }.to_string(),
            "number 101 is out of range"
        );
        assert_eq!(
            Error::SessionNotFound { code: code() }.to_string(),
            "room ABC123 not found"
        );
    }

    #[test]
    fn test_name_error_becomes_invalid_input() {
        let error: Error = names::Error::Empty.into();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            error,
            Error::InvalidInput {
                field: "name",
                reason: "name cannot be empty".to_owned()
            }
        );
    }

    #[test]
    fn test_store_error_mapping() {
        assert_eq!(
            Error::from_store(&code(), StoreError::NotFound).kind(),
            ErrorKind::SessionNotFound
        );
        assert_eq!(
            Error::from_store(&code(), StoreError::Unavailable("down".to_owned())),
            Error::StoreUnavailable {
                reason: "down".to_owned()
            }
        );
        assert_eq!(
            Error::from_store(
                &code(),
                StoreError::VersionConflict {
                    expected: Version::INITIAL,
                    actual: Version::INITIAL.next()
                }
            )
            .kind(),
            ErrorKind::ConcurrentModification
        );
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(Error::AlreadySubmitted {
            name: "Bo".to_owned(),
        })
        .unwrap();
        assert_eq!(json["kind"], "already_submitted");
        assert_eq!(json["name"], "Bo");
    }
}
