//! Runtime options for a game service
//!
//! Unlike the fixed rules in [`crate::constants`], these options can be
//! supplied by the embedding application (for example deserialized from a
//! configuration file) and are validated before a service is built.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants::{coordinator, game};

/// Options controlling room policy and the retry behaviour of the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Read-apply-write attempts per transition before reporting a conflict
    #[garde(range(min = 1, max = coordinator::MAX_ATTEMPTS))]
    pub max_attempts: usize,
    /// Base delay between attempts, multiplied by the attempt number
    #[garde(range(max = coordinator::MAX_RETRY_BACKOFF_MS))]
    pub retry_backoff_ms: u64,
    /// Players required before the first round may start
    #[garde(range(min = 1, max = game::MAX_PLAYER_COUNT))]
    pub min_players_to_start: usize,
    /// Players allowed in one room
    #[garde(range(min = 2, max = game::MAX_PLAYER_COUNT))]
    pub max_players: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_attempts: coordinator::DEFAULT_MAX_ATTEMPTS,
            retry_backoff_ms: coordinator::DEFAULT_RETRY_BACKOFF_MS,
            min_players_to_start: 2,
            max_players: 20,
        }
    }
}
