//! Configuration constants for the mean-party game system
//!
//! This module contains the fixed rules and limits used throughout the
//! game system: how many lives a player starts with, which numbers may be
//! submitted, and the bounds on names, room codes and retries.

/// Game rule constants
pub mod game {
    /// Lives every player starts with when creating or joining a room
    pub const STARTING_POINTS: i32 = 5;
    /// Smallest number a player may submit in a round
    pub const MIN_NUMBER: u8 = 1;
    /// Largest number a player may submit in a round
    pub const MAX_NUMBER: u8 = 100;
    /// Maximum number of players allowed in a single room
    pub const MAX_PLAYER_COUNT: usize = 100;
}

/// Player name constants
pub mod names {
    /// Maximum length of a player name in bytes, before trimming
    pub const MAX_LENGTH: usize = 30;
}

/// Room code constants
pub mod room_code {
    /// Length of generated room codes
    pub const GENERATED_LENGTH: usize = 6;
    /// Longest code accepted when parsing user input
    pub const MAX_LENGTH: usize = 12;
    /// Attempts at picking an unused code before giving up
    pub const MAX_GENERATION_ATTEMPTS: usize = 8;
}

/// Concurrency coordinator constants
pub mod coordinator {
    /// Default number of read-apply-write attempts for one transition
    pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
    /// Upper bound accepted for the attempt budget
    pub const MAX_ATTEMPTS: usize = 20;
    /// Default base backoff between attempts in milliseconds
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 5;
    /// Upper bound accepted for the base backoff in milliseconds
    pub const MAX_RETRY_BACKOFF_MS: u64 = 1000;
}
