//! Room code generation and parsing
//!
//! Rooms are identified by short uppercase alphanumeric codes that players
//! read out to each other. Parsing is case-insensitive so that a code typed
//! in lowercase still finds its room.

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

use crate::constants::room_code::{GENERATED_LENGTH, MAX_LENGTH};

/// Characters used when generating a code
const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A room identifier, always uppercase ASCII alphanumeric
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct RoomCode(String);

/// Errors that can occur when parsing a room code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The code is empty after trimming whitespace
    #[error("room code cannot be empty")]
    Empty,
    /// The code is longer than any code we hand out
    #[error("room code is too long")]
    TooLong,
    /// The code contains something other than letters and digits
    #[error("room code must be alphanumeric")]
    NotAlphanumeric,
}

impl RoomCode {
    /// Creates a new random room code
    ///
    /// Uniqueness is not guaranteed here; the store rejects codes that are
    /// already in use and the caller draws again.
    pub fn new() -> Self {
        Self(
            (0..GENERATED_LENGTH)
                .map(|_| char::from(ALPHABET[fastrand::usize(..ALPHABET.len())]))
                .collect(),
        )
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomCode {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = Error;

    /// Parses a room code, trimming whitespace and normalizing to uppercase
    ///
    /// # Errors
    ///
    /// * `Error::Empty` - nothing left after trimming
    /// * `Error::TooLong` - more than 12 characters
    /// * `Error::NotAlphanumeric` - anything other than ASCII letters and digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Empty);
        }
        if s.len() > MAX_LENGTH {
            return Err(Error::TooLong);
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::NotAlphanumeric);
        }
        Ok(Self(s.to_ascii_uppercase()))
    }
}

impl From<Error> for crate::Error {
    fn from(error: Error) -> Self {
        Self::invalid_input("code", error.to_string())
    }
}
