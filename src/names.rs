//! Player name validation
//!
//! Names are a player's identity within a room, so they are normalized
//! (surrounding whitespace removed) and checked for length and content
//! before a player is admitted. Uniqueness is enforced by the session.

use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

use crate::constants::names::MAX_LENGTH;

/// Errors that can occur during name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Sinful,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Validates a requested player name and returns its cleaned form
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds 30 bytes
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Sinful` - Name contains inappropriate content
pub fn clean(name: &str) -> Result<String, Error> {
    if name.len() > MAX_LENGTH {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_clean_accepts_plain_name() {
        assert_eq!(clean("TestPlayer"), Ok("TestPlayer".to_owned()));
    }

    #[test]
    fn test_clean_too_long() {
        assert_eq!(clean(&"a".repeat(31)), Err(Error::TooLong));
        assert_eq!(clean(&"a".repeat(30)), Ok("a".repeat(30)));
    }

    #[test]
    fn test_clean_empty() {
        assert_eq!(clean(""), Err(Error::Empty));
        assert_eq!(clean("   "), Err(Error::Empty));
        assert_eq!(clean("\t\n"), Err(Error::Empty));
    }

    #[test]
    fn test_clean_trims_whitespace() {
        assert_eq!(clean("  TestPlayer  "), Ok("TestPlayer".to_owned()));
    }

    #[test]
    fn test_clean_inappropriate_content() {
        for name in ["fuck", "shit"] {
            assert_eq!(
                clean(name),
                Err(Error::Sinful),
                "Expected '{name}' to be flagged as inappropriate"
            );
        }
    }

    #[test]
    fn test_clean_unicode_support() {
        let unicode_name = "Плеер测试🎮";
        assert_eq!(clean(unicode_name), Ok(unicode_name.to_owned()));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::Sinful.to_string(), "name is inappropriate");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
    }
}
