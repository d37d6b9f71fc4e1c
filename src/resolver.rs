//! Round resolution
//!
//! Once every participant has submitted a number the round is resolved:
//! the player whose number is closest to the mean is safe and every other
//! participant loses a life. Resolution is a pure function of the player
//! list and the submitted numbers.

use std::collections::HashMap;

use crate::{
    error::Error,
    session::{Player, Status},
};

/// The outcome of resolving a complete round
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Arithmetic mean of all submitted numbers
    pub mean: f64,
    /// The participant closest to the mean (the round's safe player)
    pub winner: String,
    /// Players in join order with lives deducted
    pub players: Vec<Player>,
    /// Status the session moves to
    pub status: Status,
    /// Champion of the game, set only when `status` is `Finished`
    pub champion: Option<String>,
}

/// Resolves a round from the current players and their submitted numbers
///
/// Players without an entry in `numbers` (eliminated players) are left
/// untouched. Ties on distance go to the earliest player in join order.
/// Distances are compared as `|number * count - sum|`, which orders players
/// exactly like `|number - mean|` without floating point error.
///
/// If nobody survives the round the safe player is declared champion
/// (last safe player wins). Because the safe player never loses a life this
/// only matters for inputs where the safe player was already eliminated.
///
/// # Errors
///
/// * `Error::InvalidInput` - no numbers were submitted
/// * `Error::PlayerNotFound` - a number belongs to someone not in `players`
pub fn resolve(players: &[Player], numbers: &HashMap<String, u8>) -> Result<Resolution, Error> {
    if let Some(stranger) = numbers
        .keys()
        .find(|name| !players.iter().any(|player| &player.name == *name))
    {
        return Err(Error::PlayerNotFound {
            name: stranger.clone(),
        });
    }

    let count = numbers.len() as i64;
    let sum: i64 = numbers.values().map(|&number| i64::from(number)).sum();

    let winner = players
        .iter()
        .filter_map(|player| {
            numbers
                .get(&player.name)
                .map(|&number| (player, (i64::from(number) * count - sum).abs()))
        })
        .min_by_key(|(_, scaled_distance)| *scaled_distance)
        .map(|(player, _)| player.name.clone())
        .ok_or_else(|| Error::invalid_input("numbers", "no numbers were submitted"))?;

    let mean = sum as f64 / count as f64;

    let players: Vec<Player> = players
        .iter()
        .map(|player| {
            let mut player = player.clone();
            if player.name != winner && numbers.contains_key(&player.name) {
                player.points -= 1;
            }
            player
        })
        .collect();

    let survivors: Vec<&Player> = players.iter().filter(|player| player.is_alive()).collect();

    let (status, champion) = match survivors.as_slice() {
        [] => (Status::Finished, Some(winner.clone())),
        [survivor] => (Status::Finished, Some(survivor.name.clone())),
        _ => (Status::Playing, None),
    };

    Ok(Resolution {
        mean,
        winner,
        players,
        status,
        champion,
    })
}
