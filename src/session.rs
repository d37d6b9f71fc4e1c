//! Session state machine
//!
//! A [`Session`] is the authoritative document for one room. It moves from
//! `Waiting` (players joining) to `Playing` (rounds of number submissions)
//! and finally to `Finished` once a single player has lives left. Every
//! transition validates fully before touching any field, so a rejected
//! transition leaves the session exactly as it was.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    config::Options,
    constants::game::{MAX_NUMBER, MIN_NUMBER, STARTING_POINTS},
    error::Error,
    names,
    resolver::{self, Resolution},
    room_code::RoomCode,
};

/// Phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Players may join, no round has started
    Waiting,
    /// Rounds are being played
    Playing,
    /// A champion has been decided, terminal
    Finished,
}

/// A player in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name, unique within the room
    pub name: String,
    /// Remaining lives; zero or below means eliminated
    pub points: i32,
    /// Whether this player created the room
    pub is_host: bool,
}

impl Player {
    fn new(name: String, is_host: bool) -> Self {
        Self {
            name,
            points: STARTING_POINTS,
            is_host,
        }
    }

    /// Whether the player still has lives left
    pub fn is_alive(&self) -> bool {
        self.points > 0
    }
}

/// Numbers submitted in the current round and, once closed, its result
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Submitted number per player name
    pub numbers: HashMap<String, u8>,
    /// Mean of the submitted numbers, set when the round is resolved
    pub mean: Option<f64>,
    /// Name of the player closest to the mean, set when the round is resolved
    pub winner: Option<String>,
}

impl Round {
    /// Whether the round has been resolved
    pub fn is_closed(&self) -> bool {
        self.mean.is_some()
    }
}

/// Summary of a resolved round, returned to the submitter that completed it
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    /// Mean of the submitted numbers
    pub mean: f64,
    /// The round's safe player
    pub winner: String,
    /// Players who lost their last life this round
    pub eliminated: Vec<String>,
    /// Champion if the game ended with this round
    pub champion: Option<String>,
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The number was recorded, other participants still have to submit
    Accepted,
    /// The number completed the round and the round was resolved
    Resolved(RoundOutcome),
}

/// The shared document describing one room
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    code: RoomCode,
    status: Status,
    players: Vec<Player>,
    current_round: Option<Round>,
    #[serde(default)]
    round_number: u32,
}

impl Session {
    /// Creates a waiting session with the host as its only player
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the host name is empty, too long or
    /// inappropriate.
    pub fn new(code: RoomCode, host_name: &str) -> Result<Self, Error> {
        let name = names::clean(host_name)?;
        Ok(Self {
            code,
            status: Status::Waiting,
            players: vec![Player::new(name, true)],
            current_round: None,
            round_number: 0,
        })
    }

    /// The room code
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// The current phase
    pub fn status(&self) -> Status {
        self.status
    }

    /// All players in join order, eliminated ones included
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by name
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    /// The current or most recently resolved round
    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    /// Number of rounds started so far
    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    /// Players still taking part in rounds
    pub fn participants(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| player.is_alive())
    }

    /// Whether the named player has a number in the current round
    pub fn has_submitted(&self, name: &str) -> bool {
        self.current_round
            .as_ref()
            .is_some_and(|round| round.numbers.contains_key(name))
    }

    /// Adds a player to a waiting session
    ///
    /// # Errors
    ///
    /// * `Error::InvalidInput` - the name failed validation
    /// * `Error::SessionAlreadyStarted` - the first round has already started
    /// * `Error::NameTaken` - another player uses the same name
    /// * `Error::SessionFull` - the room holds `options.max_players` already
    pub fn join(&mut self, name: &str, options: &Options) -> Result<&Player, Error> {
        let name = names::clean(name)?;
        if self.status != Status::Waiting {
            return Err(Error::SessionAlreadyStarted {
                code: self.code.clone(),
            });
        }
        if self.player(&name).is_some() {
            return Err(Error::NameTaken { name });
        }
        if self.players.len() >= options.max_players {
            return Err(Error::SessionFull {
                capacity: options.max_players,
            });
        }

        self.players.push(Player::new(name, false));
        Ok(&self.players[self.players.len() - 1])
    }

    /// Opens a new round with no submissions
    ///
    /// # Errors
    ///
    /// * `Error::SessionFinished` - the game is over
    /// * `Error::NotEnoughPlayers` - fewer than `options.min_players_to_start`
    ///   players are waiting
    /// * `Error::RoundInProgress` - the current round has not been resolved
    pub fn start_round(&mut self, options: &Options) -> Result<(), Error> {
        match self.status {
            Status::Finished => {
                return Err(Error::SessionFinished {
                    code: self.code.clone(),
                });
            }
            Status::Waiting if self.players.len() < options.min_players_to_start => {
                return Err(Error::NotEnoughPlayers {
                    required: options.min_players_to_start,
                    present: self.players.len(),
                });
            }
            Status::Playing
                if self
                    .current_round
                    .as_ref()
                    .is_some_and(|round| !round.is_closed()) =>
            {
                return Err(Error::RoundInProgress {
                    code: self.code.clone(),
                });
            }
            Status::Waiting | Status::Playing => {}
        }

        self.status = Status::Playing;
        self.round_number += 1;
        self.current_round = Some(Round::default());
        Ok(())
    }

    /// Records a player's number, resolving the round when it is complete
    ///
    /// # Errors
    ///
    /// * `Error::OutOfRange` - the number is not within 1..=100
    /// * `Error::RoundClosed` - there is no open round
    /// * `Error::PlayerNotFound` - nobody in the room has this name
    /// * `Error::PlayerEliminated` - the player has no lives left
    /// * `Error::AlreadySubmitted` - the player already has a number this round
    pub fn submit(&mut self, name: &str, number: i64) -> Result<SubmitOutcome, Error> {
        let number = u8::try_from(number)
            .ok()
            .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
            .ok_or(Error::OutOfRange { number })?;

        let participants = self.participants().count();
        let round = match self.current_round.as_mut() {
            Some(round) if self.status == Status::Playing && !round.is_closed() => round,
            _ => {
                return Err(Error::RoundClosed {
                    code: self.code.clone(),
                });
            }
        };
        let player = self
            .players
            .iter()
            .find(|player| player.name == name)
            .ok_or_else(|| Error::PlayerNotFound {
                name: name.to_owned(),
            })?;
        if !player.is_alive() {
            return Err(Error::PlayerEliminated {
                name: name.to_owned(),
            });
        }
        if round.numbers.contains_key(name) {
            return Err(Error::AlreadySubmitted {
                name: name.to_owned(),
            });
        }

        if round.numbers.len() + 1 < participants {
            round.numbers.insert(name.to_owned(), number);
            return Ok(SubmitOutcome::Accepted);
        }

        let mut numbers = round.numbers.clone();
        numbers.insert(name.to_owned(), number);
        let Resolution {
            mean,
            winner,
            players,
            status,
            champion,
        } = resolver::resolve(&self.players, &numbers)?;

        let eliminated = self
            .players
            .iter()
            .zip(&players)
            .filter(|(before, after)| before.is_alive() && !after.is_alive())
            .map(|(_, after)| after.name.clone())
            .collect();

        round.numbers = numbers;
        round.mean = Some(mean);
        round.winner = Some(winner.clone());
        self.players = players;
        self.status = status;

        Ok(SubmitOutcome::Resolved(RoundOutcome {
            mean,
            winner,
            eliminated,
            champion,
        }))
    }
}
