//! Client-side projections of a session
//!
//! Pure, read-only helpers that keep presentation questions ("how many
//! players have submitted?", "who won?") out of the state machine.

use itertools::Itertools;
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    room_code::RoomCode,
    session::{Player, Session, Status},
};

/// Number of numbers submitted in the current round
pub fn submission_count(session: &Session) -> usize {
    session
        .current_round()
        .map_or(0, |round| round.numbers.len())
}

/// Number of players expected to submit in the current round
///
/// Once a round is resolved this is the number of players who took part in
/// it, even if some of them were eliminated by the result.
pub fn participant_count(session: &Session) -> usize {
    match session.current_round() {
        Some(round) if round.is_closed() => round.numbers.len(),
        _ => session.participants().count(),
    }
}

/// Whether every participant has submitted in the current round
pub fn is_round_complete(session: &Session) -> bool {
    session.current_round().is_some() && submission_count(session) == participant_count(session)
}

/// The champion of a finished game
///
/// This is the sole survivor, or the last round's safe player if the final
/// round left nobody standing. `None` while the game is still running.
pub fn winner_name(session: &Session) -> Option<&str> {
    if session.status() != Status::Finished {
        return None;
    }
    let mut survivors = session.participants();
    match (survivors.next(), survivors.next()) {
        (Some(survivor), None) => Some(survivor.name.as_str()),
        _ => session.current_round()?.winner.as_deref(),
    }
}

/// Players ordered by remaining lives, most first, join order breaking ties
pub fn standings(session: &Session) -> Vec<&Player> {
    session
        .players()
        .iter()
        .sorted_by_key(|player| std::cmp::Reverse(player.points))
        .collect()
}

/// A player entry as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// Display name
    pub name: String,
    /// Remaining lives
    pub points: i32,
    /// Whether the player created the room
    pub is_host: bool,
    /// Whether the player is out of lives
    pub eliminated: bool,
    /// Whether the player has a number in the current round
    pub submitted: bool,
}

/// Result of the most recently resolved round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundResultView {
    /// Mean of the submitted numbers
    pub mean: f64,
    /// The round's safe player
    pub winner: String,
}

/// Everything a client needs to render a room, from one player's seat
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// The room code
    pub code: RoomCode,
    /// The current phase
    pub status: Status,
    /// Rounds started so far
    pub round_number: u32,
    /// Players in join order
    pub players: Vec<PlayerView>,
    /// Numbers submitted this round
    pub submitted: usize,
    /// Numbers expected this round
    pub expected: usize,
    /// Whether the viewer already submitted this round
    pub has_submitted: bool,
    /// Whether the viewer may submit right now
    pub can_submit: bool,
    /// Whether a new round may be started
    pub can_start_round: bool,
    /// Result of the last resolved round
    pub last_result: Option<RoundResultView>,
    /// The champion once the game is finished
    pub champion: Option<String>,
}

impl SessionView {
    /// Projects `session` for the player named `viewer`
    ///
    /// An unknown viewer (a spectator) sees the room but can never submit.
    pub fn for_viewer(session: &Session, viewer: &str) -> Self {
        let round = session.current_round();
        let open_round =
            session.status() == Status::Playing && round.is_some_and(|r| !r.is_closed());
        let has_submitted = session.has_submitted(viewer);
        let viewer_alive = session.player(viewer).is_some_and(Player::is_alive);

        Self {
            code: session.code().clone(),
            status: session.status(),
            round_number: session.round_number(),
            players: session
                .players()
                .iter()
                .map(|player| PlayerView {
                    name: player.name.clone(),
                    points: player.points,
                    is_host: player.is_host,
                    eliminated: !player.is_alive(),
                    submitted: session.has_submitted(&player.name),
                })
                .collect(),
            submitted: submission_count(session),
            expected: participant_count(session),
            has_submitted,
            can_submit: open_round && viewer_alive && !has_submitted,
            can_start_round: match session.status() {
                Status::Waiting => true,
                Status::Playing => !open_round,
                Status::Finished => false,
            },
            last_result: round.and_then(|round| {
                Some(RoundResultView {
                    mean: round.mean?,
                    winner: round.winner.clone()?,
                })
            }),
            champion: winner_name(session).map(str::to_owned),
        }
    }
}
