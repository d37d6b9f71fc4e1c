//! Game service
//!
//! The entry point for any transport (HTTP handlers, RPC, a websocket
//! actor or direct calls). Each operation names the acting player
//! explicitly; nothing about the caller is kept between calls.

use garde::Validate;
use tracing::{debug, info};

use crate::{
    config::Options,
    constants::room_code::MAX_GENERATION_ATTEMPTS,
    coordinator::Coordinator,
    error::Error,
    room_code::RoomCode,
    session::{Session, SubmitOutcome},
    store::{SessionStore, SessionStream, StoreError},
};

/// Creates, joins and plays rooms stored in a [`SessionStore`]
pub struct GameService<S> {
    coordinator: Coordinator<S>,
    options: Options,
}

impl<S: SessionStore> GameService<S> {
    /// Builds a service after validating `options`
    ///
    /// # Errors
    ///
    /// Returns the validation report if any option is out of bounds.
    pub fn new(store: S, options: Options) -> Result<Self, garde::Report> {
        options.validate()?;
        Ok(Self {
            coordinator: Coordinator::new(store, options),
            options,
        })
    }

    /// The options this service was built with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        self.coordinator.store()
    }

    /// Opens a new room with `host_name` as host and returns its code
    ///
    /// # Errors
    ///
    /// * `Error::InvalidInput` - the host name failed validation
    /// * `Error::ConcurrentModification` - no free code was found
    /// * `Error::StoreUnavailable` - the store failed
    pub async fn create_session(&self, host_name: &str) -> Result<RoomCode, Error> {
        let mut code = RoomCode::new();
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let session = Session::new(code.clone(), host_name)?;
            match self.coordinator.create(session).await {
                Ok(_) => {
                    info!(code = %code, host = host_name.trim(), "Room created");
                    return Ok(code);
                }
                Err(StoreError::CodeTaken) => {
                    debug!(code = %code, attempt, "Room code in use, drawing another");
                    code = RoomCode::new();
                }
                Err(error) => return Err(Error::from_store(&code, error)),
            }
        }

        Err(Error::ConcurrentModification {
            code,
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    /// Adds `name` to the waiting room `code`
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `InvalidInput`, `SessionAlreadyStarted`,
    /// `NameTaken`, `SessionFull`, `ConcurrentModification` or
    /// `StoreUnavailable`.
    pub async fn join_session(&self, code: &RoomCode, name: &str) -> Result<Session, Error> {
        let options = self.options;
        let applied = self
            .coordinator
            .apply(code, |session| {
                session.join(name, &options).map(|player| player.name.clone())
            })
            .await?;

        info!(
            code = %code,
            player = %applied.output,
            players = applied.session.players().len(),
            "Player joined"
        );
        Ok(applied.session)
    }

    /// Starts the first round, or the next one after a resolved round
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `SessionFinished`, `NotEnoughPlayers`,
    /// `RoundInProgress`, `ConcurrentModification` or `StoreUnavailable`.
    pub async fn start_round(&self, code: &RoomCode) -> Result<Session, Error> {
        let options = self.options;
        let applied = self
            .coordinator
            .apply(code, |session| session.start_round(&options))
            .await?;

        info!(
            code = %code,
            round = applied.session.round_number(),
            "Round started"
        );
        Ok(applied.session)
    }

    /// Submits `number` for player `name`, resolving the round if it completes
    ///
    /// # Errors
    ///
    /// `SessionNotFound`, `OutOfRange`, `RoundClosed`, `PlayerNotFound`,
    /// `PlayerEliminated`, `AlreadySubmitted`, `ConcurrentModification` or
    /// `StoreUnavailable`.
    pub async fn submit_number(
        &self,
        code: &RoomCode,
        name: &str,
        number: i64,
    ) -> Result<Session, Error> {
        let applied = self
            .coordinator
            .apply(code, |session| session.submit(name, number))
            .await?;

        match &applied.output {
            SubmitOutcome::Accepted => {
                debug!(code = %code, player = name, "Number submitted");
            }
            SubmitOutcome::Resolved(outcome) => {
                info!(
                    code = %code,
                    round = applied.session.round_number(),
                    mean = outcome.mean,
                    winner = %outcome.winner,
                    eliminated = ?outcome.eliminated,
                    "Round resolved"
                );
                if let Some(champion) = &outcome.champion {
                    info!(code = %code, champion = %champion, "Game finished");
                }
            }
        }
        Ok(applied.session)
    }

    /// Streams every committed state of room `code`, starting with the current one
    ///
    /// # Errors
    ///
    /// `SessionNotFound` or `StoreUnavailable`.
    pub async fn subscribe_session(&self, code: &RoomCode) -> Result<SessionStream, Error> {
        self.store()
            .subscribe(code)
            .await
            .map_err(|error| Error::from_store(code, error))
    }

    /// Reads the current state of room `code`
    ///
    /// # Errors
    ///
    /// `SessionNotFound` or `StoreUnavailable`.
    pub async fn session(&self, code: &RoomCode) -> Result<Session, Error> {
        self.store()
            .read(code)
            .await
            .map(|versioned| versioned.value)
            .map_err(|error| Error::from_store(code, error))
    }
}
