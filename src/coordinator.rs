//! Concurrency coordinator
//!
//! Every mutation of a session runs as read, apply, conditional write. The
//! write only lands if nobody else committed since our read; otherwise the
//! whole cycle starts over from a fresh read, up to the configured attempt
//! budget. Committed states are therefore linearizable without holding any
//! lock across the transition.

use std::time::Duration;

use tracing::{debug, warn};

use crate::{
    config::Options,
    error::Error,
    room_code::RoomCode,
    session::Session,
    store::{SessionStore, StoreError, Version, Versioned},
};

/// A committed transition
#[derive(Debug, Clone)]
pub struct Applied<T> {
    /// The session as committed
    pub session: Session,
    /// Version token of the committed session
    pub version: Version,
    /// Whatever the transition returned
    pub output: T,
}

/// Serializes concurrent transitions on the same session through a store
pub struct Coordinator<S> {
    store: S,
    options: Options,
}

impl<S: SessionStore> Coordinator<S> {
    /// Creates a coordinator over `store`
    pub fn new(store: S, options: Options) -> Self {
        Self { store, options }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stores a brand new session
    ///
    /// # Errors
    ///
    /// Passes store errors through, `StoreError::CodeTaken` included, so the
    /// caller can draw another code.
    pub async fn create(&self, session: Session) -> Result<Version, StoreError> {
        self.store.insert(session).await
    }

    /// Applies `transition` to the session stored under `code` atomically
    ///
    /// The transition runs on a private copy of the session and may run more
    /// than once if other writers interleave; it must not have side effects
    /// outside the session it is given.
    ///
    /// # Errors
    ///
    /// * `Error::SessionNotFound` - nothing stored under `code`
    /// * any error returned by `transition`, with nothing written
    /// * `Error::ConcurrentModification` - every attempt lost the race
    /// * `Error::StoreUnavailable` - the store failed, not retried
    pub async fn apply<T, F>(&self, code: &RoomCode, mut transition: F) -> Result<Applied<T>, Error>
    where
        T: Send,
        F: FnMut(&mut Session) -> Result<T, Error> + Send,
    {
        let attempts = self.options.max_attempts;

        for attempt in 1..=attempts {
            let Versioned {
                value: mut session,
                version,
            } = self
                .store
                .read(code)
                .await
                .map_err(|error| Error::from_store(code, error))?;

            let output = transition(&mut session)?;

            match self
                .store
                .write_if_version(code, session.clone(), version)
                .await
            {
                Ok(version) => {
                    return Ok(Applied {
                        session,
                        version,
                        output,
                    });
                }
                Err(StoreError::VersionConflict { expected, actual }) => {
                    debug!(
                        code = %code,
                        attempt,
                        %expected,
                        %actual,
                        "Lost write race, retrying transition"
                    );
                    if attempt < attempts {
                        self.back_off(attempt).await;
                    }
                }
                Err(error) => return Err(Error::from_store(code, error)),
            }
        }

        warn!(code = %code, attempts, "Giving up on transition after repeated conflicts");
        Err(Error::ConcurrentModification {
            code: code.clone(),
            attempts,
        })
    }

    async fn back_off(&self, attempt: usize) {
        let base = self.options.retry_backoff_ms;
        if base == 0 {
            tokio::task::yield_now().await;
            return;
        }
        let delay = base * attempt as u64 + fastrand::u64(0..=base);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
