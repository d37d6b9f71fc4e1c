//! Session store adapter
//!
//! The store is the only shared mutable resource: a document store keyed by
//! room code that hands out a version token with every read and only accepts
//! a write carrying the token of the version it replaces. Subscribers get
//! every committed document.
//!
//! [`MemoryStore`] is the in-process implementation; other backends (a
//! database row with a lock version column, a realtime document database
//! with transactions) implement [`SessionStore`] the same way.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use futures::{
    StreamExt,
    future,
    stream::{self, BoxStream},
};
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tokio_stream::wrappers::BroadcastStream;

use crate::{room_code::RoomCode, session::Session};

/// Number of unread documents a subscriber may fall behind by before it
/// skips ahead
const SUBSCRIBER_BUFFER: usize = 64;

/// Opaque token identifying one committed version of a session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display,
)]
#[display("v{_0}")]
pub struct Version(u64);

impl Version {
    /// Version of a freshly inserted session
    pub const INITIAL: Self = Self(1);

    /// The version that follows this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A value together with the version it was read at
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The stored value
    pub value: T,
    /// Version token to pass back on write
    pub version: Version,
}

/// Stream of committed session documents
pub type SessionStream = BoxStream<'static, Session>;

/// Errors reported by store adapters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No session is stored under the code
    #[error("session not found")]
    NotFound,
    /// The stored session changed since it was read
    #[error("version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the writer read
        expected: Version,
        /// Version currently stored
        actual: Version,
    },
    /// A session already exists under the code
    #[error("room code already in use")]
    CodeTaken,
    /// The backend could not serve the request
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable, shared, subscribable storage for session documents
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads the current session and its version
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no session is stored under `code`.
    async fn read(&self, code: &RoomCode) -> Result<Versioned<Session>, StoreError>;

    /// Stores a new session if its code is unused
    ///
    /// # Errors
    ///
    /// `StoreError::CodeTaken` if a session already uses the code.
    async fn insert(&self, session: Session) -> Result<Version, StoreError>;

    /// Replaces the session only if it is still at `expected`
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - no session under `code`
    /// * `StoreError::VersionConflict` - another write landed first
    async fn write_if_version(
        &self,
        code: &RoomCode,
        session: Session,
        expected: Version,
    ) -> Result<Version, StoreError>;

    /// Streams the current session followed by every later commit
    ///
    /// The stream never ends on its own. Calling again starts an
    /// independent subscription.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no session is stored under `code`.
    async fn subscribe(&self, code: &RoomCode) -> Result<SessionStream, StoreError>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn read(&self, code: &RoomCode) -> Result<Versioned<Session>, StoreError> {
        (**self).read(code).await
    }

    async fn insert(&self, session: Session) -> Result<Version, StoreError> {
        (**self).insert(session).await
    }

    async fn write_if_version(
        &self,
        code: &RoomCode,
        session: Session,
        expected: Version,
    ) -> Result<Version, StoreError> {
        (**self).write_if_version(code, session, expected).await
    }

    async fn subscribe(&self, code: &RoomCode) -> Result<SessionStream, StoreError> {
        (**self).subscribe(code).await
    }
}

struct Entry {
    session: Session,
    version: Version,
    updates: broadcast::Sender<Session>,
}

/// In-memory [`SessionStore`] backed by a map behind an async lock
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<RoomCode, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn read(&self, code: &RoomCode) -> Result<Versioned<Session>, StoreError> {
        let rooms = self.rooms.read().await;
        let entry = rooms.get(code).ok_or(StoreError::NotFound)?;
        Ok(Versioned {
            value: entry.session.clone(),
            version: entry.version,
        })
    }

    async fn insert(&self, session: Session) -> Result<Version, StoreError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(session.code()) {
            return Err(StoreError::CodeTaken);
        }
        let (updates, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        rooms.insert(
            session.code().clone(),
            Entry {
                session,
                version: Version::INITIAL,
                updates,
            },
        );
        Ok(Version::INITIAL)
    }

    async fn write_if_version(
        &self,
        code: &RoomCode,
        session: Session,
        expected: Version,
    ) -> Result<Version, StoreError> {
        let mut rooms = self.rooms.write().await;
        let entry = rooms.get_mut(code).ok_or(StoreError::NotFound)?;
        if entry.version != expected {
            return Err(StoreError::VersionConflict {
                expected,
                actual: entry.version,
            });
        }

        entry.version = entry.version.next();
        entry.session = session;
        // no subscribers is not an error
        let _ = entry.updates.send(entry.session.clone());
        Ok(entry.version)
    }

    async fn subscribe(&self, code: &RoomCode) -> Result<SessionStream, StoreError> {
        let rooms = self.rooms.read().await;
        let entry = rooms.get(code).ok_or(StoreError::NotFound)?;

        // Subscribing under the lock means no commit falls between the
        // snapshot and the first broadcast
        let receiver = entry.updates.subscribe();
        let current = entry.session.clone();

        Ok(stream::once(future::ready(current))
            .chain(BroadcastStream::new(receiver).filter_map(|update| future::ready(update.ok())))
            .boxed())
    }
}
