//! # Mean Party Game Library
//!
//! This library provides the core game logic for a "closest to the mean"
//! party game. Players gather in a room identified by a short code, submit a
//! secret number each round, and everyone but the player closest to the
//! group mean loses a life until a single player is left.
//!
//! The crate handles the session state machine, round resolution, and the
//! optimistic concurrency needed for many clients to act on the same room
//! at once. Storage is abstracted behind [`store::SessionStore`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod error;
mod names;
pub mod resolver;
pub mod room_code;
pub mod service;
pub mod session;
pub mod store;
pub mod view;

pub use config::Options;
pub use error::{Error, ErrorKind};
pub use room_code::RoomCode;
pub use service::GameService;
pub use session::{Player, Round, Session, Status};
pub use store::{MemoryStore, SessionStore};
