//! board-core - Core library for painboard
//!
//! This crate provides the business logic of the workplace pain-point board:
//! submissions and their moderation, idempotent votes, comments, the
//! community poll, interest registrations with CSV export, and the
//! backing-store contract all of them share.
//!
//! Aggregates (vote counts, comment counts, poll tallies) are recomputed
//! from the stored rows on every read.

pub mod board;
pub mod comment;
pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod identity;
pub mod interest;
pub mod moderation;
pub mod poll;
pub mod store;
pub mod submission;
pub mod sync;
pub mod types;
pub mod validator;
pub mod vote;

pub use board::{Board, SubmissionSummary};
pub use error::{BoardError, Result};
pub use feed::BoardFeed;
pub use types::*;
