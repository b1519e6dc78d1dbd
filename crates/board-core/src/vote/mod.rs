//! Submission voting
//!
//! At most one vote per (submission, voter). The local history is a fast
//! path; the store's uniqueness constraint is what actually guarantees it.

mod ledger;
mod model;

pub use ledger::VoteLedger;
pub use model::{Vote, VoteOutcome};
