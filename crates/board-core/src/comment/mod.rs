//! Comment system module
//!
//! Comments are immutable once written. Listings and counts are derived
//! from the stored rows on every fetch.

mod ledger;
mod model;

pub use ledger::CommentLedger;
pub use model::{Comment, CommentEntry, CommentThread};
