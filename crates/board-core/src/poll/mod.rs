//! Community poll
//!
//! Independent of submissions. Results are derived from the vote rows on
//! every read and are only shown to voters who already voted.

mod model;
mod subsystem;

pub use model::{percentage, OptionResult, Poll, PollOption, PollResults, PollVote};
pub use subsystem::{PollSubsystem, MIN_POLL_OPTIONS};
