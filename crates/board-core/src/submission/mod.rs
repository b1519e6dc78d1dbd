//! Submission module
//!
//! Pain point records, their description formats, and the store that
//! creates and filters them.

mod description;
mod model;
mod store;

pub use description::Description;
pub use model::{Submission, SubmissionStatus, SubmissionView};
pub use store::{NewSubmission, SubmissionStore};
