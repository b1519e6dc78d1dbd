//! Display state of one board client
//!
//! A [`BoardFeed`] holds the approved listing as last shown. Every refresh
//! and every vote takes a fetch ticket, so a listing fetched before a vote
//! landed cannot overwrite the count the vote already updated.

use crate::board::{Board, SubmissionSummary};
use crate::error::Result;
use crate::identity::VoterIdentity;
use crate::sync::{FetchSequencer, Latest};
use crate::types::SubmissionId;
use crate::vote::VoteOutcome;
use tracing::debug;

pub struct BoardFeed {
    board: Board,
    sequencer: FetchSequencer,
    listing: Latest<Vec<SubmissionSummary>>,
}

impl BoardFeed {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            sequencer: FetchSequencer::new(),
            listing: Latest::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Reload the approved listing.
    ///
    /// Returns false when a newer refresh or vote updated the display while
    /// this one was in flight; the fetched rows are then discarded.
    pub fn refresh(&self, voter: Option<&VoterIdentity>) -> Result<bool> {
        let ticket = self.sequencer.begin();
        let rows = self.board.approved(voter)?;
        Ok(self.listing.offer(ticket, rows))
    }

    /// The listing currently shown (empty before the first refresh)
    pub fn listing(&self) -> Vec<SubmissionSummary> {
        self.listing.get().unwrap_or_default()
    }

    /// The shown row of one submission
    pub fn row(&self, id: &SubmissionId) -> Option<SubmissionSummary> {
        self.listing()
            .into_iter()
            .find(|row| &row.submission.id == id)
    }

    /// Cast a vote and fold the outcome into the shown row
    pub fn vote(&self, id: &SubmissionId, voter: &VoterIdentity) -> Result<VoteOutcome> {
        let outcome = self.board.votes().cast_vote(id, voter)?;

        // Ticket taken after the write: any refresh begun earlier is older.
        let ticket = self.sequencer.begin();
        let mut rows = self.listing();
        match rows.iter_mut().find(|row| &row.submission.id == id) {
            Some(row) => {
                row.apply_vote(outcome);
                self.listing.offer(ticket, rows);
            }
            None => debug!("Submission {} is not on the shown listing", id),
        }
        Ok(outcome)
    }
}
