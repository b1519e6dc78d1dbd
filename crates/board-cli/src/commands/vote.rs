//! Vote command

use super::AppContext;
use anyhow::Result;
use board_core::types::SubmissionId;
use board_core::vote::VoteOutcome;
use board_core::BoardFeed;
use clap::Args;
use tracing::warn;

/// Arguments for the vote command
#[derive(Debug, Args)]
pub struct VoteArgs {
    /// Pain point ID
    pub id: String,
}

/// Execute the vote command
pub fn execute(ctx: &AppContext, args: VoteArgs) -> Result<()> {
    use colored::Colorize;

    let id = SubmissionId::parse(&args.id)?;
    let voter = ctx.voter()?;
    let feed = BoardFeed::new(ctx.board()?);

    // The count shown afterwards comes from this listing, not a read after the vote
    if let Err(e) = feed.refresh(Some(&voter)) {
        warn!("Listing unavailable, vote count will not be shown: {}", e);
    }

    let outcome = feed.vote(&id, &voter)?;
    let count = feed
        .row(&id)
        .map(|row| format!(" ({} votes)", row.vote_count))
        .unwrap_or_default();

    match outcome {
        VoteOutcome::Recorded => println!("{} Vote recorded{}", "✓".green(), count),
        VoteOutcome::AlreadyVoted => {
            println!("{} You already voted for this{}", "•".yellow(), count)
        }
    }
    Ok(())
}
