//! Show command
//!
//! Print one pain point with its description, counts and comments.

use super::AppContext;
use anyhow::Result;
use board_core::comment::CommentThread;
use board_core::submission::Description;
use board_core::types::SubmissionId;
use board_core::SubmissionSummary;
use clap::Args;
use serde::Serialize;

/// Arguments for the show command
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Pain point ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    #[serde(flatten)]
    summary: &'a SubmissionSummary,
    comments: &'a CommentThread,
}

/// Execute the show command
pub fn execute(ctx: &AppContext, args: ShowArgs) -> Result<()> {
    let id = SubmissionId::parse(&args.id)?;
    let board = ctx.board()?;
    let voter = ctx.optional_voter()?;

    let summary = board.summary(&id, voter.as_ref())?;
    ctx.require_visible(&summary.submission)?;
    let comments = board.comments().list(&id)?;

    if args.json {
        let output = ShowOutput {
            summary: &summary,
            comments: &comments,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_summary(&summary, &comments);
    Ok(())
}

fn print_summary(summary: &SubmissionSummary, comments: &CommentThread) {
    use colored::Colorize;

    let view = &summary.submission;
    println!("{}", view.title.bold().underline());
    println!("{}", view.id.to_string().dimmed());
    println!();
    println!("  Status:      {}", view.status);
    match &view.department {
        Some(department) => println!("  Submitted by: {} ({})", view.submitter, department),
        None => println!("  Submitted by: {}", view.submitter),
    }
    println!(
        "  Submitted:   {}",
        view.created_at.format("%Y-%m-%d %H:%M")
    );
    let voted = if summary.has_voted {
        format!(" {}", "(you voted)".green())
    } else {
        String::new()
    };
    println!("  Votes:       {}{}", summary.vote_count, voted);

    match &view.description {
        Description::Empty => {}
        Description::Legacy { text } => {
            println!();
            println!("{}", text);
        }
        description => {
            println!();
            println!("{}", "Challenge".bold());
            println!("{}", description.challenge());
            if !description.impact().is_empty() {
                println!();
                println!("{}", "Impact".bold());
                println!("{}", description.impact());
            }
        }
    }

    println!();
    println!("{}", format!("Comments ({})", comments.count()).bold());
    for entry in &comments.entries {
        println!(
            "  {} {}",
            entry.display_name.cyan(),
            entry.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        println!("    {}", entry.content);
    }
}
