//! List command
//!
//! Without options this is the public board: approved pain points with vote
//! and comment counts. Admins can list any status.

use super::AppContext;
use anyhow::{anyhow, Result};
use board_core::moderation::allowed_actions;
use board_core::submission::{SubmissionStatus, SubmissionView};
use board_core::SubmissionSummary;
use clap::Args;

/// Arguments for the list command
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Status to list: pending, approved, rejected or archived (admin)
    #[arg(long, short)]
    pub status: Option<String>,

    /// Show the number of pain points per status (admin)
    #[arg(long, conflicts_with = "status")]
    pub counts: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the list command
pub fn execute(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let board = ctx.board()?;

    if args.counts {
        ctx.require_admin()?;
        let counts = board.submissions().counts_by_status()?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&counts)?);
        } else {
            for (status, count) in counts {
                println!("  {:<10} {}", status.as_str(), count);
            }
        }
        return Ok(());
    }

    match args.status.as_deref() {
        None | Some("approved") => {
            let voter = ctx.optional_voter()?;
            let summaries = board.approved(voter.as_ref())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                print_board(&summaries);
            }
        }
        Some(name) => {
            let status = SubmissionStatus::from_name(name)
                .ok_or_else(|| anyhow!("Unknown status '{}'", name))?;
            ctx.require_admin()?;
            let views = board.submissions().list_by_status(status)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print_dashboard(status, &views);
            }
        }
    }

    Ok(())
}

fn print_board(summaries: &[SubmissionSummary]) {
    use colored::Colorize;

    if summaries.is_empty() {
        println!("No pain points on the board yet.");
        return;
    }

    println!("{}", "Pain points:".bold().underline());
    println!();
    for summary in summaries {
        let view = &summary.submission;
        let voted = if summary.has_voted {
            "✓".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {:>3} votes  {}",
            voted,
            summary.vote_count,
            view.title.bold()
        );
        println!(
            "           {} · {} comments · {}",
            view.submitter,
            summary.comment_count,
            view.id.to_string().dimmed()
        );
    }
}

fn print_dashboard(status: SubmissionStatus, views: &[SubmissionView]) {
    use colored::Colorize;

    println!(
        "{}",
        format!("{} pain points:", capitalize(status.as_str()))
            .bold()
            .underline()
    );
    if views.is_empty() {
        println!("  (none)");
        return;
    }

    let actions: Vec<&str> = allowed_actions(status).iter().map(|a| a.as_str()).collect();
    for view in views {
        println!(
            "  {}  {}  {}",
            view.id.to_string().dimmed(),
            view.title.bold(),
            view.submitter
        );
    }
    if !actions.is_empty() {
        println!();
        println!("  Available actions: {}", actions.join(", ").cyan());
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
