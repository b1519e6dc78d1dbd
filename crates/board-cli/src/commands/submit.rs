//! Submit command
//!
//! Create a new pain point. It stays pending until an admin approves it.

use super::AppContext;
use anyhow::Result;
use board_core::submission::NewSubmission;
use clap::Args;

/// Arguments for the submit command
#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Short title of the pain point
    #[arg(long, short)]
    pub title: String,

    /// What's the current challenge?
    #[arg(long, conflicts_with = "description")]
    pub challenge: Option<String>,

    /// What are the operational/business implications?
    #[arg(long, conflicts_with = "description")]
    pub impact: Option<String>,

    /// Free-text description instead of challenge/impact
    #[arg(long)]
    pub description: Option<String>,

    /// Hide your name and department on the board
    #[arg(long)]
    pub anonymous: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the submit command
pub fn execute(ctx: &AppContext, args: SubmitArgs) -> Result<()> {
    use colored::Colorize;

    let actor = ctx.require_actor()?;
    let board = ctx.board()?;

    let mut draft = NewSubmission::new(args.title).anonymous(args.anonymous);
    if let Some(text) = args.description {
        draft = draft.description(text);
    } else if args.challenge.is_some() || args.impact.is_some() {
        draft = draft.challenge_and_impact(
            args.challenge.as_deref().unwrap_or(""),
            args.impact.as_deref().unwrap_or(""),
        );
    }

    let submission = board.submissions().create(&actor, draft)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&submission.view())?);
        return Ok(());
    }

    println!(
        "{} Submitted {} ({})",
        "✓".green(),
        submission.title.bold(),
        submission.id.to_string().dimmed()
    );
    println!("  It will appear on the board once an admin approves it.");
    Ok(())
}
