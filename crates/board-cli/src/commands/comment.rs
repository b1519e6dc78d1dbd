//! Comment command
//!
//! Add and list comments on approved pain points.

use super::AppContext;
use anyhow::Result;
use board_core::types::SubmissionId;
use clap::Subcommand;

/// Comment subcommands
#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// Add a comment
    Add {
        /// Pain point ID
        id: String,

        /// Comment text
        content: String,

        /// Post as "Anonymous"
        #[arg(long)]
        anonymous: bool,
    },

    /// List comments, oldest first
    List {
        /// Pain point ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute the comment command
pub fn execute(ctx: &AppContext, cmd: CommentCommand) -> Result<()> {
    use colored::Colorize;

    let board = ctx.board()?;

    match cmd {
        CommentCommand::Add {
            id,
            content,
            anonymous,
        } => {
            let id = SubmissionId::parse(&id)?;
            let actor = ctx.actor();
            let (comment, thread) = board
                .comments()
                .add(&id, actor.as_ref(), &content, anonymous)?;
            println!(
                "{} Comment added ({} comments) {}",
                "✓".green(),
                thread.count(),
                comment.id.to_string().dimmed()
            );
        }
        CommentCommand::List { id, json } => {
            let id = SubmissionId::parse(&id)?;
            ctx.require_visible(&board.submissions().get(&id)?)?;
            let thread = board.comments().list(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&thread)?);
                return Ok(());
            }
            if thread.is_empty() {
                println!("No comments yet.");
                return Ok(());
            }
            for entry in &thread.entries {
                println!(
                    "{} {}",
                    entry.display_name.cyan(),
                    entry.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                );
                println!("  {}", entry.content);
            }
        }
    }

    Ok(())
}
