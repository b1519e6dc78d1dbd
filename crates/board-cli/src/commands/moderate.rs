//! Moderate command
//!
//! Admin status transitions: approve, reject, archive, restore.

use super::AppContext;
use anyhow::{Context, Result};
use board_core::moderation::ModerationAction;
use board_core::types::SubmissionId;
use clap::{Args, Subcommand};

/// Moderation subcommands
#[derive(Debug, Subcommand)]
pub enum ModerateCommand {
    /// Publish a pending (or archived) pain point
    Approve(TargetArgs),

    /// Reject a pain point
    Reject {
        #[command(flatten)]
        target: TargetArgs,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Take an approved pain point off the board
    Archive(TargetArgs),

    /// Put an archived pain point back on the board
    Restore(TargetArgs),
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Pain point ID
    pub id: String,
}

/// Execute the moderate command
pub fn execute(ctx: &AppContext, cmd: ModerateCommand) -> Result<()> {
    let (target, action) = match cmd {
        ModerateCommand::Approve(target) => (target, ModerationAction::Approve),
        ModerateCommand::Archive(target) => (target, ModerationAction::Archive),
        ModerateCommand::Restore(target) => (target, ModerationAction::Restore),
        ModerateCommand::Reject { target, yes } => {
            if !yes && !confirm_reject(&target.id)? {
                println!("Reject cancelled.");
                return Ok(());
            }
            (target, ModerationAction::Reject)
        }
    };

    apply(ctx, &target.id, action)
}

fn confirm_reject(id: &str) -> Result<bool> {
    use dialoguer::Confirm;

    Confirm::new()
        .with_prompt(format!("Reject pain point {}?", id))
        .default(false)
        .interact()
        .context("Confirmation needs a terminal; pass --yes to skip it")
}

fn apply(ctx: &AppContext, id: &str, action: ModerationAction) -> Result<()> {
    use colored::Colorize;

    let id = SubmissionId::parse(id)?;
    let actor = ctx.require_admin()?;
    let board = ctx.board()?;

    let view = board.moderation().transition_as(&actor, &id, action)?;
    println!(
        "{} {} is now {}",
        "✓".green(),
        view.title.bold(),
        view.status.to_string().cyan()
    );
    Ok(())
}
