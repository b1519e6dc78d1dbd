//! Interest command
//!
//! Register interest in the improvement programme and export the
//! registrations as CSV.

use super::AppContext;
use anyhow::{anyhow, Context, Result};
use board_core::export::{format_timestamp, RegistrationCsv};
use board_core::interest::InterestRole;
use clap::Subcommand;
use std::path::PathBuf;

/// Interest subcommands
#[derive(Debug, Subcommand)]
pub enum InterestCommand {
    /// Register your interest
    Register {
        /// Role to volunteer for: product-sponsor, hustler, hipster, hacker
        #[arg(long = "role", value_name = "ROLE", required_unless_present = "coach")]
        roles: Vec<String>,

        /// Register as a coach instead
        #[arg(long, conflicts_with = "roles")]
        coach: bool,

        /// Supervisor's email (coaches only)
        #[arg(long, requires = "coach")]
        supervisor: Option<String>,
    },

    /// List registrations, newest first (admin)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export registrations as CSV (admin)
    Export {
        /// Directory to write into (prints to stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Execute the interest command
pub fn execute(ctx: &AppContext, cmd: InterestCommand) -> Result<()> {
    use colored::Colorize;

    let board = ctx.board()?;

    match cmd {
        InterestCommand::Register {
            roles,
            coach,
            supervisor,
        } => {
            let actor = ctx.require_actor()?;
            let registration = if coach {
                board
                    .interest()
                    .register_coach(&actor, supervisor.as_deref())?
            } else {
                let roles = roles
                    .iter()
                    .map(|r| {
                        InterestRole::from_name(r).ok_or_else(|| anyhow!("Unknown role '{}'", r))
                    })
                    .collect::<Result<Vec<_>>>()?;
                board.interest().register_participant(&actor, &roles)?
            };
            println!(
                "{} Registered as {}: {}",
                "✓".green(),
                registration.registration_type,
                registration.role_labels().join(", ")
            );
        }
        InterestCommand::List { json } => {
            ctx.require_admin()?;
            let registrations = board.interest().list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&registrations)?);
                return Ok(());
            }
            if registrations.is_empty() {
                println!("No registrations yet.");
                return Ok(());
            }
            for registration in &registrations {
                println!(
                    "  {}  {}  {}",
                    format_timestamp(&registration.created_at).dimmed(),
                    registration.email.bold(),
                    registration.role_labels().join(", ")
                );
            }
        }
        InterestCommand::Export { output } => {
            ctx.require_admin()?;
            let registrations = board.interest().list()?;
            let csv = RegistrationCsv::new();
            match output {
                Some(dir) => {
                    let today = chrono::Local::now().date_naive();
                    let path = csv
                        .write_to_dir(&dir, &registrations, today)
                        .with_context(|| format!("Failed to export to {}", dir.display()))?;
                    eprintln!(
                        "{} Exported {} registrations to {}",
                        "✓".green(),
                        registrations.len(),
                        path.display()
                    );
                }
                None => print!("{}", csv.render(&registrations)),
            }
        }
    }

    Ok(())
}
