//! Poll command
//!
//! Show, vote in and create the community poll. Results only show once
//! you have voted.

use super::AppContext;
use anyhow::{anyhow, bail, Result};
use board_core::poll::{Poll, PollOption, PollResults};
use board_core::types::PollOptionId;
use board_core::vote::VoteOutcome;
use board_core::BoardError;
use clap::Subcommand;
use tracing::warn;

/// Poll subcommands
#[derive(Debug, Subcommand)]
pub enum PollCommand {
    /// Show the active poll
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Vote in the active poll
    Vote {
        /// Option number (as listed by `poll show`) or option ID
        option: String,
    },

    /// Show results of the active poll
    Results {
        /// Skip the voted-first rule (admin)
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new poll, replacing the active one (admin)
    Create {
        /// The question
        #[arg(long, short)]
        question: String,

        /// An answer (repeat for each option)
        #[arg(long = "option", short = 'o', value_name = "TEXT")]
        options: Vec<String>,
    },
}

/// Execute the poll command
pub fn execute(ctx: &AppContext, cmd: PollCommand) -> Result<()> {
    match cmd {
        PollCommand::Show { json } => show(ctx, json),
        PollCommand::Vote { option } => vote(ctx, &option),
        PollCommand::Results { all, json } => results(ctx, all, json),
        PollCommand::Create { question, options } => create(ctx, &question, &options),
    }
}

fn active_poll(ctx: &AppContext) -> Result<Poll> {
    ctx.board()?
        .polls()
        .active_poll()?
        .ok_or_else(|| anyhow!("There is no active poll"))
}

fn show(ctx: &AppContext, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let board = ctx.board()?;
    let Some(poll) = board.polls().active_poll()? else {
        println!("There is no active poll.");
        return Ok(());
    };
    let options = board.polls().list_options(&poll.id)?;

    if as_json {
        let value = serde_json::json!({ "poll": poll, "options": options });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", poll.question.bold());
    for (index, option) in options.iter().enumerate() {
        println!("  {}. {}", index + 1, option.text);
    }

    if let Some(voter) = ctx.optional_voter()? {
        if board.polls().has_voted(&poll.id, &voter)? {
            println!();
            print_results(&board.polls().results(&poll.id)?);
        }
    }
    Ok(())
}

fn vote(ctx: &AppContext, choice: &str) -> Result<()> {
    use colored::Colorize;

    let voter = ctx.voter()?;
    let board = ctx.board()?;
    let poll = active_poll(ctx)?;
    let options = board.polls().list_options(&poll.id)?;
    let option_id = resolve_option(&options, choice)?;

    match board.polls().cast_vote(&poll.id, &option_id, &voter)? {
        VoteOutcome::Recorded => println!("{} Vote recorded", "✓".green()),
        VoteOutcome::AlreadyVoted => {
            println!("{} You already voted in this poll", "•".yellow())
        }
    }

    show_after_vote(board.polls().results_for(&poll.id, &voter));
    Ok(())
}

fn results(ctx: &AppContext, all: bool, as_json: bool) -> Result<()> {
    let board = ctx.board()?;
    let poll = active_poll(ctx)?;

    let results = if all {
        ctx.require_admin()?;
        board.polls().results(&poll.id)?
    } else {
        let voter = ctx.voter()?;
        match board.polls().results_for(&poll.id, &voter) {
            Err(BoardError::ResultsLocked) => {
                bail!("Vote in the poll to see its results")
            }
            other => other?,
        }
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }
    Ok(())
}

fn create(ctx: &AppContext, question: &str, options: &[String]) -> Result<()> {
    use colored::Colorize;

    let actor = ctx.require_admin()?;
    let board = ctx.board()?;
    let options: Vec<&str> = options.iter().map(String::as_str).collect();

    let poll = board.polls().create_poll(&actor, question, &options)?;
    println!(
        "{} Poll created and activated ({})",
        "✓".green(),
        poll.id.to_string().dimmed()
    );
    Ok(())
}

/// Accept a 1-based option number or a full option id
fn resolve_option(options: &[PollOption], choice: &str) -> Result<PollOptionId> {
    if let Ok(number) = choice.trim().parse::<usize>() {
        return options
            .get(number.wrapping_sub(1))
            .map(|o| o.id)
            .ok_or_else(|| anyhow!("Choose an option between 1 and {}", options.len()));
    }
    Ok(PollOptionId::parse(choice)?)
}

/// Print the tally after a vote. The vote is already stored, so a failed
/// tally only hides the results; returns whether they were shown.
fn show_after_vote(results: board_core::Result<PollResults>) -> bool {
    match results {
        Ok(results) => {
            println!();
            print_results(&results);
            true
        }
        Err(e) => {
            warn!("Poll results unavailable: {}", e);
            false
        }
    }
}

fn print_results(results: &PollResults) {
    use colored::Colorize;

    println!("{}", format!("Results ({} votes)", results.total).bold());
    for result in &results.options {
        let bar = "█".repeat((result.percentage / 5) as usize);
        println!(
            "  {:>3}%  {:<20} {} ({})",
            result.percentage,
            bar.cyan(),
            result.option.text,
            result.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::poll::OptionResult;
    use board_core::types::PollId;

    #[test]
    fn test_failed_tally_after_vote_is_not_an_error() {
        let err = BoardError::Backend("poll_votes is unavailable".to_string());
        assert!(!show_after_vote(Err(err)));
    }

    #[test]
    fn test_tally_after_vote_is_shown() {
        let option = PollOption {
            id: PollOptionId::new(),
            poll_id: PollId::new(),
            text: "Printers".to_string(),
        };
        let results = PollResults {
            poll_id: option.poll_id,
            total: 1,
            options: vec![OptionResult {
                option,
                count: 1,
                percentage: 100,
            }],
        };
        assert!(show_after_vote(Ok(results)));
    }

    #[test]
    fn test_resolve_option_by_number() {
        let options: Vec<PollOption> = ["Printers", "Parking"]
            .iter()
            .map(|text| PollOption {
                id: PollOptionId::new(),
                poll_id: PollId::new(),
                text: text.to_string(),
            })
            .collect();

        assert_eq!(resolve_option(&options, "2").unwrap(), options[1].id);
        assert!(resolve_option(&options, "0").is_err());
        assert!(resolve_option(&options, "3").is_err());
        assert_eq!(
            resolve_option(&options, &options[0].id.to_string()).unwrap(),
            options[0].id
        );
    }
}
