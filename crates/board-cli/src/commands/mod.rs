//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod comment;
pub mod config;
pub mod init;
pub mod interest;
pub mod list;
pub mod moderate;
pub mod poll;
pub mod show;
pub mod submit;
pub mod vote;

use anyhow::{anyhow, bail, Context, Result};
use board_core::config::{Config, DEFAULT_CONFIG_PATH};
use board_core::identity::{Actor, VoterIdentity};
use board_core::submission::SubmissionView;
use board_core::Board;
use board_storage::{FileSystemStore, FileVoteHistory};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// painboard - Workplace pain point board
#[derive(Debug, Parser)]
#[command(name = "painboard")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Email of the acting user
    #[arg(long, short, global = true, env = "PAINBOARD_USER")]
    pub user: Option<String>,

    /// Display name of the acting user (defaults to the email's local part)
    #[arg(long, global = true, env = "PAINBOARD_NAME")]
    pub name: Option<String>,

    /// Department of the acting user
    #[arg(long, global = true, env = "PAINBOARD_DEPARTMENT")]
    pub department: Option<String>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true, env = "PAINBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl GlobalArgs {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize painboard in the current directory
    Init(init::InitArgs),

    /// Submit a new pain point
    Submit(submit::SubmitArgs),

    /// List pain points
    List(list::ListArgs),

    /// Show a pain point with its comments
    Show(show::ShowArgs),

    /// Approve, reject, archive or restore a pain point (admin)
    #[command(subcommand)]
    Moderate(moderate::ModerateCommand),

    /// Vote for a pain point
    Vote(vote::VoteArgs),

    /// Read and write comments
    #[command(subcommand)]
    Comment(comment::CommentCommand),

    /// Community poll
    #[command(subcommand)]
    Poll(poll::PollCommand),

    /// Programme interest registrations
    #[command(subcommand)]
    Interest(interest::InterestCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Everything a command needs: the loaded config, the board over the file
/// store, and the acting user
pub struct AppContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub history_dir: PathBuf,
    user: Option<String>,
    name: Option<String>,
    department: Option<String>,
}

impl AppContext {
    fn from_args(args: &GlobalArgs) -> Result<Self> {
        let config_path = args.config_path();
        let config = Config::load(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| config.store.data_dir.clone())
            .unwrap_or_else(board_storage::default_data_dir);
        let history_dir = config
            .store
            .history_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("history"));
        debug!(
            "Using data directory {} and history directory {}",
            data_dir.display(),
            history_dir.display()
        );

        Ok(Self {
            config,
            data_dir,
            history_dir,
            user: args.user.clone(),
            name: args.name.clone(),
            department: args.department.clone(),
        })
    }

    /// Open the board over the file store
    pub fn board(&self) -> Result<Board> {
        let store = FileSystemStore::new(&self.data_dir).with_context(|| {
            format!("Failed to open data directory {}", self.data_dir.display())
        })?;
        Ok(Board::with_config(Arc::new(store), &self.config))
    }

    /// The acting user, if one was given
    pub fn actor(&self) -> Option<Actor> {
        let email = self.user.as_deref()?.trim();
        if email.is_empty() {
            return None;
        }
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        let mut actor = Actor::new(email, name);
        if let Some(department) = &self.department {
            actor = actor.with_department(department.clone());
        }
        if self.config.is_admin(email) {
            actor = actor.as_admin();
        }
        Some(actor)
    }

    /// The acting user, or an error asking for one
    pub fn require_actor(&self) -> Result<Actor> {
        self.actor()
            .ok_or_else(|| anyhow!("No user given. Pass --user <email> or set PAINBOARD_USER."))
    }

    /// The acting user, who must be an admin
    pub fn require_admin(&self) -> Result<Actor> {
        let actor = self.require_actor()?;
        actor.require_admin()?;
        Ok(actor)
    }

    /// Fail unless the submission is on the board or the user is an admin
    pub fn require_visible(&self, submission: &SubmissionView) -> Result<()> {
        let is_admin = self.actor().map(|a| a.is_admin).unwrap_or(false);
        if !submission.status.is_public() && !is_admin {
            bail!("Pain point {} is not on the board", submission.id);
        }
        Ok(())
    }

    /// The acting user with their local vote history. Each user gets their
    /// own history directory, like a browser profile.
    pub fn voter(&self) -> Result<VoterIdentity> {
        let actor = self.require_actor()?;
        let dir = self.history_dir.join(actor.voter_id.as_str());
        let history = FileVoteHistory::open(&dir).with_context(|| {
            format!("Failed to open vote history in {}", dir.display())
        })?;
        Ok(VoterIdentity::new(actor, Arc::new(history)))
    }

    /// The voter when a user was given, for read paths that show vote state
    pub fn optional_voter(&self) -> Result<Option<VoterIdentity>> {
        match self.actor() {
            Some(_) => self.voter().map(Some),
            None => Ok(None),
        }
    }
}

/// Run the CLI application
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.global.verbose);

    // Handle color output
    if cli.global.no_color {
        colored::control::set_override(false);
    }

    // Dispatch to command handler
    match cli.command {
        // Config commands must work on a config file that fails to load
        Commands::Config(cmd) => config::execute(&cli.global.config_path(), cmd),
        Commands::Init(args) => init::execute(&cli.global.config_path(), &cli.global, args),
        command => {
            let ctx = AppContext::from_args(&cli.global)?;
            dispatch(&ctx, command)
        }
    }
}

fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Submit(args) => submit::execute(ctx, args),
        Commands::List(args) => list::execute(ctx, args),
        Commands::Show(args) => show::execute(ctx, args),
        Commands::Moderate(cmd) => moderate::execute(ctx, cmd),
        Commands::Vote(args) => vote::execute(ctx, args),
        Commands::Comment(cmd) => comment::execute(ctx, cmd),
        Commands::Poll(cmd) => poll::execute(ctx, cmd),
        Commands::Interest(cmd) => interest::execute(ctx, cmd),
        Commands::Config(_) | Commands::Init(_) => {
            Err(anyhow!("command does not need an opened board"))
        }
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
