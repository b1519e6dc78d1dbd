//! Init command
//!
//! Initialize painboard configuration in a directory.

use super::GlobalArgs;
use anyhow::{Context, Result};
use board_core::config::{Config, DEFAULT_CONFIG_PATH};
use board_storage::FileSystemStore;
use clap::Args;
use std::path::{Path, PathBuf};

/// Arguments for the init command
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Email to grant admin rights (repeatable)
    #[arg(long = "admin", value_name = "EMAIL")]
    pub admins: Vec<String>,

    /// Keep board data inside the project (.painboard/data)
    #[arg(long)]
    pub local: bool,

    /// Force overwrite existing configuration
    #[arg(long)]
    pub force: bool,

    /// Directory to initialize (default: current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Execute the init command
pub fn execute(config_path: &Path, global: &GlobalArgs, args: InitArgs) -> Result<()> {
    use colored::Colorize;

    let project_dir = args
        .path
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // An explicit --config wins; otherwise the config goes into the project
    let config_path = if global.config.is_some() {
        config_path.to_path_buf()
    } else {
        project_dir.join(DEFAULT_CONFIG_PATH)
    };

    println!("Initializing painboard in {}...", project_dir.display());

    if config_path.exists() && !args.force {
        eprintln!(
            "{} painboard already initialized. Use --force to reinitialize.",
            "⚠".yellow()
        );
        return Ok(());
    }

    let mut config = Config::default();
    config.moderation.admins = args
        .admins
        .iter()
        .map(|a| a.trim().to_lowercase())
        .collect();
    config.store.data_dir = match (&global.data_dir, args.local) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(project_dir.join(".painboard").join("data")),
        (None, false) => None,
    };
    config.validate()?;

    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("{} Generated {}", "✓".green(), config_path.display());

    let data_dir = config
        .store
        .data_dir
        .clone()
        .unwrap_or_else(board_storage::default_data_dir);
    FileSystemStore::new(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    println!("{} Board data in {}", "✓".green(), data_dir.display());

    if config.moderation.admins.is_empty() {
        eprintln!(
            "{} No admins configured. Re-run with '{}' to moderate.",
            "⚠".yellow(),
            "--admin <email>".cyan()
        );
    }

    println!("\n{}", "Next steps:".bold());
    println!("  1. Submit a pain point:");
    println!(
        "     {}",
        "painboard submit --user you@example.com --title \"...\"".cyan()
    );
    println!("  2. Approve it as an admin:");
    println!("     {}", "painboard moderate approve <id>".cyan());

    Ok(())
}
