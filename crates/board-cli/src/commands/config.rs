//! Config command
//!
//! Manage painboard configuration.

use anyhow::{bail, Context, Result};
use board_core::config::Config;
use clap::Subcommand;
use std::fs;
use std::path::Path;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(config_path: &Path, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(config_path, json),
        ConfigCommand::Reset { force } => reset_config(config_path, force),
        ConfigCommand::Validate => validate_config(config_path),
    }
}

fn show_config(config_path: &Path, as_json: bool) -> Result<()> {
    use colored::Colorize;

    if !config_path.exists() {
        eprintln!(
            "{} Configuration not found, showing defaults. Run '{}' to create one.",
            "⚠".yellow(),
            "painboard init".cyan()
        );
    }

    let config = Config::load(config_path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Configuration:".bold().underline());
        println!("{}", config_path.display().to_string().dimmed());
        println!();
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn reset_config(config_path: &Path, force: bool) -> Result<()> {
    use colored::Colorize;

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults?")
            .default(false)
            .interact()
            .context("Confirmation needs a terminal; pass --force to skip it")?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    // Backup existing
    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    Config::default()
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} Configuration reset to defaults.", "✓".green());
    Ok(())
}

fn validate_config(config_path: &Path) -> Result<()> {
    use colored::Colorize;

    if !config_path.exists() {
        bail!("Configuration not found at {}", config_path.display());
    }

    let content = fs::read_to_string(config_path)?;

    // Unknown keys are ignored by the loader, so report them here
    let raw: toml::Value = toml::from_str(&content).context("Invalid TOML")?;
    println!("{} Configuration is valid TOML", "✓".green());

    let known = ["store", "moderation", "submissions", "comments", "polls"];
    if let Some(table) = raw.as_table() {
        for key in table.keys().filter(|k| !known.contains(&k.as_str())) {
            println!("{} Unknown section [{}] is ignored", "⚠".yellow(), key);
        }
    }

    let config = Config::from_toml(&content)?;
    config.validate()?;
    println!("{} All values are in range", "✓".green());

    if config.moderation.admins.is_empty() {
        println!("{} No admins configured", "⚠".yellow());
    }

    Ok(())
}
