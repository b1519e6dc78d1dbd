//! painboard - Workplace pain point board CLI
//!
//! Staff submit pain points, admins moderate them, and everyone votes and
//! comments on what is on the board.
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize in the current directory with an admin
//! painboard init --local --admin lead@example.com
//!
//! # Submit a pain point
//! painboard submit --user jane@example.com --title "Printer jams weekly" \
//!     --challenge "Jams every Monday" --impact "Lost mornings"
//!
//! # Approve it and vote
//! painboard moderate approve <id> --user lead@example.com
//! painboard vote <id> --user sam@example.com
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
