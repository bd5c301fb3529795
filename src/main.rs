//! Garden Sync CLI
//!
//! Entry point for the `garden-sync` command-line tool.

use clap::{Parser, Subcommand};
use garden_sync::contributors::{self, MojangClient};
use garden_sync::pipeline;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "garden-sync")]
#[command(about = "Maintenance commands for the garden constants", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge milestone deltas into the crop milestone table
    Milestones {
        /// Path to the milestone table file
        #[arg(long, default_value = "constants/Garden.json")]
        table: PathBuf,

        /// Path to the delta source file
        #[arg(long, default_value = "milestones.txt")]
        deltas: PathBuf,
    },

    /// Refresh contributor display names from the Mojang profile API
    Contributors {
        /// Path to the contributor list file
        #[arg(long, default_value = "constants/ContributorList.json")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Milestones { table, deltas } => {
            run_milestones(&table, &deltas);
        }
        Commands::Contributors { file } => {
            run_contributors(&file);
        }
    }
}

fn run_milestones(table: &Path, deltas: &Path) {
    let outcome = match pipeline::run_milestone_update(table, deltas) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for s in &outcome.suppressions {
        eprintln!(
            "Warning: {} tier {}: keeping {} over low-precision {}",
            s.crop, s.tier, s.kept, s.incoming
        );
    }
    println!("Updated {} milestone(s)", outcome.updated);
}

fn run_contributors(file: &Path) {
    let client = MojangClient::new();
    match contributors::run_contributor_update(file, &client) {
        Ok(changes) if changes.is_empty() => {
            println!("Nothing updated");
        }
        Ok(changes) => {
            println!("Updated {} entries", changes.len());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
