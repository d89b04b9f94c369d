mod commands;

use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codesync-cli")]
#[command(about = "CodeSync CLI - Inspect harnesses, grade submissions, and seed the problem catalogue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the harness that would be sent to the execution oracle
    Harness {
        /// Problem id (e.g., two-sum)
        #[arg(short, long)]
        problem: String,

        /// Candidate source file
        #[arg(short, long)]
        file: PathBuf,

        /// Problem catalogue file
        #[arg(long, default_value = "config/problems.json")]
        problems: PathBuf,

        /// Entry point registry file
        #[arg(long, default_value = "config/entry_points.json")]
        entry_points: PathBuf,
    },

    /// Grade a source file against a problem's test cases
    Submit {
        /// Problem id (e.g., two-sum)
        #[arg(short, long)]
        problem: String,

        /// Candidate source file
        #[arg(short, long)]
        file: PathBuf,

        /// Candidate language
        #[arg(short, long, default_value = "javascript")]
        language: String,

        /// Print the full submission report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Run a source file unmodified and print its output
    Run {
        /// Language (e.g., javascript, python)
        #[arg(short, long)]
        language: String,

        /// Source file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Load problems from a JSON file into the Redis catalogue
    Seed {
        /// Problem catalogue file
        #[arg(long, default_value = "config/problems.json")]
        problems: PathBuf,

        /// Redis URL
        #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
        redis_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harness {
            problem,
            file,
            problems,
            entry_points,
        } => {
            commands::print_harness(&problem, &file, &problems, &entry_points)?;
        }
        Commands::Submit {
            problem,
            file,
            language,
            json,
        } => {
            commands::submit(&problem, &file, &language, json).await?;
        }
        Commands::Run { language, file } => {
            commands::run(&language, &file).await?;
        }
        Commands::Seed { problems, redis_url } => {
            commands::seed(&problems, &redis_url).await?;
        }
    }

    Ok(())
}
