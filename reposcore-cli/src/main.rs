#![deny(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use reposcore_core::colors::THEME_NAMES;

mod commands;
mod logging;
mod output;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "reposcore",
    about = "Score GitHub contributions from merged pull requests and issues",
    version,
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repositories as owner/repo, space- or comma-separated
    /// (shorthand for `reposcore analyze <REPO>...`).
    repos: Vec<String>,

    #[command(flatten)]
    run: RunArgs,

    /// Show debug logs.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze repositories (same as the bare form).
    Analyze(AnalyzeArgs),

    /// Show the remaining GitHub API rate limit.
    Limit(LimitArgs),

    /// Print the effective score weights and caps.
    Weights(WeightsArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Repositories as owner/repo.
    #[arg(required = true)]
    repos: Vec<String>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Args)]
struct LimitArgs {
    /// GitHub token; `-` reads it from stdin.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Args)]
struct WeightsArgs {
    /// `table` or `toml` (a commented `.reposcore.toml` template).
    #[arg(long, default_value = "table")]
    format: String,

    /// Config file to read instead of discovering `.reposcore.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Table,
    Text,
    Chart,
    Html,
    All,
}

/// Options shared by the bare form and `analyze`.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Output directory.
    #[arg(short, long, default_value = "results")]
    pub output: PathBuf,

    /// Output formats; repeat or comma-separate.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "all")]
    pub format: Vec<FormatArg>,

    /// Show letter grades on the score chart.
    #[arg(long)]
    pub grade: bool,

    /// Reuse cached snapshots when GitHub has nothing newer.
    #[arg(long)]
    pub use_cache: bool,

    /// GitHub token; `-` reads it from stdin.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print the API rate limit before analyzing.
    #[arg(long)]
    pub check_limit: bool,

    /// JSON file mapping GitHub logins to display names.
    #[arg(long)]
    pub user_info: Option<PathBuf>,

    /// Print this user's rank and total.
    #[arg(long)]
    pub user: Option<String>,

    /// Chart theme.
    #[arg(long, default_value = "default", value_parser = PossibleValuesParser::new(THEME_NAMES.iter().copied()))]
    pub theme: String,

    /// Also draw weekly PR/issue activity charts.
    #[arg(long, requires = "semester_start")]
    pub weekly_chart: bool,

    /// Semester start date (YYYY-MM-DD) for weekly buckets.
    #[arg(long, requires = "weekly_chart", value_parser = parse_date)]
    pub semester_start: Option<NaiveDate>,

    /// Drop participants whose total is below this.
    #[arg(long, default_value_t = 1)]
    pub min_contributions: u64,

    /// Keep only the first N participants.
    #[arg(long)]
    pub top: Option<usize>,

    /// Print what would be done without calling GitHub or writing files.
    #[arg(long)]
    pub dry_run: bool,

    /// Config file to read instead of discovering `.reposcore.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(Command::Analyze(a)) => commands::analyze::run(&a.repos, &a.run),

        Some(Command::Limit(a)) => commands::limit::run(a.token.as_deref()),

        Some(Command::Weights(a)) => commands::weights::run(&a.format, a.config.as_deref()),

        None => {
            if cli.repos.is_empty() {
                anyhow::bail!("no repository given; pass owner/repo (see --help)");
            }
            commands::analyze::run(&cli.repos, &cli.run)
        }
    }
}
