use std::path::Path;

use colored::Colorize;
use reposcore_core::colors::Grade;
use reposcore_core::github::RateLimit;
use reposcore_core::report::{RankedCohort, Standing};

/// Rows shown in the terminal summary; the files carry everything.
const SUMMARY_ROWS: usize = 10;

/// Terminal summary for one cohort: header, top rows with graded totals.
pub fn format_pretty(title: &str, cohort: &RankedCohort) -> String {
    let mut out = format!("{} {}\n", "Repository:".bold(), title);

    if cohort.is_empty() {
        out.push_str(&format!("  {}\n", "No contributions".dimmed()));
        return out;
    }
    out.push_str(&format!(
        "{} {} | {} {}\n",
        "Participants:".dimmed(),
        cohort.len(),
        "Points:".dimmed(),
        cohort.total_sum(),
    ));

    for e in cohort.iter().take(SUMMARY_ROWS) {
        let grade = Grade::from_total(e.score.total);
        let total = format!("{:>5} ({grade})", e.score.total);
        out.push_str(&format!(
            "  {:>3}. {:<20} {} {:>5.1}%\n",
            e.score.rank,
            e.name,
            total.color(grade.terminal_color()),
            e.score.rate,
        ));
    }
    if cohort.len() > SUMMARY_ROWS {
        out.push_str(&format!("  {}\n", format!("… {} more", cohort.len() - SUMMARY_ROWS).dimmed()));
    }
    out
}

pub fn format_standing(login: &str, standing: Option<&Standing>) -> String {
    match standing {
        Some(s) => format!(
            "{} {} is ranked {} of {} with {} points",
            "User:".bold(),
            login,
            s.rank.to_string().bold(),
            s.cohort_size,
            s.total,
        ),
        None => format!("{} {} {}", "User:".bold(), login, "has no contributions".dimmed()),
    }
}

pub fn format_rate_limit(limit: &RateLimit) -> String {
    let reset = limit
        .reset_at()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".into());
    let remaining = limit.remaining.to_string();
    let remaining = if limit.remaining == 0 { remaining.red() } else { remaining.green() };
    format!(
        "{} {remaining}/{} requests remaining, resets at {reset}",
        "Rate limit:".bold(),
        limit.limit,
    )
}

/// One planned repository for `--dry-run`.
pub struct PlannedRepo<'a> {
    pub name: String,
    pub cache: &'a Path,
    pub output: &'a Path,
}

pub fn format_plan(repos: &[PlannedRepo<'_>], formats: &[String], use_cache: bool, config: Option<&Path>) -> String {
    let mut out = format!("{}\n", "Dry run: nothing will be fetched or written".bold());
    for r in repos {
        out.push_str(&format!("  {} {}\n", "repo".green(), r.name));
        out.push_str(&format!(
            "       cache  {}{}\n",
            r.cache.display(),
            if use_cache { "" } else { " (write only)" }
        ));
        out.push_str(&format!("       output {}\n", r.output.display()));
    }
    out.push_str(&format!("  {} {}\n", "formats".dimmed(), formats.join(", ")));
    match config {
        Some(p) => out.push_str(&format!("  {} {}\n", "config".dimmed(), p.display())),
        None => out.push_str(&format!("  {} built-in defaults\n", "config".dimmed())),
    }
    out
}
