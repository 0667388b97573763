use std::fmt;

use comfy_table::presets::ASCII_FULL;
use comfy_table::{CellAlignment, Table};

use crate::report::{Averages, OverallCohort, RankedCohort};

/// Output artifact kinds written per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    /// `score.csv`
    Table,
    /// `score.txt`
    Text,
    /// SVG charts
    Chart,
    /// `index.html`
    Html,
}

impl OutputFormat {
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Table, OutputFormat::Text, OutputFormat::Chart, OutputFormat::Html]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Text  => "text",
            OutputFormat::Chart => "chart",
            OutputFormat::Html  => "html",
        })
    }
}

/// Column labels shared by every per-participant formatter.
pub const SCORE_COLUMNS: [&str; 9] = [
    "name",
    "rank",
    "feat/bug PR",
    "document PR",
    "typo PR",
    "feat/bug issue",
    "document issue",
    "total",
    "rate",
];

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// `score.csv`: one row per participant in cohort order.
pub fn format_csv(cohort: &RankedCohort) -> String {
    let mut out = SCORE_COLUMNS.join(",");
    out.push('\n');
    for e in cohort.iter() {
        let s = &e.score;
        out.push_str(&format!(
            "{},{},{},{},{},{},{},{},{:.1}\n",
            csv_field(&e.name),
            s.rank,
            s.feat_bug_pr,
            s.doc_pr,
            s.typo_pr,
            s.feat_bug_issue,
            s.doc_issue,
            s.total,
            s.rate
        ));
    }
    out
}

/// `overall_scores.csv`: rank, name, one column per repository, total.
pub fn format_overall_csv(overall: &OverallCohort) -> String {
    let mut header = vec!["rank".to_string(), "name".to_string()];
    header.extend(overall.repositories.iter().map(|r| csv_field(r)));
    header.push("total".to_string());

    let mut out = header.join(",");
    out.push('\n');
    for e in &overall.entries {
        let mut row = vec![e.rank.to_string(), csv_field(&e.name)];
        row.extend(e.per_repository.iter().map(u64::to_string));
        row.push(e.total.to_string());
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Text tables
// ---------------------------------------------------------------------------

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(header);
    table
}

fn align_numbers(table: &mut Table, from: usize) {
    let n = table.column_count();
    for idx in from..n {
        if let Some(col) = table.column_mut(idx) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// `score.txt`: the score table preceded by an `avg` row.
pub fn format_text(cohort: &RankedCohort, avg: &Averages) -> String {
    let mut table = new_table(SCORE_COLUMNS);
    table.add_row(vec![
        "avg".to_string(),
        String::new(),
        format!("{:.1}", avg.feat_bug_pr),
        format!("{:.1}", avg.doc_pr),
        format!("{:.1}", avg.typo_pr),
        format!("{:.1}", avg.feat_bug_issue),
        format!("{:.1}", avg.doc_issue),
        format!("{:.1}", avg.total),
        format!("{:.1}%", avg.rate),
    ]);
    for e in cohort.iter() {
        let s = &e.score;
        table.add_row(vec![
            e.name.clone(),
            s.rank.to_string(),
            s.feat_bug_pr.to_string(),
            s.doc_pr.to_string(),
            s.typo_pr.to_string(),
            s.feat_bug_issue.to_string(),
            s.doc_issue.to_string(),
            s.total.to_string(),
            format!("{:.1}%", s.rate),
        ]);
    }
    align_numbers(&mut table, 1);
    format!("{table}\n")
}

/// `overall_scores.txt`.
pub fn format_overall_text(overall: &OverallCohort) -> String {
    let mut header = vec!["rank".to_string(), "name".to_string()];
    header.extend(overall.repositories.iter().cloned());
    header.push("total".to_string());

    let mut table = new_table(header);
    for e in &overall.entries {
        let mut row = vec![e.rank.to_string(), e.name.clone()];
        row.extend(e.per_repository.iter().map(u64::to_string));
        row.push(e.total.to_string());
        table.add_row(row);
    }
    align_numbers(&mut table, 2);
    format!("{table}\n")
}
