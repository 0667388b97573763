//! Shaping a ranked cohort for the formatters.
//!
//! Projection filters and truncates but never re-sorts: the order produced
//! by [`crate::ranking::rank`] is authoritative.

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::ranking::{competition_ranks, rate, rerank};
use crate::report::{Averages, OverallCohort, RankedCohort, ScoreBreakdown, Standing};

/// Whether ranks survive filtering or are recomputed over what is left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterRanks {
    /// Ranks and rates from the full cohort are kept; gaps are allowed.
    #[default]
    Keep,
    Rerank,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
    /// Entries with `total < min_score` are dropped.
    pub min_score: u64,
    /// Keep at most this many entries after the score filter.
    pub top: Option<usize>,
    pub filter_ranks: FilterRanks,
}

/// Apply the minimum-score filter and the top-N cut.
pub fn project(cohort: &RankedCohort, opts: &ProjectionOptions) -> RankedCohort {
    let limit = opts.top.unwrap_or(usize::MAX);
    let entries = cohort
        .iter()
        .filter(|e| e.score.total >= opts.min_score)
        .take(limit)
        .cloned()
        .collect();

    let mut out = RankedCohort { entries };
    if opts.filter_ranks == FilterRanks::Rerank {
        rerank(&mut out);
    }
    out
}

/// [`project`] for the cross-repository cohort.
pub fn project_overall(overall: &OverallCohort, opts: &ProjectionOptions) -> OverallCohort {
    let limit = opts.top.unwrap_or(usize::MAX);
    let mut entries: Vec<_> = overall
        .entries
        .iter()
        .filter(|e| e.total >= opts.min_score)
        .take(limit)
        .cloned()
        .collect();

    if opts.filter_ranks == FilterRanks::Rerank {
        let sum = entries.iter().map(|e| e.total).fold(0, u64::saturating_add);
        let ranks = competition_ranks(entries.iter().map(|e| e.total));
        for (e, r) in entries.iter_mut().zip(ranks) {
            e.rank = r;
            e.rate = rate(e.total, sum);
        }
    }
    OverallCohort { repositories: overall.repositories.clone(), entries }
}

/// Per-field means; all zero for an empty cohort.
pub fn averages(cohort: &RankedCohort) -> Averages {
    if cohort.is_empty() {
        return Averages::default();
    }
    Averages {
        feat_bug_pr: mean(cohort, |s| s.feat_bug_pr as f64),
        doc_pr: mean(cohort, |s| s.doc_pr as f64),
        typo_pr: mean(cohort, |s| s.typo_pr as f64),
        feat_bug_issue: mean(cohort, |s| s.feat_bug_issue as f64),
        doc_issue: mean(cohort, |s| s.doc_issue as f64),
        total: mean(cohort, |s| s.total as f64),
        rate: mean(cohort, |s| s.rate),
    }
}

fn mean<F>(cohort: &RankedCohort, field: F) -> f64
where
    F: Fn(&ScoreBreakdown) -> f64,
{
    cohort.iter().map(|e| field(&e.score)).sum::<f64>() / cohort.len() as f64
}

/// Rank and total of `login` (resolved through `aliases`) within `cohort`.
pub fn lookup(cohort: &RankedCohort, aliases: &AliasTable, login: &str) -> Option<Standing> {
    let name = aliases.resolve(login);
    cohort.get(name).map(|e| Standing {
        rank: e.score.rank,
        total: e.score.total,
        cohort_size: cohort.len(),
    })
}

/// [`lookup`] against summed per-repository totals.
pub fn lookup_overall(overall: &OverallCohort, aliases: &AliasTable, login: &str) -> Option<Standing> {
    let name = aliases.resolve(login);
    overall.get(name).map(|e| Standing {
        rank: e.rank,
        total: e.total,
        cohort_size: overall.entries.len(),
    })
}
