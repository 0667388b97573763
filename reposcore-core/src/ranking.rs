//! Competition ranking and percentage-rate normalisation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::report::{RankedCohort, RankedEntry, ScoreBreakdown};

/// Ordering among participants with exactly equal totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Ascending participant name.
    #[default]
    Name,
    /// Keep the order the entries were supplied in.
    Insertion,
}

/// `total / sum * 100`, rounded to one decimal; 0 when `sum` is 0.
pub fn rate(total: u64, sum: u64) -> f64 {
    if sum == 0 {
        return 0.0;
    }
    let pct = total as f64 / sum as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Competition ranks for totals already sorted in descending order.
///
/// `[100, 100, 80]` → `[1, 1, 3]`.
pub fn competition_ranks<I>(sorted_totals: I) -> Vec<usize>
where
    I: IntoIterator<Item = u64>,
{
    let mut ranks = Vec::new();
    let mut prev: Option<(u64, usize)> = None;
    for (idx, total) in sorted_totals.into_iter().enumerate() {
        let rank = match prev {
            Some((t, r)) if t == total => r,
            _ => idx + 1,
        };
        ranks.push(rank);
        prev = Some((total, rank));
    }
    ranks
}

/// Descending-total comparator with the configured tie-break.
pub(crate) fn compare(tie: TieBreak, a: (&str, u64), b: (&str, u64)) -> Ordering {
    let by_total = b.1.cmp(&a.1);
    match tie {
        TieBreak::Name      => by_total.then_with(|| a.0.cmp(b.0)),
        TieBreak::Insertion => by_total,
    }
}

/// Sort a scored cohort and assign ranks and rates.
pub fn rank(scored: Vec<(String, ScoreBreakdown)>, tie: TieBreak) -> RankedCohort {
    let mut entries: Vec<RankedEntry> = scored
        .into_iter()
        .map(|(name, score)| RankedEntry { name, score })
        .collect();
    // sort_by is stable, which is what makes `Insertion` work.
    entries.sort_by(|a, b| compare(tie, (&a.name, a.score.total), (&b.name, b.score.total)));

    let mut cohort = RankedCohort { entries };
    rerank(&mut cohort);
    cohort
}

/// Re-derive ranks and rates over the entries currently present.
///
/// Order is left untouched; callers must pass an already-sorted cohort.
pub fn rerank(cohort: &mut RankedCohort) {
    let sum = cohort.total_sum();
    let ranks = competition_ranks(cohort.entries.iter().map(|e| e.score.total));
    for (entry, r) in cohort.entries.iter_mut().zip(ranks) {
        entry.score.rank = r;
        entry.score.rate = rate(entry.score.total, sum);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(pairs: &[(&str, u64)]) -> Vec<(String, ScoreBreakdown)> {
        pairs
            .iter()
            .map(|(n, t)| (n.to_string(), ScoreBreakdown { total: *t, ..Default::default() }))
            .collect()
    }

    fn names(c: &RankedCohort) -> Vec<&str> {
        c.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn ties_share_rank_and_leave_gap() {
        let c = rank(scored(&[("c", 80), ("a", 100), ("b", 100)]), TieBreak::Name);
        let ranks: Vec<_> = c.iter().map(|e| e.score.rank).collect();
        assert_eq!(names(&c), vec!["a", "b", "c"]);
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn insertion_tie_break_is_stable() {
        let c = rank(scored(&[("zed", 5), ("amy", 5), ("bo", 9)]), TieBreak::Insertion);
        assert_eq!(names(&c), vec!["bo", "zed", "amy"]);
    }

    #[test]
    fn name_tie_break_sorts_ascending() {
        let c = rank(scored(&[("zed", 5), ("amy", 5)]), TieBreak::Name);
        assert_eq!(names(&c), vec!["amy", "zed"]);
    }

    #[test]
    fn rates_sum_to_about_one_hundred() {
        let c = rank(scored(&[("a", 1), ("b", 1), ("c", 1)]), TieBreak::Name);
        let sum: f64 = c.iter().map(|e| e.score.rate).sum();
        assert!((sum - 100.0).abs() < 0.5, "sum was {sum}");
        assert_eq!(c.entries[0].score.rate, 33.3);
    }

    #[test]
    fn zero_sum_gives_zero_rates() {
        let c = rank(scored(&[("a", 0), ("b", 0)]), TieBreak::Name);
        assert!(c.iter().all(|e| e.score.rate == 0.0));
        assert!(c.iter().all(|e| e.score.rank == 1));
    }

    #[test]
    fn empty_cohort_ranks_to_empty() {
        let c = rank(Vec::new(), TieBreak::Name);
        assert!(c.is_empty());
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        assert_eq!(rate(2, 3), 66.7);
        assert_eq!(rate(1, 8), 12.5);
        assert_eq!(rate(5, 0), 0.0);
    }

    #[test]
    fn competition_ranks_handle_runs() {
        assert_eq!(competition_ranks([9, 7, 7, 7, 3, 3, 1]), vec![1, 2, 2, 2, 5, 5, 7]);
    }
}
