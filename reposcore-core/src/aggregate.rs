//! Cross-repository merging: raw activity sums and per-repository totals.

use std::collections::HashMap;

use crate::activity::ActivityMap;
use crate::ranking::{compare, competition_ranks, rate, TieBreak};
use crate::report::{OverallCohort, OverallEntry, RankedCohort};

/// Field-wise sum of several repositories' activity maps.
///
/// A participant missing from a repository contributes zero there. The
/// result does not depend on the order of `maps`.
pub fn merge_activity<'a, I>(maps: I) -> ActivityMap
where
    I: IntoIterator<Item = &'a ActivityMap>,
{
    let mut merged = ActivityMap::new();
    for map in maps {
        for (name, counts) in map {
            *merged.entry(name.clone()).or_default() += *counts;
        }
    }
    merged
}

/// Sum each participant's per-repository totals and rank the result.
///
/// Each repository is scored on its own first, so one repository's caps
/// never mask another's. Insertion order for [`TieBreak::Insertion`] is
/// first appearance across `per_repo` in the order given.
pub fn merge_totals(per_repo: &[(String, RankedCohort)], tie: TieBreak) -> OverallCohort {
    let repositories: Vec<String> = per_repo.iter().map(|(r, _)| r.clone()).collect();
    let width = repositories.len();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<(String, Vec<u64>)> = Vec::new();

    for (col, (_, cohort)) in per_repo.iter().enumerate() {
        for entry in cohort.iter() {
            let idx = *index.entry(entry.name.clone()).or_insert_with(|| {
                rows.push((entry.name.clone(), vec![0; width]));
                rows.len() - 1
            });
            rows[idx].1[col] += entry.score.total;
        }
    }

    let mut entries: Vec<OverallEntry> = rows
        .into_iter()
        .map(|(name, per_repository)| {
            let total = per_repository.iter().copied().fold(0, u64::saturating_add);
            OverallEntry { name, per_repository, total, rate: 0.0, rank: 0 }
        })
        .collect();
    entries.sort_by(|a, b| compare(tie, (&a.name, a.total), (&b.name, b.total)));

    let sum = entries.iter().map(|e| e.total).fold(0, u64::saturating_add);
    let ranks = competition_ranks(entries.iter().map(|e| e.total));
    for (entry, r) in entries.iter_mut().zip(ranks) {
        entry.rank = r;
        entry.rate = rate(entry.total, sum);
    }

    OverallCohort { repositories, entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCounts;
    use crate::ranking::rank;
    use crate::report::ScoreBreakdown;

    fn pr_fb(n: u64) -> ActivityCounts {
        ActivityCounts { pr_feature_bug: n, ..Default::default() }
    }

    fn cohort(pairs: &[(&str, u64)]) -> RankedCohort {
        rank(
            pairs
                .iter()
                .map(|(n, t)| (n.to_string(), ScoreBreakdown { total: *t, ..Default::default() }))
                .collect(),
            TieBreak::Name,
        )
    }

    #[test]
    fn activity_sums_per_participant() {
        let a = ActivityMap::from([("x".into(), pr_fb(1)), ("y".into(), pr_fb(2))]);
        let b = ActivityMap::from([("x".into(), pr_fb(4))]);
        let merged = merge_activity([&a, &b]);
        assert_eq!(merged["x"].pr_feature_bug, 5);
        assert_eq!(merged["y"].pr_feature_bug, 2);
    }

    #[test]
    fn merging_nothing_is_empty() {
        assert!(merge_activity(std::iter::empty()).is_empty());
    }

    #[test]
    fn totals_fill_missing_repositories_with_zero() {
        let overall = merge_totals(
            &[
                ("o/a".into(), cohort(&[("x", 10), ("y", 4)])),
                ("o/b".into(), cohort(&[("y", 9)])),
            ],
            TieBreak::Name,
        );
        assert_eq!(overall.repositories, vec!["o/a", "o/b"]);
        let y = overall.get("y").unwrap();
        assert_eq!(y.per_repository, vec![4, 9]);
        assert_eq!(y.total, 13);
        assert_eq!(y.rank, 1);
        let x = overall.get("x").unwrap();
        assert_eq!(x.per_repository, vec![10, 0]);
        assert_eq!(x.rank, 2);
    }

    #[test]
    fn overall_ties_share_rank() {
        let overall = merge_totals(
            &[("o/a".into(), cohort(&[("x", 5), ("y", 5), ("z", 1)]))],
            TieBreak::Name,
        );
        let ranks: Vec<_> = overall.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
        assert_eq!(overall.entries[0].rate, 45.5);
    }
}
