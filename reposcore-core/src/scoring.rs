//! The scoring engine: raw counts in, capped and weighted breakdown out.

use crate::activity::{ActivityCounts, ActivityMap};
use crate::report::ScoreBreakdown;
use crate::weights::ScoringRules;

/// Post-cap item counts per bucket ("valid" counts).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidCounts {
    pub pr_feature_bug: u64,
    pub pr_doc: u64,
    pub pr_typo: u64,
    pub issue_feature_bug: u64,
    pub issue_doc: u64,
}

impl ValidCounts {
    pub fn pr_valid(&self) -> u64 {
        self.pr_feature_bug.saturating_add(self.pr_doc).saturating_add(self.pr_typo)
    }

    pub fn issue_valid(&self) -> u64 {
        self.issue_feature_bug.saturating_add(self.issue_doc)
    }
}

/// Pure scoring function parameterised by a [`ScoringRules`] table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    rules: ScoringRules,
}

impl Scorer {
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Apply both caps and split the valid amounts back into buckets.
    ///
    /// Doc/typo PRs are capped at `caps.pr_doc × max(pr_fb, 1)`; the capped
    /// amount goes to documentation first, the remainder to typo. Issues are
    /// capped at `caps.issue × pr_valid`, feature/bug first.
    pub fn valid_counts(&self, counts: &ActivityCounts) -> ValidCounts {
        let caps = self.rules.caps;

        let pr_fb = counts.pr_feature_bug;
        let doc_cap = caps.pr_doc.saturating_mul(pr_fb.max(1));
        let pr_doc_typo = counts.pr_doc.saturating_add(counts.pr_typo).min(doc_cap);
        let pr_valid = pr_fb.saturating_add(pr_doc_typo);

        let issue_fb = counts.issue_feature_bug;
        let issue_valid = issue_fb
            .saturating_add(counts.issue_doc)
            .min(caps.issue.saturating_mul(pr_valid));

        let pr_fb_capped = pr_fb.min(pr_valid);
        let pr_rest = pr_valid - pr_fb_capped;
        let pr_doc_capped = counts.pr_doc.min(pr_rest);
        let pr_typo_capped = pr_rest - pr_doc_capped;

        let issue_fb_capped = issue_fb.min(issue_valid);
        let issue_doc_capped = issue_valid - issue_fb_capped;

        ValidCounts {
            pr_feature_bug: pr_fb_capped,
            pr_doc: pr_doc_capped,
            pr_typo: pr_typo_capped,
            issue_feature_bug: issue_fb_capped,
            issue_doc: issue_doc_capped,
        }
    }

    /// Score one participant. `rate` and `rank` are left at zero.
    ///
    /// Products and sums saturate at `u64::MAX`.
    pub fn score(&self, counts: &ActivityCounts) -> ScoreBreakdown {
        let valid = self.valid_counts(counts);
        let w = self.rules.weights;

        let feat_bug_pr = w.feat_bug_pr.saturating_mul(valid.pr_feature_bug);
        let doc_pr = w.doc_pr.saturating_mul(valid.pr_doc);
        let typo_pr = w.typo_pr.saturating_mul(valid.pr_typo);
        let feat_bug_issue = w.feat_bug_issue.saturating_mul(valid.issue_feature_bug);
        let doc_issue = w.doc_issue.saturating_mul(valid.issue_doc);
        let total = [doc_pr, typo_pr, feat_bug_issue, doc_issue]
            .into_iter()
            .fold(feat_bug_pr, u64::saturating_add);

        ScoreBreakdown {
            feat_bug_pr,
            doc_pr,
            typo_pr,
            feat_bug_issue,
            doc_issue,
            total,
            rate: 0.0,
            rank: 0,
        }
    }

    /// Score every participant, keeping the map's iteration order.
    pub fn score_all(&self, activity: &ActivityMap) -> Vec<(String, ScoreBreakdown)> {
        activity
            .iter()
            .map(|(name, counts)| (name.clone(), self.score(counts)))
            .collect()
    }
}
