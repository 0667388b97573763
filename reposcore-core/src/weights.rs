//! Score weights and cap ratios.
//!
//! [`ScoringRules`] is the only state the scoring engine holds. Defaults
//! match the course rubric (feat/bug PR 3, doc PR 2, typo PR 1, feat/bug
//! issue 2, doc issue 1; doc/typo PRs capped at 3× feat/bug PRs, issues at
//! 4× valid PRs). Every value can be overridden from `.reposcore.toml`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScoreWeights
// ---------------------------------------------------------------------------

/// Points awarded per valid item in each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub feat_bug_pr: u64,
    pub doc_pr: u64,
    pub typo_pr: u64,
    pub feat_bug_issue: u64,
    pub doc_issue: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            feat_bug_pr: 3,
            doc_pr: 2,
            typo_pr: 1,
            feat_bug_issue: 2,
            doc_issue: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// CapRatios
// ---------------------------------------------------------------------------

/// Multipliers bounding low-effort contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapRatios {
    /// doc+typo PRs ≤ ratio × max(feat/bug PRs, 1).
    pub pr_doc: u64,
    /// feat/bug+doc issues ≤ ratio × valid PRs.
    pub issue: u64,
}

impl Default for CapRatios {
    fn default() -> Self {
        Self { pr_doc: 3, issue: 4 }
    }
}

/// Weights plus caps: everything the scoring function depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default)]
    pub caps: CapRatios,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Description of one tunable value, for `reposcore weights`.
#[derive(Debug, Clone)]
pub struct RuleSpec {
    /// TOML path, e.g. `"weights.doc_pr"`.
    pub key: &'static str,
    pub description: &'static str,
    pub default: u64,
}

pub static ALL_RULES: &[RuleSpec] = &[
    RuleSpec { key: "weights.feat_bug_pr",    description: "Points per merged feature/bug PR",           default: 3 },
    RuleSpec { key: "weights.doc_pr",         description: "Points per merged documentation PR",         default: 2 },
    RuleSpec { key: "weights.typo_pr",        description: "Points per merged typo PR",                  default: 1 },
    RuleSpec { key: "weights.feat_bug_issue", description: "Points per feature/bug issue",               default: 2 },
    RuleSpec { key: "weights.doc_issue",      description: "Points per documentation issue",             default: 1 },
    RuleSpec { key: "caps.pr_doc",            description: "Doc+typo PR cap, multiple of feat/bug PRs",  default: 3 },
    RuleSpec { key: "caps.issue",             description: "Issue cap, multiple of valid PRs",           default: 4 },
];

impl ScoringRules {
    /// Effective value for a catalogue key; `None` for unknown keys.
    pub fn value(&self, key: &str) -> Option<u64> {
        Some(match key {
            "weights.feat_bug_pr"    => self.weights.feat_bug_pr,
            "weights.doc_pr"         => self.weights.doc_pr,
            "weights.typo_pr"        => self.weights.typo_pr,
            "weights.feat_bug_issue" => self.weights.feat_bug_issue,
            "weights.doc_issue"      => self.weights.doc_issue,
            "caps.pr_doc"            => self.caps.pr_doc,
            "caps.issue"             => self.caps.issue,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_defaults_match_default_rules() {
        let rules = ScoringRules::default();
        for spec in ALL_RULES {
            assert_eq!(rules.value(spec.key), Some(spec.default), "mismatch for {}", spec.key);
        }
    }

    #[test]
    fn catalogue_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for spec in ALL_RULES {
            assert!(seen.insert(spec.key), "duplicate rule key: {}", spec.key);
        }
    }

    #[test]
    fn partial_weights_fall_back_to_defaults() {
        let rules: ScoringRules = toml::from_str("[weights]\ndoc_pr = 5\n").unwrap();
        assert_eq!(rules.weights.doc_pr, 5);
        assert_eq!(rules.weights.feat_bug_pr, 3);
        assert_eq!(rules.caps, CapRatios::default());
    }

    #[test]
    fn unknown_key_has_no_value() {
        assert_eq!(ScoringRules::default().value("weights.nope"), None);
    }
}
