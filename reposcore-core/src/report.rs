use serde::{Deserialize, Serialize};

/// Weighted score contributions for one participant.
///
/// `rate` and `rank` stay at zero until the cohort is ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "feat/bug PR")]
    pub feat_bug_pr: u64,
    #[serde(rename = "document PR")]
    pub doc_pr: u64,
    #[serde(rename = "typo PR")]
    pub typo_pr: u64,
    #[serde(rename = "feat/bug issue")]
    pub feat_bug_issue: u64,
    #[serde(rename = "document issue")]
    pub doc_issue: u64,
    pub total: u64,
    /// Percentage of the cohort's score sum, one decimal.
    pub rate: f64,
    /// 1-based competition rank.
    pub rank: usize,
}

impl ScoreBreakdown {
    /// PR-derived part of the total.
    pub fn pr_points(&self) -> u64 {
        self.feat_bug_pr + self.doc_pr + self.typo_pr
    }

    /// Issue-derived part of the total.
    pub fn issue_points(&self) -> u64 {
        self.feat_bug_issue + self.doc_issue
    }
}

/// One participant's entry in a ranked cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub name: String,
    #[serde(flatten)]
    pub score: ScoreBreakdown,
}

/// A cohort ordered by descending total with ranks and rates assigned.
///
/// The order is authoritative: formatters must not re-sort it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedCohort {
    pub entries: Vec<RankedEntry>,
}

impl RankedCohort {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RankedEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn total_sum(&self) -> u64 {
        self.entries.iter().map(|e| e.score.total).fold(0, u64::saturating_add)
    }
}

/// Cross-repository row: per-repository totals summed into one total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallEntry {
    pub name: String,
    /// Totals in the same order as [`OverallCohort::repositories`]; 0 where absent.
    pub per_repository: Vec<u64>,
    pub total: u64,
    pub rate: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallCohort {
    pub repositories: Vec<String>,
    pub entries: Vec<OverallEntry>,
}

impl OverallCohort {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&OverallEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

/// Per-field means over a cohort, used for the `avg` row of text output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Averages {
    pub feat_bug_pr: f64,
    pub doc_pr: f64,
    pub typo_pr: f64,
    pub feat_bug_issue: f64,
    pub doc_issue: f64,
    pub total: f64,
    pub rate: f64,
}

/// Where one participant stands within a cohort.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing {
    pub rank: usize,
    pub total: u64,
    pub cohort_size: usize,
}
