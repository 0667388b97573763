//! Raw per-participant activity counts and the label → category lookup.
//!
//! Counts are produced once per analysis run (fetched from GitHub or loaded
//! from a cache snapshot) and are never mutated after scoring starts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::AddAssign;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Participant login → raw counts for one repository (or a merged set).
pub type ActivityMap = BTreeMap<String, ActivityCounts>;

/// Week number (1-based from the semester start) → PR/issue counts.
pub type WeeklyActivity = BTreeMap<u32, WeeklyCounts>;

// ---------------------------------------------------------------------------
// Category / ActivityKind
// ---------------------------------------------------------------------------

/// Label category used to weight a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FeatureBug,
    Documentation,
    Typo,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::FeatureBug    => "feat/bug",
            Category::Documentation => "document",
            Category::Typo          => "typo",
        })
    }
}

/// Whether an item was a pull request or an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PullRequest,
    Issue,
}

// ---------------------------------------------------------------------------
// ActivityCounts
// ---------------------------------------------------------------------------

/// Raw counts for one participant. Absent fields deserialize as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityCounts {
    pub pr_feature_bug: u64,
    pub pr_doc: u64,
    pub pr_typo: u64,
    pub issue_feature_bug: u64,
    pub issue_doc: u64,
}

impl ActivityCounts {
    /// Count one item of `kind` in `category`.
    ///
    /// Returns `false` for combinations that have no bucket (typo issues).
    pub fn record(&mut self, kind: ActivityKind, category: Category) -> bool {
        let slot = match (kind, category) {
            (ActivityKind::PullRequest, Category::FeatureBug)    => &mut self.pr_feature_bug,
            (ActivityKind::PullRequest, Category::Documentation) => &mut self.pr_doc,
            (ActivityKind::PullRequest, Category::Typo)          => &mut self.pr_typo,
            (ActivityKind::Issue, Category::FeatureBug)          => &mut self.issue_feature_bug,
            (ActivityKind::Issue, Category::Documentation)       => &mut self.issue_doc,
            (ActivityKind::Issue, Category::Typo)                => return false,
        };
        *slot += 1;
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for ActivityCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.pr_feature_bug += rhs.pr_feature_bug;
        self.pr_doc += rhs.pr_doc;
        self.pr_typo += rhs.pr_typo;
        self.issue_feature_bug += rhs.issue_feature_bug;
        self.issue_doc += rhs.issue_doc;
    }
}

// ---------------------------------------------------------------------------
// LabelTable
// ---------------------------------------------------------------------------

/// Explicit label name → category lookup. Unknown labels are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    entries: BTreeMap<String, Category>,
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::from_pairs([
            ("enhancement", Category::FeatureBug),
            ("feature", Category::FeatureBug),
            ("bug", Category::FeatureBug),
            ("documentation", Category::Documentation),
            ("typo", Category::Typo),
        ])
    }
}

impl LabelTable {
    /// Build a table from `(label, category)` pairs. Labels are lowercased.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Category)>,
        S: AsRef<str>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, cat)| (label.as_ref().to_ascii_lowercase(), cat))
            .collect();
        Self { entries }
    }

    /// Add or replace a single mapping.
    pub fn insert(&mut self, label: &str, category: Category) {
        self.entries.insert(label.to_ascii_lowercase(), category);
    }

    pub fn classify(&self, label: &str) -> Option<Category> {
        self.entries.get(&label.to_ascii_lowercase()).copied()
    }

    /// Distinct categories carried by an item's labels, in category order.
    pub fn categories<'a, I>(&self, labels: I) -> BTreeSet<Category>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels.into_iter().filter_map(|l| self.classify(l)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Category)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ---------------------------------------------------------------------------
// Weekly activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyCounts {
    pub pr: u64,
    pub issue: u64,
}

impl AddAssign for WeeklyCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.pr += rhs.pr;
        self.issue += rhs.issue;
    }
}

/// 1-based week of `date` relative to `start`; `None` before the start.
pub fn week_of(start: NaiveDate, date: NaiveDate) -> Option<u32> {
    let days = (date - start).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days / 7 + 1).ok()
}

/// Sum several weekly series week by week.
pub fn merge_weekly<'a, I>(series: I) -> WeeklyActivity
where
    I: IntoIterator<Item = &'a WeeklyActivity>,
{
    let mut out = WeeklyActivity::new();
    for weekly in series {
        for (week, counts) in weekly {
            *out.entry(*week).or_default() += *counts;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// RepoActivity
// ---------------------------------------------------------------------------

/// Everything collected for one repository; also the cache snapshot shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoActivity {
    /// Unix timestamp of the newest item seen; 0 when nothing was seen.
    pub update_time: i64,
    pub participants: ActivityMap,
    #[serde(default)]
    pub weekly_activity: WeeklyActivity,
    /// Date the weekly buckets were counted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_start: Option<NaiveDate>,
}

impl RepoActivity {
    /// True when GitHub has activity newer than this snapshot.
    pub fn is_stale(&self, latest_seen: Option<i64>) -> bool {
        latest_seen.is_some_and(|t| t > self.update_time)
    }

    /// Whether the weekly buckets can serve a run starting at `start`.
    /// Always true when no start is requested.
    pub fn weeks_match(&self, start: Option<NaiveDate>) -> bool {
        start.is_none() || self.semester_start == start
    }

    /// Drop the given logins from the participant map.
    pub fn exclude<'a, I>(&mut self, logins: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        for login in logins {
            if self.participants.remove(login).is_some() {
                tracing::debug!(login = %login, "excluded participant");
            }
        }
    }
}
