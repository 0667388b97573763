use anyhow::Context;
use chrono::NaiveDate;

use crate::activity::{merge_weekly, ActivityMap, RepoActivity, WeeklyActivity};
use crate::aggregate::{merge_activity, merge_totals};
use crate::alias::{AliasError, AliasTable};
use crate::cache::Cache;
use crate::config::Config;
use crate::github::{ActivitySource, RepoName};
use crate::ranking::rank;
use crate::report::{OverallCohort, RankedCohort};
use crate::scoring::Scorer;

/// Scores for one repository plus the activity they came from.
#[derive(Debug, Clone)]
pub struct RepoScores {
    pub repo: RepoName,
    pub activity: RepoActivity,
    pub cohort: RankedCohort,
}

/// Result of a full run.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub repos: Vec<RepoScores>,
    /// Merged raw activity re-scored as one cohort; multi-repository runs only.
    pub ratio: Option<RankedCohort>,
    /// Per-repository totals summed; multi-repository runs only.
    pub overall: Option<OverallCohort>,
    pub weekly: WeeklyActivity,
}

/// Collects activity, scores it and aggregates across repositories.
pub struct Pipeline {
    source: Box<dyn ActivitySource>,
    config: Config,
    aliases: AliasTable,
    cache: Option<Cache>,
    use_cache: bool,
    semester_start: Option<NaiveDate>,
}

impl Pipeline {
    pub fn new(source: Box<dyn ActivitySource>, config: Config) -> Self {
        Self {
            source,
            config,
            aliases: AliasTable::default(),
            cache: None,
            use_cache: false,
            semester_start: None,
        }
    }

    pub fn with_aliases(mut self, aliases: AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    /// Snapshots are always written to `cache`; they are read back only
    /// when `use_cache` is set.
    pub fn with_cache(mut self, cache: Cache, use_cache: bool) -> Self {
        self.cache = Some(cache);
        self.use_cache = use_cache;
        self
    }

    /// Snapshots whose weeks were counted from another date are refetched.
    pub fn with_semester_start(mut self, start: Option<NaiveDate>) -> Self {
        self.semester_start = start;
        self
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Activity for `repo`, from a fresh snapshot or the source.
    pub fn collect(&self, repo: &RepoName) -> anyhow::Result<RepoActivity> {
        if let Some(snapshot) = self.fresh_snapshot(repo)? {
            tracing::info!(repo = %repo, "using cached snapshot");
            return Ok(snapshot);
        }

        tracing::info!(repo = %repo, "collecting activity from GitHub");
        let mut activity = self
            .source
            .fetch(repo)
            .with_context(|| format!("failed to collect activity for {repo}"))?;
        activity.exclude(&self.config.exclude);

        if let Some(cache) = &self.cache {
            cache
                .put(repo, &activity)
                .with_context(|| format!("failed to write snapshot for {repo}"))?;
        }
        Ok(activity)
    }

    fn fresh_snapshot(&self, repo: &RepoName) -> anyhow::Result<Option<RepoActivity>> {
        let cache = match (&self.cache, self.use_cache) {
            (Some(c), true) => c,
            _ => return Ok(None),
        };
        let Some(mut snapshot) = cache.get(repo)? else {
            return Ok(None);
        };
        if !snapshot.weeks_match(self.semester_start) {
            tracing::info!(
                repo = %repo,
                cached = ?snapshot.semester_start,
                requested = ?self.semester_start,
                "snapshot weeks use another semester start"
            );
            return Ok(None);
        }
        let latest = match self.source.latest_activity(repo) {
            Ok(latest) => latest,
            Err(e) => {
                tracing::warn!(repo = %repo, "cannot check for newer activity ({e}); using snapshot");
                None
            }
        };
        if snapshot.is_stale(latest) {
            tracing::info!(repo = %repo, "snapshot is stale");
            return Ok(None);
        }
        snapshot.exclude(&self.config.exclude);
        Ok(Some(snapshot))
    }

    /// Score, alias and rank one activity map.
    pub fn score(&self, activity: &ActivityMap) -> Result<RankedCohort, AliasError> {
        let scored = Scorer::new(self.config.rules).score_all(activity);
        let renamed = self.aliases.apply(scored, self.config.ranking.alias_collision)?;
        Ok(rank(renamed, self.config.ranking.tie_break))
    }

    /// Run every repository, calling `on_repo` before each one.
    ///
    /// Any repository failure aborts the whole run.
    pub fn run<F>(&self, repos: &[RepoName], mut on_repo: F) -> anyhow::Result<Analysis>
    where
        F: FnMut(&RepoName),
    {
        let mut analysis = Analysis::default();
        for repo in repos {
            on_repo(repo);
            let activity = self.collect(repo)?;
            let cohort = self
                .score(&activity.participants)
                .with_context(|| format!("failed to apply aliases for {repo}"))?;
            analysis.repos.push(RepoScores { repo: repo.clone(), activity, cohort });
        }

        analysis.weekly = merge_weekly(analysis.repos.iter().map(|r| &r.activity.weekly_activity));

        if analysis.repos.len() > 1 {
            let merged = merge_activity(analysis.repos.iter().map(|r| &r.activity.participants));
            analysis.ratio = Some(self.score(&merged).context("failed to apply aliases to merged activity")?);

            let per_repo: Vec<(String, RankedCohort)> = analysis
                .repos
                .iter()
                .map(|r| (r.repo.to_string(), r.cohort.clone()))
                .collect();
            analysis.overall = Some(merge_totals(&per_repo, self.config.ranking.tie_break));
        }
        Ok(analysis)
    }
}
