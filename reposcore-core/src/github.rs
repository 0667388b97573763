//! GitHub ingestion: repository names, the [`ActivitySource`] seam, and the
//! production [`GithubClient`].
//!
//! Everything that turns API payloads into [`RepoActivity`] lives in
//! [`Collector`], which is pure and tested without a network.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::activity::{week_of, ActivityKind, LabelTable, RepoActivity};

pub const API_BASE: &str = "https://api.github.com";

const PER_PAGE: u32 = 100;

// ---------------------------------------------------------------------------
// RepoName
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid repository '{0}': expected owner/repo")]
pub struct InvalidRepoName(pub String);

/// A validated `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName {
    owner: String,
    repo: String,
}

impl RepoName {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

fn valid_part(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl FromStr for RepoName {
    type Err = InvalidRepoName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if valid_part(owner) && valid_part(repo) => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(InvalidRepoName(s.to_string())),
        }
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Parse arguments that may each hold several comma- or space-separated
/// repositories. Duplicates are dropped, keeping the first occurrence.
pub fn parse_repo_list<S: AsRef<str>>(args: &[S]) -> Result<Vec<RepoName>, InvalidRepoName> {
    let mut out: Vec<RepoName> = Vec::new();
    for arg in args {
        for token in arg.as_ref().split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            let name: RepoName = token.parse()?;
            if !out.contains(&name) {
                out.push(name);
            }
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication failed (401): the GitHub token is invalid")]
    Unauthorized,
    #[error("GitHub API rate limit reached (403); unauthenticated requests are limited to 60 per hour, pass --token")]
    RateLimited,
    #[error("repository {0} does not exist (404)")]
    NotFound(String),
    #[error("GitHub could not process the request (422): {0}")]
    Unprocessable(String),
    #[error("GitHub returned HTTP {0}")]
    Status(u16),
    #[error("all {attempts} attempts failed: {reason}")]
    Exhausted { attempts: u32, reason: String },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Seam between the analysis run and wherever activity comes from.
pub trait ActivitySource {
    /// Collect every participant's raw counts for `repo`.
    fn fetch(&self, repo: &RepoName) -> Result<RepoActivity, FetchError>;

    /// Unix timestamp of the newest issue or PR, used to judge cache
    /// freshness. `None` for an empty repository.
    fn latest_activity(&self, repo: &RepoName) -> Result<Option<i64>, FetchError>;
}

// ---------------------------------------------------------------------------
// StaticSource — in-memory test double
// ---------------------------------------------------------------------------

/// Serves pre-built activity; unknown repositories are `NotFound`.
#[derive(Debug, Default)]
pub struct StaticSource {
    repos: HashMap<RepoName, RepoActivity>,
}

impl StaticSource {
    pub fn with(mut self, repo: RepoName, activity: RepoActivity) -> Self {
        self.repos.insert(repo, activity);
        self
    }
}

impl ActivitySource for StaticSource {
    fn fetch(&self, repo: &RepoName) -> Result<RepoActivity, FetchError> {
        self.repos
            .get(repo)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(repo.to_string()))
    }

    fn latest_activity(&self, repo: &RepoName) -> Result<Option<i64>, FetchError> {
        self.fetch(repo).map(|a| (a.update_time > 0).then_some(a.update_time))
    }
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

/// One element of `GET /repos/{repo}/issues`. PRs carry `pull_request`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueItem {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,
    #[serde(default)]
    pub state_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl IssueItem {
    pub fn kind(&self) -> ActivityKind {
        if self.pull_request.is_some() {
            ActivityKind::PullRequest
        } else {
            ActivityKind::Issue
        }
    }

    /// Merged PRs, and issues that were not closed as "not planned".
    pub fn counts(&self) -> bool {
        match &self.pull_request {
            Some(pr) => pr.merged_at.is_some(),
            None => matches!(self.state_reason.as_deref(), None | Some("completed") | Some("reopened")),
        }
    }

    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Unix timestamp at which the window resets.
    pub reset: i64,
}

impl RateLimit {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}

#[derive(Deserialize)]
struct RateLimitResponse {
    rate: RateLimit,
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Accumulates API items into a [`RepoActivity`].
pub struct Collector<'a> {
    labels: &'a LabelTable,
    semester_start: Option<NaiveDate>,
    activity: RepoActivity,
}

impl<'a> Collector<'a> {
    pub fn new(labels: &'a LabelTable, semester_start: Option<NaiveDate>) -> Self {
        let activity = RepoActivity { semester_start, ..Default::default() };
        Self { labels, semester_start, activity }
    }

    pub fn push(&mut self, item: &IssueItem) {
        let counts = self.activity.participants.entry(item.author().to_string()).or_default();

        if let Some(created) = item.created_at {
            self.activity.update_time = self.activity.update_time.max(created.timestamp());
        }
        if !item.counts() {
            return;
        }

        let kind = item.kind();
        let names = item.labels.iter().filter_map(|l| l.name.as_deref());
        for category in self.labels.categories(names) {
            counts.record(kind, category);
        }

        if let (Some(start), Some(created)) = (self.semester_start, item.created_at) {
            if let Some(week) = week_of(start, created.date_naive()) {
                let bucket = self.activity.weekly_activity.entry(week).or_default();
                match kind {
                    ActivityKind::PullRequest => bucket.pr += 1,
                    ActivityKind::Issue       => bucket.issue += 1,
                }
            }
        }
    }

    pub fn finish(self) -> RepoActivity {
        self.activity
    }
}

/// True when a `Link` header advertises another page.
pub fn has_next_page(link: &str) -> bool {
    link.split(',').any(|part| part.contains("rel=\"next\""))
}

// ---------------------------------------------------------------------------
// GithubClient — production implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    /// Doubles after each retry, up to `max_backoff`.
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

pub struct GithubClient {
    http: Client,
    config: GithubConfig,
    labels: LabelTable,
    semester_start: Option<NaiveDate>,
}

impl GithubClient {
    pub fn new(config: GithubConfig, token: Option<&str>) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FetchError::Client(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        let http = Client::builder()
            .user_agent(concat!("reposcore/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { http, config, labels: LabelTable::default(), semester_start: None })
    }

    pub fn with_labels(mut self, labels: LabelTable) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_semester_start(mut self, start: Option<NaiveDate>) -> Self {
        self.semester_start = start;
        self
    }

    pub fn rate_limit(&self) -> Result<RateLimit, FetchError> {
        let url = format!("{}/rate_limit", self.config.base_url);
        let resp = self.get(&url, &[], "rate_limit")?;
        let body: RateLimitResponse = decode(&url, resp)?;
        Ok(body.rate)
    }

    /// GET with retry and backoff. Network errors and 5xx are retried;
    /// other failures return immediately.
    fn get(&self, url: &str, query: &[(&str, String)], what: &str) -> Result<Response, FetchError> {
        let mut backoff = self.config.initial_backoff;
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    "github: retry attempt {}/{} after {:?}",
                    attempt,
                    self.config.max_retries,
                    backoff
                );
                std::thread::sleep(backoff);
                backoff = (backoff * 2).min(self.config.max_backoff);
            }

            match self.http.get(url).query(query).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp);
                    }
                    if status.is_server_error() {
                        last_err = format!("HTTP {status}");
                        continue;
                    }
                    return Err(match status {
                        StatusCode::UNAUTHORIZED         => FetchError::Unauthorized,
                        StatusCode::FORBIDDEN            => FetchError::RateLimited,
                        StatusCode::NOT_FOUND            => FetchError::NotFound(what.to_string()),
                        StatusCode::UNPROCESSABLE_ENTITY => FetchError::Unprocessable(resp.text().unwrap_or_default()),
                        other                            => FetchError::Status(other.as_u16()),
                    });
                }
                Err(e) => last_err = e.to_string(),
            }
        }

        Err(FetchError::Exhausted { attempts: self.config.max_retries + 1, reason: last_err })
    }

    fn issues_url(&self, repo: &RepoName) -> String {
        format!("{}/repos/{}/issues", self.config.base_url, repo)
    }
}

fn decode<T: serde::de::DeserializeOwned>(url: &str, resp: Response) -> Result<T, FetchError> {
    resp.json::<T>().map_err(|e| FetchError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl ActivitySource for GithubClient {
    fn fetch(&self, repo: &RepoName) -> Result<RepoActivity, FetchError> {
        let url = self.issues_url(repo);
        let what = repo.to_string();
        let mut collector = Collector::new(&self.labels, self.semester_start);

        let mut page = 1u32;
        loop {
            let query = [
                ("state", "all".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let resp = self.get(&url, &query, &what)?;
            let more = resp
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .is_some_and(has_next_page);
            let items: Vec<IssueItem> = decode(&url, resp)?;
            tracing::debug!(repo = %repo, page, items = items.len(), "fetched page");

            if items.is_empty() {
                break;
            }
            for item in &items {
                collector.push(item);
            }
            if !more {
                break;
            }
            page += 1;
        }

        let activity = collector.finish();
        if activity.participants.is_empty() {
            tracing::warn!(repo = %repo, "no participants found");
        }
        Ok(activity)
    }

    fn latest_activity(&self, repo: &RepoName) -> Result<Option<i64>, FetchError> {
        let url = self.issues_url(repo);
        let query = [
            ("state", "all".to_string()),
            ("sort", "created".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", "1".to_string()),
        ];
        let resp = self.get(&url, &query, &repo.to_string())?;
        let items: Vec<IssueItem> = decode(&url, resp)?;
        Ok(items.first().and_then(|i| i.created_at).map(|t| t.timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::WeeklyCounts;

    fn items(json: &str) -> Vec<IssueItem> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn repo_name_validation() {
        assert!("oss2025hnu/reposcore-py".parse::<RepoName>().is_ok());
        assert!("a_b/c-d".parse::<RepoName>().is_ok());
        assert!("noslash".parse::<RepoName>().is_err());
        assert!("a/b/c".parse::<RepoName>().is_err());
        assert!("/repo".parse::<RepoName>().is_err());
        assert!("own.er/repo".parse::<RepoName>().is_err());
    }

    #[test]
    fn repo_list_splits_and_dedups() {
        let list = parse_repo_list(&["a/x,b/y", "a/x  c/z"]).unwrap();
        let names: Vec<_> = list.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["a/x", "b/y", "c/z"]);
    }

    #[test]
    fn repo_list_reports_bad_entry() {
        let err = parse_repo_list(&["a/x,bad"]).unwrap_err();
        assert_eq!(err, InvalidRepoName("bad".into()));
    }

    #[test]
    fn link_header_next_detection() {
        let link = r#"<https://api.github.com/x?page=2>; rel="next", <https://api.github.com/x?page=5>; rel="last""#;
        assert!(has_next_page(link));
        assert!(!has_next_page(r#"<https://api.github.com/x?page=1>; rel="prev""#));
        assert!(!has_next_page(""));
    }

    #[test]
    fn collector_counts_only_merged_prs_and_valid_issues() {
        let labels = LabelTable::default();
        let mut c = Collector::new(&labels, None);
        for item in items(
            r#"[
            {"user": {"login": "kim"}, "labels": [{"name": "bug"}], "pull_request": {"merged_at": "2025-03-10T00:00:00Z"}},
            {"user": {"login": "kim"}, "labels": [{"name": "bug"}], "pull_request": {"merged_at": null}},
            {"user": {"login": "kim"}, "labels": [{"name": "documentation"}], "state_reason": "completed"},
            {"user": {"login": "kim"}, "labels": [{"name": "enhancement"}], "state_reason": "not_planned"},
            {"user": {"login": "lee"}, "labels": [{"name": "question"}]}
        ]"#,
        ) {
            c.push(&item);
        }
        let a = c.finish();
        assert_eq!(a.participants["kim"].pr_feature_bug, 1);
        assert_eq!(a.participants["kim"].issue_doc, 1);
        assert_eq!(a.participants["kim"].issue_feature_bug, 0);
        assert!(a.participants["lee"].is_empty());
    }

    #[test]
    fn missing_user_becomes_unknown() {
        let labels = LabelTable::default();
        let mut c = Collector::new(&labels, None);
        c.push(&items(r#"[{"labels": [{"name": "bug"}]}]"#)[0]);
        assert_eq!(c.finish().participants["Unknown"].issue_feature_bug, 1);
    }

    #[test]
    fn enhancement_and_bug_on_one_pr_count_once() {
        let labels = LabelTable::default();
        let mut c = Collector::new(&labels, None);
        c.push(&items(
            r#"[{"user": {"login": "kim"}, "labels": [{"name": "enhancement"}, {"name": "Bug"}, {"name": "typo"}],
                "pull_request": {"merged_at": "2025-03-10T00:00:00Z"}}]"#,
        )[0]);
        let a = c.finish();
        assert_eq!(a.participants["kim"].pr_feature_bug, 1);
        assert_eq!(a.participants["kim"].pr_typo, 1);
    }

    #[test]
    fn update_time_and_weekly_buckets() {
        let labels = LabelTable::default();
        let start = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let mut c = Collector::new(&labels, Some(start));
        for item in items(
            r#"[
            {"user": {"login": "kim"}, "labels": [], "created_at": "2025-03-04T09:00:00Z",
             "pull_request": {"merged_at": "2025-03-05T00:00:00Z"}},
            {"user": {"login": "kim"}, "labels": [], "created_at": "2025-03-12T09:00:00Z"},
            {"user": {"login": "kim"}, "labels": [], "created_at": "2025-02-20T09:00:00Z"}
        ]"#,
        ) {
            c.push(&item);
        }
        let a = c.finish();
        assert_eq!(a.semester_start, Some(start));
        assert_eq!(a.update_time, 1_741_770_000);
        assert_eq!(a.weekly_activity[&1], WeeklyCounts { pr: 1, issue: 0 });
        assert_eq!(a.weekly_activity[&2], WeeklyCounts { pr: 0, issue: 1 });
        assert_eq!(a.weekly_activity.len(), 2);
    }

    #[test]
    fn static_source_serves_known_repos() {
        let repo: RepoName = "o/r".parse().unwrap();
        let src = StaticSource::default()
            .with(repo.clone(), RepoActivity { update_time: 42, ..Default::default() });
        assert_eq!(src.latest_activity(&repo).unwrap(), Some(42));
        let other: RepoName = "o/missing".parse().unwrap();
        assert!(matches!(src.fetch(&other), Err(FetchError::NotFound(_))));
    }

    #[test]
    fn rate_limit_payload() {
        let body: RateLimitResponse = serde_json::from_str(
            r#"{"resources": {}, "rate": {"limit": 5000, "remaining": 4999, "reset": 1700000000, "used": 1}}"#,
        )
        .unwrap();
        assert_eq!(body.rate.remaining, 4999);
        assert!(body.rate.reset_at().is_some());
    }
}
