use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::activity::RepoActivity;
use crate::github::RepoName;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cannot access snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-repository JSON snapshots stored in the output directory.
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Use `dir` as the snapshot directory, creating it if needed.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self::at(dir))
    }

    /// Like [`Cache::open`] without touching the filesystem.
    pub fn at(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    /// `<dir>/cache_<owner>_<repo>.json`.
    pub fn path_for(&self, repo: &RepoName) -> PathBuf {
        self.dir.join(format!("cache_{}_{}.json", repo.owner(), repo.repo()))
    }

    /// Load the snapshot for `repo`; `Ok(None)` when none has been written.
    pub fn get(&self, repo: &RepoName) -> Result<Option<RepoActivity>, CacheError> {
        let path = self.path_for(repo);
        if !path.is_file() {
            return Ok(None);
        }
        load_snapshot(&path).map(Some)
    }

    pub fn put(&self, repo: &RepoName, activity: &RepoActivity) -> Result<(), CacheError> {
        let path = self.path_for(repo);
        let json = serde_json::to_string_pretty(activity).map_err(|source| CacheError::Malformed {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, json).map_err(|source| CacheError::Io { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), "wrote snapshot");
        Ok(())
    }
}

pub fn load_snapshot(path: &Path) -> Result<RepoActivity, CacheError> {
    let text = std::fs::read_to_string(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CacheError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityCounts, WeeklyCounts};

    fn repo() -> RepoName {
        "oss2025hnu/reposcore-py".parse().unwrap()
    }

    #[test]
    fn snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();

        let mut activity = RepoActivity { update_time: 1_717_000_000, ..Default::default() };
        activity.participants.insert(
            "kim".into(),
            ActivityCounts { pr_feature_bug: 2, issue_doc: 1, ..Default::default() },
        );
        activity.weekly_activity.insert(3, WeeklyCounts { pr: 2, issue: 1 });

        cache.put(&repo(), &activity).unwrap();
        assert_eq!(cache.get(&repo()).unwrap(), Some(activity));
    }

    #[test]
    fn snapshot_file_name_uses_owner_and_repo() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        assert_eq!(
            cache.path_for(&repo()),
            dir.path().join("cache_oss2025hnu_reposcore-py.json")
        );
    }

    #[test]
    fn snapshot_miss_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        assert!(cache.get(&repo()).unwrap().is_none());
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::open(dir.path()).unwrap();
        std::fs::write(cache.path_for(&repo()), "{\"update_time\": \"soon\"}").unwrap();
        assert!(matches!(cache.get(&repo()), Err(CacheError::Malformed { .. })));
    }

    #[test]
    fn weekly_activity_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, r#"{"update_time": 5, "participants": {"lee": {"pr_doc": 1}}}"#).unwrap();
        let snap = load_snapshot(&path).unwrap();
        assert_eq!(snap.participants["lee"].pr_doc, 1);
        assert!(snap.weekly_activity.is_empty());
    }
}
