//! Identity aliases: platform login → display name.
//!
//! Applied to scored entries after scoring and before ranking. The rename
//! builds a new sequence in one pass; it never touches the scores.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::ScoreBreakdown;

#[derive(Debug, Error)]
pub enum AliasError {
    #[error("cannot read alias file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("alias file {path} is not a JSON object of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("alias target '{target}' is claimed by both '{first}' and '{second}'")]
    Collision {
        target: String,
        first: String,
        second: String,
    },
}

/// What to do when two entries end up under the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasCollision {
    /// The later entry replaces the earlier one; a warning is logged.
    #[default]
    LastWins,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    map: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        Self { map }
    }

    /// Load a `{"login": "Name", ...}` JSON file.
    pub fn load(path: &Path) -> Result<Self, AliasError> {
        let text = std::fs::read_to_string(path).map_err(|source| AliasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AliasError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Display name for `login`, or `login` itself when unaliased.
    pub fn resolve<'a>(&'a self, login: &'a str) -> &'a str {
        match self.map.get(login) {
            Some(target) if !target.is_empty() => target,
            _ => login,
        }
    }

    /// Rename scored entries.
    ///
    /// Unaliased entries are placed first, then aliased ones in alias-key
    /// order, so an alias landing on an existing login replaces it under
    /// [`AliasCollision::LastWins`].
    pub fn apply(
        &self,
        scored: Vec<(String, ScoreBreakdown)>,
        policy: AliasCollision,
    ) -> Result<Vec<(String, ScoreBreakdown)>, AliasError> {
        if self.is_empty() {
            return Ok(scored);
        }

        let (plain, mut aliased): (Vec<_>, Vec<_>) = scored
            .into_iter()
            .partition(|(login, _)| self.resolve(login) == login.as_str());
        aliased.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out: Vec<(String, ScoreBreakdown)> = Vec::with_capacity(plain.len() + aliased.len());
        // name -> (index in out, login it came from)
        let mut seen: HashMap<String, (usize, String)> = HashMap::new();

        for (login, score) in plain.into_iter().chain(aliased) {
            let name = self.resolve(&login).to_string();
            if let Some((idx, prev)) = seen.get(&name).cloned() {
                match policy {
                    AliasCollision::Reject => {
                        return Err(AliasError::Collision { target: name, first: prev, second: login });
                    }
                    AliasCollision::LastWins => {
                        tracing::warn!(name = %name, replaced = %prev, by = %login, "alias collision");
                        out[idx].1 = score;
                        seen.insert(name, (idx, login));
                    }
                }
                continue;
            }
            seen.insert(name.clone(), (out.len(), login));
            out.push((name, score));
        }
        Ok(out)
    }
}
