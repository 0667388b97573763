//! Project configuration from `.reposcore.toml`.
//!
//! # Config file format
//!
//! ```toml
//! [weights]
//! feat_bug_pr = 3
//! doc_pr = 2
//!
//! [caps]
//! pr_doc = 3
//! issue = 4
//!
//! # Extra label → category mappings, on top of the built-in ones.
//! [labels]
//! "good first issue" = "documentation"
//! refactor = "feature_bug"
//!
//! [ranking]
//! tie_break = "name"           # or "insertion"
//! filter_ranks = "keep"        # or "rerank"
//! alias_collision = "last_wins" # or "reject"
//!
//! [participants]
//! exclude = ["dependabot[bot]"]
//! ```
//!
//! # Discovery
//! [`Config::discover`] walks upward from the given path looking for a
//! `.reposcore.toml` file or a `.git` directory and uses the first match as
//! the config root. Missing sections and keys fall back to defaults.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{Category, LabelTable};
use crate::alias::AliasCollision;
use crate::projection::FilterRanks;
use crate::ranking::TieBreak;
use crate::weights::{CapRatios, ScoreWeights, ScoringRules};

pub const CONFIG_FILE_NAME: &str = ".reposcore.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// TOML file shape (private)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    weights: ScoreWeights,
    caps: CapRatios,
    labels: BTreeMap<String, Category>,
    ranking: RankingOptions,
    participants: ParticipantsSection,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ParticipantsSection {
    exclude: Vec<String>,
}

/// The `[ranking]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingOptions {
    pub tie_break: TieBreak,
    pub filter_ranks: FilterRanks,
    pub alias_collision: AliasCollision,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Effective configuration for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub rules: ScoringRules,
    pub labels: LabelTable,
    pub ranking: RankingOptions,
    /// Logins dropped after collection (bots, instructors).
    pub exclude: BTreeSet<String>,
    /// File the values came from; `None` when running on defaults.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Find and load the nearest `.reposcore.toml`, walking upward from
    /// `start`. Uses defaults when none exists or it cannot be parsed.
    pub fn discover(start: &Path) -> Self {
        let path = find_config_root(start).join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Self::default();
        }
        Self::from_file(&path).unwrap_or_else(|e| {
            tracing::warn!("{e}; using default configuration");
            Self::default()
        })
    }

    /// Load an explicit config file. Errors if it cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut labels = LabelTable::default();
        for (label, category) in &file.labels {
            labels.insert(label, *category);
        }
        Ok(Self {
            rules: ScoringRules { weights: file.weights, caps: file.caps },
            labels,
            ranking: file.ranking,
            exclude: file.participants.exclude.into_iter().collect(),
            source: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Walk upward from `start` (normalised to a directory) looking for a
/// `.reposcore.toml` file or a `.git` directory. Returns the first match, or
/// `start` itself if neither is found before the filesystem root.
fn find_config_root(start: &Path) -> PathBuf {
    let dir = if start.is_file() {
        start.parent().unwrap_or(start)
    } else {
        start
    };

    let mut current = dir;
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() || current.join(".git").is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(p) => current = p,
            None => return dir.to_path_buf(),
        }
    }
}
