#![deny(dead_code)]

pub mod activity;
pub mod aggregate;
pub mod alias;
pub mod cache;
pub mod chart;
pub mod colors;
pub mod config;
pub mod github;
pub mod html;
pub mod output;
pub mod pipeline;
pub mod projection;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod weights;

use activity::ActivityMap;
use ranking::{rank, TieBreak};
use report::RankedCohort;
use scoring::Scorer;
use weights::ScoringRules;

/// Score and rank an activity map with the given rules, no aliases.
pub fn score_activity(activity: &ActivityMap, rules: ScoringRules, tie: TieBreak) -> RankedCohort {
    rank(Scorer::new(rules).score_all(activity), tie)
}

/// Score and rank with the default rules and name tie-break.
pub fn score_default(activity: &ActivityMap) -> RankedCohort {
    score_activity(activity, ScoringRules::default(), TieBreak::default())
}
