//! Catalog record models
//!
//! Basic records come from the ranks data dump; detailed records are built from
//! the XML API payload and then completed from the matching basic record.
//! Field names serialize as camelCase so saved files stay stable across runs.

use serde::{Deserialize, Serialize};

/// Ranked catalog entry as read from the data dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicRecord {
    /// Stable identifier; kept as text because not every upstream ID fits a small integer
    pub id: String,
    /// Integer form of `id`, used for display and sorting
    pub numeric_id: i64,
    pub name: String,
    pub year_published: i32,
    #[serde(default)]
    pub rank: Option<u32>,
    /// Smoothed rating score
    #[serde(default)]
    pub bayes_average: Option<f64>,
}

/// Per-player-count poll votes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCountRecommendation {
    /// Surveyed player count ("4+" collapses to 4)
    pub num_players: u32,
    #[serde(default)]
    pub best: u32,
    #[serde(default)]
    pub recommended: u32,
    #[serde(default)]
    pub not_recommended: u32,
}

impl PlayerCountRecommendation {
    pub fn new(num_players: u32) -> Self {
        Self {
            num_players,
            ..Default::default()
        }
    }

    /// "Best" plus "Recommended" votes
    pub fn positive_votes(&self) -> u64 {
        u64::from(self.best) + u64::from(self.recommended)
    }
}

/// Fully enriched catalog entry
///
/// Every API-sourced field is optional because the remote payload may omit it.
/// List fields are always present and empty when the payload has no entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetailedRecord {
    // Basic fields
    pub id: String,
    pub numeric_id: Option<i64>,
    pub name: String,
    pub year_published: Option<i32>,
    pub rank: Option<u32>,
    pub bayes_average: Option<f64>,

    // Detail fields
    pub description: Option<String>,
    pub min_players: Option<u32>,
    pub max_players: Option<u32>,
    pub min_play_time: Option<u32>,
    pub max_play_time: Option<u32>,
    pub playing_time: Option<u32>,
    pub min_age: Option<u32>,

    // Statistics
    pub users_rated: Option<u32>,
    pub average: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub owned: Option<u32>,
    pub trading: Option<u32>,
    pub wanting: Option<u32>,
    pub wishing: Option<u32>,
    pub num_comments: Option<u32>,
    pub num_weights: Option<u32>,
    pub average_weight: Option<f64>,

    // Classification and credits
    pub categories: Vec<String>,
    pub mechanics: Vec<String>,
    pub designers: Vec<String>,
    pub artists: Vec<String>,
    pub publishers: Vec<String>,

    // Player count poll
    pub best_player_count: Option<u32>,
    pub recommended_player_count: Option<u32>,
    pub player_count_recommendations: Vec<PlayerCountRecommendation>,
}

impl DetailedRecord {
    /// Create an empty record for the given ID
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let numeric_id = id.trim().parse().ok();
        Self {
            id,
            numeric_id,
            ..Default::default()
        }
    }

    /// Fill fields the payload left unset from the source basic record.
    ///
    /// API values always win; basic values only fill gaps.
    pub fn merge_basic(&mut self, basic: &BasicRecord) {
        if self.name.is_empty() {
            self.name = basic.name.clone();
        }
        if self.numeric_id.is_none() {
            self.numeric_id = Some(basic.numeric_id);
        }
        if self.year_published.is_none() {
            self.year_published = Some(basic.year_published);
        }
        if self.rank.is_none() {
            self.rank = basic.rank;
        }
        if self.bayes_average.is_none() {
            self.bayes_average = basic.bayes_average;
        }
    }
}
