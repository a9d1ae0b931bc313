//! End-of-run summary statistics

use bgg_common::DetailedRecord;
use tracing::info;

/// Aggregate figures over an enriched record list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub with_rank: usize,
    /// Best (numerically lowest) rank
    pub highest_rank: Option<u32>,
    /// Worst (numerically highest) rank
    pub lowest_rank: Option<u32>,
    pub with_rating: usize,
    pub average_rating: Option<f64>,
    pub highest_rating: Option<f64>,
    pub lowest_rating: Option<f64>,
    /// (min, max) over records that report both player bounds
    pub player_range: Option<(u32, u32)>,
    pub with_categories: usize,
    pub with_mechanics: usize,
}

impl RunSummary {
    pub fn from_records(records: &[DetailedRecord]) -> Self {
        let ranks: Vec<u32> = records.iter().filter_map(|r| r.rank).collect();
        let ratings: Vec<f64> = records.iter().filter_map(|r| r.bayes_average).collect();

        let player_range = records
            .iter()
            .filter_map(|r| Some((r.min_players?, r.max_players?)))
            .fold(None, |acc: Option<(u32, u32)>, (min, max)| match acc {
                Some((lo, hi)) => Some((lo.min(min), hi.max(max))),
                None => Some((min, max)),
            });

        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        Self {
            total: records.len(),
            with_rank: ranks.len(),
            highest_rank: ranks.iter().copied().min(),
            lowest_rank: ranks.iter().copied().max(),
            with_rating: ratings.len(),
            average_rating,
            highest_rating: ratings.iter().copied().reduce(f64::max),
            lowest_rating: ratings.iter().copied().reduce(f64::min),
            player_range,
            with_categories: records.iter().filter(|r| !r.categories.is_empty()).count(),
            with_mechanics: records.iter().filter(|r| !r.mechanics.is_empty()).count(),
        }
    }

    /// Emit the summary at info level
    pub fn log(&self) {
        info!(total = self.total, "Summary: total games fetched");

        if let (Some(highest), Some(lowest)) = (self.highest_rank, self.lowest_rank) {
            info!(
                with_rank = self.with_rank,
                highest_rank = highest,
                lowest_rank = lowest,
                "Summary: ranks"
            );
        }

        if let (Some(avg), Some(max), Some(min)) =
            (self.average_rating, self.highest_rating, self.lowest_rating)
        {
            info!(
                with_rating = self.with_rating,
                average = format!("{:.2}", avg),
                highest = format!("{:.2}", max),
                lowest = format!("{:.2}", min),
                "Summary: ratings"
            );
        }

        if let Some((min, max)) = self.player_range {
            info!(min_players = min, max_players = max, "Summary: player count range");
        }

        if self.with_categories > 0 {
            info!(count = self.with_categories, "Summary: games with categories");
        }
        if self.with_mechanics > 0 {
            info!(count = self.with_mechanics, "Summary: games with mechanics");
        }
    }
}
