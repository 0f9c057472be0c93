//! Configuration types for test data generation.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, macros::date};

/// Configuration for seeding operations.
///
/// Missing fields take their default values when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Number of teams to generate. All teams belong to one coach account.
    pub team_count: usize,

    /// Number of players on each team.
    pub players_per_team: usize,

    /// First day of the generated season.
    pub season_start: Date,

    /// Length of the season in days.
    pub season_days: u16,

    /// Training sessions per week.
    pub trainings_per_week: u8,

    /// Probability (0.0-1.0) that a player appears in a given match.
    pub match_participation: f64,

    /// Probability (0.0-1.0) that a match goes to extra time.
    pub extra_time_rate: f64,

    /// Probability (0.0-1.0) that any single metric is missing from a record.
    pub missing_metric_rate: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            team_count: 2,
            players_per_team: 18,
            season_start: date!(2024 - 08 - 05),
            season_days: 84,
            trainings_per_week: 4,
            match_participation: 0.75,
            extra_time_rate: 0.1,
            missing_metric_rate: 0.05,
            seed: None,
        }
    }
}

impl SeedConfig {
    /// Creates a small configuration for quick local runs.
    pub fn minimal() -> Self {
        Self {
            team_count: 1,
            players_per_team: 6,
            season_days: 21,
            ..Default::default()
        }
    }

    /// Last day of the season (inclusive).
    pub fn season_end(&self) -> Date {
        let days = i64::from(self.season_days.max(1)) - 1;
        self.season_start
            .checked_add(Duration::days(days))
            .unwrap_or(self.season_start)
    }
}
