//! Load analysis over persisted activity rows.
//!
//! Everything in here is a pure function of its inputs: the handlers load a
//! snapshot of the relevant rows through [`crate::database::Database`] and
//! hand them over, so the computations never touch the database themselves.

pub mod load;
pub mod periods;
pub mod player_stats;

use time::Date;
use uuid::Uuid;

use crate::models::{Activity, MatchPeriod};

pub use load::{
    LoadAnalysis, LoadSummary, MetricAverages, MetricRatios, PlayerLoadComparison, TrackedMetric,
    compare_training_to_match, load_ratio,
};
pub use periods::{MatchPeriodAnalysis, PeriodLoad, PlayerPeriodSplit, split_match_periods};
pub use player_stats::{PlayerStatistics, player_statistics};

/// Inclusive calendar date range.
///
/// A range whose start lies after its end is not rejected, it simply
/// contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A resolved player and the activity rows loaded for it.
#[derive(Debug, Clone)]
pub struct PlayerActivities {
    pub player_id: Uuid,
    pub player_name: String,
    pub activities: Vec<Activity>,
}

/// A resolved player with its match activities and their recorded periods.
#[derive(Debug, Clone)]
pub struct PlayerMatchData {
    pub player_id: Uuid,
    pub player_name: String,
    pub matches: Vec<Activity>,
    pub periods: Vec<MatchPeriod>,
}

/// Consumes activities one at a time and produces a result at the end.
pub trait ActivityAccumulator {
    type Output;
    fn next_activity(&mut self, activity: &Activity);
    fn finish(&self) -> Self::Output;
}

/// Running arithmetic mean over optional samples. Absent samples are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMean {
    sum: f64,
    count: u32,
}

impl RunningMean {
    pub fn push(&mut self, sample: Option<f64>) {
        if let Some(value) = sample {
            self.sum += value;
            self.count += 1;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// `None` when no sample was ever pushed.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}
