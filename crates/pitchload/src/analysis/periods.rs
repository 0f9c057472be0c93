//! Per-period breakdown of match load.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{DateRange, PlayerMatchData, RunningMean};
use crate::models::{ActivityKind, MatchPeriod, PeriodType};

/// Average load in one part of a match. Missing values read as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct PeriodLoad {
    /// Distance covered (m).
    pub distance: f64,
    /// Top speed (km/h).
    pub max_speed: f64,
    /// Efforts above 24 km/h.
    pub sprint_count: f64,
}

#[derive(Debug, Default)]
struct PeriodMeans {
    distance: RunningMean,
    max_speed: RunningMean,
    sprint_count: RunningMean,
}

impl PeriodMeans {
    fn push(&mut self, period: &MatchPeriod) {
        self.distance.push(period.metrics.total_distance_m);
        self.max_speed.push(period.metrics.max_speed_kmh);
        self.sprint_count.push(period.sprint_count.map(f64::from));
    }

    fn finish(&self) -> PeriodLoad {
        PeriodLoad {
            distance: self.distance.mean().unwrap_or(0.0),
            max_speed: self.max_speed.mean().unwrap_or(0.0),
            sprint_count: self.sprint_count.mean().unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerPeriodSplit {
    pub player_id: Uuid,
    pub player_name: String,
    /// Matches inside the range.
    pub match_count: usize,
    pub first_half: PeriodLoad,
    pub second_half: PeriodLoad,
    /// Both extra-time periods pooled together.
    pub extra_time: PeriodLoad,
    /// The two halves stacked: summed distance and sprints, the higher top speed.
    pub total: PeriodLoad,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MatchPeriodAnalysis {
    pub players: Vec<PlayerPeriodSplit>,
}

/// Split each resolved player's match load into halves and extra time.
///
/// Periods count only when their match falls inside `range`. `None` entries
/// are unresolved ids and are skipped.
pub fn split_match_periods<I>(range: DateRange, players: I) -> MatchPeriodAnalysis
where
    I: IntoIterator<Item = Option<PlayerMatchData>>,
{
    let players = players
        .into_iter()
        .flatten()
        .map(|player| split_player(range, player))
        .collect();

    MatchPeriodAnalysis { players }
}

fn split_player(range: DateRange, player: PlayerMatchData) -> PlayerPeriodSplit {
    let matches: HashSet<Uuid> = player
        .matches
        .iter()
        .filter(|a| a.activity_type == ActivityKind::Match && range.contains(a.date))
        .map(|a| a.id)
        .collect();

    let mut first = PeriodMeans::default();
    let mut second = PeriodMeans::default();
    let mut extra = PeriodMeans::default();

    for period in player
        .periods
        .iter()
        .filter(|p| matches.contains(&p.activity_id))
    {
        match period.period_type {
            PeriodType::FirstHalf => first.push(period),
            PeriodType::SecondHalf => second.push(period),
            PeriodType::ExtraTime1 | PeriodType::ExtraTime2 => extra.push(period),
        }
    }

    let first_half = first.finish();
    let second_half = second.finish();

    PlayerPeriodSplit {
        player_id: player.player_id,
        player_name: player.player_name,
        match_count: matches.len(),
        first_half,
        second_half,
        extra_time: extra.finish(),
        total: PeriodLoad {
            distance: first_half.distance + second_half.distance,
            max_speed: first_half.max_speed.max(second_half.max_speed),
            sprint_count: first_half.sprint_count + second_half.sprint_count,
        },
    }
}
