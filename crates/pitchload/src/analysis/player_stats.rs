//! Lifetime summary of one player's activities.

use serde::Serialize;
use time::Date;
use utoipa::ToSchema;

use super::{ActivityAccumulator, RunningMean};
use crate::models::{Activity, ActivityKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct GeneralStats {
    pub total_activities: u32,
    pub training_count: u32,
    pub match_count: u32,
    pub last_activity_date: Option<Date>,
}

/// Averages over every activity regardless of kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct OverallAverages {
    pub duration_minutes: Option<f64>,
    pub total_distance_m: Option<f64>,
    pub high_speed_20kmh_m: Option<f64>,
    pub sprint_24kmh_m: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct KindAverages {
    pub duration: Option<f64>,
    pub distance: Option<f64>,
    /// Distance above 20 km/h.
    pub high_speed: Option<f64>,
    pub sprint: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TrainingVsMatch {
    pub training: KindAverages,
    #[serde(rename = "match")]
    pub matches: KindAverages,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PlayerStatistics {
    pub general_stats: GeneralStats,
    pub averages: OverallAverages,
    pub training_vs_match: TrainingVsMatch,
}

#[derive(Debug, Default)]
struct Means {
    duration: RunningMean,
    distance: RunningMean,
    high_speed: RunningMean,
    sprint: RunningMean,
}

impl Means {
    fn push(&mut self, activity: &Activity) {
        let m = &activity.metrics;
        self.duration.push(m.duration_minutes.map(f64::from));
        self.distance.push(m.total_distance_m);
        self.high_speed.push(m.high_speed_20kmh_m);
        self.sprint.push(m.sprint_24kmh_m);
    }

    fn kind_averages(&self) -> KindAverages {
        KindAverages {
            duration: self.duration.mean(),
            distance: self.distance.mean(),
            high_speed: self.high_speed.mean(),
            sprint: self.sprint.mean(),
        }
    }
}

#[derive(Debug, Default)]
struct StatisticsAccumulator {
    general: GeneralStats,
    all: Means,
    training: Means,
    matches: Means,
}

impl ActivityAccumulator for StatisticsAccumulator {
    type Output = PlayerStatistics;

    fn next_activity(&mut self, activity: &Activity) {
        self.general.total_activities += 1;
        self.general.last_activity_date = self.general.last_activity_date.max(Some(activity.date));
        self.all.push(activity);
        match activity.activity_type {
            ActivityKind::Training => {
                self.general.training_count += 1;
                self.training.push(activity);
            }
            ActivityKind::Match => {
                self.general.match_count += 1;
                self.matches.push(activity);
            }
        }
    }

    fn finish(&self) -> PlayerStatistics {
        let all = self.all.kind_averages();
        PlayerStatistics {
            general_stats: self.general.clone(),
            averages: OverallAverages {
                duration_minutes: all.duration,
                total_distance_m: all.distance,
                high_speed_20kmh_m: all.high_speed,
                sprint_24kmh_m: all.sprint,
            },
            training_vs_match: TrainingVsMatch {
                training: self.training.kind_averages(),
                matches: self.matches.kind_averages(),
            },
        }
    }
}

/// Summarise every activity recorded for a player.
pub fn player_statistics<'a, I>(activities: I) -> PlayerStatistics
where
    I: IntoIterator<Item = &'a Activity>,
{
    let mut acc = StatisticsAccumulator::default();
    for activity in activities {
        acc.next_activity(activity);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadMetrics;
    use time::macros::date;
    use uuid::Uuid;

    fn activity(kind: ActivityKind, date: Date, duration: Option<i32>, distance: Option<f64>) -> Activity {
        Activity::new(
            Uuid::nil(),
            date,
            kind,
            LoadMetrics {
                duration_minutes: duration,
                total_distance_m: distance,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_no_activities() {
        let stats = player_statistics(&[]);
        assert_eq!(stats, PlayerStatistics::default());
        assert_eq!(stats.general_stats.last_activity_date, None);
        assert_eq!(stats.averages.total_distance_m, None);
    }

    #[test]
    fn test_counts_and_last_date() {
        let activities = vec![
            activity(ActivityKind::Training, date!(2024 - 03 - 05), Some(90), Some(6000.0)),
            activity(ActivityKind::Match, date!(2024 - 03 - 09), Some(95), Some(10000.0)),
            activity(ActivityKind::Training, date!(2024 - 03 - 07), Some(60), None),
        ];

        let stats = player_statistics(&activities);

        assert_eq!(stats.general_stats.total_activities, 3);
        assert_eq!(stats.general_stats.training_count, 2);
        assert_eq!(stats.general_stats.match_count, 1);
        assert_eq!(stats.general_stats.last_activity_date, Some(date!(2024 - 03 - 09)));
    }

    #[test]
    fn test_averages_skip_missing_samples() {
        let activities = vec![
            activity(ActivityKind::Training, date!(2024 - 03 - 05), Some(90), Some(6000.0)),
            activity(ActivityKind::Training, date!(2024 - 03 - 07), Some(60), None),
            activity(ActivityKind::Match, date!(2024 - 03 - 09), Some(90), Some(9000.0)),
        ];

        let stats = player_statistics(&activities);

        assert_eq!(stats.averages.duration_minutes, Some(80.0));
        assert_eq!(stats.averages.total_distance_m, Some(7500.0));
        assert_eq!(stats.averages.sprint_24kmh_m, None);
        assert_eq!(stats.training_vs_match.training.duration, Some(75.0));
        assert_eq!(stats.training_vs_match.training.distance, Some(6000.0));
        assert_eq!(stats.training_vs_match.matches.distance, Some(9000.0));
    }

    #[test]
    fn test_match_key_in_json() {
        let stats = player_statistics(&[]);
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["training_vs_match"]["match"]["distance"].is_null());
        assert_eq!(json["general_stats"]["total_activities"], 0);
    }
}
