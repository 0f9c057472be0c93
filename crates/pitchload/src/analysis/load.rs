//! Training vs match load comparison.
//!
//! For every requested player the mean of each tracked metric is taken over
//! the training sessions and over the matches in the date range, and the two
//! are related as a percentage (training / match * 100). A team summary is
//! accumulated from the per-player means, not from the per-player ratios, so
//! players with sparse data do not skew the team figure.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ActivityAccumulator, DateRange, PlayerActivities, RunningMean};
use crate::models::{Activity, ActivityKind};

/// The load metrics compared between training and matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedMetric {
    TotalDistance,
    HighSpeed16,
    HighSpeed20,
    Sprint,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 4] = [
        TrackedMetric::TotalDistance,
        TrackedMetric::HighSpeed16,
        TrackedMetric::HighSpeed20,
        TrackedMetric::Sprint,
    ];

    fn index(self) -> usize {
        match self {
            TrackedMetric::TotalDistance => 0,
            TrackedMetric::HighSpeed16 => 1,
            TrackedMetric::HighSpeed20 => 2,
            TrackedMetric::Sprint => 3,
        }
    }

    /// The activity's value for this metric, if recorded.
    pub fn sample(self, activity: &Activity) -> Option<f64> {
        let metrics = &activity.metrics;
        match self {
            TrackedMetric::TotalDistance => metrics.total_distance_m,
            TrackedMetric::HighSpeed16 => metrics.high_speed_16kmh_m,
            TrackedMetric::HighSpeed20 => metrics.high_speed_20kmh_m,
            TrackedMetric::Sprint => metrics.sprint_24kmh_m,
        }
    }
}

/// Mean value per tracked metric; `null` where no sample was available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct MetricAverages {
    /// Total distance (m).
    pub total_distance: Option<f64>,
    /// Distance above 16 km/h (m).
    pub hs16: Option<f64>,
    /// Distance above 20 km/h (m).
    pub hs20: Option<f64>,
    /// Sprint distance above 24 km/h (m).
    pub sprint: Option<f64>,
}

impl MetricAverages {
    fn from_means(means: &[RunningMean; 4]) -> Self {
        Self::from_fn(|metric| means[metric.index()].mean())
    }

    fn from_fn(mut value: impl FnMut(TrackedMetric) -> Option<f64>) -> Self {
        Self {
            total_distance: value(TrackedMetric::TotalDistance),
            hs16: value(TrackedMetric::HighSpeed16),
            hs20: value(TrackedMetric::HighSpeed20),
            sprint: value(TrackedMetric::Sprint),
        }
    }

    pub fn get(&self, metric: TrackedMetric) -> Option<f64> {
        match metric {
            TrackedMetric::TotalDistance => self.total_distance,
            TrackedMetric::HighSpeed16 => self.hs16,
            TrackedMetric::HighSpeed20 => self.hs20,
            TrackedMetric::Sprint => self.sprint,
        }
    }
}

/// Training / match percentage per tracked metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, ToSchema)]
pub struct MetricRatios {
    pub distance_pct: Option<f64>,
    pub hs16_pct: Option<f64>,
    pub hs20_pct: Option<f64>,
    pub sprint_pct: Option<f64>,
}

impl MetricRatios {
    pub fn between(training: &MetricAverages, matches: &MetricAverages) -> Self {
        let ratio = |metric| load_ratio(training.get(metric), matches.get(metric));
        Self {
            distance_pct: ratio(TrackedMetric::TotalDistance),
            hs16_pct: ratio(TrackedMetric::HighSpeed16),
            hs20_pct: ratio(TrackedMetric::HighSpeed20),
            sprint_pct: ratio(TrackedMetric::Sprint),
        }
    }

    pub fn get(&self, metric: TrackedMetric) -> Option<f64> {
        match metric {
            TrackedMetric::TotalDistance => self.distance_pct,
            TrackedMetric::HighSpeed16 => self.hs16_pct,
            TrackedMetric::HighSpeed20 => self.hs20_pct,
            TrackedMetric::Sprint => self.sprint_pct,
        }
    }
}

/// Training mean as a percentage of the match mean.
///
/// No match baseline (absent or exactly zero) gives `None`. A usable match
/// baseline without any training data gives `Some(0.0)`.
pub fn load_ratio(training: Option<f64>, matches: Option<f64>) -> Option<f64> {
    match (training, matches) {
        (_, None) => None,
        (_, Some(baseline)) if baseline == 0.0 => None,
        (None, Some(_)) => Some(0.0),
        (Some(training), Some(baseline)) => Some(training / baseline * 100.0),
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerLoadComparison {
    pub player_id: Uuid,
    pub player_name: String,
    pub training: MetricAverages,
    #[serde(rename = "match")]
    pub matches: MetricAverages,
    pub ratios: MetricRatios,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct LoadSummary {
    pub training: MetricAverages,
    #[serde(rename = "match")]
    pub matches: MetricAverages,
    pub ratios: MetricRatios,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LoadAnalysis {
    pub players: Vec<PlayerLoadComparison>,
    pub summary: LoadSummary,
}

/// Per-metric means of one player's sessions, split by kind.
#[derive(Debug)]
struct KindMeans {
    range: DateRange,
    training: [RunningMean; 4],
    matches: [RunningMean; 4],
}

impl KindMeans {
    fn within(range: DateRange) -> Self {
        Self {
            range,
            training: Default::default(),
            matches: Default::default(),
        }
    }
}

impl ActivityAccumulator for KindMeans {
    type Output = (MetricAverages, MetricAverages);

    fn next_activity(&mut self, activity: &Activity) {
        if !self.range.contains(activity.date) {
            return;
        }
        let bucket = match activity.activity_type {
            ActivityKind::Training => &mut self.training,
            ActivityKind::Match => &mut self.matches,
        };
        for metric in TrackedMetric::ALL {
            bucket[metric.index()].push(metric.sample(activity));
        }
    }

    fn finish(&self) -> Self::Output {
        (
            MetricAverages::from_means(&self.training),
            MetricAverages::from_means(&self.matches),
        )
    }
}

/// Team-level means built from the present per-player means.
#[derive(Debug, Default)]
struct TeamMeans {
    training: [RunningMean; 4],
    matches: [RunningMean; 4],
}

impl TeamMeans {
    fn add_player(&mut self, player: &PlayerLoadComparison) {
        for metric in TrackedMetric::ALL {
            self.training[metric.index()].push(player.training.get(metric));
            self.matches[metric.index()].push(player.matches.get(metric));
        }
    }

    fn finish(&self) -> LoadSummary {
        let training = MetricAverages::from_means(&self.training);
        let matches = MetricAverages::from_means(&self.matches);
        LoadSummary {
            training,
            matches,
            ratios: MetricRatios::between(&training, &matches),
        }
    }
}

/// Compare training load against match load for each resolved player.
///
/// `players` yields one entry per requested id, in request order; `None`
/// marks an id that no longer resolves to a player and is skipped. Only the
/// activities dated inside `range` are considered.
pub fn compare_training_to_match<I>(range: DateRange, players: I) -> LoadAnalysis
where
    I: IntoIterator<Item = Option<PlayerActivities>>,
{
    let mut team = TeamMeans::default();
    let mut comparisons = Vec::new();

    for player in players.into_iter().flatten() {
        let mut means = KindMeans::within(range);
        for activity in &player.activities {
            means.next_activity(activity);
        }
        let (training, matches) = means.finish();

        let comparison = PlayerLoadComparison {
            player_id: player.player_id,
            player_name: player.player_name,
            training,
            matches,
            ratios: MetricRatios::between(&training, &matches),
        };
        team.add_player(&comparison);
        comparisons.push(comparison);
    }

    LoadAnalysis {
        players: comparisons,
        summary: team.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadMetrics;
    use time::{Date, macros::date};

    const START: Date = date!(2024 - 01 - 01);
    const END: Date = date!(2024 - 12 - 31);

    fn range() -> DateRange {
        DateRange::new(START, END)
    }

    fn session(kind: ActivityKind, date: Date, distance: Option<f64>) -> Activity {
        Activity::new(
            Uuid::nil(),
            date,
            kind,
            LoadMetrics {
                total_distance_m: distance,
                ..Default::default()
            },
        )
    }

    fn full_session(kind: ActivityKind, distance: f64, hs16: f64, hs20: f64, sprint: f64) -> Activity {
        Activity::new(
            Uuid::nil(),
            date!(2024 - 06 - 01),
            kind,
            LoadMetrics {
                total_distance_m: Some(distance),
                high_speed_16kmh_m: Some(hs16),
                high_speed_20kmh_m: Some(hs20),
                sprint_24kmh_m: Some(sprint),
                ..Default::default()
            },
        )
    }

    fn player(name: &str, activities: Vec<Activity>) -> PlayerActivities {
        PlayerActivities {
            player_id: Uuid::new_v4(),
            player_name: name.to_string(),
            activities,
        }
    }

    #[test]
    fn test_ratio_policy() {
        assert_eq!(load_ratio(Some(2000.0), None), None);
        assert_eq!(load_ratio(None, None), None);
        assert_eq!(load_ratio(Some(2000.0), Some(0.0)), None);
        assert_eq!(load_ratio(None, Some(0.0)), None);
        assert_eq!(load_ratio(None, Some(2000.0)), Some(0.0));
        assert_eq!(load_ratio(Some(1500.0), Some(2000.0)), Some(75.0));
    }

    #[test]
    fn test_ratio_not_clamped_for_tiny_baseline() {
        let ratio = load_ratio(Some(1000.0), Some(0.001)).unwrap();
        assert!(ratio > 1.0e7);
    }

    #[test]
    fn test_equal_means_give_hundred_percent() {
        let p = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(1000.0)),
                session(ActivityKind::Training, date!(2024 - 03 - 03), Some(3000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 05), Some(2000.0)),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.training.total_distance, Some(2000.0));
        assert_eq!(row.matches.total_distance, Some(2000.0));
        assert_eq!(row.ratios.distance_pct, Some(100.0));
        // Metrics nobody recorded stay absent.
        assert_eq!(row.training.hs16, None);
        assert_eq!(row.ratios.hs16_pct, None);
    }

    #[test]
    fn test_training_only_player_has_no_ratios() {
        let p = player(
            "Berra Pekgoz",
            vec![full_session(ActivityKind::Training, 5000.0, 600.0, 250.0, 80.0)],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.matches, MetricAverages::default());
        assert_eq!(row.ratios, MetricRatios::default());
        assert_eq!(row.training.sprint, Some(80.0));
    }

    #[test]
    fn test_match_only_player_reports_zero_percent() {
        let p = player(
            "Ela Gecer",
            vec![full_session(ActivityKind::Match, 9800.0, 2100.0, 900.0, 310.0)],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.training, MetricAverages::default());
        for metric in TrackedMetric::ALL {
            assert_eq!(row.ratios.get(metric), Some(0.0));
        }
    }

    #[test]
    fn test_zero_match_mean_gives_no_ratio() {
        let p = player(
            "Ecemnur Ozturk",
            vec![
                session(ActivityKind::Training, date!(2024 - 04 - 01), Some(4000.0)),
                session(ActivityKind::Match, date!(2024 - 04 - 02), Some(0.0)),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.matches.total_distance, Some(0.0));
        assert_eq!(row.ratios.distance_pct, None);
    }

    #[test]
    fn test_null_samples_are_excluded_from_means() {
        let p = player(
            "Elif Ceren Mutlu",
            vec![
                session(ActivityKind::Training, date!(2024 - 05 - 01), Some(3000.0)),
                session(ActivityKind::Training, date!(2024 - 05 - 02), None),
                session(ActivityKind::Match, date!(2024 - 05 - 03), Some(6000.0)),
                session(ActivityKind::Match, date!(2024 - 05 - 04), None),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.training.total_distance, Some(3000.0));
        assert_eq!(row.matches.total_distance, Some(6000.0));
        assert_eq!(row.ratios.distance_pct, Some(50.0));
    }

    #[test]
    fn test_activities_outside_range_are_ignored() {
        let p = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2023 - 12 - 31), Some(9000.0)),
                session(ActivityKind::Training, START, Some(1000.0)),
                session(ActivityKind::Match, END, Some(4000.0)),
                session(ActivityKind::Match, date!(2025 - 01 - 01), Some(100.0)),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![Some(p)]);

        let row = &analysis.players[0];
        assert_eq!(row.training.total_distance, Some(1000.0));
        assert_eq!(row.matches.total_distance, Some(4000.0));
        assert_eq!(row.ratios.distance_pct, Some(25.0));
    }

    #[test]
    fn test_reversed_range_yields_empty_sets() {
        let p = player(
            "Aleyna Can",
            vec![session(ActivityKind::Training, date!(2024 - 06 - 01), Some(1000.0))],
        );

        let analysis = compare_training_to_match(DateRange::new(END, START), vec![Some(p)]);

        assert_eq!(analysis.players.len(), 1);
        assert_eq!(analysis.players[0].training, MetricAverages::default());
        assert_eq!(analysis.summary, LoadSummary::default());
    }

    #[test]
    fn test_unresolved_players_are_skipped() {
        let p = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(2000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 02), Some(2000.0)),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![None, Some(p), None]);

        assert_eq!(analysis.players.len(), 1);
        assert_eq!(analysis.players[0].player_name, "Aleyna Can");
        assert_eq!(analysis.summary.training.total_distance, Some(2000.0));
    }

    #[test]
    fn test_empty_input_gives_well_formed_result() {
        let analysis = compare_training_to_match(range(), Vec::new());
        assert!(analysis.players.is_empty());
        assert_eq!(analysis.summary, LoadSummary::default());

        let analysis = compare_training_to_match(range(), vec![None, None]);
        assert!(analysis.players.is_empty());
        assert_eq!(analysis.summary, LoadSummary::default());
    }

    #[test]
    fn test_summary_uses_contributing_players_only() {
        let complete = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(2000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 02), Some(2000.0)),
            ],
        );
        let training_only = player(
            "Berra Pekgoz",
            vec![session(ActivityKind::Training, date!(2024 - 03 - 01), Some(4000.0))],
        );

        let analysis = compare_training_to_match(range(), vec![Some(complete), Some(training_only)]);

        assert_eq!(analysis.players[0].ratios.distance_pct, Some(100.0));
        assert_eq!(analysis.players[1].ratios.distance_pct, None);
        // Training mean pools both players, match mean only the first.
        assert_eq!(analysis.summary.training.total_distance, Some(3000.0));
        assert_eq!(analysis.summary.matches.total_distance, Some(2000.0));
        assert_eq!(analysis.summary.ratios.distance_pct, Some(150.0));
    }

    #[test]
    fn test_summary_is_not_mean_of_ratios() {
        // Ratios 50% and 200%: their mean would be 125%.
        let a = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(1000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 02), Some(2000.0)),
            ],
        );
        let b = player(
            "Ela Gecer",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(8000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 02), Some(4000.0)),
            ],
        );

        let analysis = compare_training_to_match(range(), vec![Some(a), Some(b)]);

        assert_eq!(analysis.players[0].ratios.distance_pct, Some(50.0));
        assert_eq!(analysis.players[1].ratios.distance_pct, Some(200.0));
        assert_eq!(analysis.summary.training.total_distance, Some(4500.0));
        assert_eq!(analysis.summary.matches.total_distance, Some(3000.0));
        assert_eq!(analysis.summary.ratios.distance_pct, Some(150.0));
    }

    #[test]
    fn test_match_only_player_counts_towards_match_summary() {
        let match_only = player(
            "Ela Gecer",
            vec![session(ActivityKind::Match, date!(2024 - 03 - 02), Some(4000.0))],
        );

        let analysis = compare_training_to_match(range(), vec![Some(match_only)]);

        assert_eq!(analysis.summary.training.total_distance, None);
        assert_eq!(analysis.summary.matches.total_distance, Some(4000.0));
        assert_eq!(analysis.summary.ratios.distance_pct, Some(0.0));
    }

    #[test]
    fn test_duplicate_ids_are_processed_per_occurrence() {
        let p = player(
            "Aleyna Can",
            vec![
                session(ActivityKind::Training, date!(2024 - 03 - 01), Some(1000.0)),
                session(ActivityKind::Match, date!(2024 - 03 - 02), Some(2000.0)),
            ],
        );
        let other = player(
            "Berra Pekgoz",
            vec![session(ActivityKind::Training, date!(2024 - 03 - 01), Some(4000.0))],
        );

        let analysis =
            compare_training_to_match(range(), vec![Some(p.clone()), Some(other), Some(p)]);

        assert_eq!(analysis.players.len(), 3);
        assert_eq!(analysis.players[0].player_id, analysis.players[2].player_id);
        // (1000 + 4000 + 1000) / 3
        assert_eq!(analysis.summary.training.total_distance, Some(2000.0));
    }

    #[test]
    fn test_output_preserves_input_order() {
        let names = ["Elif", "Aleyna", "Ela"];
        let players = names
            .iter()
            .map(|name| Some(player(name, Vec::new())))
            .collect::<Vec<_>>();

        let analysis = compare_training_to_match(range(), players);

        let order: Vec<&str> = analysis
            .players
            .iter()
            .map(|p| p.player_name.as_str())
            .collect();
        assert_eq!(order, names);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let build = || {
            vec![
                Some(player(
                    "Aleyna Can",
                    vec![
                        full_session(ActivityKind::Training, 5123.7, 611.3, 233.9, 71.1),
                        full_session(ActivityKind::Training, 4870.2, 587.0, 201.4, 64.8),
                        full_session(ActivityKind::Match, 9650.4, 1822.6, 811.2, 298.3),
                    ],
                )),
                Some(player(
                    "Ela Gecer",
                    vec![full_session(ActivityKind::Match, 10210.9, 2011.5, 902.7, 341.6)],
                )),
            ]
        };

        let first = compare_training_to_match(range(), build());
        let second = compare_training_to_match(range(), build());

        assert_eq!(
            serde_json::to_string(&first.summary).unwrap(),
            serde_json::to_string(&second.summary).unwrap()
        );
        for (a, b) in first.players.iter().zip(&second.players) {
            for metric in TrackedMetric::ALL {
                assert_eq!(
                    a.ratios.get(metric).map(f64::to_bits),
                    b.ratios.get(metric).map(f64::to_bits)
                );
            }
        }
    }

    #[test]
    fn test_json_shape() {
        let p = player(
            "Aleyna Can",
            vec![session(ActivityKind::Match, date!(2024 - 03 - 02), Some(2000.0))],
        );
        let analysis = compare_training_to_match(range(), vec![Some(p)]);
        let json = serde_json::to_value(&analysis).unwrap();

        let row = &json["players"][0];
        assert_eq!(row["player_name"], "Aleyna Can");
        assert!(row["training"]["total_distance"].is_null());
        assert_eq!(row["match"]["total_distance"], 2000.0);
        assert_eq!(row["ratios"]["distance_pct"], 0.0);
        assert!(row["ratios"]["hs16_pct"].is_null());

        let summary = json["summary"].as_object().unwrap();
        assert_eq!(summary.len(), 3);
        for section in ["training", "match"] {
            let keys: Vec<&String> = summary[section].as_object().unwrap().keys().collect();
            assert_eq!(keys.len(), 4);
        }
        assert!(summary["ratios"].get("sprint_pct").is_some());
    }
}
