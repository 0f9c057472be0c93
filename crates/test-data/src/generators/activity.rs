//! Training session and match generation.
//!
//! A season is a weekly cycle: training on a fixed set of weekdays and a match
//! every Saturday. Match activities carry a per-period breakdown whose totals
//! add up to the activity-level metrics.

use rand::Rng;
use time::{Date, Weekday};
use uuid::Uuid;

use pitchload::models::{Activity, ActivityKind, LoadMetrics, MatchPeriod, PeriodType};

use super::team::{round1, sample_normal};
use crate::profiles::{PositionProfile, sample_intensity};

/// Training days in the order they are added to the weekly plan.
const TRAINING_DAYS: [Weekday; 5] = [
    Weekday::Tuesday,
    Weekday::Thursday,
    Weekday::Monday,
    Weekday::Friday,
    Weekday::Wednesday,
];

const MATCH_DAY: Weekday = Weekday::Saturday;

/// Generated activity with its match periods (empty for training).
#[derive(Debug, Clone)]
pub struct GeneratedActivity {
    pub activity: Activity,
    pub periods: Vec<MatchPeriod>,
}

/// Configuration for activity generation.
#[derive(Debug, Clone)]
pub struct ActivityGenConfig {
    /// Training sessions per week (0-5).
    pub trainings_per_week: u8,
    /// Probability that a player features in a match.
    pub match_participation: f64,
    /// Probability that a match goes to extra time.
    pub extra_time_rate: f64,
    /// Probability that a single metric is left blank.
    pub missing_metric_rate: f64,
}

impl Default for ActivityGenConfig {
    fn default() -> Self {
        Self {
            trainings_per_week: 4,
            match_participation: 0.75,
            extra_time_rate: 0.1,
            missing_metric_rate: 0.05,
        }
    }
}

/// Generates a season of activities for individual players.
pub struct ActivityGenerator {
    config: ActivityGenConfig,
}

impl ActivityGenerator {
    pub fn new() -> Self {
        Self {
            config: ActivityGenConfig::default(),
        }
    }

    pub fn with_config(config: ActivityGenConfig) -> Self {
        Self { config }
    }

    /// Session calendar between `start` and `end` inclusive.
    pub fn schedule(&self, start: Date, end: Date) -> Vec<(Date, ActivityKind)> {
        let training_days = &TRAINING_DAYS[..usize::from(self.config.trainings_per_week.min(5))];
        let mut calendar = Vec::new();
        let mut day = Some(start);

        while let Some(date) = day.filter(|d| *d <= end) {
            if date.weekday() == MATCH_DAY {
                calendar.push((date, ActivityKind::Match));
            } else if training_days.contains(&date.weekday()) {
                calendar.push((date, ActivityKind::Training));
            }
            day = date.next_day();
        }
        calendar
    }

    /// Generates every session a player takes part in during the season.
    pub fn generate_season(
        &self,
        player_id: Uuid,
        profile: &PositionProfile,
        start: Date,
        end: Date,
        rng: &mut impl Rng,
    ) -> Vec<GeneratedActivity> {
        self.schedule(start, end)
            .into_iter()
            .filter_map(|(date, kind)| match kind {
                ActivityKind::Training => Some(self.generate_training(player_id, date, profile, rng)),
                ActivityKind::Match if rng.gen_bool(self.config.match_participation.clamp(0.0, 1.0)) => {
                    Some(self.generate_match(player_id, date, profile, rng))
                }
                ActivityKind::Match => None,
            })
            .collect()
    }

    pub fn generate_training(
        &self,
        player_id: Uuid,
        date: Date,
        profile: &PositionProfile,
        rng: &mut impl Rng,
    ) -> GeneratedActivity {
        let minutes = rng.gen_range(60..=95);
        let intensity = sample_intensity(profile, rng) * profile.training_scale;
        let load = SessionLoad::sample(profile, f64::from(minutes) / 90.0 * intensity, rng);

        let metrics = self.blank_some(load.into_metrics(minutes), rng);
        GeneratedActivity {
            activity: Activity::new(player_id, date, ActivityKind::Training, metrics),
            periods: Vec::new(),
        }
    }

    pub fn generate_match(
        &self,
        player_id: Uuid,
        date: Date,
        profile: &PositionProfile,
        rng: &mut impl Rng,
    ) -> GeneratedActivity {
        let intensity = sample_intensity(profile, rng);
        let extra_time = rng.gen_bool(self.config.extra_time_rate.clamp(0.0, 1.0));

        // Output drops a little after the break and again in extra time.
        let mut parts = vec![
            (PeriodType::FirstHalf, 45, 1.02),
            (PeriodType::SecondHalf, 45, 0.97),
        ];
        if extra_time {
            parts.push((PeriodType::ExtraTime1, 15, 0.92));
            parts.push((PeriodType::ExtraTime2, 15, 0.9));
        }

        let loads: Vec<(PeriodType, i32, SessionLoad)> = parts
            .into_iter()
            .map(|(period, minutes, fatigue)| {
                let share = f64::from(minutes) / 90.0 * intensity * fatigue;
                (period, minutes, SessionLoad::sample(profile, share, rng))
            })
            .collect();

        let total = loads
            .iter()
            .fold(SessionLoad::default(), |acc, (_, _, load)| acc.combine(load));
        let total_minutes: i32 = loads.iter().map(|(_, minutes, _)| minutes).sum();

        let metrics = self.blank_some(total.into_metrics(total_minutes), rng);
        let activity = Activity::new(player_id, date, ActivityKind::Match, metrics);

        let periods = loads
            .into_iter()
            .map(|(period_type, minutes, load)| {
                let sprint_count = load.sprints;
                MatchPeriod {
                    id: Uuid::new_v4(),
                    activity_id: activity.id,
                    period_type,
                    metrics: self.blank_some(load.into_metrics(minutes), rng),
                    sprint_count: self.keep(Some(sprint_count), rng),
                    notes: None,
                }
            })
            .collect();

        GeneratedActivity { activity, periods }
    }

    /// Drops individual metrics at the configured rate.
    fn blank_some(&self, mut m: LoadMetrics, rng: &mut impl Rng) -> LoadMetrics {
        m.total_distance_m = self.keep(m.total_distance_m, rng);
        m.high_speed_16kmh_m = self.keep(m.high_speed_16kmh_m, rng);
        m.high_speed_18kmh_m = self.keep(m.high_speed_18kmh_m, rng);
        m.high_speed_20kmh_m = self.keep(m.high_speed_20kmh_m, rng);
        m.sprint_24kmh_m = self.keep(m.sprint_24kmh_m, rng);
        m.acc_decc_count = self.keep(m.acc_decc_count, rng);
        m.high_metabolic_power_m = self.keep(m.high_metabolic_power_m, rng);
        m.max_speed_kmh = self.keep(m.max_speed_kmh, rng);
        m
    }

    fn keep<T>(&self, value: Option<T>, rng: &mut impl Rng) -> Option<T> {
        if rng.gen_bool(self.config.missing_metric_rate.clamp(0.0, 1.0)) {
            None
        } else {
            value
        }
    }
}

impl Default for ActivityGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw physical output for a session or period before metrics are blanked.
#[derive(Debug, Clone, Default)]
struct SessionLoad {
    distance: f64,
    hs16: f64,
    hs18: f64,
    hs20: f64,
    sprint: f64,
    hmp: f64,
    max_speed: f64,
    sprints: i32,
    acc_decc: i32,
    high_acc_decc: i32,
}

impl SessionLoad {
    /// Samples output for `share` of a full match worth of work.
    fn sample(profile: &PositionProfile, share: f64, rng: &mut impl Rng) -> Self {
        let distance = (profile.match_distance_m * share * sample_normal(1.0, 0.04, rng)).max(0.0);
        let hs16 = speed_band(distance, profile.hs16_fraction, rng);
        let hs18 = speed_band(distance, profile.hs18_fraction, rng).min(hs16);
        let hs20 = speed_band(distance, profile.hs20_fraction, rng).min(hs18);
        let sprint = speed_band(distance, profile.sprint_fraction, rng).min(hs20);
        let acc_decc = sample_normal(profile.acc_decc_per_match * share, 6.0, rng).max(0.0);

        Self {
            distance,
            hs16,
            hs18,
            hs20,
            sprint,
            hmp: hs16 * sample_normal(1.8, 0.1, rng).max(1.0),
            max_speed: sample_normal(profile.max_speed_kmh, 1.2, rng).clamp(15.0, 36.0),
            sprints: sample_normal(profile.sprints_per_match * share, 2.0, rng)
                .round()
                .max(0.0) as i32,
            acc_decc: acc_decc.round() as i32,
            high_acc_decc: (acc_decc * 0.3).round() as i32,
        }
    }

    fn combine(&self, other: &Self) -> Self {
        Self {
            distance: self.distance + other.distance,
            hs16: self.hs16 + other.hs16,
            hs18: self.hs18 + other.hs18,
            hs20: self.hs20 + other.hs20,
            sprint: self.sprint + other.sprint,
            hmp: self.hmp + other.hmp,
            max_speed: self.max_speed.max(other.max_speed),
            sprints: self.sprints + other.sprints,
            acc_decc: self.acc_decc + other.acc_decc,
            high_acc_decc: self.high_acc_decc + other.high_acc_decc,
        }
    }

    fn into_metrics(self, minutes: i32) -> LoadMetrics {
        LoadMetrics {
            duration_minutes: Some(minutes),
            total_distance_m: Some(round1(self.distance)),
            high_speed_16kmh_m: Some(round1(self.hs16)),
            high_speed_18kmh_m: Some(round1(self.hs18)),
            high_speed_20kmh_m: Some(round1(self.hs20)),
            sprint_24kmh_m: Some(round1(self.sprint)),
            acc_decc_count: Some(self.acc_decc),
            high_acc_decc_count: Some(self.high_acc_decc),
            high_metabolic_power_m: Some(round1(self.hmp)),
            max_speed_kmh: Some(round1(self.max_speed)),
        }
    }
}

fn speed_band(distance: f64, fraction: f64, rng: &mut impl Rng) -> f64 {
    (distance * fraction * sample_normal(1.0, 0.12, rng)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn complete() -> ActivityGenerator {
        ActivityGenerator::with_config(ActivityGenConfig {
            missing_metric_rate: 0.0,
            ..Default::default()
        })
    }

    #[test]
    fn test_weekly_schedule() {
        // 2024-08-05 is a Monday
        let schedule = ActivityGenerator::new().schedule(date!(2024 - 08 - 05), date!(2024 - 08 - 11));
        let matches: Vec<_> = schedule
            .iter()
            .filter(|(_, kind)| *kind == ActivityKind::Match)
            .collect();

        assert_eq!(schedule.len(), 5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, date!(2024 - 08 - 10));
    }

    #[test]
    fn test_empty_schedule_for_reversed_range() {
        let schedule = ActivityGenerator::new().schedule(date!(2024 - 08 - 11), date!(2024 - 08 - 05));
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_match_totals_match_periods() {
        let mut rng = rand::thread_rng();
        let generated = complete().generate_match(
            Uuid::new_v4(),
            date!(2024 - 08 - 10),
            &PositionProfile::midfielder(),
            &mut rng,
        );

        assert_eq!(generated.activity.activity_type, ActivityKind::Match);
        assert!(generated.periods.len() == 2 || generated.periods.len() == 4);
        assert!(generated.periods.iter().all(|p| p.activity_id == generated.activity.id));

        let period_distance: f64 = generated
            .periods
            .iter()
            .filter_map(|p| p.metrics.total_distance_m)
            .sum();
        let total = generated.activity.metrics.total_distance_m.unwrap();
        assert!((period_distance - total).abs() < 1.0);

        let top_speed = generated
            .periods
            .iter()
            .filter_map(|p| p.metrics.max_speed_kmh)
            .fold(0.0, f64::max);
        assert_eq!(generated.activity.metrics.max_speed_kmh, Some(top_speed));
    }

    #[test]
    fn test_training_is_lighter_than_match() {
        let generator = complete();
        let profile = PositionProfile::forward();
        let mut rng = rand::thread_rng();
        let player = Uuid::new_v4();

        let mean = |kind: ActivityKind, rng: &mut rand::rngs::ThreadRng| {
            let sessions: Vec<f64> = (0..40)
                .map(|_| {
                    let g = match kind {
                        ActivityKind::Training => {
                            generator.generate_training(player, date!(2024 - 08 - 06), &profile, rng)
                        }
                        ActivityKind::Match => {
                            generator.generate_match(player, date!(2024 - 08 - 10), &profile, rng)
                        }
                    };
                    g.activity.metrics.total_distance_m.unwrap()
                })
                .collect();
            sessions.iter().sum::<f64>() / sessions.len() as f64
        };

        let training = mean(ActivityKind::Training, &mut rng);
        let matches = mean(ActivityKind::Match, &mut rng);
        assert!(training < matches, "training {training} vs match {matches}");
    }

    #[test]
    fn test_speed_bands_are_nested() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let g = complete().generate_training(
                Uuid::new_v4(),
                date!(2024 - 08 - 06),
                &PositionProfile::defender(),
                &mut rng,
            );
            let m = g.activity.metrics;
            assert!(m.high_speed_16kmh_m >= m.high_speed_18kmh_m);
            assert!(m.high_speed_18kmh_m >= m.high_speed_20kmh_m);
            assert!(m.high_speed_20kmh_m >= m.sprint_24kmh_m);
            assert!(g.periods.is_empty());
        }
    }

    #[test]
    fn test_missing_metrics_rate() {
        let generator = ActivityGenerator::with_config(ActivityGenConfig {
            missing_metric_rate: 1.0,
            ..Default::default()
        });
        let mut rng = rand::thread_rng();
        let g = generator.generate_training(
            Uuid::new_v4(),
            date!(2024 - 08 - 06),
            &PositionProfile::goalkeeper(),
            &mut rng,
        );
        assert_eq!(g.activity.metrics.total_distance_m, None);
        assert_eq!(g.activity.metrics.sprint_24kmh_m, None);
        // Duration is always recorded
        assert!(g.activity.metrics.duration_minutes.is_some());
    }
}
