//! Fluent builder for constructing test scenarios.

use std::time::Instant;

use rand::{Rng, SeedableRng, rngs::StdRng};
use time::Date;
use uuid::Uuid;

use pitchload::{
    database::Database,
    models::{CreatePlayerRequest, CreateTeamRequest, Player, Team, User},
};

use crate::config::SeedConfig;
use crate::db::{SeedError, Seeder};
use crate::generators::{
    ActivityGenConfig, ActivityGenerator, GeneratedActivity, GeneratedUser, PlayerGenerator,
    TeamGenerator, UserGenerator,
};
use crate::profiles::PositionProfile;

/// A generated player together with their season.
#[derive(Debug)]
pub struct PlannedPlayer {
    pub request: CreatePlayerRequest,
    pub activities: Vec<GeneratedActivity>,
}

/// A generated team before insertion.
#[derive(Debug)]
pub struct PlannedTeam {
    pub request: CreateTeamRequest,
    pub players: Vec<PlannedPlayer>,
}

/// Everything generated for a scenario, not yet written to the database.
#[derive(Debug)]
pub struct ScenarioData {
    pub coach: GeneratedUser,
    pub teams: Vec<PlannedTeam>,
}

impl ScenarioData {
    pub fn activity_count(&self) -> usize {
        self.players().map(|p| p.activities.len()).sum()
    }

    fn players(&self) -> impl Iterator<Item = &PlannedPlayer> {
        self.teams.iter().flat_map(|t| t.players.iter())
    }
}

/// Result of building and seeding a scenario.
#[derive(Debug)]
pub struct ScenarioResult {
    pub coach: User,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub activity_count: usize,
    pub period_count: usize,
    pub metrics: ScenarioMetrics,
}

/// Timing from scenario generation.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Time spent generating data (milliseconds).
    pub generation_time_ms: u64,
    /// Time spent seeding the database (milliseconds).
    pub seeding_time_ms: u64,
}

/// Builder for creating complete test scenarios.
///
/// # Example
///
/// ```rust,ignore
/// let result = ScenarioBuilder::new()
///     .with_teams(2)
///     .with_players_per_team(18)
///     .with_season(date!(2024 - 08 - 05), 84)
///     .with_seed(12345)
///     .build(&db)
///     .await?;
/// ```
pub struct ScenarioBuilder {
    config: SeedConfig,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::from_config(SeedConfig::default())
    }

    pub fn from_config(config: SeedConfig) -> Self {
        Self { config }
    }

    pub fn with_teams(mut self, count: usize) -> Self {
        self.config.team_count = count;
        self
    }

    pub fn with_players_per_team(mut self, count: usize) -> Self {
        self.config.players_per_team = count;
        self
    }

    pub fn with_season(mut self, start: Date, days: u16) -> Self {
        self.config.season_start = start;
        self.config.season_days = days;
        self
    }

    pub fn with_missing_metric_rate(mut self, rate: f64) -> Self {
        self.config.missing_metric_rate = rate;
        self
    }

    /// Sets the random seed for reproducible data.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Generates the scenario without touching the database.
    ///
    /// Player and team ids inside the plan are placeholders; [`Self::build`]
    /// replaces them with the stored ids.
    pub fn build_data(&self, rng: &mut impl Rng) -> Result<ScenarioData, SeedError> {
        let coach = UserGenerator::new()
            .generate(rng)
            .map_err(|e| SeedError::Generation(e.to_string()))?;

        let start = self.config.season_start;
        let end = self.config.season_end();
        let team_gen = TeamGenerator::new();
        let player_gen = PlayerGenerator::new(start);
        let activity_gen = ActivityGenerator::with_config(ActivityGenConfig {
            trainings_per_week: self.config.trainings_per_week,
            match_participation: self.config.match_participation,
            extra_time_rate: self.config.extra_time_rate,
            missing_metric_rate: self.config.missing_metric_rate,
        });

        let teams = (0..self.config.team_count)
            .map(|_| {
                let request = team_gen.generate(rng);
                let players = player_gen
                    .generate_roster(Uuid::nil(), self.config.players_per_team, rng)
                    .into_iter()
                    .map(|request| {
                        let profile = PositionProfile::for_position(request.position);
                        let activities =
                            activity_gen.generate_season(Uuid::nil(), &profile, start, end, rng);
                        PlannedPlayer {
                            request,
                            activities,
                        }
                    })
                    .collect();
                PlannedTeam { request, players }
            })
            .collect();

        Ok(ScenarioData { coach, teams })
    }

    /// Generates the scenario and seeds it through `db`.
    pub async fn build(&self, db: &Database) -> Result<ScenarioResult, SeedError> {
        let started = Instant::now();
        let data = self.build_data(&mut self.rng())?;
        let generation_time_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            teams = data.teams.len(),
            activities = data.activity_count(),
            "Generated scenario"
        );

        let started = Instant::now();
        let seeder = Seeder::new(db.clone());
        let coach = seeder.seed_user(&data.coach).await?;

        let mut teams = Vec::new();
        let mut players = Vec::new();
        let mut activity_count = 0;
        let mut period_count = 0;

        for planned in data.teams {
            let team = seeder.seed_team(&coach, &planned.request).await?;
            let (requests, seasons): (Vec<_>, Vec<_>) = planned
                .players
                .into_iter()
                .map(|p| (p.request, p.activities))
                .unzip();

            let roster = seeder.seed_players(&team, requests).await?;
            for (player, season) in roster.iter().zip(seasons) {
                period_count += season.iter().map(|a| a.periods.len()).sum::<usize>();
                activity_count += seeder.seed_activities(player, season).await?;
            }

            teams.push(team);
            players.extend(roster);
        }

        Ok(ScenarioResult {
            coach,
            teams,
            players,
            activity_count,
            period_count,
            metrics: ScenarioMetrics {
                generation_time_ms,
                seeding_time_ms: started.elapsed().as_millis() as u64,
            },
        })
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_build_data_shape() {
        let builder = ScenarioBuilder::new()
            .with_teams(2)
            .with_players_per_team(5)
            .with_season(date!(2024 - 08 - 05), 14)
            .with_seed(7);
        let data = builder.build_data(&mut builder.rng()).unwrap();

        assert_eq!(data.teams.len(), 2);
        assert!(data.teams.iter().all(|t| t.players.len() == 5));
        // Two weeks of four trainings each, plus up to two matches
        for player in data.players() {
            let trainings = player
                .activities
                .iter()
                .filter(|a| a.periods.is_empty())
                .count();
            assert!(trainings >= 8);
            assert!(player.activities.len() <= 10);
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let builder = ScenarioBuilder::from_config(SeedConfig::minimal()).with_seed(42);
        let a = builder.build_data(&mut builder.rng()).unwrap();
        let b = builder.build_data(&mut builder.rng()).unwrap();

        let distances = |data: &ScenarioData| -> Vec<Option<f64>> {
            data.players()
                .flat_map(|p| p.activities.iter())
                .map(|a| a.activity.metrics.total_distance_m)
                .collect()
        };
        assert_eq!(a.coach.user.name, b.coach.user.name);
        assert_eq!(distances(&a), distances(&b));
    }
}
