//! Database seeding utilities.

use thiserror::Error;
use tracing::info;

use pitchload::{
    database::Database,
    errors::AppError,
    models::{CreatePlayerRequest, CreateTeamRequest, Player, Team, User},
};

use crate::generators::{GeneratedActivity, GeneratedUser};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] AppError),
    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Database seeder for inserting generated test data.
pub struct Seeder {
    db: Database,
    batch_size: usize,
}

impl Seeder {
    /// Creates a new seeder on top of the API's database layer.
    pub fn new(db: Database) -> Self {
        Self { db, batch_size: 200 }
    }

    /// Sets how many activities are inserted between progress log lines.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Inserts the coach account, skipping it when the email is already taken.
    pub async fn seed_user(&self, generated: &GeneratedUser) -> Result<User, SeedError> {
        if let Some(existing) = self.db.get_user_by_email(&generated.user.email).await? {
            info!(email = %existing.email, "Coach already exists");
            return Ok(existing);
        }
        self.db
            .create_user(&generated.user, &generated.password_hash)
            .await?;
        info!(email = %generated.user.email, "Seeded coach");
        Ok(generated.user.clone())
    }

    pub async fn seed_team(&self, owner: &User, team: &CreateTeamRequest) -> Result<Team, SeedError> {
        let team = self.db.create_team(owner.id, team).await?;
        info!(team = %team.name, "Seeded team");
        Ok(team)
    }

    /// Inserts a roster into `team`, overriding the generated team id.
    pub async fn seed_players(
        &self,
        team: &Team,
        roster: Vec<CreatePlayerRequest>,
    ) -> Result<Vec<Player>, SeedError> {
        let mut players = Vec::with_capacity(roster.len());
        for mut req in roster {
            req.team_id = team.id;
            players.push(self.db.create_player(&req).await?);
        }
        info!("Seeded {} players for {}", players.len(), team.name);
        Ok(players)
    }

    /// Inserts activities and their match periods for `player`.
    ///
    /// Generated rows are re-pointed at the stored player id before insertion.
    pub async fn seed_activities(
        &self,
        player: &Player,
        activities: Vec<GeneratedActivity>,
    ) -> Result<usize, SeedError> {
        let total = activities.len();
        for (i, mut generated) in activities.into_iter().enumerate() {
            generated.activity.player_id = player.id;
            self.db
                .create_activity(&generated.activity, &generated.periods)
                .await?;

            if (i + 1) % self.batch_size == 0 {
                info!("  Seeded {}/{} activities for {}", i + 1, total, player.name);
            }
        }
        Ok(total)
    }
}
