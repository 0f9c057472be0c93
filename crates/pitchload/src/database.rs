use std::collections::HashMap;

use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use crate::analysis::{DateRange, PlayerActivities, PlayerMatchData};
use crate::errors::AppError;
use crate::models::{
    Activity, ActivityFilter, ActivityWithPlayer, CreatePlayerRequest, CreateTeamRequest,
    DashboardStats, InjuryRecord, MatchPeriod, Player, ProfileStats, RecentActivity, Team,
    TeamStats, TeamSummary, UpdateTeamRequest, User, UserWithPassword, WeightMeasurement,
};
use crate::query_builder::QueryBuilder;

const ACTIVITY_COLUMNS: &str = r#"
    a.id, a.player_id, a.date, a.activity_type,
    a.duration_minutes, a.total_distance_m, a.high_speed_16kmh_m, a.high_speed_18kmh_m,
    a.high_speed_20kmh_m, a.sprint_24kmh_m, a.acc_decc_count, a.high_acc_decc_count,
    a.high_metabolic_power_m, a.max_speed_kmh, a.notes, a.created_at
"#;

const PERIOD_COLUMNS: &str = r#"
    mp.id, mp.activity_id, mp.period_type,
    mp.duration_minutes, mp.total_distance_m, mp.high_speed_16kmh_m, mp.high_speed_18kmh_m,
    mp.high_speed_20kmh_m, mp.sprint_24kmh_m, mp.acc_decc_count, mp.high_acc_decc_count,
    mp.high_metabolic_power_m, mp.max_speed_kmh, mp.sprint_count, mp.notes
"#;

const RECENT_ACTIVITY_LIMIT: i64 = 10;

#[derive(FromRow)]
struct PlayerName {
    id: Uuid,
    name: String,
}

#[derive(FromRow)]
struct ActivityCounts {
    players_count: i64,
    activities_count: i64,
    training_count: i64,
    match_count: i64,
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(email_conflict)?;

        Ok(())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn get_user_with_password(
        &self,
        email: &str,
    ) -> Result<Option<UserWithPassword>, AppError> {
        let user = sqlx::query_as(
            "SELECT id, email, name, created_at, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_password_hash(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let hash = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hash)
    }

    /// Renames a user and changes their email. `None` when the user is gone.
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(
            r#"
            UPDATE users SET name = $2, email = $3
            WHERE id = $1
            RETURNING id, email, name, created_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(email_conflict)?;
        Ok(user)
    }

    /// Teams, players and activities owned by one user.
    pub async fn profile_stats(&self, user_id: Uuid) -> Result<ProfileStats, AppError> {
        let stats = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT t.id) AS team_count,
                   COUNT(DISTINCT p.id) AS player_count,
                   COUNT(a.id) AS activity_count
            FROM teams t
            LEFT JOIN players p ON p.team_id = t.id
            LEFT JOIN activities a ON a.player_id = p.id
            WHERE t.owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------------

    pub async fn create_team(
        &self,
        owner_id: Uuid,
        req: &CreateTeamRequest,
    ) -> Result<Team, AppError> {
        let team = sqlx::query_as(
            r#"
            INSERT INTO teams (id, owner_id, name, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(req.name.trim())
        .bind(req.description.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(team)
    }

    pub async fn list_teams(&self, owner_id: Uuid) -> Result<Vec<TeamSummary>, AppError> {
        let teams = sqlx::query_as(
            r#"
            SELECT t.id, t.owner_id, t.name, t.description, t.created_at,
                   COUNT(p.id) AS player_count
            FROM teams t
            LEFT JOIN players p ON p.team_id = t.id
            WHERE t.owner_id = $1
            GROUP BY t.id
            ORDER BY t.name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(teams)
    }

    /// A team, only when owned by `owner_id`.
    pub async fn get_team(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, created_at
            FROM teams
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(team)
    }

    pub async fn update_team(
        &self,
        id: Uuid,
        owner_id: Uuid,
        req: &UpdateTeamRequest,
    ) -> Result<Option<Team>, AppError> {
        let team = sqlx::query_as(
            r#"
            UPDATE teams
            SET name = COALESCE($3, name),
                description = COALESCE($4, description)
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(team)
    }

    pub async fn delete_team(&self, id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn team_stats(&self, team_id: Uuid) -> Result<TeamStats, AppError> {
        let stats = sqlx::query_as(
            r#"
            SELECT $1::uuid AS team_id,
                   COUNT(DISTINCT p.id) AS players_count,
                   COUNT(a.id) AS activities_count,
                   COUNT(a.id) FILTER (WHERE a.activity_type = 'training') AS training_count,
                   COUNT(a.id) FILTER (WHERE a.activity_type = 'match') AS match_count,
                   MAX(a.date) AS last_activity_date
            FROM players p
            LEFT JOIN activities a ON a.player_id = p.id
            WHERE p.team_id = $1
            "#,
        )
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    // ------------------------------------------------------------------------
    // Players
    // ------------------------------------------------------------------------

    pub async fn create_player(&self, req: &CreatePlayerRequest) -> Result<Player, AppError> {
        let player = sqlx::query_as(
            r#"
            INSERT INTO players (id, team_id, name, position, jersey_number, birth_date,
                                 height_cm, weight_kg, preferred_foot, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.team_id)
        .bind(req.name.trim())
        .bind(req.position)
        .bind(req.jersey_number)
        .bind(req.birth_date)
        .bind(req.height_cm)
        .bind(req.weight_kg)
        .bind(req.preferred_foot.as_deref())
        .bind(req.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(player)
    }

    /// A player, only when their team is owned by `owner_id`.
    pub async fn get_player(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Player>, AppError> {
        let player = sqlx::query_as(
            r#"
            SELECT p.*
            FROM players p
            JOIN teams t ON t.id = p.team_id
            WHERE p.id = $1 AND t.owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn list_team_players(&self, team_id: Uuid) -> Result<Vec<Player>, AppError> {
        let players = sqlx::query_as(
            "SELECT * FROM players WHERE team_id = $1 ORDER BY jersey_number NULLS LAST, name",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    /// Overwrites every editable column with the values in `player`.
    pub async fn save_player(&self, player: &Player) -> Result<Player, AppError> {
        let player = sqlx::query_as(
            r#"
            UPDATE players
            SET team_id = $2, name = $3, position = $4, jersey_number = $5, birth_date = $6,
                height_cm = $7, weight_kg = $8, preferred_foot = $9, notes = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(player.id)
        .bind(player.team_id)
        .bind(&player.name)
        .bind(player.position)
        .bind(player.jersey_number)
        .bind(player.birth_date)
        .bind(player.height_cm)
        .bind(player.weight_kg)
        .bind(player.preferred_foot.as_deref())
        .bind(player.notes.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn delete_player(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The subset of `ids` whose players belong to teams owned by `owner_id`.
    pub async fn owned_player_ids(
        &self,
        owner_id: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        let owned = sqlx::query_scalar(
            r#"
            SELECT p.id
            FROM players p
            JOIN teams t ON t.id = p.team_id
            WHERE p.id = ANY($1) AND t.owner_id = $2
            "#,
        )
        .bind(ids)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(owned)
    }

    pub async fn player_activities(&self, player_id: Uuid) -> Result<Vec<Activity>, AppError> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities a WHERE a.player_id = $1 ORDER BY a.date DESC"
        );
        let activities = sqlx::query_as(&sql)
            .bind(player_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }

    // ------------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------------

    pub async fn list_weight_measurements(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<WeightMeasurement>, AppError> {
        let measurements = sqlx::query_as(
            r#"
            SELECT id, player_id, measurement_date, weight_kg, notes, created_at
            FROM weight_measurements
            WHERE player_id = $1
            ORDER BY measurement_date DESC, created_at DESC
            "#,
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(measurements)
    }

    /// Records a measurement and makes it the player's current weight.
    pub async fn add_weight_measurement(
        &self,
        player_id: Uuid,
        measurement_date: Date,
        weight_kg: f64,
        notes: Option<&str>,
    ) -> Result<WeightMeasurement, AppError> {
        let mut tx = self.pool.begin().await?;

        let measurement = sqlx::query_as(
            r#"
            INSERT INTO weight_measurements (id, player_id, measurement_date, weight_kg, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, player_id, measurement_date, weight_kg, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(player_id)
        .bind(measurement_date)
        .bind(weight_kg)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE players SET weight_kg = $2 WHERE id = $1")
            .bind(player_id)
            .bind(weight_kg)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(measurement)
    }

    pub async fn list_injuries(&self, player_id: Uuid) -> Result<Vec<InjuryRecord>, AppError> {
        let injuries = sqlx::query_as(
            "SELECT * FROM injury_records WHERE player_id = $1 ORDER BY injury_date DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(injuries)
    }

    pub async fn get_injury(
        &self,
        id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<InjuryRecord>, AppError> {
        let injury =
            sqlx::query_as("SELECT * FROM injury_records WHERE id = $1 AND player_id = $2")
                .bind(id)
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(injury)
    }

    /// Inserts or overwrites an injury record.
    pub async fn save_injury(&self, injury: &InjuryRecord) -> Result<InjuryRecord, AppError> {
        let saved = sqlx::query_as(
            r#"
            INSERT INTO injury_records (id, player_id, injury_date, injury_type, description,
                                        status, recovery_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE
            SET injury_type = EXCLUDED.injury_type,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                recovery_date = EXCLUDED.recovery_date
            RETURNING *
            "#,
        )
        .bind(injury.id)
        .bind(injury.player_id)
        .bind(injury.injury_date)
        .bind(&injury.injury_type)
        .bind(injury.description.as_deref())
        .bind(injury.status)
        .bind(injury.recovery_date)
        .bind(injury.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    // ------------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------------

    /// Inserts an activity together with its match periods.
    pub async fn create_activity(
        &self,
        activity: &Activity,
        periods: &[MatchPeriod],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let m = &activity.metrics;
        sqlx::query(
            r#"
            INSERT INTO activities (id, player_id, date, activity_type,
                                    duration_minutes, total_distance_m, high_speed_16kmh_m,
                                    high_speed_18kmh_m, high_speed_20kmh_m, sprint_24kmh_m,
                                    acc_decc_count, high_acc_decc_count, high_metabolic_power_m,
                                    max_speed_kmh, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(activity.id)
        .bind(activity.player_id)
        .bind(activity.date)
        .bind(activity.activity_type)
        .bind(m.duration_minutes)
        .bind(m.total_distance_m)
        .bind(m.high_speed_16kmh_m)
        .bind(m.high_speed_18kmh_m)
        .bind(m.high_speed_20kmh_m)
        .bind(m.sprint_24kmh_m)
        .bind(m.acc_decc_count)
        .bind(m.high_acc_decc_count)
        .bind(m.high_metabolic_power_m)
        .bind(m.max_speed_kmh)
        .bind(activity.notes.as_deref())
        .bind(activity.created_at)
        .execute(&mut *tx)
        .await?;

        for period in periods {
            insert_period(&mut tx, period).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// An activity, only when its player's team is owned by `owner_id`.
    pub async fn get_activity(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<ActivityWithPlayer>, AppError> {
        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}, p.name AS player_name
            FROM activities a
            JOIN players p ON p.id = a.player_id
            JOIN teams t ON t.id = p.team_id
            WHERE a.id = $1 AND t.owner_id = $2
            "#
        );
        let activity = sqlx::query_as(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(activity)
    }

    pub async fn list_activities(
        &self,
        owner_id: Uuid,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityWithPlayer>, AppError> {
        let mut qb = QueryBuilder::new();
        qb.push("t.owner_id = {}", owner_id)
            .push_optional("a.player_id = {}", filter.player_id)
            .push_optional("p.team_id = {}", filter.team_id)
            .add_date_bounds("a.date", filter.start_date, filter.end_date)
            .push_optional("a.activity_type = {}", filter.activity_type);
        let limit = qb.placeholder(filter.limit());
        let offset = qb.placeholder(filter.offset());

        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}, p.name AS player_name
            FROM activities a
            JOIN players p ON p.id = a.player_id
            JOIN teams t ON t.id = p.team_id
            {}
            ORDER BY a.date DESC, a.created_at DESC
            LIMIT {limit} OFFSET {offset}
            "#,
            qb.build_where_clause()
        );

        let activities = qb
            .bind_to(sqlx::query_as::<_, ActivityWithPlayer>(&sql))
            .fetch_all(&self.pool)
            .await?;
        Ok(activities)
    }

    /// Overwrites the editable columns of an existing activity, dropping its
    /// periods in the same transaction when `clear_periods` is set.
    pub async fn update_activity(
        &self,
        activity: &Activity,
        clear_periods: bool,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let m = &activity.metrics;
        sqlx::query(
            r#"
            UPDATE activities
            SET date = $2, activity_type = $3, duration_minutes = $4, total_distance_m = $5,
                high_speed_16kmh_m = $6, high_speed_18kmh_m = $7, high_speed_20kmh_m = $8,
                sprint_24kmh_m = $9, acc_decc_count = $10, high_acc_decc_count = $11,
                high_metabolic_power_m = $12, max_speed_kmh = $13, notes = $14
            WHERE id = $1
            "#,
        )
        .bind(activity.id)
        .bind(activity.date)
        .bind(activity.activity_type)
        .bind(m.duration_minutes)
        .bind(m.total_distance_m)
        .bind(m.high_speed_16kmh_m)
        .bind(m.high_speed_18kmh_m)
        .bind(m.high_speed_20kmh_m)
        .bind(m.sprint_24kmh_m)
        .bind(m.acc_decc_count)
        .bind(m.high_acc_decc_count)
        .bind(m.high_metabolic_power_m)
        .bind(m.max_speed_kmh)
        .bind(activity.notes.as_deref())
        .execute(&mut *tx)
        .await?;

        if clear_periods {
            sqlx::query("DELETE FROM match_periods WHERE activity_id = $1")
                .bind(activity.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_activity(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn activity_periods(&self, activity_id: Uuid) -> Result<Vec<MatchPeriod>, AppError> {
        let sql = format!(
            "SELECT {PERIOD_COLUMNS} FROM match_periods mp WHERE mp.activity_id = $1 ORDER BY mp.period_type"
        );
        let periods = sqlx::query_as(&sql)
            .bind(activity_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(periods)
    }

    // ------------------------------------------------------------------------
    // Analysis input
    // ------------------------------------------------------------------------

    /// Activities of each requested player inside `range`, in request order.
    ///
    /// Ids that do not resolve to a player yield `None`. All rows are read
    /// from one snapshot.
    pub async fn load_player_activities(
        &self,
        player_ids: &[Uuid],
        range: DateRange,
    ) -> Result<Vec<Option<PlayerActivities>>, AppError> {
        let mut tx = self.snapshot().await?;

        let names = player_names(&mut tx, player_ids).await?;

        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities a
            WHERE a.player_id = ANY($1) AND a.date >= $2 AND a.date <= $3
            ORDER BY a.date, a.created_at
            "#
        );
        let activities: Vec<Activity> = sqlx::query_as(&sql)
            .bind(player_ids)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut by_player: HashMap<Uuid, Vec<Activity>> = HashMap::new();
        for activity in activities {
            by_player.entry(activity.player_id).or_default().push(activity);
        }

        Ok(player_ids
            .iter()
            .map(|id| {
                names.get(id).map(|name| PlayerActivities {
                    player_id: *id,
                    player_name: name.clone(),
                    activities: by_player.get(id).cloned().unwrap_or_default(),
                })
            })
            .collect())
    }

    /// Matches inside `range` and their recorded periods, in request order.
    pub async fn load_player_match_data(
        &self,
        player_ids: &[Uuid],
        range: DateRange,
    ) -> Result<Vec<Option<PlayerMatchData>>, AppError> {
        let mut tx = self.snapshot().await?;

        let names = player_names(&mut tx, player_ids).await?;

        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities a
            WHERE a.player_id = ANY($1) AND a.activity_type = 'match'
              AND a.date >= $2 AND a.date <= $3
            ORDER BY a.date
            "#
        );
        let matches: Vec<Activity> = sqlx::query_as(&sql)
            .bind(player_ids)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&mut *tx)
            .await?;

        let match_ids: Vec<Uuid> = matches.iter().map(|a| a.id).collect();
        let sql = format!(
            "SELECT {PERIOD_COLUMNS} FROM match_periods mp WHERE mp.activity_id = ANY($1)"
        );
        let periods: Vec<MatchPeriod> = sqlx::query_as(&sql)
            .bind(match_ids.as_slice())
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let owner_of: HashMap<Uuid, Uuid> = matches.iter().map(|a| (a.id, a.player_id)).collect();
        let mut matches_by_player: HashMap<Uuid, Vec<Activity>> = HashMap::new();
        for activity in matches {
            matches_by_player
                .entry(activity.player_id)
                .or_default()
                .push(activity);
        }
        let mut periods_by_player: HashMap<Uuid, Vec<MatchPeriod>> = HashMap::new();
        for period in periods {
            if let Some(player_id) = owner_of.get(&period.activity_id) {
                periods_by_player.entry(*player_id).or_default().push(period);
            }
        }

        Ok(player_ids
            .iter()
            .map(|id| {
                names.get(id).map(|name| PlayerMatchData {
                    player_id: *id,
                    player_name: name.clone(),
                    matches: matches_by_player.get(id).cloned().unwrap_or_default(),
                    periods: periods_by_player.get(id).cloned().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn snapshot(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    // ------------------------------------------------------------------------
    // Dashboard
    // ------------------------------------------------------------------------

    pub async fn dashboard_stats(
        &self,
        owner_id: Uuid,
        team_id: Option<Uuid>,
    ) -> Result<DashboardStats, AppError> {
        let counts: ActivityCounts = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT p.id) AS players_count,
                   COUNT(a.id) AS activities_count,
                   COUNT(a.id) FILTER (WHERE a.activity_type = 'training') AS training_count,
                   COUNT(a.id) FILTER (WHERE a.activity_type = 'match') AS match_count
            FROM teams t
            JOIN players p ON p.team_id = t.id
            LEFT JOIN activities a ON a.player_id = p.id
            WHERE t.owner_id = $1 AND ($2::uuid IS NULL OR t.id = $2)
            "#,
        )
        .bind(owner_id)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;

        let recent_activities: Vec<RecentActivity> = sqlx::query_as(
            r#"
            SELECT a.id, a.date, a.player_id, p.name AS player_name, a.activity_type,
                   a.total_distance_m, a.duration_minutes
            FROM activities a
            JOIN players p ON p.id = a.player_id
            JOIN teams t ON t.id = p.team_id
            WHERE t.owner_id = $1 AND ($2::uuid IS NULL OR t.id = $2)
            ORDER BY a.date DESC, a.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(team_id)
        .bind(RECENT_ACTIVITY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(DashboardStats {
            players_count: counts.players_count,
            activities_count: counts.activities_count,
            training_count: counts.training_count,
            match_count: counts.match_count,
            recent_activities,
        })
    }
}

/// Maps a `users.email` unique violation to a client error.
fn email_conflict(error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Database(e) if e.is_unique_violation() => {
            AppError::InvalidInput("Email already registered".to_string())
        }
        other => AppError::Database(other),
    }
}

async fn player_names(
    tx: &mut Transaction<'static, Postgres>,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, AppError> {
    let rows: Vec<PlayerName> = sqlx::query_as("SELECT id, name FROM players WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;
    Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
}

async fn insert_period(
    tx: &mut Transaction<'static, Postgres>,
    period: &MatchPeriod,
) -> Result<(), AppError> {
    let m = &period.metrics;
    sqlx::query(
        r#"
        INSERT INTO match_periods (id, activity_id, period_type,
                                   duration_minutes, total_distance_m, high_speed_16kmh_m,
                                   high_speed_18kmh_m, high_speed_20kmh_m, sprint_24kmh_m,
                                   acc_decc_count, high_acc_decc_count, high_metabolic_power_m,
                                   max_speed_kmh, sprint_count, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(period.id)
    .bind(period.activity_id)
    .bind(period.period_type)
    .bind(m.duration_minutes)
    .bind(m.total_distance_m)
    .bind(m.high_speed_16kmh_m)
    .bind(m.high_speed_18kmh_m)
    .bind(m.high_speed_20kmh_m)
    .bind(m.sprint_24kmh_m)
    .bind(m.acc_decc_count)
    .bind(m.high_acc_decc_count)
    .bind(m.high_metabolic_power_m)
    .bind(m.max_speed_kmh)
    .bind(period.sprint_count)
    .bind(period.notes.as_deref())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
