use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn new(email: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// A user row joined with its stored password hash. Never serialized.
#[derive(Debug, FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// Counts shown on a user's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
pub struct ProfileStats {
    pub team_count: i64,
    pub player_count: i64,
    pub activity_count: i64,
}

// ============================================================================
// Teams
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Team listing entry with its roster size.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub team: Team,
    pub player_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeamRequest {
    #[validate(length(min = 1, max = 100, message = "Team name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description is too long"))]
    pub description: Option<String>,
}

/// Activity counts for one team.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamStats {
    pub team_id: Uuid,
    pub players_count: i64,
    pub activities_count: i64,
    pub training_count: i64,
    pub match_count: i64,
    pub last_activity_date: Option<Date>,
}

// ============================================================================
// Players
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "player_position", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlayerPosition {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl PlayerPosition {
    pub const ALL: [PlayerPosition; 4] = [
        PlayerPosition::Goalkeeper,
        PlayerPosition::Defender,
        PlayerPosition::Midfielder,
        PlayerPosition::Forward,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerPosition::Goalkeeper => "goalkeeper",
            PlayerPosition::Defender => "defender",
            PlayerPosition::Midfielder => "midfielder",
            PlayerPosition::Forward => "forward",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Player {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub position: Option<PlayerPosition>,
    pub jersey_number: Option<i32>,
    pub birth_date: Option<Date>,
    pub height_cm: Option<f64>,
    /// Most recent recorded body weight.
    pub weight_kg: Option<f64>,
    pub preferred_foot: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePlayerRequest {
    pub team_id: Uuid,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    pub position: Option<PlayerPosition>,
    #[validate(range(min = 0, max = 999, message = "Jersey number must be between 0 and 999"))]
    pub jersey_number: Option<i32>,
    pub birth_date: Option<Date>,
    #[validate(range(min = 50.0, max = 260.0, message = "Height must be between 50 and 260 cm"))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 20.0, max = 250.0, message = "Weight must be between 20 and 250 kg"))]
    pub weight_kg: Option<f64>,
    #[validate(length(max = 10, message = "Preferred foot is too long"))]
    pub preferred_foot: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePlayerRequest {
    /// Move the player to another team owned by the caller.
    pub team_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    pub position: Option<PlayerPosition>,
    #[validate(range(min = 0, max = 999, message = "Jersey number must be between 0 and 999"))]
    pub jersey_number: Option<i32>,
    pub birth_date: Option<Date>,
    #[validate(range(min = 50.0, max = 260.0, message = "Height must be between 50 and 260 cm"))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 20.0, max = 250.0, message = "Weight must be between 20 and 250 kg"))]
    pub weight_kg: Option<f64>,
    #[validate(length(max = 10, message = "Preferred foot is too long"))]
    pub preferred_foot: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// Activities
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Training,
    Match,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Training => "training",
            ActivityKind::Match => "match",
        }
    }
}

/// GPS / physical load metrics captured for a session or a match period.
/// Any metric may be missing for a given record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct LoadMetrics {
    #[validate(range(min = 0, max = 600, message = "Duration must be between 0 and 600 minutes"))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub total_distance_m: Option<f64>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub high_speed_16kmh_m: Option<f64>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub high_speed_18kmh_m: Option<f64>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub high_speed_20kmh_m: Option<f64>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub sprint_24kmh_m: Option<f64>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub acc_decc_count: Option<i32>,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub high_acc_decc_count: Option<i32>,
    #[validate(range(min = 0.0, message = "Distances cannot be negative"))]
    pub high_metabolic_power_m: Option<f64>,
    #[validate(range(min = 0.0, max = 50.0, message = "Max speed must be between 0 and 50 km/h"))]
    pub max_speed_kmh: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Activity {
    pub id: Uuid,
    pub player_id: Uuid,
    pub date: Date,
    pub activity_type: ActivityKind,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub metrics: LoadMetrics,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Activity {
    pub fn new(player_id: Uuid, date: Date, activity_type: ActivityKind, metrics: LoadMetrics) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            date,
            activity_type,
            metrics,
            notes: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Activity listing entry with the player's display name.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActivityWithPlayer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub activity: Activity,
    pub player_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "period_type")]
pub enum PeriodType {
    #[sqlx(rename = "1st_half")]
    #[serde(rename = "1st_half")]
    FirstHalf,
    #[sqlx(rename = "2nd_half")]
    #[serde(rename = "2nd_half")]
    SecondHalf,
    #[sqlx(rename = "extra_time_1")]
    #[serde(rename = "extra_time_1")]
    ExtraTime1,
    #[sqlx(rename = "extra_time_2")]
    #[serde(rename = "extra_time_2")]
    ExtraTime2,
}

/// Load recorded for one period of a match activity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MatchPeriod {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub period_type: PeriodType,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub metrics: LoadMetrics,
    /// Number of efforts above 24 km/h.
    pub sprint_count: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMatchPeriodRequest {
    pub period_type: PeriodType,
    #[serde(flatten)]
    #[validate(nested)]
    pub metrics: LoadMetrics,
    #[validate(range(min = 0, message = "Counts cannot be negative"))]
    pub sprint_count: Option<i32>,
    pub notes: Option<String>,
}

impl CreateMatchPeriodRequest {
    pub fn into_period(self, activity_id: Uuid) -> MatchPeriod {
        MatchPeriod {
            id: Uuid::new_v4(),
            activity_id,
            period_type: self.period_type,
            metrics: self.metrics,
            sprint_count: self.sprint_count,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_match_periods"))]
pub struct CreateActivityRequest {
    pub player_id: Uuid,
    pub date: Date,
    pub activity_type: ActivityKind,
    #[serde(flatten)]
    #[validate(nested)]
    pub metrics: LoadMetrics,
    pub notes: Option<String>,
    /// Per-period breakdown, only accepted for matches.
    #[serde(default)]
    #[validate(nested)]
    pub match_periods: Vec<CreateMatchPeriodRequest>,
}

fn validate_match_periods(req: &CreateActivityRequest) -> Result<(), ValidationError> {
    if req.match_periods.is_empty() {
        return Ok(());
    }
    if req.activity_type != ActivityKind::Match {
        return Err(ValidationError::new("periods_on_training")
            .with_message("Match periods can only be recorded for matches".into()));
    }
    let mut seen = Vec::with_capacity(req.match_periods.len());
    for period in &req.match_periods {
        if seen.contains(&period.period_type) {
            return Err(ValidationError::new("duplicate_period")
                .with_message("Each match period can only be recorded once".into()));
        }
        seen.push(period.period_type);
    }
    Ok(())
}

/// Activity update request. `metrics`, when present, replaces every metric.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    pub date: Option<Date>,
    pub activity_type: Option<ActivityKind>,
    #[validate(nested)]
    pub metrics: Option<LoadMetrics>,
    pub notes: Option<String>,
}

/// Filters for activity listings. Dates are inclusive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityFilter {
    pub player_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub activity_type: Option<ActivityKind>,
    /// Page size, capped at 200.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ActivityFilter {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

// ============================================================================
// Measurements
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WeightMeasurement {
    pub id: Uuid,
    pub player_id: Uuid,
    pub measurement_date: Date,
    pub weight_kg: f64,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWeightMeasurementRequest {
    pub measurement_date: Date,
    #[validate(range(min = 20.0, max = 250.0, message = "Weight must be between 20 and 250 kg"))]
    pub weight_kg: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "injury_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InjuryStatus {
    Active,
    Recovered,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct InjuryRecord {
    pub id: Uuid,
    pub player_id: Uuid,
    pub injury_date: Date,
    pub injury_type: String,
    pub description: Option<String>,
    pub status: InjuryStatus,
    pub recovery_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl InjuryRecord {
    /// Checks the status / recovery date combination.
    pub fn check_recovery(&self) -> Result<(), String> {
        match (self.status, self.recovery_date) {
            (InjuryStatus::Recovered, None) => {
                Err("A recovered injury needs a recovery date".to_string())
            }
            (_, Some(recovered)) if recovered < self.injury_date => {
                Err("Recovery date cannot be before the injury date".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInjuryRequest {
    pub injury_date: Date,
    #[validate(length(min = 1, max = 100, message = "Injury type must be between 1 and 100 characters"))]
    pub injury_type: String,
    pub description: Option<String>,
    #[serde(default = "default_injury_status")]
    pub status: InjuryStatus,
    pub recovery_date: Option<Date>,
}

fn default_injury_status() -> InjuryStatus {
    InjuryStatus::Active
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInjuryRequest {
    #[validate(length(min = 1, max = 100, message = "Injury type must be between 1 and 100 characters"))]
    pub injury_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<InjuryStatus>,
    pub recovery_date: Option<Date>,
}

// ============================================================================
// Dashboard
// ============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RecentActivity {
    pub id: Uuid,
    pub date: Date,
    pub player_id: Uuid,
    pub player_name: String,
    pub activity_type: ActivityKind,
    pub total_distance_m: Option<f64>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub players_count: i64,
    pub activities_count: i64,
    pub training_count: i64,
    pub match_count: i64,
    pub recent_activities: Vec<RecentActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn injury(status: InjuryStatus, recovery_date: Option<Date>) -> InjuryRecord {
        InjuryRecord {
            id: Uuid::new_v4(),
            player_id: Uuid::new_v4(),
            injury_date: date!(2024 - 03 - 10),
            injury_type: "Hamstring strain".to_string(),
            description: None,
            status,
            recovery_date,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_activity_filter_paging_is_clamped() {
        let filter = ActivityFilter::default();
        assert_eq!(filter.limit(), ActivityFilter::DEFAULT_LIMIT);
        assert_eq!(filter.offset(), 0);

        let filter = ActivityFilter {
            limit: Some(10_000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(filter.limit(), ActivityFilter::MAX_LIMIT);
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn test_activity_kind_rejects_unknown_values() {
        let parsed: Result<ActivityKind, _> = serde_json::from_str("\"friendly\"");
        assert!(parsed.is_err());
        let parsed: ActivityKind = serde_json::from_str("\"match\"").unwrap();
        assert_eq!(parsed, ActivityKind::Match);
    }

    #[test]
    fn test_period_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PeriodType::FirstHalf).unwrap(),
            "\"1st_half\""
        );
        let parsed: PeriodType = serde_json::from_str("\"extra_time_2\"").unwrap();
        assert_eq!(parsed, PeriodType::ExtraTime2);
    }

    #[test]
    fn test_activity_request_flattens_metrics() {
        let req: CreateActivityRequest = serde_json::from_value(serde_json::json!({
            "player_id": Uuid::nil(),
            "date": "2024-05-01",
            "activity_type": "training",
            "total_distance_m": 5400.0,
            "sprint_24kmh_m": 120.5
        }))
        .unwrap();

        assert_eq!(req.date, date!(2024 - 05 - 01));
        assert_eq!(req.metrics.total_distance_m, Some(5400.0));
        assert_eq!(req.metrics.sprint_24kmh_m, Some(120.5));
        assert_eq!(req.metrics.high_speed_16kmh_m, None);
        assert!(req.match_periods.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_periods_rejected_for_training() {
        let req: CreateActivityRequest = serde_json::from_value(serde_json::json!({
            "player_id": Uuid::nil(),
            "date": "2024-05-01",
            "activity_type": "training",
            "match_periods": [{ "period_type": "1st_half", "total_distance_m": 5000.0 }]
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_duplicate_periods_rejected() {
        let req: CreateActivityRequest = serde_json::from_value(serde_json::json!({
            "player_id": Uuid::nil(),
            "date": "2024-05-01",
            "activity_type": "match",
            "match_periods": [
                { "period_type": "1st_half" },
                { "period_type": "1st_half" }
            ]
        }))
        .unwrap();

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let metrics = LoadMetrics {
            total_distance_m: Some(-5.0),
            ..Default::default()
        };
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn test_injury_recovery_rules() {
        assert!(injury(InjuryStatus::Active, None).check_recovery().is_ok());
        assert!(injury(InjuryStatus::Recovered, None).check_recovery().is_err());
        assert!(
            injury(InjuryStatus::Recovered, Some(date!(2024 - 03 - 01)))
                .check_recovery()
                .is_err()
        );
        assert!(
            injury(InjuryStatus::Recovered, Some(date!(2024 - 04 - 01)))
                .check_recovery()
                .is_ok()
        );
    }
}
