//! OpenAPI document for the HTTP API, served at `/api-docs/openapi.json`.

use axum::response::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};

use crate::{
    analysis::{
        LoadAnalysis, LoadSummary, MatchPeriodAnalysis, MetricAverages, MetricRatios, PeriodLoad,
        PlayerLoadComparison, PlayerPeriodSplit, PlayerStatistics,
        player_stats::{GeneralStats, KindAverages, OverallAverages, TrainingVsMatch},
    },
    auth::{
        AuthResponse, ChangePasswordRequest, LoginRequest, ProfileResponse, RegisterRequest,
        UpdateProfileRequest, UserResponse, __path_change_password, __path_get_profile,
        __path_login, __path_me, __path_register, __path_update_profile,
    },
    handlers::*,
    models::{
        Activity, ActivityKind, ActivityWithPlayer, CreateActivityRequest,
        CreateInjuryRequest, CreateMatchPeriodRequest, CreatePlayerRequest, CreateTeamRequest,
        CreateWeightMeasurementRequest, DashboardStats, InjuryRecord, InjuryStatus, LoadMetrics,
        MatchPeriod, PeriodType, Player, PlayerPosition, ProfileStats, RecentActivity, Team,
        TeamStats, TeamSummary, UpdateActivityRequest, UpdateInjuryRequest, UpdatePlayerRequest,
        UpdateTeamRequest, WeightMeasurement,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pitchload API",
        description = "Team rosters, session load records and training vs match load analysis"
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Accounts and bearer tokens"),
        (name = "teams", description = "Teams owned by the caller"),
        (name = "players", description = "Player roster"),
        (name = "measurements", description = "Weight measurements and injuries"),
        (name = "activities", description = "Training and match sessions"),
        (name = "analysis", description = "Load analysis"),
        (name = "stats", description = "Health and dashboard")
    ),
    paths(
        register, login, me, get_profile, update_profile, change_password,
        list_teams, create_team, get_team, update_team, delete_team, list_team_players,
        get_team_stats,
        create_player, get_player, update_player, delete_player, get_player_statistics,
        list_weight_measurements, add_weight_measurement, list_injuries, create_injury,
        update_injury,
        list_activities, create_activity, get_activity, update_activity, delete_activity,
        get_activity_periods,
        analyze_load, analyze_match_periods,
        health_check, get_dashboard,
    ),
    components(schemas(
        RegisterRequest, LoginRequest, ChangePasswordRequest, AuthResponse, UserResponse,
        UpdateProfileRequest, ProfileResponse, ProfileStats,
        Team, TeamSummary, TeamStats, CreateTeamRequest, UpdateTeamRequest,
        Player, PlayerPosition, CreatePlayerRequest, UpdatePlayerRequest,
        WeightMeasurement, CreateWeightMeasurementRequest,
        InjuryRecord, InjuryStatus, CreateInjuryRequest, UpdateInjuryRequest,
        Activity, ActivityKind, ActivityWithPlayer, ActivityDetail, LoadMetrics,
        MatchPeriod, PeriodType, CreateActivityRequest, CreateMatchPeriodRequest,
        UpdateActivityRequest,
        AnalysisRequest, LoadAnalysis, LoadSummary, PlayerLoadComparison, MetricAverages,
        MetricRatios, MatchPeriodAnalysis, PlayerPeriodSplit, PeriodLoad,
        PlayerStatistics, GeneralStats, OverallAverages, TrainingVsMatch, KindAverages,
        DashboardStats, RecentActivity,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_analysis_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/analysis"));
        assert!(doc.paths.paths.contains_key("/analysis/match-periods"));
        assert!(doc.paths.paths.contains_key("/teams/{id}/stats"));
    }

    #[test]
    fn test_document_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
        assert!(components.schemas.contains_key("LoadAnalysis"));
    }
}
