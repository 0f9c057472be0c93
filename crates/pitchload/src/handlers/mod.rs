//! HTTP request handlers for the pitchload API.
//!
//! This module re-exports handlers from focused submodules organized by domain.

// Utility submodules
pub mod access;

// Handler modules
pub mod activities;
pub mod analysis;
pub mod measurements;
pub mod players;
pub mod stats;
pub mod teams;

// Re-export handlers from submodules (including utoipa __path types for OpenAPI)
pub use activities::{
    __path_create_activity, __path_delete_activity, __path_get_activity,
    __path_get_activity_periods, __path_list_activities, __path_update_activity, ActivityDetail,
    create_activity, delete_activity, get_activity, get_activity_periods, list_activities,
    update_activity,
};
pub use analysis::{
    __path_analyze_load, __path_analyze_match_periods, AnalysisRequest, analyze_load,
    analyze_match_periods,
};
pub use measurements::{
    __path_add_weight_measurement, __path_create_injury, __path_list_injuries,
    __path_list_weight_measurements, __path_update_injury, add_weight_measurement, create_injury,
    list_injuries, list_weight_measurements, update_injury,
};
pub use players::{
    __path_create_player, __path_delete_player, __path_get_player, __path_get_player_statistics,
    __path_update_player, create_player, delete_player, get_player, get_player_statistics,
    update_player,
};
pub use stats::{__path_get_dashboard, __path_health_check, DashboardQuery, get_dashboard, health_check};
pub use teams::{
    __path_create_team, __path_delete_team, __path_get_team, __path_get_team_stats,
    __path_list_team_players, __path_list_teams, __path_update_team, create_team, delete_team,
    get_team, get_team_stats, list_team_players, list_teams, update_team,
};
