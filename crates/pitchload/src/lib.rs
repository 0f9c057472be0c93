pub mod analysis;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod query_builder;
pub mod request_id;

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post, put},
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::{
    auth::{AuthKeys, change_password, get_profile, login, me, register, update_profile},
    config::Config,
    database::Database,
    handlers::{
        add_weight_measurement, analyze_load, analyze_match_periods, create_activity,
        create_injury, create_player, create_team, delete_activity, delete_player, delete_team,
        get_activity, get_activity_periods, get_dashboard, get_player, get_player_statistics,
        get_team, get_team_stats, health_check, list_activities, list_injuries,
        list_team_players, list_teams, list_weight_measurements, update_activity, update_injury,
        update_player, update_team,
    },
    openapi::openapi_json,
    request_id::request_id_middleware,
};

pub fn create_router(pool: PgPool, keys: AuthKeys) -> Router {
    let db = Database::new(pool);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Auth routes
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/profile", get(get_profile).put(update_profile))
        .route("/auth/password", put(change_password))
        // Team routes
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/{id}",
            get(get_team).patch(update_team).delete(delete_team),
        )
        .route("/teams/{id}/players", get(list_team_players))
        .route("/teams/{id}/stats", get(get_team_stats))
        // Player routes
        .route("/players", post(create_player))
        .route(
            "/players/{id}",
            get(get_player).patch(update_player).delete(delete_player),
        )
        .route("/players/{id}/statistics", get(get_player_statistics))
        .route(
            "/players/{id}/weight-measurements",
            get(list_weight_measurements).post(add_weight_measurement),
        )
        .route(
            "/players/{id}/injury-records",
            get(list_injuries).post(create_injury),
        )
        .route(
            "/players/{id}/injury-records/{injury_id}",
            patch(update_injury),
        )
        // Activity routes
        .route("/activities", get(list_activities).post(create_activity))
        .route(
            "/activities/{id}",
            get(get_activity)
                .patch(update_activity)
                .delete(delete_activity),
        )
        .route("/activities/{id}/periods", get(get_activity_periods))
        // Analysis routes
        .route("/analysis", post(analyze_load))
        .route("/analysis/match-periods", post(analyze_match_periods))
        .route("/dashboard", get(get_dashboard))
        .layer(Extension(db))
        .layer(Extension(keys))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub async fn run_server(pool: PgPool, config: &Config) -> anyhow::Result<()> {
    let keys = AuthKeys::new(config.jwt_secret.as_bytes(), config.token_ttl_days);
    let app = create_router(pool, keys);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
