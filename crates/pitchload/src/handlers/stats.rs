//! Health check and dashboard handlers.

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{auth::AuthUser, database::Database, errors::AppError, models::DashboardStats};

use super::access::require_team;

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "stats",
    responses(
        (status = 200, description = "Health check passed")
    )
)]
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Restrict the counts to one team.
    pub team_id: Option<Uuid>,
}

/// Headline counts and the most recent activities across the caller's teams.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "stats",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_dashboard(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardStats>, AppError> {
    if let Some(team_id) = query.team_id {
        require_team(&db, &claims, team_id).await?;
    }
    let stats = db.dashboard_stats(claims.sub, query.team_id).await?;
    Ok(Json(stats))
}
