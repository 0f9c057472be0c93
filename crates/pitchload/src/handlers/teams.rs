//! Team management handlers.

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    extract::ApiJson,
    models::{CreateTeamRequest, Player, Team, TeamStats, TeamSummary, UpdateTeamRequest},
};

use super::access::require_team;

#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    responses(
        (status = 200, description = "Teams owned by the caller", body = Vec<TeamSummary>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
/// List the caller's teams with their player counts.
pub async fn list_teams(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<TeamSummary>>, AppError> {
    let teams = db.list_teams(claims.sub).await?;
    Ok(Json(teams))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
pub async fn create_team(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), AppError> {
    req.validate()?;
    if req.name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Team name cannot be empty".to_string(),
        ));
    }

    let team = db.create_team(claims.sub, &req).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    get,
    path = "/teams/{id}",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team details", body = Team),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_team(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Team>, AppError> {
    let team = require_team(&db, &claims, id).await?;
    Ok(Json(team))
}

#[utoipa::path(
    patch,
    path = "/teams/{id}",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = Team),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_team(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateTeamRequest>,
) -> Result<Json<Team>, AppError> {
    req.validate()?;
    if req.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(AppError::InvalidInput(
            "Team name cannot be empty".to_string(),
        ));
    }

    let team = db
        .update_team(id, claims.sub, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(team))
}

#[utoipa::path(
    delete,
    path = "/teams/{id}",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 204, description = "Team and its players deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_team(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !db.delete_team(id, claims.sub).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(team_id = %id, "Deleted team");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/teams/{id}/players",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Team roster", body = Vec<Player>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_team_players(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Player>>, AppError> {
    let team = require_team(&db, &claims, id).await?;
    let players = db.list_team_players(team.id).await?;
    Ok(Json(players))
}

#[utoipa::path(
    get,
    path = "/teams/{id}/stats",
    tag = "teams",
    params(
        ("id" = Uuid, Path, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Roster and activity counts", body = TeamStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_team_stats(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamStats>, AppError> {
    let team = require_team(&db, &claims, id).await?;
    let stats = db.team_stats(team.id).await?;
    Ok(Json(stats))
}
