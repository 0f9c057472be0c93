//! Player roster handlers.

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    analysis::{PlayerStatistics, player_statistics},
    auth::AuthUser,
    database::Database,
    errors::AppError,
    extract::ApiJson,
    models::{CreatePlayerRequest, Player, UpdatePlayerRequest},
};

use super::access::{require_player, require_team};

#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = CreatePlayerRequest,
    responses(
        (status = 201, description = "Player added", body = Player),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer" = []))
)]
/// Add a player to one of the caller's teams.
pub async fn create_player(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<Player>), AppError> {
    req.validate()?;
    require_team(&db, &claims, req.team_id).await?;

    let player = db.create_player(&req).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

#[utoipa::path(
    get,
    path = "/players/{id}",
    tag = "players",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Player details", body = Player),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_player(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Player>, AppError> {
    let player = require_player(&db, &claims, id).await?;
    Ok(Json(player))
}

fn apply_update(player: &mut Player, req: UpdatePlayerRequest) {
    if let Some(team_id) = req.team_id {
        player.team_id = team_id;
    }
    if let Some(name) = req.name {
        player.name = name.trim().to_string();
    }
    if req.position.is_some() {
        player.position = req.position;
    }
    if req.jersey_number.is_some() {
        player.jersey_number = req.jersey_number;
    }
    if req.birth_date.is_some() {
        player.birth_date = req.birth_date;
    }
    if req.height_cm.is_some() {
        player.height_cm = req.height_cm;
    }
    if req.weight_kg.is_some() {
        player.weight_kg = req.weight_kg;
    }
    if req.preferred_foot.is_some() {
        player.preferred_foot = req.preferred_foot;
    }
    if req.notes.is_some() {
        player.notes = req.notes;
    }
}

#[utoipa::path(
    patch,
    path = "/players/{id}",
    tag = "players",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    request_body = UpdatePlayerRequest,
    responses(
        (status = 200, description = "Player updated", body = Player),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player or target team not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_player(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdatePlayerRequest>,
) -> Result<Json<Player>, AppError> {
    req.validate()?;
    let mut player = require_player(&db, &claims, id).await?;

    // Moving a player is only allowed between the caller's own teams.
    if let Some(team_id) = req.team_id.filter(|t| *t != player.team_id) {
        require_team(&db, &claims, team_id).await?;
    }

    apply_update(&mut player, req);
    let player = db.save_player(&player).await?;
    Ok(Json(player))
}

#[utoipa::path(
    delete,
    path = "/players/{id}",
    tag = "players",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 204, description = "Player and their records deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_player(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let player = require_player(&db, &claims, id).await?;
    db.delete_player(player.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/players/{id}/statistics",
    tag = "players",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Lifetime activity summary", body = PlayerStatistics),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_player_statistics(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerStatistics>, AppError> {
    let player = require_player(&db, &claims, id).await?;
    let activities = db.player_activities(player.id).await?;
    Ok(Json(player_statistics(&activities)))
}
