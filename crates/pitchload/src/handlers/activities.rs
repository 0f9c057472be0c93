//! Training and match session handlers.

use axum::{
    Extension,
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    extract::ApiJson,
    models::{
        Activity, ActivityFilter, ActivityKind, ActivityWithPlayer, CreateActivityRequest,
        MatchPeriod, UpdateActivityRequest,
    },
};

use super::access::{require_activity, require_player, require_team};

/// An activity with its player's name and any recorded match periods.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: ActivityWithPlayer,
    pub match_periods: Vec<MatchPeriod>,
}

#[utoipa::path(
    get,
    path = "/activities",
    tag = "activities",
    params(ActivityFilter),
    responses(
        (status = 200, description = "Activities of the caller's players, newest first", body = Vec<ActivityWithPlayer>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Filtered player or team not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_activities(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Query(filter): Query<ActivityFilter>,
) -> Result<Json<Vec<ActivityWithPlayer>>, AppError> {
    if let Some(player_id) = filter.player_id {
        require_player(&db, &claims, player_id).await?;
    }
    if let Some(team_id) = filter.team_id {
        require_team(&db, &claims, team_id).await?;
    }
    let activities = db.list_activities(claims.sub, &filter).await?;
    Ok(Json(activities))
}

#[utoipa::path(
    post,
    path = "/activities",
    tag = "activities",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity recorded", body = ActivityDetail),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
/// Record a session, optionally with a per-period breakdown for matches.
pub async fn create_activity(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<CreateActivityRequest>,
) -> Result<(StatusCode, Json<ActivityDetail>), AppError> {
    req.validate()?;
    let player = require_player(&db, &claims, req.player_id).await?;

    let mut activity = Activity::new(player.id, req.date, req.activity_type, req.metrics);
    activity.notes = req.notes;
    let match_periods: Vec<MatchPeriod> = req
        .match_periods
        .into_iter()
        .map(|p| p.into_period(activity.id))
        .collect();

    db.create_activity(&activity, &match_periods).await?;

    tracing::info!(
        activity_id = %activity.id,
        player_id = %player.id,
        kind = activity.activity_type.as_str(),
        periods = match_periods.len(),
        "Recorded activity"
    );

    Ok((
        StatusCode::CREATED,
        Json(ActivityDetail {
            activity: ActivityWithPlayer {
                activity,
                player_name: player.name,
            },
            match_periods,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/activities/{id}",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    responses(
        (status = 200, description = "Activity details", body = ActivityDetail),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_activity(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ActivityDetail>, AppError> {
    let activity = require_activity(&db, &claims, id).await?;
    let match_periods = db.activity_periods(activity.activity.id).await?;
    Ok(Json(ActivityDetail {
        activity,
        match_periods,
    }))
}

#[utoipa::path(
    patch,
    path = "/activities/{id}",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = ActivityWithPlayer),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer" = []))
)]
/// Update an activity. A metrics object replaces every metric; turning a
/// match into training discards its periods.
pub async fn update_activity(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateActivityRequest>,
) -> Result<Json<ActivityWithPlayer>, AppError> {
    req.validate()?;
    let mut existing = require_activity(&db, &claims, id).await?;
    let activity = &mut existing.activity;
    let was_match = activity.activity_type == ActivityKind::Match;

    if let Some(date) = req.date {
        activity.date = date;
    }
    if let Some(kind) = req.activity_type {
        activity.activity_type = kind;
    }
    if let Some(metrics) = req.metrics {
        activity.metrics = metrics;
    }
    if req.notes.is_some() {
        activity.notes = req.notes;
    }

    let became_training = was_match && activity.activity_type == ActivityKind::Training;
    db.update_activity(activity, became_training).await?;

    Ok(Json(existing))
}

#[utoipa::path(
    delete,
    path = "/activities/{id}",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_activity(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let activity = require_activity(&db, &claims, id).await?;
    db.delete_activity(activity.activity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/activities/{id}/periods",
    tag = "activities",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    responses(
        (status = 200, description = "Recorded match periods", body = Vec<MatchPeriod>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Activity not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_activity_periods(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MatchPeriod>>, AppError> {
    let activity = require_activity(&db, &claims, id).await?;
    let periods = db.activity_periods(activity.activity.id).await?;
    Ok(Json(periods))
}
