//! Weight measurement and injury record handlers.

use axum::{
    Extension,
    extract::Path,
    http::StatusCode,
    response::Json,
};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    database::Database,
    errors::AppError,
    extract::ApiJson,
    models::{
        CreateInjuryRequest, CreateWeightMeasurementRequest, InjuryRecord, UpdateInjuryRequest,
        WeightMeasurement,
    },
};

use super::access::require_player;

#[utoipa::path(
    get,
    path = "/players/{id}/weight-measurements",
    tag = "measurements",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Measurements, newest first", body = Vec<WeightMeasurement>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_weight_measurements(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<WeightMeasurement>>, AppError> {
    let player = require_player(&db, &claims, id).await?;
    let measurements = db.list_weight_measurements(player.id).await?;
    Ok(Json(measurements))
}

#[utoipa::path(
    post,
    path = "/players/{id}/weight-measurements",
    tag = "measurements",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    request_body = CreateWeightMeasurementRequest,
    responses(
        (status = 201, description = "Measurement recorded", body = WeightMeasurement),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
/// Record a weight measurement; it also becomes the player's current weight.
pub async fn add_weight_measurement(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<CreateWeightMeasurementRequest>,
) -> Result<(StatusCode, Json<WeightMeasurement>), AppError> {
    req.validate()?;
    let player = require_player(&db, &claims, id).await?;

    let measurement = db
        .add_weight_measurement(
            player.id,
            req.measurement_date,
            req.weight_kg,
            req.notes.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

#[utoipa::path(
    get,
    path = "/players/{id}/injury-records",
    tag = "measurements",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    responses(
        (status = 200, description = "Injury history, newest first", body = Vec<InjuryRecord>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn list_injuries(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InjuryRecord>>, AppError> {
    let player = require_player(&db, &claims, id).await?;
    let injuries = db.list_injuries(player.id).await?;
    Ok(Json(injuries))
}

#[utoipa::path(
    post,
    path = "/players/{id}/injury-records",
    tag = "measurements",
    params(
        ("id" = Uuid, Path, description = "Player ID")
    ),
    request_body = CreateInjuryRequest,
    responses(
        (status = 201, description = "Injury recorded", body = InjuryRecord),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer" = []))
)]
pub async fn create_injury(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<CreateInjuryRequest>,
) -> Result<(StatusCode, Json<InjuryRecord>), AppError> {
    req.validate()?;
    let player = require_player(&db, &claims, id).await?;

    let injury = InjuryRecord {
        id: Uuid::new_v4(),
        player_id: player.id,
        injury_date: req.injury_date,
        injury_type: req.injury_type.trim().to_string(),
        description: req.description,
        status: req.status,
        recovery_date: req.recovery_date,
        created_at: OffsetDateTime::now_utc(),
    };
    injury.check_recovery().map_err(AppError::InvalidInput)?;

    let injury = db.save_injury(&injury).await?;
    Ok((StatusCode::CREATED, Json(injury)))
}

#[utoipa::path(
    patch,
    path = "/players/{id}/injury-records/{injury_id}",
    tag = "measurements",
    params(
        ("id" = Uuid, Path, description = "Player ID"),
        ("injury_id" = Uuid, Path, description = "Injury record ID")
    ),
    request_body = UpdateInjuryRequest,
    responses(
        (status = 200, description = "Injury updated", body = InjuryRecord),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Player or injury not found")
    ),
    security(("bearer" = []))
)]
/// Update an injury, typically to mark it recovered.
pub async fn update_injury(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    Path((id, injury_id)): Path<(Uuid, Uuid)>,
    ApiJson(req): ApiJson<UpdateInjuryRequest>,
) -> Result<Json<InjuryRecord>, AppError> {
    req.validate()?;
    let player = require_player(&db, &claims, id).await?;
    let mut injury = db
        .get_injury(injury_id, player.id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(injury_type) = req.injury_type {
        injury.injury_type = injury_type.trim().to_string();
    }
    if req.description.is_some() {
        injury.description = req.description;
    }
    if let Some(status) = req.status {
        injury.status = status;
    }
    if req.recovery_date.is_some() {
        injury.recovery_date = req.recovery_date;
    }
    injury.check_recovery().map_err(AppError::InvalidInput)?;

    let injury = db.save_injury(&injury).await?;
    Ok(Json(injury))
}
