//! Load analysis handlers.

use axum::{Extension, response::Json};
use serde::Deserialize;
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    analysis::{
        DateRange, LoadAnalysis, MatchPeriodAnalysis, compare_training_to_match,
        split_match_periods,
    },
    auth::{AuthUser, Claims},
    database::Database,
    errors::AppError,
    extract::ApiJson,
};

use super::access::authorized_player_ids;

/// Players and inclusive date range to analyse.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub player_ids: Vec<Uuid>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl AnalysisRequest {
    /// Rejects requests the engine cannot run on.
    pub fn range(&self) -> Result<DateRange, AppError> {
        if self.player_ids.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one player_id is required".to_string(),
            ));
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Ok(DateRange::new(start, end)),
            _ => Err(AppError::InvalidInput(
                "start_date and end_date are required".to_string(),
            )),
        }
    }
}

async fn resolve(
    db: &Database,
    claims: &Claims,
    req: &AnalysisRequest,
) -> Result<(DateRange, Vec<Uuid>), AppError> {
    let range = req.range()?;
    let player_ids = authorized_player_ids(db, claims, &req.player_ids).await?;

    tracing::debug!(
        requested = req.player_ids.len(),
        authorized = player_ids.len(),
        start = %range.start,
        end = %range.end,
        "Running analysis"
    );

    Ok((range, player_ids))
}

#[utoipa::path(
    post,
    path = "/analysis",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Training vs match load per player and for the group", body = LoadAnalysis),
        (status = 400, description = "Missing players or dates"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
/// Compare average training load against average match load.
pub async fn analyze_load(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<AnalysisRequest>,
) -> Result<Json<LoadAnalysis>, AppError> {
    let (range, player_ids) = resolve(&db, &claims, &req).await?;
    let players = db.load_player_activities(&player_ids, range).await?;
    Ok(Json(compare_training_to_match(range, players)))
}

#[utoipa::path(
    post,
    path = "/analysis/match-periods",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Per-half match load per player", body = MatchPeriodAnalysis),
        (status = 400, description = "Missing players or dates"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer" = []))
)]
/// Split match load into halves and extra time.
pub async fn analyze_match_periods(
    Extension(db): Extension<Database>,
    AuthUser(claims): AuthUser,
    ApiJson(req): ApiJson<AnalysisRequest>,
) -> Result<Json<MatchPeriodAnalysis>, AppError> {
    let (range, player_ids) = resolve(&db, &claims, &req).await?;
    let players = db.load_player_match_data(&player_ids, range).await?;
    Ok(Json(split_match_periods(range, players)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn request(value: serde_json::Value) -> AnalysisRequest {
        serde_json::from_value(value).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::InvalidInput(msg) => msg,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_players_rejected() {
        let req = request(serde_json::json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-31"
        }));
        assert_eq!(
            message(req.range().unwrap_err()),
            "At least one player_id is required"
        );
    }

    #[test]
    fn test_missing_dates_rejected() {
        let req = request(serde_json::json!({
            "player_ids": [Uuid::new_v4()],
            "start_date": "2024-01-01"
        }));
        assert_eq!(
            message(req.range().unwrap_err()),
            "start_date and end_date are required"
        );
    }

    #[test]
    fn test_malformed_date_fails_to_parse() {
        let parsed: Result<AnalysisRequest, _> = serde_json::from_value(serde_json::json!({
            "player_ids": [Uuid::new_v4()],
            "start_date": "01/02/2024",
            "end_date": "2024-02-01"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_reversed_range_is_accepted() {
        let req = request(serde_json::json!({
            "player_ids": [Uuid::new_v4()],
            "start_date": "2024-02-01",
            "end_date": "2024-01-01"
        }));
        let range = req.range().unwrap();
        assert_eq!(range.start, date!(2024 - 02 - 01));
        assert!(!range.contains(date!(2024 - 01 - 15)));
    }
}
