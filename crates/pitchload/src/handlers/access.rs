//! Ownership checks.
//!
//! Every resource hangs off a team owned by exactly one user. Lookups for
//! resources the caller does not own answer `NotFound`, so ids of other
//! tenants are indistinguishable from ids that never existed.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    auth::Claims,
    database::Database,
    errors::AppError,
    models::{ActivityWithPlayer, Player, Team},
};

pub async fn require_team(db: &Database, claims: &Claims, team_id: Uuid) -> Result<Team, AppError> {
    db.get_team(team_id, claims.sub)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn require_player(
    db: &Database,
    claims: &Claims,
    player_id: Uuid,
) -> Result<Player, AppError> {
    db.get_player(player_id, claims.sub)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn require_activity(
    db: &Database,
    claims: &Claims,
    activity_id: Uuid,
) -> Result<ActivityWithPlayer, AppError> {
    db.get_activity(activity_id, claims.sub)
        .await?
        .ok_or(AppError::NotFound)
}

/// Narrows requested player ids to the caller's own players.
///
/// Order and repeats of the request are kept; foreign or unknown ids are
/// dropped without error.
pub async fn authorized_player_ids(
    db: &Database,
    claims: &Claims,
    requested: &[Uuid],
) -> Result<Vec<Uuid>, AppError> {
    let owned: HashSet<Uuid> = db
        .owned_player_ids(claims.sub, requested)
        .await?
        .into_iter()
        .collect();
    Ok(retain_owned(requested, &owned))
}

fn retain_owned(requested: &[Uuid], owned: &HashSet<Uuid>) -> Vec<Uuid> {
    requested
        .iter()
        .filter(|id| owned.contains(id))
        .copied()
        .collect()
}
