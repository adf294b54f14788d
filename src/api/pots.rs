use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use plant_tracker_core::filter::{ActiveFilter, OccupancyFilter, PotFilter};
use plant_tracker_core::models::*;
use plant_tracker_core::Database;

use super::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct PotListQuery {
    /// Shorthand used by older clients; `active` takes precedence.
    pub include_inactive: Option<bool>,
    pub active: Option<ActiveFilter>,
    pub q: Option<String>,
    pub occupancy: Option<OccupancyFilter>,
    pub room: Option<String>,
}

impl PotListQuery {
    fn into_filter(self) -> PotFilter {
        let active = self.active.unwrap_or(match self.include_inactive {
            Some(true) => ActiveFilter::All,
            _ => ActiveFilter::Active,
        });
        PotFilter {
            q: self.q,
            active,
            occupancy: self.occupancy.unwrap_or_default(),
            room: self.room,
        }
    }
}

pub async fn list_pots(
    State(db): State<Database>,
    Query(query): Query<PotListQuery>,
) -> ApiResult<Json<Vec<PotWithOccupants>>> {
    let filter = query.into_filter();
    let pots = db.list_pots(filter.active.needs_inactive())?;
    Ok(Json(filter.apply(pots)))
}

pub async fn get_pot_by_qr(
    State(db): State<Database>,
    Path(qr_code_id): Path<String>,
) -> ApiResult<Json<PotWithOccupants>> {
    db.get_pot_by_qr(&qr_code_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Pot"))
}

pub async fn get_pot_history(
    State(db): State<Database>,
    Path(qr_code_id): Path<String>,
) -> ApiResult<Json<Vec<OccupancyEntry>>> {
    db.get_pot_history(&qr_code_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Pot"))
}

pub async fn create_pot(
    State(db): State<Database>,
    body: Result<Json<CreatePotInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedPot>)> {
    let Json(input) = body?;
    let pot = db.create_pot(input)?;
    Ok((StatusCode::CREATED, Json(pot)))
}

pub async fn update_pot(
    State(db): State<Database>,
    Path(id): Path<i64>,
    body: Result<Json<UpdatePotInput>, JsonRejection>,
) -> ApiResult<Json<Pot>> {
    let Json(input) = body?;
    db.update_pot(id, input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Pot"))
}

/// Pots are never physically deleted; this retires an empty one.
pub async fn deactivate_pot(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Pot>> {
    Ok(Json(db.deactivate_pot(id)?))
}
