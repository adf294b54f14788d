use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use plant_tracker_core::models::*;
use plant_tracker_core::Database;

use super::{ApiError, ApiResult};

pub async fn move_plant(
    State(db): State<Database>,
    body: Result<Json<MoveInput>, JsonRejection>,
) -> ApiResult<Json<PlantWithLocation>> {
    let Json(input) = body?;
    Ok(Json(db.move_plant(input)?))
}

pub async fn get_plant_history(
    State(db): State<Database>,
    Path(plant_id): Path<i64>,
) -> ApiResult<Json<Vec<OccupancyEntry>>> {
    if db.get_plant(plant_id)?.is_none() {
        return Err(ApiError::not_found("Plant"));
    }
    Ok(Json(db.get_plant_history(plant_id)?))
}
