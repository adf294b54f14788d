use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use plant_tracker_core::filter::PlantFilter;
use plant_tracker_core::models::*;
use plant_tracker_core::Database;

use super::{ApiError, ApiResult};

pub async fn list_plants(
    State(db): State<Database>,
    Query(filter): Query<PlantFilter>,
) -> ApiResult<Json<Vec<PlantWithLocation>>> {
    let plants = filter.apply(db.list_plants()?);
    Ok(Json(plants))
}

pub async fn get_plant(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PlantDetail>> {
    db.get_plant_detail(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Plant"))
}

pub async fn create_plant(
    State(db): State<Database>,
    body: Result<Json<CreatePlantInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Plant>)> {
    let Json(input) = body?;
    let plant = db.create_plant(input)?;
    Ok((StatusCode::CREATED, Json(plant)))
}

pub async fn update_plant(
    State(db): State<Database>,
    Path(id): Path<i64>,
    body: Result<Json<UpdatePlantInput>, JsonRejection>,
) -> ApiResult<Json<Plant>> {
    let Json(input) = body?;
    db.update_plant(id, input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Plant"))
}

/// Archive a plant. The body must carry a non-empty `removed_reason`.
pub async fn remove_plant(
    State(db): State<Database>,
    Path(id): Path<i64>,
    body: Result<Json<RemovePlantInput>, JsonRejection>,
) -> ApiResult<Json<Plant>> {
    let reason = match body {
        Ok(Json(input)) => input.removed_reason.unwrap_or_default(),
        Err(JsonRejection::MissingJsonContentType(_)) => String::new(),
        Err(rejection) => return Err(rejection.into()),
    };
    let plant = db.archive_plant(id, &reason)?;
    Ok(Json(plant))
}
