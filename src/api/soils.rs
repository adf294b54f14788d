use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use plant_tracker_core::models::*;
use plant_tracker_core::Database;

use super::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct SoilListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub async fn list_soils(
    State(db): State<Database>,
    Query(query): Query<SoilListQuery>,
) -> ApiResult<Json<Vec<Soil>>> {
    Ok(Json(db.list_soils(query.include_inactive)?))
}

pub async fn get_soil(State(db): State<Database>, Path(id): Path<i64>) -> ApiResult<Json<Soil>> {
    db.get_soil(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Soil"))
}

pub async fn create_soil(
    State(db): State<Database>,
    body: Result<Json<CreateSoilInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Soil>)> {
    let Json(input) = body?;
    let soil = db.create_soil(input)?;
    Ok((StatusCode::CREATED, Json(soil)))
}

pub async fn update_soil(
    State(db): State<Database>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateSoilInput>, JsonRejection>,
) -> ApiResult<Json<Soil>> {
    let Json(input) = body?;
    db.update_soil(id, input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Soil"))
}

pub async fn delete_soil(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Soil>> {
    Ok(Json(db.delete_soil(id)?))
}
