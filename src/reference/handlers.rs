use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    reference::{
        dto::{RegionCreate, TherapeuticAreaCreate},
        repo::{self, Region, TherapeuticArea},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/therapeutic-areas/",
            get(list_therapeutic_areas).post(create_therapeutic_area),
        )
        .route("/products/regions/", get(list_regions).post(create_region))
}

#[instrument(skip(state))]
pub async fn list_therapeutic_areas(
    State(state): State<AppState>,
) -> Result<Json<Vec<TherapeuticArea>>, ApiError> {
    let areas = repo::list_therapeutic_areas(&state.db).await?;
    Ok(Json(areas))
}

#[instrument(skip_all)]
pub async fn create_therapeutic_area(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<TherapeuticAreaCreate>,
) -> Result<Json<TherapeuticArea>, ApiError> {
    let area = repo::create_therapeutic_area(&state.db, &payload.name).await?;
    info!(area_id = area.id, user_id = user.id, "therapeutic area created");
    Ok(Json(area))
}

#[instrument(skip(state))]
pub async fn list_regions(State(state): State<AppState>) -> Result<Json<Vec<Region>>, ApiError> {
    let regions = repo::list_regions(&state.db).await?;
    Ok(Json(regions))
}

#[instrument(skip_all)]
pub async fn create_region(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RegionCreate>,
) -> Result<Json<Region>, ApiError> {
    let region = repo::create_region(&state.db, &payload.name).await?;
    info!(region_id = region.id, user_id = user.id, "region created");
    Ok(Json(region))
}
