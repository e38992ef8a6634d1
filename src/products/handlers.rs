use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::CurrentUser,
    error::ApiError,
    products::{
        dto::{ProductCreate, ProductResponse, ProductUpdate},
        query::ProductListParams,
        repo,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = repo::list(&state.db, &params).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = repo::get(&state.db, id).await?;
    Ok(Json(product))
}

#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> Result<Json<ProductResponse>, ApiError> {
    let id = repo::create(&state.db, &payload, user.id).await?;
    info!(product_id = id, creator_id = user.id, "product created");
    let product = repo::get(&state.db, id).await?;
    Ok(Json(product))
}

#[instrument(skip_all, fields(product_id = id))]
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<ProductResponse>, ApiError> {
    repo::update(&state.db, id, &payload, user.id).await?;
    info!(product_id = id, user_id = user.id, "product updated");
    let product = repo::get(&state.db, id).await?;
    Ok(Json(product))
}

#[instrument(skip_all, fields(product_id = id))]
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    repo::delete(&state.db, id, user.id).await?;
    info!(product_id = id, user_id = user.id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
