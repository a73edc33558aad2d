//! 商品目录处理器

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::Json,
};

use super::{
    model::Product,
    query::{ProductPage, ProductQuery},
    service::ProductService,
};
use crate::core::{
    error::ApiError,
    middleware::{ApiKey, RequireApiKey, ValidatedProduct},
};

#[derive(Clone)]
pub struct AppState {
    pub product_service: ProductService,
    pub api_key: ApiKey,
}

impl FromRef<AppState> for ApiKey {
    fn from_ref(state: &AppState) -> Self {
        state.api_key.clone()
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProductPage>, ApiError> {
    let query = ProductQuery::from_params(&params);
    let page = state.product_service.list_products(&query)?;
    Ok(Json(page))
}

pub async fn product_stats(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, usize>>, ApiError> {
    let stats = state.product_service.stats()?;
    Ok(Json(stats))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service.get_product(&id)?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    ValidatedProduct(draft): ValidatedProduct,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.product_service.create_product(draft)?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    Path(id): Path<String>,
    ValidatedProduct(draft): ValidatedProduct,
) -> Result<Json<Product>, ApiError> {
    let product = state.product_service.update_product(&id, draft)?;
    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    _auth: RequireApiKey,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.product_service.delete_product(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
