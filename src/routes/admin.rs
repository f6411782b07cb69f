//! Bulk admin actions: unconditional bulk writes over a manual
//! selection, reporting the count of rows affected.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::admin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products/restock", post(restock_products))
        .route("/products/out-of-stock", post(mark_products_out_of_stock))
        .route("/sales/mark-paid", post(mark_sales_paid))
        .route("/sales/mark-delivered", post(mark_sales_delivered))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkSelectRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkActionResult {
    pub affected: u64,
}

#[utoipa::path(
    post,
    path = "/api/admin/products/restock",
    request_body = BulkSelectRequest,
    responses(
        (status = 200, description = "Replenish selected products under the low-stock threshold", body = ApiResponse<BulkActionResult>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn restock_products(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkSelectRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp = admin_service::restock_products(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products/out-of-stock",
    request_body = BulkSelectRequest,
    responses(
        (status = 200, description = "Set stock to zero for selected products", body = ApiResponse<BulkActionResult>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn mark_products_out_of_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkSelectRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp = admin_service::mark_products_out_of_stock(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/sales/mark-paid",
    request_body = BulkSelectRequest,
    responses(
        (status = 200, description = "Mark selected sales as paid", body = ApiResponse<BulkActionResult>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn mark_sales_paid(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkSelectRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp = admin_service::mark_sales_paid(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/sales/mark-delivered",
    request_body = BulkSelectRequest,
    responses(
        (status = 200, description = "Mark selected sales as delivered", body = ApiResponse<BulkActionResult>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn mark_sales_delivered(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<BulkSelectRequest>,
) -> AppResult<Json<ApiResponse<BulkActionResult>>> {
    let resp = admin_service::mark_sales_delivered(&state, &user, payload).await?;
    Ok(Json(resp))
}
