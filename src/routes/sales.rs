use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::sales::{SaleList, SaleWithLines, SubmitSaleRequest, UpdateSaleStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Sale,
    response::ApiResponse,
    routes::params::SaleListQuery,
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales))
        .route("/", post(submit_sale))
        .route("/{id}", get(get_sale))
        .route("/{id}/status", patch(update_sale_status))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("channel" = Option<String>, Query, description = "Filter by sales channel"),
        ("sort_order" = Option<String>, Query, description = "Sort by sold_at: asc, desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List sales; Cliente callers only see their own", body = ApiResponse<SaleList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    let resp = sale_service::list_sales(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Get sale with its lines", body = ApiResponse<SaleWithLines>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleWithLines>>> {
    let resp = sale_service::get_sale(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = SubmitSaleRequest,
    responses(
        (status = 200, description = "Sale recorded with stock reserved", body = ApiResponse<SaleWithLines>),
        (status = 400, description = "Batch validation failed"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn submit_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitSaleRequest>,
) -> AppResult<Json<ApiResponse<SaleWithLines>>> {
    let resp = sale_service::submit_sale(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/sales/{id}/status",
    params(("id" = Uuid, Path, description = "Sale ID")),
    request_body = UpdateSaleStatusRequest,
    responses(
        (status = 200, description = "Update sale status", body = ApiResponse<Sale>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn update_sale_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSaleStatusRequest>,
) -> AppResult<Json<ApiResponse<Sale>>> {
    let resp = sale_service::update_sale_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
