use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    audit::{self, AuditEvent},
    authz::Resource,
    entity::{
        products::{Column as ProdCol, Entity as Products},
        sales::{Column as SaleCol, Entity as Sales},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_resource, ensure_staff},
    response::{ApiResponse, Meta},
    routes::admin::{BulkActionResult, BulkSelectRequest},
    state::AppState,
};

pub const RESTOCK_THRESHOLD: i32 = 5;
pub const RESTOCK_LEVEL: i32 = 50;

pub const STATUS_PAID: &str = "Pagado";
pub const STATUS_DELIVERED: &str = "Entregado";

/// Replenish every selected product whose stock has fallen under the
/// threshold. Products at or above it are left untouched.
pub async fn restock_products(
    state: &AppState,
    user: &AuthUser,
    payload: BulkSelectRequest,
) -> AppResult<ApiResponse<BulkActionResult>> {
    ensure_staff(user)?;
    ensure_resource(user, Resource::Products)?;
    require_selection(&payload)?;

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::value(RESTOCK_LEVEL))
        .filter(
            ProdCol::Id
                .is_in(payload.ids.clone())
                .and(ProdCol::Stock.lt(RESTOCK_THRESHOLD)),
        )
        .exec(&state.orm)
        .await?;

    let affected = result.rows_affected;
    audit_bulk(state, user, "products_restock", "products", affected).await;

    Ok(ApiResponse::success(
        format!("Stock updated for {affected} products"),
        BulkActionResult { affected },
        Some(Meta::empty()),
    ))
}

pub async fn mark_products_out_of_stock(
    state: &AppState,
    user: &AuthUser,
    payload: BulkSelectRequest,
) -> AppResult<ApiResponse<BulkActionResult>> {
    ensure_staff(user)?;
    ensure_resource(user, Resource::Products)?;
    require_selection(&payload)?;

    let result = Products::update_many()
        .col_expr(ProdCol::Stock, Expr::value(0))
        .filter(ProdCol::Id.is_in(payload.ids.clone()))
        .exec(&state.orm)
        .await?;

    let affected = result.rows_affected;
    audit_bulk(state, user, "products_out_of_stock", "products", affected).await;

    Ok(ApiResponse::success(
        format!("{affected} products marked as out of stock"),
        BulkActionResult { affected },
        Some(Meta::empty()),
    ))
}

pub async fn mark_sales_paid(
    state: &AppState,
    user: &AuthUser,
    payload: BulkSelectRequest,
) -> AppResult<ApiResponse<BulkActionResult>> {
    set_sales_status(state, user, payload, STATUS_PAID, "sales_mark_paid").await
}

pub async fn mark_sales_delivered(
    state: &AppState,
    user: &AuthUser,
    payload: BulkSelectRequest,
) -> AppResult<ApiResponse<BulkActionResult>> {
    set_sales_status(state, user, payload, STATUS_DELIVERED, "sales_mark_delivered").await
}

async fn set_sales_status(
    state: &AppState,
    user: &AuthUser,
    payload: BulkSelectRequest,
    status: &str,
    action: &str,
) -> AppResult<ApiResponse<BulkActionResult>> {
    ensure_staff(user)?;
    ensure_resource(user, Resource::Sales)?;
    require_selection(&payload)?;

    let result = Sales::update_many()
        .col_expr(SaleCol::Status, Expr::value(status))
        .filter(SaleCol::Id.is_in(payload.ids.clone()))
        .exec(&state.orm)
        .await?;

    let affected = result.rows_affected;
    audit_bulk(state, user, action, "sales", affected).await;

    Ok(ApiResponse::success(
        format!("{affected} sales marked as {status}"),
        BulkActionResult { affected },
        Some(Meta::empty()),
    ))
}

fn require_selection(payload: &BulkSelectRequest) -> Result<(), AppError> {
    if payload.ids.is_empty() {
        return Err(AppError::BadRequest("No rows selected".into()));
    }
    Ok(())
}

async fn audit_bulk(state: &AppState, user: &AuthUser, action: &str, resource: &str, affected: u64) {
    audit::record_or_warn(
        &state.pool,
        AuditEvent {
            user_id: Some(user.user_id),
            action,
            resource,
            metadata: Some(serde_json::json!({ "affected": affected })),
        },
    )
    .await;
}
