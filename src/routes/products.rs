use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    authz::Resource,
    dto::products::{CreateProductRequest, ProductList, ProductView, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_resource},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, SortOrder},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/{id}", get(get_product))
        .route("/{id}", put(update_product))
        .route("/{id}", delete(delete_product))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("q" = Option<String>, Query, description = "Search name, brand or kind"),
        ("kind" = Option<String>, Query, description = "Filter by kind"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("sort_order" = Option<String>, Query, description = "Sort by name: asc, desc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    ensure_resource(&user, Resource::Products)?;
    let (page, limit, offset) = query.pagination.normalize();
    let q = query
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));
    let order = query.sort_order.unwrap_or(SortOrder::Asc).as_sql();

    let sql = format!(
        r#"
        SELECT * FROM products
        WHERE ($1::text IS NULL OR name ILIKE $1 OR brand ILIKE $1 OR kind ILIKE $1)
          AND ($2::text IS NULL OR kind = $2)
          AND ($3::uuid IS NULL OR category_id = $3)
        ORDER BY name {order}
        LIMIT $4 OFFSET $5
        "#
    );
    let items: Vec<Product> = sqlx::query_as(&sql)
        .bind(q.as_deref())
        .bind(query.kind.as_deref())
        .bind(query.category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT count(*) FROM products
        WHERE ($1::text IS NULL OR name ILIKE $1 OR brand ILIKE $1 OR kind ILIKE $1)
          AND ($2::text IS NULL OR kind = $2)
          AND ($3::uuid IS NULL OR category_id = $3)
        "#,
    )
    .bind(q.as_deref())
    .bind(query.kind.as_deref())
    .bind(query.category_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::paginated(page, limit, total.0);
    let data = ProductList {
        items: items.into_iter().map(ProductView::from).collect(),
    };
    Ok(Json(ApiResponse::success("Products", data, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductView>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    ensure_resource(&user, Resource::Products)?;
    let result = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(ApiResponse::success(
        "Product",
        ProductView::from(result),
        None,
    )))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    ensure_resource(&user, Resource::Products)?;
    validate_product_fields(payload.price, payload.stock)?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (id, name, brand, price, kind, category_id, stock, nutrition_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.brand)
    .bind(payload.price)
    .bind(payload.kind)
    .bind(payload.category_id)
    .bind(payload.stock)
    .bind(payload.nutrition_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Product created",
        ProductView::from(product),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<ProductView>),
        (status = 400, description = "Invalid fields"),
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    ensure_resource(&user, Resource::Products)?;
    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let brand = payload.brand.or(existing.brand);
    let price = payload.price.unwrap_or(existing.price);
    let kind = payload.kind.unwrap_or(existing.kind);
    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let stock = payload.stock.unwrap_or(existing.stock);
    let nutrition_id = payload.nutrition_id.or(existing.nutrition_id);

    validate_product_fields(price, stock)?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, brand = $3, price = $4, kind = $5, category_id = $6,
            stock = $7, nutrition_id = $8, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(brand)
    .bind(price)
    .bind(kind)
    .bind(category_id)
    .bind(stock)
    .bind(nutrition_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Updated",
        ProductView::from(product),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses((status = 200, description = "Deleted product")),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_resource(&user, Resource::Products)?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    )))
}

fn validate_product_fields(price: i64, stock: i32) -> Result<(), AppError> {
    if price <= 0 {
        return Err(AppError::BadRequest("Price must be greater than 0".into()));
    }
    if stock < 0 {
        return Err(AppError::BadRequest("Stock cannot be negative".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_positive() {
        assert!(validate_product_fields(0, 10).is_err());
        assert!(validate_product_fields(-100, 10).is_err());
        assert!(validate_product_fields(1200, 10).is_ok());
    }

    #[test]
    fn stock_must_not_be_negative() {
        assert!(validate_product_fields(1200, -1).is_err());
        assert!(validate_product_fields(1200, 0).is_ok());
    }
}
