//! Categories, nutrition facts and payment methods: plain CRUD over
//! the reference tables, gated by the capability table.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    authz::Resource,
    dto::catalog::{
        CategoryList, CategoryRequest, NutritionList, NutritionRequest, PaymentMethodList,
        PaymentMethodRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_resource},
    models::{Category, NutritionFacts, PaymentMethod},
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    state::AppState,
};

pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/", post(create_category))
        .route("/{id}", get(get_category))
        .route("/{id}", put(update_category))
        .route("/{id}", delete(delete_category))
}

pub fn nutrition_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_nutrition))
        .route("/", post(create_nutrition))
        .route("/{id}", get(get_nutrition))
        .route("/{id}", put(update_nutrition))
        .route("/{id}", delete(delete_nutrition))
}

pub fn payment_methods_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payment_methods))
        .route("/", post(create_payment_method))
        .route("/{id}", delete(delete_payment_method))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("q" = Option<String>, Query, description = "Search by name"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    ensure_resource(&user, Resource::Categories)?;
    let (page, limit, offset) = query.pagination.normalize();
    let q = search_pattern(&query.q);

    let items = sqlx::query_as::<_, Category>(
        r#"
        SELECT * FROM categories
        WHERE ($1::text IS NULL OR name ILIKE $1)
        ORDER BY name
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(q.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) =
        sqlx::query_as("SELECT count(*) FROM categories WHERE ($1::text IS NULL OR name ILIKE $1)")
            .bind(q.as_deref())
            .fetch_one(&state.pool)
            .await?;

    let meta = Meta::paginated(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_resource(&user, Resource::Categories)?;
    let found = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match found {
        Some(c) => Ok(Json(ApiResponse::success("Category", c, None))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_resource(&user, Resource::Categories)?;
    validate_name(&payload.name)?;

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.description)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    ensure_resource(&user, Resource::Categories)?;
    validate_name(&payload.name)?;

    let updated = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $2, description = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.name)
    .bind(payload.description)
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(c) => Ok(Json(ApiResponse::success("Updated", c, Some(Meta::empty())))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses((status = 200, description = "Deleted category")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_resource(&user, Resource::Categories)?;
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
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

#[utoipa::path(
    get,
    path = "/api/nutrition",
    params(
        ("q" = Option<String>, Query, description = "Search by ingredients"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List nutrition facts", body = ApiResponse<NutritionList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_nutrition(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<NutritionList>>> {
    ensure_resource(&user, Resource::Nutrition)?;
    let (page, limit, offset) = query.pagination.normalize();
    let q = search_pattern(&query.q);

    let items = sqlx::query_as::<_, NutritionFacts>(
        r#"
        SELECT * FROM nutrition_facts
        WHERE ($1::text IS NULL OR ingredients ILIKE $1)
        ORDER BY created_at
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(q.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT count(*) FROM nutrition_facts WHERE ($1::text IS NULL OR ingredients ILIKE $1)",
    )
    .bind(q.as_deref())
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::paginated(page, limit, total.0);
    Ok(Json(ApiResponse::success(
        "Nutrition facts",
        NutritionList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    get,
    path = "/api/nutrition/{id}",
    params(("id" = Uuid, Path, description = "Nutrition facts ID")),
    responses(
        (status = 200, description = "Get nutrition facts", body = ApiResponse<NutritionFacts>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn get_nutrition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<NutritionFacts>>> {
    ensure_resource(&user, Resource::Nutrition)?;
    let found = sqlx::query_as::<_, NutritionFacts>("SELECT * FROM nutrition_facts WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    match found {
        Some(n) => Ok(Json(ApiResponse::success("Nutrition facts", n, None))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/nutrition",
    request_body = NutritionRequest,
    responses(
        (status = 201, description = "Create nutrition facts", body = ApiResponse<NutritionFacts>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_nutrition(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NutritionRequest>,
) -> AppResult<Json<ApiResponse<NutritionFacts>>> {
    ensure_resource(&user, Resource::Nutrition)?;
    validate_nutrition(&payload)?;

    let row = sqlx::query_as::<_, NutritionFacts>(
        r#"
        INSERT INTO nutrition_facts (id, ingredients, prep_minutes, protein_g, sugar_g, gluten)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.ingredients)
    .bind(payload.prep_minutes)
    .bind(payload.protein_g.unwrap_or(0.0))
    .bind(payload.sugar_g.unwrap_or(0.0))
    .bind(payload.gluten.unwrap_or(false))
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Nutrition facts created",
        row,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    put,
    path = "/api/nutrition/{id}",
    params(("id" = Uuid, Path, description = "Nutrition facts ID")),
    request_body = NutritionRequest,
    responses(
        (status = 200, description = "Updated nutrition facts", body = ApiResponse<NutritionFacts>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_nutrition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NutritionRequest>,
) -> AppResult<Json<ApiResponse<NutritionFacts>>> {
    ensure_resource(&user, Resource::Nutrition)?;
    validate_nutrition(&payload)?;

    let updated = sqlx::query_as::<_, NutritionFacts>(
        r#"
        UPDATE nutrition_facts
        SET ingredients = $2, prep_minutes = $3, protein_g = $4, sugar_g = $5, gluten = $6,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.ingredients)
    .bind(payload.prep_minutes)
    .bind(payload.protein_g.unwrap_or(0.0))
    .bind(payload.sugar_g.unwrap_or(0.0))
    .bind(payload.gluten.unwrap_or(false))
    .fetch_optional(&state.pool)
    .await?;

    match updated {
        Some(n) => Ok(Json(ApiResponse::success("Updated", n, Some(Meta::empty())))),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/api/nutrition/{id}",
    params(("id" = Uuid, Path, description = "Nutrition facts ID")),
    responses((status = 200, description = "Deleted nutrition facts")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_nutrition(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_resource(&user, Resource::Nutrition)?;
    let result = sqlx::query("DELETE FROM nutrition_facts WHERE id = $1")
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

#[utoipa::path(
    get,
    path = "/api/payment-methods",
    responses(
        (status = 200, description = "List payment methods", body = ApiResponse<PaymentMethodList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentMethodList>>> {
    ensure_resource(&user, Resource::PaymentMethods)?;
    let items = sqlx::query_as::<_, PaymentMethod>("SELECT * FROM payment_methods ORDER BY name")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success(
        "Payment methods",
        PaymentMethodList { items },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/payment-methods",
    request_body = PaymentMethodRequest,
    responses(
        (status = 201, description = "Create payment method", body = ApiResponse<PaymentMethod>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PaymentMethodRequest>,
) -> AppResult<Json<ApiResponse<PaymentMethod>>> {
    ensure_resource(&user, Resource::PaymentMethods)?;
    validate_name(&payload.name)?;

    let row = sqlx::query_as::<_, PaymentMethod>(
        "INSERT INTO payment_methods (id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(
        "Payment method created",
        row,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/payment-methods/{id}",
    params(("id" = Uuid, Path, description = "Payment method ID")),
    responses((status = 200, description = "Deleted payment method")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_payment_method(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_resource(&user, Resource::PaymentMethods)?;
    let result = sqlx::query("DELETE FROM payment_methods WHERE id = $1")
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

fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("Name must not be empty".into()));
    }
    Ok(())
}

fn validate_nutrition(payload: &NutritionRequest) -> Result<(), AppError> {
    if payload.ingredients.trim().is_empty() {
        return Err(AppError::BadRequest("Ingredients must not be empty".into()));
    }
    if payload.prep_minutes <= 0 {
        return Err(AppError::BadRequest(
            "Preparation time must be greater than 0".into(),
        ));
    }
    Ok(())
}

fn search_pattern(q: &Option<String>) -> Option<String> {
    q.as_deref()
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Panadería").is_ok());
    }

    #[test]
    fn nutrition_requires_positive_prep_time() {
        let payload = NutritionRequest {
            ingredients: "Harina, agua, sal".into(),
            prep_minutes: 0,
            protein_g: None,
            sugar_g: None,
            gluten: None,
        };
        assert!(validate_nutrition(&payload).is_err());
    }
}
