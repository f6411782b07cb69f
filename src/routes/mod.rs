use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod sales;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", catalog::categories_router())
        .nest("/nutrition", catalog::nutrition_router())
        .nest("/payment-methods", catalog::payment_methods_router())
        .nest("/products", products::router())
        .nest("/users", users::router())
        .nest("/sales", sales::router())
        .nest("/admin", admin::router())
}
