pub mod admin_service;
pub mod auth_service;
pub mod sale_service;
pub mod user_service;
