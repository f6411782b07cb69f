pub mod auth;
pub mod catalog;
pub mod products;
pub mod sales;
pub mod users;
