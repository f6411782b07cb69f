use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, StockStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub brand: Option<String>,
    pub price: i64,
    pub kind: String,
    pub category_id: Uuid,
    pub stock: i32,
    pub nutrition_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<i64>,
    pub kind: Option<String>,
    pub category_id: Option<Uuid>,
    pub stock: Option<i32>,
    pub nutrition_id: Option<Uuid>,
}

/// A product row as the admin listing shows it, with the derived
/// stock status column.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let stock_status = product.stock_status();
        Self {
            product,
            stock_status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductView>,
}
