use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct NutritionFacts {
    pub id: Uuid,
    pub ingredients: String,
    /// Preparation time in minutes.
    pub prep_minutes: i32,
    pub protein_g: f64,
    pub sugar_g: f64,
    pub gluten: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Address {
    pub id: Uuid,
    pub street: String,
    pub number: String,
    pub commune: String,
    pub region: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name_paternal: String,
    pub last_name_maternal: Option<String>,
    /// Chilean national id, unique.
    pub run: String,
    pub phone: Option<String>,
    pub role_id: Option<Uuid>,
    pub address_id: Option<Uuid>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    /// Price in CLP.
    pub price: i64,
    pub kind: String,
    pub category_id: Uuid,
    pub stock: i32,
    pub nutrition_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StockStatus {
    Agotado,
    BajoStock,
    Disponible,
}

impl Product {
    pub fn stock_status(&self) -> StockStatus {
        if self.stock == 0 {
            StockStatus::Agotado
        } else if self.stock < 10 {
            StockStatus::BajoStock
        } else {
            StockStatus::Disponible
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_method_id: Option<Uuid>,
    pub total_amount: i64,
    pub status: String,
    pub channel: String,
    pub sold_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product_with_stock(stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Marraqueta".into(),
            brand: None,
            price: 1200,
            kind: "Propia".into(),
            category_id: Uuid::new_v4(),
            stock,
            nutrition_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(product_with_stock(0).stock_status(), StockStatus::Agotado);
        assert_eq!(product_with_stock(9).stock_status(), StockStatus::BajoStock);
        assert_eq!(
            product_with_stock(10).stock_status(),
            StockStatus::Disponible
        );
    }
}
