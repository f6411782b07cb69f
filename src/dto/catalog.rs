use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, NutritionFacts, PaymentMethod};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NutritionRequest {
    pub ingredients: String,
    pub prep_minutes: i32,
    pub protein_g: Option<f64>,
    pub sugar_g: Option<f64>,
    pub gluten: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NutritionList {
    pub items: Vec<NutritionFacts>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentMethodRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentMethodList {
    pub items: Vec<PaymentMethod>,
}
