use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Sale, SaleLine};

fn default_status() -> String {
    "Pendiente".to_string()
}

fn default_channel() -> String {
    "Online".to_string()
}

/// One candidate line of a sale submission. Lines flagged with `remove`
/// are dropped from the batch before validation, mirroring rows deleted
/// in the admin form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaleLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitSaleRequest {
    pub user_id: Uuid,
    pub payment_method_id: Option<Uuid>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    pub lines: Vec<SaleLineInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSaleStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleWithLines {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleList {
    pub items: Vec<Sale>,
}
