use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    authz::{Resource, Scope, require_all, require_module},
    dto::sales::{SaleLineInput, SaleList, SaleWithLines, SubmitSaleRequest, UpdateSaleStatusRequest},
    entity::{
        products::{Column as ProdCol, Entity as Products},
        sale_lines::{ActiveModel as SaleLineActive, Column as SaleLineCol, Entity as SaleLines, Model as SaleLineModel},
        sales::{ActiveModel as SaleActive, Column as SaleCol, Entity as Sales, Model as SaleModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Sale, SaleLine},
    response::{ApiResponse, Meta},
    routes::params::{SaleListQuery, SortOrder},
    state::AppState,
};

/// Live stock of a product as seen inside the submission transaction.
#[derive(Debug, Clone)]
pub struct AvailableStock {
    pub name: String,
    pub stock: i32,
}

/// Whole-batch validation of a sale's candidate lines.
///
/// Lines flagged for removal are skipped. Field checks run over the
/// whole batch first; then the requested quantity is aggregated per
/// product and held against that product's stock, so several lines for
/// the same product cannot jointly oversell it. The batch as a whole
/// must come out positive. Returns the accumulated total.
pub fn validate_line_batch(
    lines: &[SaleLineInput],
    stock: &HashMap<Uuid, AvailableStock>,
) -> Result<i64, AppError> {
    let surviving: Vec<&SaleLineInput> = lines.iter().filter(|l| !l.remove).collect();

    for line in &surviving {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(
                "Quantity must be greater than 0".into(),
            ));
        }
        if line.unit_price <= 0 {
            return Err(AppError::BadRequest(
                "Unit price must be greater than 0".into(),
            ));
        }
    }

    let mut total: i64 = 0;
    let mut requested: HashMap<Uuid, i64> = HashMap::new();
    for line in &surviving {
        total += (line.quantity as i64) * line.unit_price;
        *requested.entry(line.product_id).or_insert(0) += line.quantity as i64;
    }

    for (product_id, quantity) in &requested {
        let available = stock.get(product_id).ok_or(AppError::NotFound)?;
        if *quantity > available.stock as i64 {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}. Available: {}",
                available.name, available.stock
            )));
        }
    }

    if total <= 0 {
        return Err(AppError::BadRequest(
            "Sale must contain at least one line with positive quantity".into(),
        ));
    }

    Ok(total)
}

pub async fn list_sales(
    state: &AppState,
    user: &AuthUser,
    query: SaleListQuery,
) -> AppResult<ApiResponse<SaleList>> {
    let scope = require_module(user.role, user.staff, Resource::Sales)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if scope == Scope::Own {
        condition = condition.add(SaleCol::UserId.eq(user.user_id));
    }
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(SaleCol::Status.eq(status.clone()));
    }
    if let Some(channel) = query.channel.as_ref().filter(|c| !c.is_empty()) {
        condition = condition.add(SaleCol::Channel.eq(channel.clone()));
    }

    let mut finder = Sales::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(SaleCol::SoldAt),
        SortOrder::Desc => finder.order_by_desc(SaleCol::SoldAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let sales = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_from_entity)
        .collect();

    let meta = Meta::paginated(page, limit, total);
    Ok(ApiResponse::success(
        "Sales",
        SaleList { items: sales },
        Some(meta),
    ))
}

pub async fn get_sale(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SaleWithLines>> {
    let scope = require_module(user.role, user.staff, Resource::Sales)?;

    let mut condition = Condition::all().add(SaleCol::Id.eq(id));
    if scope == Scope::Own {
        condition = condition.add(SaleCol::UserId.eq(user.user_id));
    }

    let sale = Sales::find().filter(condition).one(&state.orm).await?;
    let sale = match sale {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let lines = SaleLines::find()
        .filter(SaleLineCol::SaleId.eq(sale.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_line_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Sale",
        SaleWithLines {
            sale: sale_from_entity(sale),
            lines,
        },
        Some(Meta::empty()),
    ))
}

/// Submit a sale header with its line batch. Validation and stock
/// reservation happen inside one transaction: product rows are locked,
/// the batch is validated against live stock, and on success the lines
/// are inserted and each product's stock decremented before commit.
pub async fn submit_sale(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitSaleRequest,
) -> AppResult<ApiResponse<SaleWithLines>> {
    let scope = require_module(user.role, user.staff, Resource::Sales)?;
    if scope == Scope::Own && payload.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    if payload.status.is_empty() {
        return Err(AppError::BadRequest("Status must not be empty".into()));
    }

    let txn = state.orm.begin().await?;

    let surviving: Vec<&SaleLineInput> =
        payload.lines.iter().filter(|l| !l.remove).collect();
    let product_ids: Vec<Uuid> = surviving.iter().map(|l| l.product_id).collect();

    let products = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    let stock: HashMap<Uuid, AvailableStock> = products
        .into_iter()
        .map(|p| {
            (
                p.id,
                AvailableStock {
                    name: p.name,
                    stock: p.stock,
                },
            )
        })
        .collect();

    let total = validate_line_batch(&payload.lines, &stock)?;

    let sale = SaleActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        payment_method_id: Set(payload.payment_method_id),
        total_amount: Set(total),
        status: Set(payload.status.clone()),
        channel: Set(payload.channel.clone()),
        sold_at: NotSet,
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut lines: Vec<SaleLine> = Vec::new();
    for input in &surviving {
        let line = SaleLineActive {
            id: Set(Uuid::new_v4()),
            sale_id: Set(sale.id),
            product_id: Set(input.product_id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            created_at: NotSet,
            updated_at: NotSet,
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;

        lines.push(sale_line_from_entity(line));

        // Reserve the stock in the same transaction.
        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(input.quantity))
            .filter(ProdCol::Id.eq(input.product_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    audit::record_or_warn(
        &state.pool,
        AuditEvent {
            user_id: Some(user.user_id),
            action: "sale_submit",
            resource: "sales",
            metadata: Some(serde_json::json!({ "sale_id": sale.id, "total": total })),
        },
    )
    .await;

    Ok(ApiResponse::success(
        "Sale recorded",
        SaleWithLines {
            sale: sale_from_entity(sale),
            lines,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_sale_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSaleStatusRequest,
) -> AppResult<ApiResponse<Sale>> {
    require_all(user.role, user.staff, Resource::Sales)?;
    if payload.status.is_empty() {
        return Err(AppError::BadRequest("Status must not be empty".into()));
    }

    let existing = Sales::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let mut active: SaleActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let sale = active.update(&state.orm).await?;

    audit::record_or_warn(
        &state.pool,
        AuditEvent {
            user_id: Some(user.user_id),
            action: "sale_status_update",
            resource: "sales",
            metadata: Some(serde_json::json!({ "sale_id": sale.id, "status": sale.status })),
        },
    )
    .await;

    Ok(ApiResponse::success(
        "Sale updated",
        sale_from_entity(sale),
        Some(Meta::empty()),
    ))
}

fn sale_from_entity(model: SaleModel) -> Sale {
    Sale {
        id: model.id,
        user_id: model.user_id,
        payment_method_id: model.payment_method_id,
        total_amount: model.total_amount,
        status: model.status,
        channel: model.channel,
        sold_at: model.sold_at.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

fn sale_line_from_entity(model: SaleLineModel) -> SaleLine {
    SaleLine {
        id: model.id,
        sale_id: model.sale_id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        deleted_at: model.deleted_at.map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, quantity: i32, unit_price: i64) -> SaleLineInput {
        SaleLineInput {
            product_id,
            quantity,
            unit_price,
            remove: false,
        }
    }

    fn stock_of(entries: &[(Uuid, &str, i32)]) -> HashMap<Uuid, AvailableStock> {
        entries
            .iter()
            .map(|(id, name, stock)| {
                (
                    *id,
                    AvailableStock {
                        name: name.to_string(),
                        stock: *stock,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn valid_batch_returns_total() {
        let bread = Uuid::new_v4();
        let cake = Uuid::new_v4();
        let stock = stock_of(&[(bread, "Marraqueta", 50), (cake, "Torta", 5)]);

        let total = validate_line_batch(
            &[line(bread, 2, 1200), line(cake, 1, 8500)],
            &stock,
        )
        .unwrap();
        assert_eq!(total, 2 * 1200 + 8500);
    }

    #[test]
    fn insufficient_stock_names_product_and_available() {
        let cake = Uuid::new_v4();
        let stock = stock_of(&[(cake, "Torta de Chocolate", 5)]);

        let err = validate_line_batch(&[line(cake, 6, 8500)], &stock).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("Torta de Chocolate"), "got: {msg}");
                assert!(msg.contains("5"), "got: {msg}");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_product_lines_oversell_in_aggregate() {
        let cake = Uuid::new_v4();
        let stock = stock_of(&[(cake, "Torta de Chocolate", 5)]);

        // Two lines of 3 fit individually but jointly exceed stock 5.
        let err =
            validate_line_batch(&[line(cake, 3, 8500), line(cake, 3, 8500)], &stock).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("Torta de Chocolate"), "got: {msg}");
                assert!(msg.contains("5"), "got: {msg}");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }

        // At exactly the available stock the batch passes.
        let total = validate_line_batch(&[line(cake, 2, 8500), line(cake, 3, 8500)], &stock)
            .unwrap();
        assert_eq!(total, 5 * 8500);
    }

    #[test]
    fn non_positive_quantity_fails_field_validation() {
        let bread = Uuid::new_v4();
        let stock = stock_of(&[(bread, "Marraqueta", 50)]);

        assert!(validate_line_batch(&[line(bread, 0, 1200)], &stock).is_err());
        assert!(validate_line_batch(&[line(bread, -1, 1200)], &stock).is_err());
        assert!(validate_line_batch(&[line(bread, 1, 0)], &stock).is_err());
    }

    #[test]
    fn removed_lines_are_skipped() {
        let bread = Uuid::new_v4();
        // The removed line would fail both field validation and the
        // stock check if it were counted.
        let mut bad = line(bread, 1000, 1200);
        bad.remove = true;
        let stock = stock_of(&[(bread, "Marraqueta", 50)]);

        let total = validate_line_batch(&[line(bread, 1, 1200), bad], &stock).unwrap();
        assert_eq!(total, 1200);
    }

    #[test]
    fn all_lines_removed_fails_positive_total() {
        let bread = Uuid::new_v4();
        let mut removed = line(bread, 1, 1200);
        removed.remove = true;
        let stock = stock_of(&[(bread, "Marraqueta", 50)]);

        let err = validate_line_batch(&[removed], &stock).unwrap_err();
        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("at least one line"), "got: {msg}")
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn empty_batch_fails() {
        let stock = HashMap::new();
        assert!(validate_line_batch(&[], &stock).is_err());
    }

    #[test]
    fn unknown_product_is_not_found() {
        let stock = HashMap::new();
        let err = validate_line_batch(&[line(Uuid::new_v4(), 1, 100)], &stock).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
