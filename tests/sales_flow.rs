use forneria_admin_api::{
    authz::Role,
    db::{create_orm_conn, create_pool, run_migrations},
    dto::sales::{SaleLineInput, SubmitSaleRequest},
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        products::Entity as Products, sales::Entity as Sales, users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    routes::admin::BulkSelectRequest,
    routes::params::{Pagination, SaleListQuery},
    services::{admin_service, sale_service},
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use uuid::Uuid;

// Integration flow: a staff user submits a sale against live stock,
// stock is reserved atomically, and bulk actions update selections.
#[tokio::test]
async fn submit_sale_reserves_stock_and_bulk_actions_count_rows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let admin_id = create_user(&state, "vendedor", "33333333-3").await?;
    let category_id = create_category(&state, "Panadería").await?;
    let product = create_product(&state, "Marraqueta", 1000, category_id, 10).await?;

    let staff = AuthUser {
        user_id: admin_id,
        role: Role::Admin,
        staff: true,
    };

    // Submit a sale: 2 x 1000, with one removed line that must be ignored.
    let resp = sale_service::submit_sale(
        &state,
        &staff,
        SubmitSaleRequest {
            user_id: admin_id,
            payment_method_id: None,
            status: "Pendiente".into(),
            channel: "Local".into(),
            lines: vec![
                SaleLineInput {
                    product_id: product,
                    quantity: 2,
                    unit_price: 1000,
                    remove: false,
                },
                SaleLineInput {
                    product_id: product,
                    quantity: 999,
                    unit_price: 1000,
                    remove: true,
                },
            ],
        },
    )
    .await?;
    let data = resp.data.unwrap();
    assert_eq!(data.sale.total_amount, 2000);
    assert_eq!(data.lines.len(), 1);

    // Stock was reserved in the same transaction.
    let stored = Products::find_by_id(product).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 8);

    // A quantity over live stock fails naming the product.
    let err = sale_service::submit_sale(
        &state,
        &staff,
        SubmitSaleRequest {
            user_id: admin_id,
            payment_method_id: None,
            status: "Pendiente".into(),
            channel: "Local".into(),
            lines: vec![SaleLineInput {
                product_id: product,
                quantity: 50,
                unit_price: 1000,
                remove: false,
            }],
        },
    )
    .await
    .unwrap_err();
    match err {
        AppError::BadRequest(msg) => {
            assert!(msg.contains("Marraqueta"), "got: {msg}");
            assert!(msg.contains("8"), "got: {msg}");
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // Restock only touches rows under the threshold.
    let low_a = create_product(&state, "Hallulla", 900, category_id, 2).await?;
    let mid = create_product(&state, "Dobladita", 950, category_id, 7).await?;
    let low_b = create_product(&state, "Colisa", 800, category_id, 0).await?;

    let restock = admin_service::restock_products(
        &state,
        &staff,
        BulkSelectRequest {
            ids: vec![low_a, mid, low_b],
        },
    )
    .await?;
    assert_eq!(restock.data.unwrap().affected, 2);

    let stored = Products::find_by_id(low_a).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 50);
    let stored = Products::find_by_id(mid).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 7);
    let stored = Products::find_by_id(low_b).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 50);

    // Bulk actions demand the staff flag even for back-office roles.
    let clerk = AuthUser {
        user_id: admin_id,
        role: Role::Admin,
        staff: false,
    };
    let err = admin_service::restock_products(
        &state,
        &clerk,
        BulkSelectRequest { ids: vec![low_a] },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Mark the sale as paid.
    let paid = admin_service::mark_sales_paid(
        &state,
        &staff,
        BulkSelectRequest {
            ids: vec![data.sale.id],
        },
    )
    .await?;
    assert_eq!(paid.data.unwrap().affected, 1);

    let stored = Sales::find_by_id(data.sale.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(stored.status, "Pagado");

    Ok(())
}

#[tokio::test]
async fn cliente_only_sees_own_sales() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let cliente_id = create_user(&state, "cliente-uno", "44444444-4").await?;
    let other_id = create_user(&state, "cliente-dos", "55555555-5").await?;
    let category_id = create_category(&state, "Pastelería").await?;
    let product = create_product(&state, "Torta", 8500, category_id, 20).await?;

    let staff = AuthUser {
        user_id: other_id,
        role: Role::Admin,
        staff: true,
    };
    for user_id in [cliente_id, other_id] {
        sale_service::submit_sale(
            &state,
            &staff,
            SubmitSaleRequest {
                user_id,
                payment_method_id: None,
                status: "Pendiente".into(),
                channel: "Online".into(),
                lines: vec![SaleLineInput {
                    product_id: product,
                    quantity: 1,
                    unit_price: 8500,
                    remove: false,
                }],
            },
        )
        .await?;
    }

    let cliente = AuthUser {
        user_id: cliente_id,
        role: Role::Cliente,
        staff: true,
    };
    let query = || SaleListQuery {
        pagination: Pagination {
            page: None,
            per_page: None,
        },
        status: None,
        channel: None,
        sort_order: None,
    };

    let own = sale_service::list_sales(&state, &cliente, query()).await?;
    let own = own.data.unwrap();
    assert_eq!(own.items.len(), 1);
    assert!(own.items.iter().all(|s| s.user_id == cliente_id));

    let all = sale_service::list_sales(&state, &staff, query()).await?;
    assert_eq!(all.data.unwrap().items.len(), 2);

    Ok(())
}

async fn setup_state() -> anyhow::Result<Option<AppState>> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE sale_lines, sales, audit_logs, products, nutrition_facts, categories, payment_methods, users, addresses, roles RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState { pool, orm }))
}

async fn create_user(state: &AppState, username: &str, run: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(format!("{username}@forneria.cl")),
        password_hash: Set("dummy".into()),
        first_name: Set("Test".into()),
        last_name_paternal: Set("User".into()),
        last_name_maternal: Set(None),
        run: Set(run.to_string()),
        phone: Set(None),
        role_id: Set(None),
        address_id: Set(None),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_category(state: &AppState, name: &str) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(category.id)
}

async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    category_id: Uuid,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        brand: Set(Some("La Fornería".into())),
        price: Set(price),
        kind: Set("Propia".into()),
        category_id: Set(category_id),
        stock: Set(stock),
        nutrition_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
        deleted_at: Set(None),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}
