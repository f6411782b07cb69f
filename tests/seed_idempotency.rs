use forneria_admin_api::{
    db::{create_pool, run_migrations, DbPool},
    seed,
};

// Running the seed twice must not duplicate any row.
#[tokio::test]
async fn seed_runs_are_idempotent() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run the seed test."
                );
                return Ok(());
            }
        };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    sqlx::query(
        "TRUNCATE TABLE sale_lines, sales, audit_logs, products, nutrition_facts, categories, payment_methods, users, addresses, roles RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    seed::run(&pool).await?;
    let first = table_counts(&pool).await?;

    seed::run(&pool).await?;
    let second = table_counts(&pool).await?;

    assert_eq!(first, second);

    // The seed users exist exactly once each.
    for username in [
        seed::ADMIN_CREDENTIALS.username,
        seed::CLIENTE_CREDENTIALS.username,
    ] {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 1, "expected one row for {username}");
    }

    Ok(())
}

async fn table_counts(pool: &DbPool) -> anyhow::Result<Vec<(&'static str, i64)>> {
    let tables = [
        "roles",
        "categories",
        "nutrition_facts",
        "addresses",
        "users",
        "products",
        "payment_methods",
        "sales",
        "sale_lines",
    ];
    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        counts.push((table, count));
    }
    Ok(counts)
}
