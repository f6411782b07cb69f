use forneria_admin_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    seed::{ADMIN_CREDENTIALS, CLIENTE_CREDENTIALS, run},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    run(&pool).await?;

    println!("Seed completed. Users created:");
    println!(
        "  - Admin:   {} / {}",
        ADMIN_CREDENTIALS.username, ADMIN_CREDENTIALS.password
    );
    println!(
        "  - Cliente: {} / {}",
        CLIENTE_CREDENTIALS.username, CLIENTE_CREDENTIALS.password
    );
    Ok(())
}
