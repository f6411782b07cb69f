//! Idempotent bootstrap data: reference rows plus a couple of sample
//! accounts and sales. Every step is get-or-create, so running the
//! seed repeatedly leaves row counts unchanged.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use uuid::Uuid;

use crate::db::DbPool;

pub struct SeedCredentials {
    pub username: &'static str,
    pub password: &'static str,
}

pub const ADMIN_CREDENTIALS: SeedCredentials = SeedCredentials {
    username: "admin",
    password: "admin123",
};

pub const CLIENTE_CREDENTIALS: SeedCredentials = SeedCredentials {
    username: "cliente",
    password: "cliente123",
};

pub async fn run(pool: &DbPool) -> anyhow::Result<()> {
    let admin_role = ensure_role(pool, "Admin", "Administrador del sistema").await?;
    let cliente_role = ensure_role(pool, "Cliente", "Cliente de la fornería").await?;

    let bakery = ensure_category(pool, "Panadería", "Pan dulce y salado").await?;
    let pastry = ensure_category(pool, "Pastelería", "Tortas y postres").await?;
    let drinks = ensure_category(pool, "Bebidas", "Bebidas calientes y frías").await?;

    let admin_address = ensure_address(pool, "Av. Principal", "123", "Santiago", "RM").await?;
    let cliente_address =
        ensure_address(pool, "Calle Secundaria", "456", "Providencia", "RM").await?;

    let bread_nutrition =
        ensure_nutrition(pool, "Harina, agua, sal, levadura", 120, 8.5, 2.0, true).await?;
    let cake_nutrition = ensure_nutrition(
        pool,
        "Harina, huevos, azúcar, mantequilla",
        180,
        6.2,
        25.0,
        true,
    )
    .await?;

    let cash = ensure_payment_method(pool, "Efectivo").await?;
    let card = ensure_payment_method(pool, "Tarjeta").await?;
    ensure_payment_method(pool, "Transferencia").await?;

    let marraqueta = ensure_product(
        pool,
        "Marraqueta",
        "La Fornería",
        1200,
        "Propia",
        bakery,
        50,
        Some(bread_nutrition),
    )
    .await?;
    let chocolate_cake = ensure_product(
        pool,
        "Torta de Chocolate",
        "La Fornería",
        8500,
        "Propia",
        pastry,
        5,
        Some(cake_nutrition),
    )
    .await?;
    ensure_product(
        pool,
        "Café Americano",
        "La Fornería",
        1800,
        "Propia",
        drinks,
        100,
        None,
    )
    .await?;

    ensure_user(
        pool,
        &UserSpec {
            username: ADMIN_CREDENTIALS.username,
            email: "admin@forneria.cl",
            password: ADMIN_CREDENTIALS.password,
            first_name: "Admin",
            last_name_paternal: "Sistema",
            run: "11111111-1",
            role_id: admin_role,
            address_id: admin_address,
            is_staff: true,
            is_superuser: true,
        },
    )
    .await?;
    // The sample Cliente gets the staff flag so it can reach the admin
    // surface; the direct insert bypasses the soft Cliente-not-staff
    // validation on purpose, matching the original bootstrap.
    let cliente_user = ensure_user(
        pool,
        &UserSpec {
            username: CLIENTE_CREDENTIALS.username,
            email: "cliente@forneria.cl",
            password: CLIENTE_CREDENTIALS.password,
            first_name: "Juan",
            last_name_paternal: "Pérez",
            run: "22222222-2",
            role_id: cliente_role,
            address_id: cliente_address,
            is_staff: true,
            is_superuser: false,
        },
    )
    .await?;

    let sale_paid = ensure_sale(pool, cliente_user, Some(card), 1200, "Pagado", "Local").await?;
    let sale_pending =
        ensure_sale(pool, cliente_user, Some(cash), 8500, "Pendiente", "Instagram").await?;

    ensure_sale_line(pool, sale_paid, marraqueta, 1, 1200).await?;
    ensure_sale_line(pool, sale_pending, chocolate_cake, 1, 8500).await?;

    Ok(())
}

async fn ensure_role(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO roles (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => Ok(id),
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            Ok(existing.0)
        }
    }
}

async fn ensure_category(pool: &DbPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, description)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => Ok(id),
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            Ok(existing.0)
        }
    }
}

async fn ensure_payment_method(pool: &DbPool, name: &str) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO payment_methods (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => Ok(id),
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM payment_methods WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            Ok(existing.0)
        }
    }
}

async fn ensure_address(
    pool: &DbPool,
    street: &str,
    number: &str,
    commune: &str,
    region: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM addresses WHERE street = $1 AND number = $2 AND commune = $3 AND region = $4",
    )
    .bind(street)
    .bind(number)
    .bind(commune)
    .bind(region)
    .fetch_optional(pool)
    .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO addresses (id, street, number, commune, region)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(street)
    .bind(number)
    .bind(commune)
    .bind(region)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_nutrition(
    pool: &DbPool,
    ingredients: &str,
    prep_minutes: i32,
    protein_g: f64,
    sugar_g: f64,
    gluten: bool,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM nutrition_facts WHERE ingredients = $1")
            .bind(ingredients)
            .fetch_optional(pool)
            .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO nutrition_facts (id, ingredients, prep_minutes, protein_g, sugar_g, gluten)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(ingredients)
    .bind(prep_minutes)
    .bind(protein_g)
    .bind(sugar_g)
    .bind(gluten)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[allow(clippy::too_many_arguments)]
async fn ensure_product(
    pool: &DbPool,
    name: &str,
    brand: &str,
    price: i64,
    kind: &str,
    category_id: Uuid,
    stock: i32,
    nutrition_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO products (id, name, brand, price, kind, category_id, stock, nutrition_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(brand)
    .bind(price)
    .bind(kind)
    .bind(category_id)
    .bind(stock)
    .bind(nutrition_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((id,)) => Ok(id),
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE name = $1")
                .bind(name)
                .fetch_one(pool)
                .await?;
            Ok(existing.0)
        }
    }
}

struct UserSpec<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    first_name: &'a str,
    last_name_paternal: &'a str,
    run: &'a str,
    role_id: Uuid,
    address_id: Uuid,
    is_staff: bool,
    is_superuser: bool,
}

async fn ensure_user(pool: &DbPool, spec: &UserSpec<'_>) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(spec.username)
        .fetch_optional(pool)
        .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(spec.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, first_name,
                           last_name_paternal, run, role_id, address_id, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(spec.username)
    .bind(spec.email)
    .bind(password_hash)
    .bind(spec.first_name)
    .bind(spec.last_name_paternal)
    .bind(spec.run)
    .bind(spec.role_id)
    .bind(spec.address_id)
    .bind(spec.is_staff)
    .bind(spec.is_superuser)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_sale(
    pool: &DbPool,
    user_id: Uuid,
    payment_method_id: Option<Uuid>,
    total_amount: i64,
    status: &str,
    channel: &str,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM sales
        WHERE user_id = $1 AND total_amount = $2 AND status = $3 AND channel = $4
        "#,
    )
    .bind(user_id)
    .bind(total_amount)
    .bind(status)
    .bind(channel)
    .fetch_optional(pool)
    .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sales (id, user_id, payment_method_id, total_amount, status, channel)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(payment_method_id)
    .bind(total_amount)
    .bind(status)
    .bind(channel)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_sale_line(
    pool: &DbPool,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: i64,
) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM sale_lines WHERE sale_id = $1 AND product_id = $2")
            .bind(sale_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;

    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO sale_lines (id, sale_id, product_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(sale_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
