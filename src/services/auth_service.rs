use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    authz::ROLE_CLIENTE,
    db::DbPool,
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult},
    models::User,
    response::{ApiResponse, Meta},
};

/// Self-registration always creates a Cliente account without staff
/// privileges, so the Cliente-not-staff invariant holds by construction.
pub async fn register_user(pool: &DbPool, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR run = $2")
            .bind(payload.username.as_str())
            .bind(payload.run.as_str())
            .fetch_optional(pool)
            .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest(
            "Username or RUN is already taken".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let cliente_role: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
        .bind(ROLE_CLIENTE)
        .fetch_optional(pool)
        .await?;

    let id = Uuid::new_v4();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, first_name,
                           last_name_paternal, last_name_maternal, run, phone, role_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.username.as_str())
    .bind(payload.email.as_str())
    .bind(password_hash)
    .bind(payload.first_name.as_str())
    .bind(payload.last_name_paternal.as_str())
    .bind(payload.last_name_maternal.as_deref())
    .bind(payload.run.as_str())
    .bind(payload.phone.as_deref())
    .bind(cliente_role.map(|(id,)| id))
    .fetch_one(pool)
    .await?;

    audit::record_or_warn(
        pool,
        AuditEvent {
            user_id: Some(user.id),
            action: "user_register",
            resource: "users",
            metadata: Some(serde_json::json!({ "user_id": user.id })),
        },
    )
    .await;
    Ok(ApiResponse::success("User created", user, None))
}

pub async fn login_user(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username.as_str())
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let role_name: Option<(String,)> = match user.role_id {
        Some(role_id) => {
            sqlx::query_as("SELECT name FROM roles WHERE id = $1")
                .bind(role_id)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: role_name.map(|(name,)| name).unwrap_or_default(),
        staff: user.is_staff,
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
    };

    audit::record_or_warn(
        pool,
        AuditEvent {
            user_id: Some(user.id),
            action: "user_login",
            resource: "users",
            metadata: Some(serde_json::json!({ "user_id": user.id })),
        },
    )
    .await;

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}
