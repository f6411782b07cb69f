use uuid::Uuid;

use crate::{
    audit::{self, AuditEvent},
    authz::{ROLE_CLIENTE, Resource, Scope, require_module},
    db::DbPool,
    dto::users::{UpdateUserRequest, UserList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    routes::params::UserQuery,
};

pub async fn list_users(
    pool: &DbPool,
    user: &AuthUser,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    let scope = require_module(user.role, user.staff, Resource::Users)?;
    let (page, limit, offset) = query.pagination.normalize();
    let q = query
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));

    // A Cliente only ever sees its own row.
    let own_id = match scope {
        Scope::Own => Some(user.user_id),
        _ => None,
    };

    let items = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users
        WHERE ($1::uuid IS NULL OR id = $1)
          AND ($2::text IS NULL OR username ILIKE $2 OR email ILIKE $2
               OR first_name ILIKE $2 OR last_name_paternal ILIKE $2 OR run ILIKE $2)
        ORDER BY first_name
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(own_id)
    .bind(q.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT count(*) FROM users
        WHERE ($1::uuid IS NULL OR id = $1)
          AND ($2::text IS NULL OR username ILIKE $2 OR email ILIKE $2
               OR first_name ILIKE $2 OR last_name_paternal ILIKE $2 OR run ILIKE $2)
        "#,
    )
    .bind(own_id)
    .bind(q.as_deref())
    .fetch_one(pool)
    .await?;

    let meta = Meta::paginated(page, limit, total.0);
    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(meta),
    ))
}

pub async fn get_user(pool: &DbPool, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    let scope = require_module(user.role, user.staff, Resource::Users)?;
    if scope == Scope::Own && id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let found = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match found {
        Some(u) => Ok(ApiResponse::success("User", u, None)),
        None => Err(AppError::NotFound),
    }
}

pub async fn update_user(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    let scope = require_module(user.role, user.staff, Resource::Users)?;
    if scope == Scope::Own && id != user.user_id {
        return Err(AppError::Forbidden);
    }
    // Only staff may grant or revoke staff privileges or reassign roles.
    if (payload.is_staff.is_some() || payload.role_id.is_some()) && !user.staff {
        return Err(AppError::Forbidden);
    }

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let run = payload.run.unwrap_or(existing.run);
    if !run.is_empty() {
        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE run = $1 AND id <> $2")
                .bind(run.as_str())
                .bind(id)
                .fetch_optional(pool)
                .await?;
        if taken.is_some() {
            return Err(AppError::BadRequest("RUN is already taken".into()));
        }
    }

    let role_id = payload.role_id.or(existing.role_id);
    let is_staff = payload.is_staff.unwrap_or(existing.is_staff);
    validate_role_staff(pool, role_id, is_staff).await?;

    let email = payload.email.unwrap_or(existing.email);
    let first_name = payload.first_name.unwrap_or(existing.first_name);
    let last_name_paternal = payload.last_name_paternal.unwrap_or(existing.last_name_paternal);
    let last_name_maternal = payload.last_name_maternal.or(existing.last_name_maternal);
    let phone = payload.phone.or(existing.phone);
    let address_id = payload.address_id.or(existing.address_id);

    let updated = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET email = $2, first_name = $3, last_name_paternal = $4, last_name_maternal = $5,
            run = $6, phone = $7, role_id = $8, address_id = $9, is_staff = $10,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(last_name_paternal)
    .bind(last_name_maternal)
    .bind(run)
    .bind(phone)
    .bind(role_id)
    .bind(address_id)
    .bind(is_staff)
    .fetch_one(pool)
    .await?;

    audit::record_or_warn(
        pool,
        AuditEvent {
            user_id: Some(user.user_id),
            action: "user_update",
            resource: "users",
            metadata: Some(serde_json::json!({ "target_user_id": updated.id })),
        },
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        updated,
        Some(Meta::empty()),
    ))
}

/// Soft invariant from the account model: an account whose role is
/// Cliente must not hold the staff flag. Checked here at validation
/// time only; nothing at the database level backs it up.
async fn validate_role_staff(
    pool: &DbPool,
    role_id: Option<Uuid>,
    is_staff: bool,
) -> AppResult<()> {
    if !is_staff {
        return Ok(());
    }
    if let Some(role_id) = role_id {
        let role: Option<(String,)> = sqlx::query_as("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(pool)
            .await?;
        if let Some((name,)) = role
            && name == ROLE_CLIENTE
        {
            return Err(AppError::BadRequest(
                "Cliente accounts cannot hold staff privileges".into(),
            ));
        }
    }
    Ok(())
}
