//! Append-only audit trail. Events are recorded fire-and-forget: a
//! failed write is logged and never fails the request that caused it.

use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

pub struct AuditEvent<'a> {
    pub user_id: Option<Uuid>,
    pub action: &'a str,
    pub resource: &'a str,
    pub metadata: Option<Value>,
}

pub async fn record(pool: &DbPool, event: AuditEvent<'_>) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(event.user_id)
    .bind(event.action)
    .bind(event.resource)
    .bind(event.metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record an event, downgrading a failed write to a warning.
pub async fn record_or_warn(pool: &DbPool, event: AuditEvent<'_>) {
    let action = event.action;
    if let Err(err) = record(pool, event).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
