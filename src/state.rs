use crate::db::{DbPool, OrmConn};

/// Shared handles cloned into every handler: the sqlx pool backs the
/// plain CRUD queries, migrations and the audit trail; the SeaORM
/// connection backs the transactional paths (sale submission, bulk
/// actions).
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}
