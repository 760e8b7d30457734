pub mod balance;
pub mod history;
pub mod lifecycle;
pub mod locks;
pub mod notify;
pub mod workdays;

use std::sync::Arc;

use sqlx::SqlitePool;

use self::locks::EmployeeLocks;

/// Handle over the leave-record store. Every create/review/cancel runs as
/// one atomic unit under the owning employee's lock; operations on different
/// employees proceed in parallel.
#[derive(Clone)]
pub struct Engine {
    pool: SqlitePool,
    locks: Arc<EmployeeLocks>,
}

impl Engine {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: Arc::new(EmployeeLocks::new()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
