use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

/// Per-employee exclusive locks serializing create/review/cancel for one
/// employee's record set. A single operation never holds more than one
/// employee's lock, so there is no lock ordering to get wrong.
#[derive(Default)]
pub struct EmployeeLocks {
    // Grows with the number of distinct employees seen, which is bounded by
    // the employees table.
    inner: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_employee(&self, employee_id: i64) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().expect("employee lock registry poisoned");
        map.entry(employee_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
