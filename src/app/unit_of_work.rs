use crate::utils::error::Result;
use std::sync::{Arc, Mutex};

/// Process-wide lock around ledger mutations (bet placement and settlement).
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    lock: Arc<Mutex<()>>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在鎖內執行；閉包內不可 await
    pub fn run<T>(&self, work: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        work()
    }
}
