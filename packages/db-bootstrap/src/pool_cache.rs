//! Process-wide memoization of the bootstrapped connection.
//!
//! The cache is an explicit value, not a hidden global: the bootstrap is
//! handed a `PoolSlot` and every clone of that slot shares one underlying
//! cell. Production code passes `PoolSlot::process()`; tests hand each
//! bootstrap a private slot so runs stay independent.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use sea_orm::DatabaseConnection;

/// Shared single-assignment holder for a database handle.
#[derive(Debug, Clone, Default)]
pub struct PoolSlot {
    cell: Arc<OnceCell<DatabaseConnection>>,
}

impl PoolSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The one slot shared by every bootstrap in this process.
    pub fn process() -> Self {
        static PROCESS_SLOT: OnceCell<PoolSlot> = OnceCell::new();
        PROCESS_SLOT.get_or_init(PoolSlot::new).clone()
    }

    /// The cached handle, if one was stored.
    pub fn get(&self) -> Option<DatabaseConnection> {
        self.cell.get().cloned()
    }

    /// Store `conn` if the slot is empty. Returns whether this call filled
    /// the slot; a warm slot keeps its first handle.
    pub fn fill(&self, conn: DatabaseConnection) -> bool {
        self.cell.set(conn).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.get().is_none()
    }
}
