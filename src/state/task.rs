use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::state::data_model::{Field, RowId};

pub type CellKey = (RowId, Field);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FocusKey {
    pub row: usize,
    pub col: usize,
}

impl FocusKey {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Cancellation token shared between whoever scheduled a delayed action and
/// the host that sleeps for it. Clones observe the same token.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle {
    cancelled: Rc<Cell<bool>>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn same_task(&self, other: &TaskHandle) -> bool {
        Rc::ptr_eq(&self.cancelled, &other.cancelled)
    }

    pub async fn elapsed(&self, delay: Duration) -> bool {
        tokio::time::sleep(delay).await;
        !self.is_cancelled()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskKind {
    Debounce(CellKey),
    StatusReset(CellKey),
    FocusEviction(FocusKey),
}

/// A timer the host must run; when it elapses the host hands it back to the
/// grid, which ignores it if it was cancelled in the meantime.
#[derive(Clone, Debug)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub handle: TaskHandle,
    pub delay: Duration,
}

impl ScheduledTask {
    pub fn new(kind: TaskKind, delay: Duration) -> Self {
        Self {
            kind,
            handle: TaskHandle::new(),
            delay,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.handle.is_cancelled()
    }
}
