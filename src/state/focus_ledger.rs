use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::state::task::{FocusKey, ScheduledTask, TaskHandle, TaskKind};

pub const DEFAULT_GRACE: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorOffsets {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug)]
struct LedgerEntry {
    offsets: CursorOffsets,
    eviction: Option<TaskHandle>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    entries: HashMap<FocusKey, LedgerEntry>,
    disposed: bool,
}

/// Remembers the cursor of each cell input so it can be restored when a
/// refresh tears the input down and recreates it.
///
/// One ledger belongs to one grid; clones share the same entries.
#[derive(Clone, Debug)]
pub struct FocusLedger {
    grace: Duration,
    inner: Rc<RefCell<LedgerInner>>,
}

impl Default for FocusLedger {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl PartialEq for FocusLedger {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl FocusLedger {
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            inner: Rc::new(RefCell::new(LedgerInner::default())),
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    pub fn record(&self, key: FocusKey, start: usize, end: usize) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }

        let offsets = CursorOffsets {
            start: start.min(end),
            end: start.max(end),
        };
        let entry = inner.entries.entry(key).or_insert(LedgerEntry {
            offsets,
            eviction: None,
        });
        entry.offsets = offsets;
        if let Some(pending) = entry.eviction.take() {
            pending.cancel();
        }
    }

    pub fn get(&self, key: FocusKey) -> Option<CursorOffsets> {
        self.inner
            .borrow()
            .entries
            .get(&key)
            .map(|entry| entry.offsets)
    }

    /// Schedules removal of `key` after the grace period. Returns `None` when
    /// there is nothing to forget.
    pub fn forget(&self, key: FocusKey) -> Option<ScheduledTask> {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return None;
        }

        let entry = inner.entries.get_mut(&key)?;
        if let Some(previous) = entry.eviction.take() {
            previous.cancel();
        }
        let task = ScheduledTask::new(TaskKind::FocusEviction(key), self.grace);
        entry.eviction = Some(task.handle.clone());
        Some(task)
    }

    pub fn evict(&self, key: FocusKey, handle: &TaskHandle) -> bool {
        if handle.is_cancelled() {
            return false;
        }

        let mut inner = self.inner.borrow_mut();
        let current = inner
            .entries
            .get(&key)
            .and_then(|entry| entry.eviction.as_ref())
            .is_some_and(|pending| pending.same_task(handle));
        if current {
            inner.entries.remove(&key);
        }
        current
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        for entry in inner.entries.values_mut() {
            if let Some(pending) = entry.eviction.take() {
                pending.cancel();
            }
        }
        inner.entries.clear();
        inner.disposed = true;
    }
}
