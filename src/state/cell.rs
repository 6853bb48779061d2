use std::time::Duration;

use crate::state::data_model::{Field, FieldValue, RowId};
use crate::state::edit_session::EditMode;
use crate::state::task::{CellKey, ScheduledTask, TaskHandle, TaskKind};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_STATUS_RESET: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellTimings {
    pub debounce: Duration,
    pub status_reset: Duration,
}

impl Default for CellTimings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            status_reset: DEFAULT_STATUS_RESET,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    pub row_id: RowId,
    pub field: Field,
    pub value: FieldValue,
    pub ticket: u64,
}

impl SaveRequest {
    pub fn key(&self) -> CellKey {
        (self.row_id.clone(), self.field)
    }
}

/// At most one save per cell is in flight. A save requested meanwhile is
/// queued and sent when the in-flight one settles, so an older value can
/// never land after a newer one.
#[derive(Debug)]
pub struct EditableCell {
    row_id: RowId,
    field: Field,
    local_value: FieldValue,
    server_value: FieldValue,
    last_saved_value: FieldValue,
    status: SaveStatus,
    error: Option<String>,
    focused: bool,
    debounce: Option<TaskHandle>,
    status_reset: Option<TaskHandle>,
    in_flight: Option<(u64, FieldValue)>,
    next_ticket: u64,
    resave_queued: bool,
    adopt_landing: bool,
    timings: CellTimings,
    tasks: Vec<ScheduledTask>,
}

impl EditableCell {
    pub fn new(
        row_id: RowId,
        field: Field,
        server_value: FieldValue,
        local_value: FieldValue,
        timings: CellTimings,
    ) -> Self {
        Self {
            row_id,
            field,
            local_value,
            last_saved_value: server_value.clone(),
            server_value,
            status: SaveStatus::Idle,
            error: None,
            focused: false,
            debounce: None,
            status_reset: None,
            in_flight: None,
            next_ticket: 0,
            resave_queued: false,
            adopt_landing: false,
            timings,
            tasks: Vec::new(),
        }
    }

    pub fn key(&self) -> CellKey {
        (self.row_id.clone(), self.field)
    }

    pub fn row_id(&self) -> &RowId {
        &self.row_id
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn local_value(&self) -> &FieldValue {
        &self.local_value
    }

    pub fn last_saved_value(&self) -> &FieldValue {
        &self.last_saved_value
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_save_pending(&self) -> bool {
        self.debounce.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn take_tasks(&mut self) -> Vec<ScheduledTask> {
        std::mem::take(&mut self.tasks)
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn update_value(&mut self, value: FieldValue, mode: &EditMode) {
        self.local_value = value;
        self.adopt_landing = false;
        self.cancel_debounce();

        if mode.autosaves() {
            let task = ScheduledTask::new(TaskKind::Debounce(self.key()), self.timings.debounce);
            self.debounce = Some(task.handle.clone());
            self.tasks.push(task);
        }
    }

    pub fn debounce_elapsed(&mut self, handle: &TaskHandle) -> Option<SaveRequest> {
        let live = !handle.is_cancelled()
            && self
                .debounce
                .as_ref()
                .is_some_and(|current| current.same_task(handle));
        if !live {
            return None;
        }

        self.debounce = None;
        self.begin_save()
    }

    pub fn blur(&mut self, mode: &EditMode) -> Option<SaveRequest> {
        self.focused = false;
        if !mode.autosaves() {
            return None;
        }

        let was_pending = self.debounce.is_some();
        self.cancel_debounce();
        let dirty =
            self.local_value != self.server_value && self.local_value != self.last_saved_value;

        if was_pending || dirty {
            self.begin_save()
        } else {
            None
        }
    }

    pub fn save_succeeded(&mut self, ticket: u64, value: FieldValue) -> Option<SaveRequest> {
        if !self.settle(ticket) {
            return None;
        }

        if std::mem::take(&mut self.adopt_landing) {
            self.local_value = value.clone();
        }
        self.last_saved_value = value;
        self.set_status(SaveStatus::Saved, None);
        self.follow_up(None)
    }

    pub fn save_failed(&mut self, ticket: u64, message: String) -> Option<SaveRequest> {
        let attempted = match &self.in_flight {
            Some((current, value)) if *current == ticket => value.clone(),
            _ => return None,
        };
        self.settle(ticket);
        self.adopt_landing = false;

        self.set_status(SaveStatus::Error, Some(message));
        self.follow_up(Some(&attempted))
    }

    pub fn mark_saved(&mut self, value: FieldValue) {
        self.last_saved_value = value;
        self.set_status(SaveStatus::Saved, None);
    }

    pub fn reject(&mut self, message: String) {
        self.set_status(SaveStatus::Error, Some(message));
    }

    pub fn reset_status(&mut self, handle: &TaskHandle) -> bool {
        let live = !handle.is_cancelled()
            && self
                .status_reset
                .as_ref()
                .is_some_and(|current| current.same_task(handle));
        if live {
            self.status_reset = None;
            self.status = SaveStatus::Idle;
            self.error = None;
        }
        live
    }

    /// `pending` is the session's overlay for this field. A field with an
    /// unsaved overlay keeps its local value whatever the server says.
    pub fn reconcile(&mut self, server: FieldValue, pending: Option<&FieldValue>, mode: &EditMode) {
        match mode {
            EditMode::Viewing => {
                self.local_value = server.clone();
                self.last_saved_value = server.clone();
            }
            EditMode::SingleRow(_) => {
                let adopt = !self.focused
                    && pending.is_none()
                    && self.in_flight.is_none()
                    && self.debounce.is_none()
                    && server != self.local_value
                    && server != self.last_saved_value;
                if adopt {
                    self.local_value = server.clone();
                    self.last_saved_value = server.clone();
                }
            }
            EditMode::AllRows => {}
        }
        self.server_value = server;
    }

    /// A save still in flight is not recalled; when it lands, the cell takes
    /// the persisted value so it cannot drift from the store.
    pub fn undo(&mut self, server: FieldValue) {
        self.cancel_debounce();
        self.cancel_status_reset();
        self.resave_queued = false;
        self.adopt_landing = self.in_flight.is_some();
        self.status = SaveStatus::Idle;
        self.error = None;
        self.local_value = server.clone();
        self.last_saved_value = server.clone();
        self.server_value = server;
    }

    fn begin_save(&mut self) -> Option<SaveRequest> {
        if let Err(err) = self.local_value.validate_for(self.field) {
            self.set_status(SaveStatus::Error, Some(err.to_string()));
            return None;
        }

        if self.in_flight.is_some() {
            self.resave_queued = true;
            return None;
        }

        if self.local_value == self.server_value && self.local_value == self.last_saved_value {
            return None;
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some((ticket, self.local_value.clone()));
        self.set_status(SaveStatus::Saving, None);

        Some(SaveRequest {
            row_id: self.row_id.clone(),
            field: self.field,
            value: self.local_value.clone(),
            ticket,
        })
    }

    fn settle(&mut self, ticket: u64) -> bool {
        match &self.in_flight {
            Some((current, _)) if *current == ticket => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    fn follow_up(&mut self, failed: Option<&FieldValue>) -> Option<SaveRequest> {
        if !std::mem::take(&mut self.resave_queued) || self.debounce.is_some() {
            return None;
        }

        let changed_since = match failed {
            Some(attempted) => self.local_value != *attempted,
            None => self.local_value != self.last_saved_value,
        };
        if changed_since {
            self.begin_save()
        } else {
            None
        }
    }

    fn set_status(&mut self, status: SaveStatus, error: Option<String>) {
        self.cancel_status_reset();
        self.status = status;
        self.error = error;

        if matches!(status, SaveStatus::Saved | SaveStatus::Error) {
            let task = ScheduledTask::new(
                TaskKind::StatusReset(self.key()),
                self.timings.status_reset,
            );
            self.status_reset = Some(task.handle.clone());
            self.tasks.push(task);
        }
    }

    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.cancel();
        }
    }

    fn cancel_status_reset(&mut self) {
        if let Some(handle) = self.status_reset.take() {
            handle.cancel();
        }
    }
}

impl Drop for EditableCell {
    fn drop(&mut self) {
        self.cancel_debounce();
        self.cancel_status_reset();
    }
}
