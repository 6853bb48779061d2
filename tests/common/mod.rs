#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use supplygrid::state::data_model::{Field, FieldValue, Row, RowId, SupplierStatus};
use supplygrid::state::grid::{GridConfig, GridController};
use supplygrid::state::source::{BulkOutcome, SourceError, SupplierSource};
use supplygrid::state::task::{ScheduledTask, TaskKind};

#[derive(Default)]
struct MockState {
    rows: Vec<Row>,
    saves: Vec<(RowId, Field, FieldValue)>,
    failing_fields: BTreeSet<(RowId, Field)>,
    failing_rows: BTreeSet<RowId>,
    unavailable: bool,
}

/// In-memory supplier backend. Clones share state so a test can keep a
/// handle after moving one into the grid.
#[derive(Clone, Default)]
pub struct MockSource {
    state: Rc<RefCell<MockState>>,
}

impl MockSource {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        let source = Self::default();
        source.state.borrow_mut().rows = rows;
        source
    }

    pub fn rows(&self) -> Vec<Row> {
        self.state.borrow().rows.clone()
    }

    pub fn row(&self, id: &str) -> Option<Row> {
        self.state
            .borrow()
            .rows
            .iter()
            .find(|row| row.id.as_str() == id)
            .cloned()
    }

    /// Simulates a change made elsewhere, visible on the next fetch.
    pub fn set_field(&self, id: &str, field: Field, value: FieldValue) {
        let mut state = self.state.borrow_mut();
        if let Some(row) = state.rows.iter_mut().find(|row| row.id.as_str() == id) {
            row.set(field, value);
        }
    }

    pub fn remove_row(&self, id: &str) {
        self.state
            .borrow_mut()
            .rows
            .retain(|row| row.id.as_str() != id);
    }

    pub fn saves(&self) -> Vec<(RowId, Field, FieldValue)> {
        self.state.borrow().saves.clone()
    }

    pub fn fail_field(&self, id: &str, field: Field) {
        self.state
            .borrow_mut()
            .failing_fields
            .insert((RowId::new(id), field));
    }

    pub fn fail_row(&self, id: &str) {
        self.state.borrow_mut().failing_rows.insert(RowId::new(id));
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.borrow_mut().unavailable = unavailable;
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.state.borrow().unavailable {
            Err(SourceError::Unavailable("connection reset".to_string()))
        } else {
            Ok(())
        }
    }

    fn bulk<F>(&self, row_ids: &[RowId], mut apply: F) -> Result<BulkOutcome, SourceError>
    where
        F: FnMut(&mut Vec<Row>, &RowId),
    {
        self.check_available()?;
        let mut state = self.state.borrow_mut();
        let mut outcome = BulkOutcome::default();
        for row_id in row_ids {
            let exists = state.rows.iter().any(|row| &row.id == row_id);
            if !exists || state.failing_rows.contains(row_id) {
                outcome.failed.push(row_id.clone());
                continue;
            }
            apply(&mut state.rows, row_id);
            outcome.succeeded.push(row_id.clone());
        }
        Ok(outcome)
    }
}

impl SupplierSource for MockSource {
    async fn fetch_rows(&self) -> Result<Vec<Row>, SourceError> {
        self.check_available()?;
        Ok(self.rows())
    }

    async fn save_field(
        &self,
        row_id: &RowId,
        field: Field,
        value: &FieldValue,
    ) -> Result<Row, SourceError> {
        self.check_available()?;
        let mut state = self.state.borrow_mut();
        state.saves.push((row_id.clone(), field, value.clone()));
        if state.failing_fields.contains(&(row_id.clone(), field)) {
            return Err(SourceError::Rejected("simulated network error".to_string()));
        }

        let row = state
            .rows
            .iter_mut()
            .find(|row| &row.id == row_id)
            .ok_or_else(|| SourceError::NotFound(row_id.clone()))?;
        row.set(field, value.clone());
        Ok(row.clone())
    }

    async fn bulk_delete(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError> {
        self.bulk(row_ids, |rows, row_id| rows.retain(|row| &row.id != row_id))
    }

    async fn bulk_archive(&self, row_ids: &[RowId]) -> Result<BulkOutcome, SourceError> {
        self.bulk(row_ids, |rows, row_id| {
            if let Some(row) = rows.iter_mut().find(|row| &row.id == row_id) {
                row.status = SupplierStatus::Archived;
            }
        })
    }
}

pub fn rid(id: &str) -> RowId {
    RowId::new(id)
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub fn sample_rows() -> Vec<Row> {
    vec![
        Row::new("R1", "Acme")
            .with_website("acme.example.com")
            .with_phone("+1 555 010 0001"),
        Row::new("R2", "Borealis Supply").with_website("borealis.example.com"),
        Row::new("R3", "Cobalt Parts").with_status(SupplierStatus::OnHold),
        Row::new("R4", "Delta Fasteners"),
        Row::new("R5", "Evergreen Lumber"),
    ]
}

/// Grid over `sample_rows()` with the first fetch already applied.
pub async fn loaded_grid() -> (GridController<MockSource>, MockSource) {
    let source = MockSource::with_rows(sample_rows());
    let mut grid = GridController::new(source.clone(), GridConfig::default());
    grid.refresh().await;
    (grid, source)
}

/// Fires every queued debounce as if its delay had passed and returns the
/// other timers untouched.
pub fn fire_debounces(grid: &mut GridController<MockSource>) -> Vec<ScheduledTask> {
    let mut rest = Vec::new();
    for task in grid.take_tasks() {
        if matches!(task.kind, TaskKind::Debounce(_)) {
            grid.task_elapsed(&task);
        } else {
            rest.push(task);
        }
    }
    rest
}

/// Sends every queued save, including follow-ups queued by completions.
pub async fn run_saves(grid: &mut GridController<MockSource>) {
    loop {
        let saves = grid.take_saves();
        if saves.is_empty() {
            break;
        }
        for request in saves {
            grid.run_save(request).await;
        }
    }
}
