use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::state::cell::{CellTimings, EditableCell, SaveRequest, SaveStatus};
use crate::state::data_model::{Field, FieldValue, Row, RowId, ValidationError};
use crate::state::edit_session::{EditMode, EditSession, FieldChange};
use crate::state::focus_ledger::{CursorOffsets, FocusLedger, DEFAULT_GRACE};
use crate::state::navigation::{
    FocusContext, FocusOrigin, FocusRequest, KeyInput, NavOutcome, NavigationController,
};
use crate::state::selection::{ClickTarget, SelectionController, SelectionOutcome};
use crate::state::source::{BulkOutcome, SourceError, SupplierSource};
use crate::state::task::{CellKey, FocusKey, ScheduledTask, TaskKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridConfig {
    pub timings: CellTimings,
    pub focus_grace: Duration,
    pub columns: Vec<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            timings: CellTimings::default(),
            focus_grace: DEFAULT_GRACE,
            columns: (0..Field::NAVIGABLE.len()).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Autosave,
    Held,
    NotEditable,
    Rejected,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyResponse {
    pub handled: bool,
    pub focus: Option<FocusRequest>,
    pub delete_requested: bool,
}

impl KeyResponse {
    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkAction {
    Save,
    Delete,
    Archive,
}

impl BulkAction {
    fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Save => "saved",
            BulkAction::Delete => "deleted",
            BulkAction::Archive => "archived",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkSummary {
    pub action: BulkAction,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BulkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of {}",
            self.action.past_tense(),
            self.succeeded,
            self.attempted
        )?;
        if self.failed > 0 {
            write!(f, "; {} failed", self.failed)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BulkSavePlan {
    pub changes: Vec<FieldChange>,
    pub rejected: Vec<(FieldChange, ValidationError)>,
}

pub struct GridController<S> {
    source: S,
    config: GridConfig,
    rows: Vec<Row>,
    session: EditSession,
    navigation: NavigationController,
    selection: SelectionController,
    focus: FocusLedger,
    cells: HashMap<CellKey, EditableCell>,
    tasks: Vec<ScheduledTask>,
    saves: Vec<SaveRequest>,
    fetch_error: Option<String>,
    notice: Option<String>,
}

impl<S: SupplierSource> GridController<S> {
    pub fn new(source: S, config: GridConfig) -> Self {
        Self {
            navigation: NavigationController::new(config.columns.clone()),
            focus: FocusLedger::new(config.focus_grace),
            source,
            config,
            rows: Vec::new(),
            session: EditSession::new(),
            selection: SelectionController::new(),
            cells: HashMap::new(),
            tasks: Vec::new(),
            saves: Vec::new(),
            fetch_error: None,
            notice: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn replace_source(&mut self, source: S) {
        self.source = source;
        self.rows.clear();
        self.session.cancel_all();
        self.selection.clear();
        self.navigation.clear();
        self.cells.clear();
        self.saves.clear();
        self.fetch_error = None;
        self.notice = None;
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|row| row.id.clone()).collect()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn mode(&self) -> &EditMode {
        self.session.mode()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn focus_ledger(&self) -> &FocusLedger {
        &self.focus
    }

    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_row_editable(&self, row_id: &RowId) -> bool {
        self.session.is_row_editable(row_id)
    }

    pub fn effective_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| self.session.effective_row(row))
            .collect()
    }

    pub fn row_index(&self, row_id: &RowId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == row_id)
    }

    pub fn focus_key(&self, row_id: &RowId, field: Field) -> Option<FocusKey> {
        let row = self.row_index(row_id)?;
        let col = field.column_index()?;
        Some(FocusKey::new(row, col))
    }

    /// Value to render for a cell: the cell's local value while it is
    /// mounted, otherwise the server row with pending edits applied.
    pub fn cell_value(&self, row_id: &RowId, field: Field) -> Option<FieldValue> {
        if let Some(cell) = self.cells.get(&(row_id.clone(), field)) {
            return Some(cell.local_value().clone());
        }
        let row = self.rows.iter().find(|row| &row.id == row_id)?;
        Some(self.session.effective_row(row).get(field))
    }

    pub fn cell_status(&self, row_id: &RowId, field: Field) -> SaveStatus {
        self.cells
            .get(&(row_id.clone(), field))
            .map(EditableCell::status)
            .unwrap_or_default()
    }

    pub fn cell_error(&self, row_id: &RowId, field: Field) -> Option<&str> {
        self.cells
            .get(&(row_id.clone(), field))
            .and_then(EditableCell::error)
    }

    pub fn cell(&self, row_id: &RowId, field: Field) -> Option<&EditableCell> {
        self.cells.get(&(row_id.clone(), field))
    }

    pub fn take_tasks(&mut self) -> Vec<ScheduledTask> {
        std::mem::take(&mut self.tasks)
    }

    pub fn take_saves(&mut self) -> Vec<SaveRequest> {
        std::mem::take(&mut self.saves)
    }

    // ---- data ----

    pub fn apply_fetch(&mut self, result: Result<Vec<Row>, SourceError>) {
        match result {
            Ok(rows) => {
                self.fetch_error = None;
                self.rows = rows;
                self.prune_vanished_rows();
                self.sync_cells();
            }
            Err(err) => {
                warn!(error = %err, "supplier refresh failed; keeping previous rows");
                self.fetch_error = Some(err.to_string());
            }
        }
    }

    pub async fn refresh(&mut self) {
        let result = self.source.fetch_rows().await;
        self.apply_fetch(result);
    }

    // ---- mode transitions ----

    pub fn toggle_row_edit(&mut self, row_id: &RowId) -> Option<FocusRequest> {
        if self.row_index(row_id).is_none() {
            return None;
        }

        self.session.toggle_row_edit(row_id);
        debug!(row = %row_id, mode = ?self.session.mode(), "row edit toggled");
        self.sync_cells();

        if !self.session.is_row_editable(row_id) {
            return None;
        }
        let row = self.row_index(row_id)?;
        let col = *self.config.columns.first()?;
        self.navigation
            .focus_cell(FocusKey::new(row, col), FocusOrigin::Keyboard)
    }

    pub fn edit_all(&mut self) {
        self.session.start_all_edit();
        debug!("editing all rows");
        self.sync_cells();
    }

    pub fn exit_edit(&mut self) {
        self.session.exit();
        debug!(pending = self.session.changed_row_count(), "left edit mode");
        self.sync_cells();
    }

    pub fn cancel_all(&mut self) {
        let discarded = self.session.changed_row_count();
        self.session.cancel_all();
        info!(discarded, "pending changes discarded");
        self.sync_cells();
    }

    pub fn undo_row(&mut self, row_id: &RowId) -> bool {
        if !self.session.undo_row(row_id) {
            return false;
        }
        let Some(row) = self.rows.iter().find(|row| &row.id == row_id) else {
            return true;
        };

        for field in Field::ALL {
            if let Some(cell) = self.cells.get_mut(&(row_id.clone(), field)) {
                cell.undo(row.get(field));
            }
        }
        true
    }

    // ---- editing ----

    pub fn edit_value(&mut self, row_id: &RowId, field: Field, value: FieldValue) -> EditOutcome {
        if !self.session.is_row_editable(row_id) {
            return EditOutcome::NotEditable;
        }
        let Some(original) = self.rows.iter().find(|row| &row.id == row_id) else {
            return EditOutcome::NotEditable;
        };

        self.session.set_change(original, field, value.clone());
        let mode = self.session.mode().clone();
        let key = (row_id.clone(), field);
        let timings = self.config.timings;
        let cell = self.cells.entry(key).or_insert_with(|| {
            EditableCell::new(
                row_id.clone(),
                field,
                original.get(field),
                original.get(field),
                timings,
            )
        });
        cell.update_value(value, &mode);
        self.tasks.extend(cell.take_tasks());

        if mode.autosaves() {
            EditOutcome::Autosave
        } else {
            EditOutcome::Held
        }
    }

    pub fn edit_input(&mut self, row_id: &RowId, field: Field, input: &str) -> EditOutcome {
        match FieldValue::from_input(field, input) {
            Ok(value) => self.edit_value(row_id, field, value),
            Err(err) => {
                if let Some(cell) = self.cells.get_mut(&(row_id.clone(), field)) {
                    cell.reject(err.to_string());
                    self.tasks.extend(cell.take_tasks());
                }
                EditOutcome::Rejected
            }
        }
    }

    pub fn focus_input(&mut self, row_id: &RowId, field: Field) {
        if let Some(cell) = self.cells.get_mut(&(row_id.clone(), field)) {
            cell.focus();
        }
        if let Some(key) = self.focus_key(row_id, field) {
            if self.navigation.current() != Some(key) {
                self.navigation.focus_cell(key, FocusOrigin::Keyboard);
            }
        }
    }

    pub fn blur_input(&mut self, row_id: &RowId, field: Field) {
        let mode = self.session.mode().clone();
        if let Some(cell) = self.cells.get_mut(&(row_id.clone(), field)) {
            if let Some(request) = cell.blur(&mode) {
                debug!(row = %row_id, field = field.key(), "flushing edit on blur");
                self.saves.push(request);
            }
            self.tasks.extend(cell.take_tasks());
        }

        if let Some(task) = self
            .focus_key(row_id, field)
            .and_then(|key| self.focus.forget(key))
        {
            self.tasks.push(task);
        }
    }

    /// Mouse click on a cell. The click's own cursor position is kept and
    /// the selection is left alone.
    pub fn click_cell(&mut self, row_id: &RowId, field: Field) -> Option<FocusRequest> {
        self.selection.handle_click(ClickTarget::Grid);
        if !self.session.is_row_editable(row_id) {
            return None;
        }
        let key = self.focus_key(row_id, field)?;
        self.navigation.focus_cell(key, FocusOrigin::Click)
    }

    pub fn record_cursor(&self, row_id: &RowId, field: Field, start: usize, end: usize) {
        if let Some(key) = self.focus_key(row_id, field) {
            self.focus.record(key, start, end);
        }
    }

    pub fn restore_cursor(&self, row_id: &RowId, field: Field) -> Option<CursorOffsets> {
        self.focus_key(row_id, field)
            .and_then(|key| self.focus.get(key))
    }

    // ---- effects ----

    pub fn task_elapsed(&mut self, task: &ScheduledTask) {
        if !task.is_live() {
            return;
        }

        match &task.kind {
            TaskKind::Debounce(key) => {
                if let Some(cell) = self.cells.get_mut(key) {
                    if let Some(request) = cell.debounce_elapsed(&task.handle) {
                        debug!(row = %request.row_id, field = request.field.key(), "autosave");
                        self.saves.push(request);
                    }
                    self.tasks.extend(cell.take_tasks());
                }
            }
            TaskKind::StatusReset(key) => {
                if let Some(cell) = self.cells.get_mut(key) {
                    cell.reset_status(&task.handle);
                }
            }
            TaskKind::FocusEviction(key) => {
                self.focus.evict(*key, &task.handle);
            }
        }
    }

    pub fn complete_save(&mut self, request: SaveRequest, result: Result<Row, SourceError>) {
        let key = request.key();
        match result {
            Ok(row) => {
                let follow_up = self.cells.get_mut(&key).and_then(|cell| {
                    let next = cell.save_succeeded(request.ticket, request.value.clone());
                    self.tasks.extend(cell.take_tasks());
                    next
                });
                self.session
                    .mark_persisted(&request.row_id, request.field, &request.value);
                self.replace_row(row);
                self.sync_cells();
                self.saves.extend(follow_up);
            }
            Err(err) => {
                warn!(
                    row = %request.row_id,
                    field = request.field.key(),
                    error = %err,
                    "autosave failed; keeping local value"
                );
                let follow_up = self.cells.get_mut(&key).and_then(|cell| {
                    let next = cell.save_failed(request.ticket, err.to_string());
                    self.tasks.extend(cell.take_tasks());
                    next
                });
                self.saves.extend(follow_up);
            }
        }
    }

    pub async fn run_save(&mut self, request: SaveRequest) {
        let result = self
            .source
            .save_field(&request.row_id, request.field, &request.value)
            .await;
        self.complete_save(request, result);
    }

    // ---- bulk save ----

    pub fn prepare_bulk_save(&mut self) -> BulkSavePlan {
        let mut plan = BulkSavePlan::default();
        for change in self.session.all_changes() {
            match change.value.validate_for(change.field) {
                Ok(()) => plan.changes.push(change),
                Err(err) => {
                    if let Some(cell) = self.cells.get_mut(&(change.row_id.clone(), change.field)) {
                        cell.reject(err.to_string());
                        self.tasks.extend(cell.take_tasks());
                    }
                    plan.rejected.push((change, err));
                }
            }
        }
        plan
    }

    pub fn apply_bulk_save(
        &mut self,
        plan: BulkSavePlan,
        results: Vec<(FieldChange, Result<Row, SourceError>)>,
    ) -> BulkSummary {
        let mut attempted: BTreeSet<RowId> = BTreeSet::new();
        let mut failed: BTreeSet<RowId> = BTreeSet::new();

        for (change, err) in &plan.rejected {
            warn!(row = %change.row_id, field = change.field.key(), error = %err, "bulk save skipped invalid value");
            attempted.insert(change.row_id.clone());
            failed.insert(change.row_id.clone());
        }

        for (change, result) in results {
            attempted.insert(change.row_id.clone());
            let key = (change.row_id.clone(), change.field);
            match result {
                Ok(row) => {
                    self.session
                        .mark_persisted(&change.row_id, change.field, &change.value);
                    if let Some(cell) = self.cells.get_mut(&key) {
                        cell.mark_saved(change.value.clone());
                        self.tasks.extend(cell.take_tasks());
                    }
                    self.replace_row(row);
                }
                Err(err) => {
                    warn!(row = %change.row_id, field = change.field.key(), error = %err, "bulk save failed");
                    if let Some(cell) = self.cells.get_mut(&key) {
                        cell.reject(err.to_string());
                        self.tasks.extend(cell.take_tasks());
                    }
                    failed.insert(change.row_id.clone());
                }
            }
        }

        let summary = BulkSummary {
            action: BulkAction::Save,
            attempted: attempted.len(),
            succeeded: attempted.len() - failed.len(),
            failed: failed.len(),
        };

        if summary.is_complete() {
            self.session.commit_saved();
        }
        self.sync_cells();
        info!(%summary, "bulk save finished");
        self.notice = Some(summary.to_string());
        summary
    }

    pub async fn save_all(&mut self) -> BulkSummary {
        let plan = self.prepare_bulk_save();
        let mut results = Vec::with_capacity(plan.changes.len());
        for change in &plan.changes {
            let result = self
                .source
                .save_field(&change.row_id, change.field, &change.value)
                .await;
            results.push((change.clone(), result));
        }
        self.apply_bulk_save(plan, results)
    }

    // ---- bulk delete / archive ----

    pub fn apply_bulk_delete(
        &mut self,
        requested: &[RowId],
        result: Result<BulkOutcome, SourceError>,
    ) -> BulkSummary {
        let outcome = self.bulk_outcome(BulkAction::Delete, requested, result);
        let deleted: BTreeSet<&RowId> = outcome.succeeded.iter().collect();

        self.selection.remove(&outcome.succeeded);
        self.rows.retain(|row| !deleted.contains(&row.id));
        for row_id in &outcome.succeeded {
            self.session.remove_row(row_id);
        }
        if self
            .session
            .active_row_id()
            .is_some_and(|active| deleted.contains(active))
        {
            self.session.exit();
        }
        self.sync_cells();

        self.finish_bulk(BulkAction::Delete, &outcome)
    }

    pub fn apply_bulk_archive(
        &mut self,
        requested: &[RowId],
        result: Result<BulkOutcome, SourceError>,
    ) -> BulkSummary {
        let outcome = self.bulk_outcome(BulkAction::Archive, requested, result);
        self.selection.remove(&outcome.succeeded);
        self.finish_bulk(BulkAction::Archive, &outcome)
    }

    pub async fn delete_selected(&mut self) -> Option<BulkSummary> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return None;
        }
        let result = self.source.bulk_delete(&ids).await;
        Some(self.apply_bulk_delete(&ids, result))
    }

    pub async fn archive_selected(&mut self) -> Option<BulkSummary> {
        let ids = self.selection.ids();
        if ids.is_empty() {
            return None;
        }
        let result = self.source.bulk_archive(&ids).await;
        let summary = self.apply_bulk_archive(&ids, result);
        self.refresh().await;
        Some(summary)
    }

    // ---- input routing ----

    pub fn handle_key(&mut self, input: KeyInput, ctx: FocusContext) -> KeyResponse {
        if self.session.mode().is_editing() {
            if let Some(rows) = self.navigable_rows() {
                match self.navigation.handle_key(input, ctx, rows) {
                    NavOutcome::Moved(request) => {
                        return KeyResponse {
                            handled: true,
                            focus: Some(request),
                            delete_requested: false,
                        };
                    }
                    NavOutcome::ExitEditing => {
                        self.exit_edit();
                        return KeyResponse::handled();
                    }
                    NavOutcome::Stay => return KeyResponse::handled(),
                    NavOutcome::DeferToListbox => return KeyResponse::default(),
                    NavOutcome::Ignored => {}
                }
            }
        }

        let row_ids = self.row_ids();
        let cursor_row = self.navigation.current().map(|key| key.row);
        match self
            .selection
            .handle_shortcut(input, ctx, cursor_row, &row_ids)
        {
            SelectionOutcome::Ignored => KeyResponse::default(),
            SelectionOutcome::SelectedAll | SelectionOutcome::Toggled(_) => KeyResponse::handled(),
            SelectionOutcome::Extended { cursor } => {
                self.navigation.move_to_row(cursor);
                KeyResponse::handled()
            }
            SelectionOutcome::RequestBulkDelete => KeyResponse {
                handled: true,
                focus: None,
                delete_requested: true,
            },
        }
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        self.selection.handle_click(target)
    }

    /// Row checkbox or row header click; also parks the row cursor there so
    /// Space and Shift+Arrow work from it.
    pub fn toggle_selected(&mut self, row_id: &RowId) -> bool {
        if let Some(row) = self.row_index(row_id) {
            self.navigation.move_to_row(row);
        }
        self.selection.toggle(row_id)
    }

    pub fn toggle_select_all(&mut self) {
        let row_ids = self.row_ids();
        if self.selection.are_all_selected(&row_ids) {
            self.selection.clear();
        } else {
            self.selection.select_all(row_ids);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn dispose(&mut self) {
        self.cells.clear();
        self.tasks.clear();
        self.focus.dispose();
    }

    // ---- internals ----

    fn navigable_rows(&self) -> Option<RangeInclusive<usize>> {
        match self.session.mode() {
            EditMode::SingleRow(row_id) => self.row_index(row_id).map(|row| row..=row),
            EditMode::Viewing | EditMode::AllRows => {
                self.rows.len().checked_sub(1).map(|last| 0..=last)
            }
        }
    }

    fn replace_row(&mut self, row: Row) {
        if let Some(existing) = self.rows.iter_mut().find(|r| r.id == row.id) {
            *existing = row;
        }
    }

    fn prune_vanished_rows(&mut self) {
        let present: BTreeSet<RowId> = self.row_ids().into_iter().collect();

        let vanished: Vec<RowId> = self
            .session
            .changes()
            .keys()
            .filter(|row_id| !present.contains(*row_id))
            .cloned()
            .collect();
        for row_id in &vanished {
            debug!(row = %row_id, "dropping pending changes for vanished row");
            self.session.remove_row(row_id);
        }

        self.selection.retain(|row_id| present.contains(row_id));
        if self
            .session
            .active_row_id()
            .is_some_and(|active| !present.contains(active))
        {
            self.session.exit();
        }
    }

    fn sync_cells(&mut self) {
        let session = &self.session;
        let present: BTreeSet<&RowId> = self.rows.iter().map(|row| &row.id).collect();
        self.cells
            .retain(|(row_id, _), _| present.contains(row_id) && session.is_row_editable(row_id));

        let mode = session.mode().clone();
        for row in &self.rows {
            if !session.is_row_editable(&row.id) {
                continue;
            }
            let effective = session.effective_row(row);
            for field in Field::ALL {
                let key = (row.id.clone(), field);
                match self.cells.get_mut(&key) {
                    Some(cell) => cell.reconcile(
                        row.get(field),
                        session.pending_value(&row.id, field),
                        &mode,
                    ),
                    None => {
                        let cell = EditableCell::new(
                            row.id.clone(),
                            field,
                            row.get(field),
                            effective.get(field),
                            self.config.timings,
                        );
                        self.cells.insert(key, cell);
                    }
                }
            }
        }

        let rows = self.navigable_rows();
        self.navigation.clamp_rows(rows);
    }

    fn bulk_outcome(
        &self,
        action: BulkAction,
        requested: &[RowId],
        result: Result<BulkOutcome, SourceError>,
    ) -> BulkOutcome {
        result.unwrap_or_else(|err| {
            warn!(action = action.past_tense(), error = %err, "bulk action failed");
            BulkOutcome {
                succeeded: Vec::new(),
                failed: requested.to_vec(),
            }
        })
    }

    fn finish_bulk(&mut self, action: BulkAction, outcome: &BulkOutcome) -> BulkSummary {
        let summary = BulkSummary {
            action,
            attempted: outcome.attempted(),
            succeeded: outcome.count(),
            failed: outcome.failed.len(),
        };
        info!(%summary, "bulk action finished");
        self.notice = Some(summary.to_string());
        summary
    }
}
