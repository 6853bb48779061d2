use std::collections::BTreeMap;

use crate::state::data_model::{Field, FieldValue, Row, RowId};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Viewing,
    SingleRow(RowId),
    AllRows,
}

impl EditMode {
    pub fn is_editing(&self) -> bool {
        !matches!(self, EditMode::Viewing)
    }

    pub fn autosaves(&self) -> bool {
        matches!(self, EditMode::SingleRow(_))
    }
}

pub type PendingChangeSet = BTreeMap<RowId, BTreeMap<Field, FieldValue>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldChange {
    pub row_id: RowId,
    pub field: Field,
    pub value: FieldValue,
}

/// Edit mode plus the overlay of unsaved field edits.
///
/// `changes` survives switching between single-row and all-rows editing;
/// only `cancel_all` and `commit_saved` clear it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditSession {
    mode: EditMode,
    changes: PendingChangeSet,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn active_row_id(&self) -> Option<&RowId> {
        match &self.mode {
            EditMode::SingleRow(row_id) => Some(row_id),
            _ => None,
        }
    }

    pub fn start_row_edit(&mut self, row_id: RowId) {
        self.mode = EditMode::SingleRow(row_id);
    }

    pub fn toggle_row_edit(&mut self, row_id: &RowId) {
        if self.active_row_id() == Some(row_id) {
            self.mode = EditMode::Viewing;
        } else {
            self.mode = EditMode::SingleRow(row_id.clone());
        }
    }

    pub fn start_all_edit(&mut self) {
        self.mode = EditMode::AllRows;
    }

    pub fn exit(&mut self) {
        self.mode = EditMode::Viewing;
    }

    pub fn cancel_all(&mut self) {
        self.mode = EditMode::Viewing;
        self.changes.clear();
    }

    pub fn commit_saved(&mut self) {
        self.mode = EditMode::Viewing;
        self.changes.clear();
    }

    pub fn is_row_editable(&self, row_id: &RowId) -> bool {
        match &self.mode {
            EditMode::Viewing => false,
            EditMode::SingleRow(active) => active == row_id,
            EditMode::AllRows => true,
        }
    }

    pub fn has_row_changes(&self, row_id: &RowId) -> bool {
        self.changes.contains_key(row_id)
    }

    pub fn row_changes(&self, row_id: &RowId) -> Option<&BTreeMap<Field, FieldValue>> {
        self.changes.get(row_id)
    }

    pub fn pending_value(&self, row_id: &RowId, field: Field) -> Option<&FieldValue> {
        self.changes.get(row_id).and_then(|fields| fields.get(&field))
    }

    /// Records an edit against the authoritative `original` row. Editing a
    /// field back to its original value drops it from the overlay.
    pub fn set_change(&mut self, original: &Row, field: Field, value: FieldValue) {
        if original.get(field) == value {
            self.clear_field(&original.id, field);
            return;
        }

        self.changes
            .entry(original.id.clone())
            .or_default()
            .insert(field, value);
    }

    pub fn mark_persisted(&mut self, row_id: &RowId, field: Field, value: &FieldValue) {
        if self.pending_value(row_id, field) == Some(value) {
            self.clear_field(row_id, field);
        }
    }

    pub fn undo_row(&mut self, row_id: &RowId) -> bool {
        self.changes.remove(row_id).is_some()
    }

    pub fn remove_row(&mut self, row_id: &RowId) {
        self.changes.remove(row_id);
    }

    pub fn effective_row(&self, original: &Row) -> Row {
        let mut row = original.clone();
        if let Some(fields) = self.changes.get(&original.id) {
            for (field, value) in fields {
                row.set(*field, value.clone());
            }
        }
        row
    }

    pub fn changed_row_count(&self) -> usize {
        self.changes.len()
    }

    pub fn changes(&self) -> &PendingChangeSet {
        &self.changes
    }

    pub fn all_changes(&self) -> Vec<FieldChange> {
        self.changes
            .iter()
            .flat_map(|(row_id, fields)| {
                fields.iter().map(move |(field, value)| FieldChange {
                    row_id: row_id.clone(),
                    field: *field,
                    value: value.clone(),
                })
            })
            .collect()
    }

    fn clear_field(&mut self, row_id: &RowId, field: Field) {
        let now_empty = match self.changes.get_mut(row_id) {
            Some(fields) => {
                fields.remove(&field);
                fields.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.changes.remove(row_id);
        }
    }
}
