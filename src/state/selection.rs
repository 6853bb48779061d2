use std::collections::BTreeSet;

use crate::state::data_model::RowId;
use crate::state::navigation::{FocusContext, FocusTarget, GridKey, KeyInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    Grid,
    FormControl,
    Button,
    BatchActions,
    Outside,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    Ignored,
    SelectedAll,
    Toggled(RowId),
    Extended { cursor: usize },
    RequestBulkDelete,
}

/// Set of checked rows. Independent of the edit session: editing a cell
/// never changes it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: BTreeSet<RowId>,
    anchor: Option<usize>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, row_id: &RowId) -> bool {
        if self.selected.remove(row_id) {
            false
        } else {
            self.selected.insert(row_id.clone());
            true
        }
    }

    pub fn select_all<I>(&mut self, row_ids: I)
    where
        I: IntoIterator<Item = RowId>,
    {
        self.selected.extend(row_ids);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    pub fn extend_range<F>(&mut self, from: usize, to: usize, row_id_for_index: F)
    where
        F: Fn(usize) -> Option<RowId>,
    {
        let (low, high) = if from <= to { (from, to) } else { (to, from) };
        for index in low..=high {
            if let Some(row_id) = row_id_for_index(index) {
                self.selected.insert(row_id);
            }
        }
    }

    pub fn is_selected(&self, row_id: &RowId) -> bool {
        self.selected.contains(row_id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<RowId> {
        self.selected.iter().cloned().collect()
    }

    pub fn are_all_selected(&self, row_ids: &[RowId]) -> bool {
        !row_ids.is_empty() && row_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn remove(&mut self, row_ids: &[RowId]) {
        for row_id in row_ids {
            self.selected.remove(row_id);
        }
    }

    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&RowId) -> bool,
    {
        self.selected.retain(keep);
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> bool {
        if target != ClickTarget::Outside || self.selected.is_empty() {
            return false;
        }
        self.clear();
        true
    }

    pub fn handle_shortcut(
        &mut self,
        input: KeyInput,
        ctx: FocusContext,
        cursor_row: Option<usize>,
        row_ids: &[RowId],
    ) -> SelectionOutcome {
        if ctx.target.is_text_entry() || ctx.listbox_open {
            return SelectionOutcome::Ignored;
        }

        match input.key {
            GridKey::Char('a') | GridKey::Char('A') if input.has_command() => {
                self.select_all(row_ids.iter().cloned());
                SelectionOutcome::SelectedAll
            }
            // Space activates a focused checkbox or button natively.
            GridKey::Space if matches!(ctx.target, FocusTarget::Checkbox | FocusTarget::Button) => {
                SelectionOutcome::Ignored
            }
            GridKey::Space => {
                let Some(row_id) = cursor_row.and_then(|row| row_ids.get(row)) else {
                    return SelectionOutcome::Ignored;
                };
                self.toggle(row_id);
                self.anchor = cursor_row;
                SelectionOutcome::Toggled(row_id.clone())
            }
            GridKey::Delete if !self.selected.is_empty() => SelectionOutcome::RequestBulkDelete,
            GridKey::ArrowUp | GridKey::ArrowDown if input.shift => {
                let (Some(cursor), Some(last)) = (cursor_row, row_ids.len().checked_sub(1)) else {
                    return SelectionOutcome::Ignored;
                };
                let target = if input.key == GridKey::ArrowDown {
                    (cursor + 1).min(last)
                } else {
                    cursor.saturating_sub(1)
                };
                let anchor = *self.anchor.get_or_insert(cursor);
                self.extend_range(anchor, target, |index| row_ids.get(index).cloned());
                SelectionOutcome::Extended { cursor: target }
            }
            _ => SelectionOutcome::Ignored,
        }
    }
}
