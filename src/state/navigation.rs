use std::ops::RangeInclusive;

use crate::state::task::FocusKey;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GridKey {
    Tab,
    ArrowUp,
    ArrowDown,
    Escape,
    Space,
    Delete,
    Char(char),
    #[default]
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyInput {
    pub key: GridKey,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: GridKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn shifted(key: GridKey) -> Self {
        Self {
            key,
            shift: true,
            ..Self::default()
        }
    }

    pub fn command(key: GridKey) -> Self {
        Self {
            key,
            ctrl: true,
            ..Self::default()
        }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Kind of element holding DOM focus when a key or click arrives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusTarget {
    #[default]
    None,
    TextInput,
    Select,
    TextArea,
    Checkbox,
    Button,
    Other,
}

impl FocusTarget {
    pub fn is_editable_control(self) -> bool {
        matches!(self, FocusTarget::TextInput | FocusTarget::Select)
    }

    pub fn is_text_entry(self) -> bool {
        matches!(
            self,
            FocusTarget::TextInput | FocusTarget::Select | FocusTarget::TextArea
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusContext {
    pub target: FocusTarget,
    pub listbox_open: bool,
}

impl FocusContext {
    pub fn on(target: FocusTarget) -> Self {
        Self {
            target,
            listbox_open: false,
        }
    }

    pub fn with_listbox_open(mut self) -> Self {
        self.listbox_open = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOrigin {
    Keyboard,
    Click,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorPlacement {
    End,
    Preserve,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusRequest {
    pub key: FocusKey,
    pub cursor: CursorPlacement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavOutcome {
    Ignored,
    Stay,
    Moved(FocusRequest),
    ExitEditing,
    DeferToListbox,
}

impl NavOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            NavOutcome::Stay | NavOutcome::Moved(_) | NavOutcome::ExitEditing
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationController {
    columns: Vec<usize>,
    current: Option<FocusKey>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(vec![0, 1, 2, 3])
    }
}

impl NavigationController {
    pub fn new(columns: Vec<usize>) -> Self {
        Self {
            columns,
            current: None,
        }
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn current(&self) -> Option<FocusKey> {
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn focus_cell(&mut self, key: FocusKey, origin: FocusOrigin) -> Option<FocusRequest> {
        if !self.columns.contains(&key.col) {
            return None;
        }

        self.current = Some(key);
        let cursor = match origin {
            FocusOrigin::Keyboard => CursorPlacement::End,
            FocusOrigin::Click => CursorPlacement::Preserve,
        };
        Some(FocusRequest { key, cursor })
    }

    pub fn move_to_row(&mut self, row: usize) {
        let col = self
            .current
            .map(|key| key.col)
            .or_else(|| self.columns.first().copied());
        if let Some(col) = col {
            self.current = Some(FocusKey::new(row, col));
        }
    }

    pub fn clamp_rows(&mut self, rows: Option<RangeInclusive<usize>>) {
        let (Some(current), Some(rows)) = (self.current, rows) else {
            self.current = None;
            return;
        };

        let row = current.row.clamp(*rows.start(), *rows.end());
        self.current = Some(FocusKey::new(row, current.col));
    }

    pub fn handle_key(
        &mut self,
        input: KeyInput,
        ctx: FocusContext,
        rows: RangeInclusive<usize>,
    ) -> NavOutcome {
        let is_nav_key = matches!(
            input.key,
            GridKey::Tab | GridKey::ArrowUp | GridKey::ArrowDown | GridKey::Escape
        );
        if !is_nav_key {
            return NavOutcome::Ignored;
        }
        if ctx.listbox_open {
            return NavOutcome::DeferToListbox;
        }
        if input.key == GridKey::Escape {
            self.current = None;
            return NavOutcome::ExitEditing;
        }

        let Some(current) = self.current else {
            return NavOutcome::Ignored;
        };

        let target = match input.key {
            GridKey::Tab if input.shift => self.previous_cell(current, &rows),
            GridKey::Tab => self.next_cell(current, &rows),
            GridKey::ArrowUp | GridKey::ArrowDown => {
                if !ctx.target.is_editable_control() {
                    return NavOutcome::Ignored;
                }
                vertical_neighbor(current, input.key == GridKey::ArrowDown, &rows)
            }
            _ => None,
        };

        match target.and_then(|key| self.focus_cell(key, FocusOrigin::Keyboard)) {
            Some(request) => NavOutcome::Moved(request),
            None => NavOutcome::Stay,
        }
    }

    fn column_position(&self, col: usize) -> Option<usize> {
        self.columns.iter().position(|c| *c == col)
    }

    fn next_cell(&self, current: FocusKey, rows: &RangeInclusive<usize>) -> Option<FocusKey> {
        let position = self.column_position(current.col)?;
        if let Some(col) = self.columns.get(position + 1) {
            return Some(FocusKey::new(current.row, *col));
        }

        let next_row = current.row + 1;
        if next_row > *rows.end() {
            return None;
        }
        self.columns
            .first()
            .map(|col| FocusKey::new(next_row, *col))
    }

    fn previous_cell(&self, current: FocusKey, rows: &RangeInclusive<usize>) -> Option<FocusKey> {
        let position = self.column_position(current.col)?;
        if position > 0 {
            return Some(FocusKey::new(current.row, self.columns[position - 1]));
        }

        if current.row <= *rows.start() {
            return None;
        }
        self.columns
            .last()
            .map(|col| FocusKey::new(current.row - 1, *col))
    }
}

fn vertical_neighbor(
    current: FocusKey,
    down: bool,
    rows: &RangeInclusive<usize>,
) -> Option<FocusKey> {
    let row = if down {
        current.row.checked_add(1).filter(|row| row <= rows.end())?
    } else {
        current.row.checked_sub(1).filter(|row| row >= rows.start())?
    };
    Some(FocusKey::new(row, current.col))
}
