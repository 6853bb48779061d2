use dioxus::prelude::{Key, *};

use crate::io::json_store::JsonFileSource;
use crate::state::focus_ledger::CursorOffsets;
use crate::state::grid::GridController;
use crate::state::navigation::{CursorPlacement, FocusContext, FocusRequest, GridKey, KeyInput};
use crate::state::source::SupplierSource;

pub type SupplierGrid = GridController<JsonFileSource>;

pub fn cell_input_id(row_index: usize, col: usize) -> String {
    format!("cell-input-{row_index}-{col}")
}

/// Runs every timer and save the controller has queued. Each finished task
/// may queue more work, so completions pump again.
pub fn pump(mut grid: Signal<SupplierGrid>) {
    let (tasks, saves) = grid.with_mut(|g| (g.take_tasks(), g.take_saves()));

    for task in tasks {
        spawn(async move {
            let mut grid = grid;
            if task.handle.elapsed(task.delay).await {
                grid.with_mut(|g| g.task_elapsed(&task));
                pump(grid);
            }
        });
    }

    for request in saves {
        spawn(async move {
            let mut grid = grid;
            let source = grid.read().source().clone();
            let result = source
                .save_field(&request.row_id, request.field, &request.value)
                .await;
            grid.with_mut(|g| g.complete_save(request, result));
            pump(grid);
        });
    }
}

pub async fn refresh(mut grid: Signal<SupplierGrid>) {
    let source = grid.read().source().clone();
    let result = source.fetch_rows().await;
    grid.with_mut(|g| g.apply_fetch(result));
    pump(grid);
}

pub async fn save_all(mut grid: Signal<SupplierGrid>) {
    let (plan, source) = grid.with_mut(|g| (g.prepare_bulk_save(), g.source().clone()));

    let mut results = Vec::with_capacity(plan.changes.len());
    for change in &plan.changes {
        let result = source
            .save_field(&change.row_id, change.field, &change.value)
            .await;
        results.push((change.clone(), result));
    }

    grid.with_mut(|g| g.apply_bulk_save(plan, results));
    pump(grid);
}

pub async fn delete_selected(mut grid: Signal<SupplierGrid>) {
    let (ids, source) = {
        let g = grid.read();
        (g.selection().ids(), g.source().clone())
    };
    if ids.is_empty() {
        return;
    }

    let result = source.bulk_delete(&ids).await;
    grid.with_mut(|g| g.apply_bulk_delete(&ids, result));
    pump(grid);
}

pub async fn archive_selected(mut grid: Signal<SupplierGrid>) {
    let (ids, source) = {
        let g = grid.read();
        (g.selection().ids(), g.source().clone())
    };
    if ids.is_empty() {
        return;
    }

    let result = source.bulk_archive(&ids).await;
    grid.with_mut(|g| g.apply_bulk_archive(&ids, result));
    refresh(grid).await;
}

pub async fn open_store(mut grid: Signal<SupplierGrid>) {
    let picked = rfd::AsyncFileDialog::new()
        .add_filter("Supplier list", &["json"])
        .pick_file()
        .await;

    if let Some(handle) = picked {
        let path = handle.path().to_path_buf();
        tracing::info!(path = %path.display(), "opening supplier store");
        grid.with_mut(|g| g.replace_source(JsonFileSource::new(path)));
        refresh(grid).await;
    }
}

/// Routes a keydown from a control whose kind is known and keeps it from
/// reaching the table container.
pub fn route_key(mut grid: Signal<SupplierGrid>, evt: KeyboardEvent, ctx: FocusContext) {
    let input = key_input(&evt);
    let response = grid.with_mut(|g| g.handle_key(input, ctx));
    evt.stop_propagation();

    if response.handled {
        evt.prevent_default();
    }
    if let Some(request) = response.focus {
        apply_focus(request);
    }
    if response.delete_requested {
        spawn(delete_selected(grid));
    }
    pump(grid);
}

pub fn key_input(evt: &KeyboardEvent) -> KeyInput {
    let key = match evt.key() {
        Key::Tab => GridKey::Tab,
        Key::ArrowUp => GridKey::ArrowUp,
        Key::ArrowDown => GridKey::ArrowDown,
        Key::Escape => GridKey::Escape,
        Key::Delete => GridKey::Delete,
        Key::Character(text) if text == " " => GridKey::Space,
        Key::Character(text) => text.chars().next().map(GridKey::Char).unwrap_or_default(),
        _ => GridKey::Other,
    };

    let modifiers = evt.modifiers();
    KeyInput {
        key,
        shift: modifiers.shift(),
        ctrl: modifiers.ctrl(),
        meta: modifiers.meta(),
    }
}

/// Focuses the requested cell input once the next frame has painted.
pub fn apply_focus(request: FocusRequest) {
    let id = cell_input_id(request.key.row, request.key.col);
    let to_end = matches!(request.cursor, CursorPlacement::End);
    let script = format!(
        r#"requestAnimationFrame(() => {{
            const el = document.getElementById("{id}");
            if (!el) return;
            if (document.activeElement !== el) el.focus();
            if ({to_end} && typeof el.setSelectionRange === "function") {{
                const end = el.value.length;
                el.setSelectionRange(end, end);
            }}
        }});"#
    );
    document::eval(&script);
}

pub fn restore_cursor(id: &str, offsets: CursorOffsets) {
    let CursorOffsets { start, end } = offsets;
    let script = format!(
        r#"requestAnimationFrame(() => {{
            const el = document.getElementById("{id}");
            if (!el) return;
            el.focus();
            if (typeof el.setSelectionRange === "function") el.setSelectionRange({start}, {end});
        }});"#
    );
    document::eval(&script);
}

pub async fn read_cursor(id: &str) -> Option<(usize, usize)> {
    let script = format!(
        r#"const el = document.getElementById("{id}");
        if (!el || el.selectionStart == null) return null;
        return [el.selectionStart, el.selectionEnd];"#
    );
    let value = document::eval(&script).await.ok()?;
    serde_json::from_value::<Option<(usize, usize)>>(value)
        .ok()
        .flatten()
}
