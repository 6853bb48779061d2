use dioxus::prelude::*;

use crate::state::cell::SaveStatus;
use crate::state::data_model::{Field, FieldKind, FieldValue, RowId, SupplierStatus};
use crate::state::navigation::{FocusContext, FocusTarget};
use crate::ui::actions::{self, SupplierGrid};

#[component]
pub fn GridCell(
    grid: Signal<SupplierGrid>,
    row_index: usize,
    row_id: RowId,
    field: Field,
    editable: bool,
) -> Element {
    let mut listbox_open = use_signal(|| false);

    let (value, status, error) = {
        let g = grid.read();
        (
            g.cell_value(&row_id, field),
            g.cell_status(&row_id, field),
            g.cell_error(&row_id, field).map(str::to_string),
        )
    };
    let value = value.unwrap_or_else(|| FieldValue::Text(String::new()));

    if !editable {
        return rsx! {
            td {
                class: "cell {field.key()}",
                onclick: {
                    let row_id = row_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.click_cell(&row_id, field));
                    }
                },
                "{value.display()}"
            }
        };
    }

    let input_id = match field.column_index() {
        Some(col) => actions::cell_input_id(row_index, col),
        None => format!("cell-input-{row_index}-{}", field.key()),
    };
    let status_class = status_class(status);
    let title = error.clone().unwrap_or_default();

    let control = match field.kind() {
        FieldKind::Boolean => rsx! {
            input {
                class: "cell-checkbox",
                id: "{input_id}",
                r#type: "checkbox",
                checked: matches!(value, FieldValue::Boolean(true)),
                onchange: {
                    let row_id = row_id.clone();
                    move |evt: FormEvent| {
                        grid.with_mut(|g| g.edit_value(&row_id, field, FieldValue::Boolean(evt.checked())));
                        actions::pump(grid);
                    }
                },
                onblur: {
                    let row_id = row_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.blur_input(&row_id, field));
                        actions::pump(grid);
                    }
                },
                onkeydown: move |evt: KeyboardEvent| {
                    actions::route_key(grid, evt, FocusContext::on(FocusTarget::Checkbox));
                },
            }
        },
        FieldKind::Enum => rsx! {
            select {
                class: "cell-select",
                id: "{input_id}",
                value: "{value.input_text()}",
                onclick: move |_| {
                    let open = !*listbox_open.read();
                    listbox_open.set(open);
                },
                onchange: {
                    let row_id = row_id.clone();
                    move |evt: FormEvent| {
                        listbox_open.set(false);
                        grid.with_mut(|g| g.edit_input(&row_id, field, &evt.value()));
                        actions::pump(grid);
                    }
                },
                onfocus: {
                    let row_id = row_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.focus_input(&row_id, field));
                    }
                },
                onblur: {
                    let row_id = row_id.clone();
                    move |_| {
                        listbox_open.set(false);
                        grid.with_mut(|g| g.blur_input(&row_id, field));
                        actions::pump(grid);
                    }
                },
                onkeydown: move |evt: KeyboardEvent| {
                    let ctx = FocusContext {
                        target: FocusTarget::Select,
                        listbox_open: *listbox_open.read(),
                    };
                    actions::route_key(grid, evt, ctx);
                    if ctx.listbox_open {
                        listbox_open.set(false);
                    }
                },
                for choice in SupplierStatus::all() {
                    option { value: "{choice.code()}", "{choice.label()}" }
                }
            }
        },
        FieldKind::Text | FieldKind::Url | FieldKind::Phone => rsx! {
            input {
                class: "cell-input",
                id: "{input_id}",
                r#type: "text",
                value: "{value.input_text()}",
                oninput: {
                    let row_id = row_id.clone();
                    let input_id = input_id.clone();
                    move |evt: FormEvent| {
                        grid.with_mut(|g| g.edit_input(&row_id, field, &evt.value()));
                        actions::pump(grid);
                        remember_cursor(grid, row_id.clone(), field, input_id.clone());
                    }
                },
                onfocus: {
                    let row_id = row_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.focus_input(&row_id, field));
                    }
                },
                onblur: {
                    let row_id = row_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.blur_input(&row_id, field));
                        actions::pump(grid);
                    }
                },
                onclick: {
                    let row_id = row_id.clone();
                    let input_id = input_id.clone();
                    move |_| {
                        grid.with_mut(|g| g.click_cell(&row_id, field));
                        remember_cursor(grid, row_id.clone(), field, input_id.clone());
                    }
                },
                onkeyup: {
                    let row_id = row_id.clone();
                    let input_id = input_id.clone();
                    move |_| remember_cursor(grid, row_id.clone(), field, input_id.clone())
                },
                onkeydown: move |evt: KeyboardEvent| {
                    actions::route_key(grid, evt, FocusContext::on(FocusTarget::TextInput));
                },
                onmounted: {
                    let row_id = row_id.clone();
                    let input_id = input_id.clone();
                    move |_| {
                        let g = grid.read();
                        let focused = g.focus_key(&row_id, field) == g.navigation().current();
                        if let Some(offsets) = g.restore_cursor(&row_id, field).filter(|_| focused) {
                            actions::restore_cursor(&input_id, offsets);
                        }
                    }
                },
            }
        },
    };

    rsx! {
        td { class: "cell editing-cell {field.key()} {status_class}", title: "{title}",
            {control}
            if let Some(mark) = status_mark(status) {
                span { class: "save-status", "{mark}" }
            }
        }
    }
}

fn remember_cursor(grid: Signal<SupplierGrid>, row_id: RowId, field: Field, input_id: String) {
    spawn(async move {
        if let Some((start, end)) = actions::read_cursor(&input_id).await {
            grid.read().record_cursor(&row_id, field, start, end);
        }
    });
}

fn status_mark(status: SaveStatus) -> Option<&'static str> {
    match status {
        SaveStatus::Idle => None,
        SaveStatus::Saving => Some("\u{2026}"),
        SaveStatus::Saved => Some("\u{2714}"),
        SaveStatus::Error => Some("\u{26A0}"),
    }
}

fn status_class(status: SaveStatus) -> &'static str {
    match status {
        SaveStatus::Idle => "",
        SaveStatus::Saving => "saving",
        SaveStatus::Saved => "saved",
        SaveStatus::Error => "save-error",
    }
}
