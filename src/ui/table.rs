use dioxus::prelude::*;

use crate::state::data_model::{Field, Row};
use crate::state::navigation::{FocusContext, FocusTarget};
use crate::state::selection::ClickTarget;
use crate::ui::actions::{self, SupplierGrid};
use crate::ui::cell::GridCell;

#[component]
pub fn Table(grid: Signal<SupplierGrid>, click_region: Signal<Option<ClickTarget>>) -> Element {
    let (rows, all_selected) = {
        let g = grid.read();
        let rows: Vec<(Row, bool)> = g
            .effective_rows()
            .into_iter()
            .map(|row| {
                let editable = g.is_row_editable(&row.id);
                (row, editable)
            })
            .collect();
        (rows, g.selection().are_all_selected(&g.row_ids()))
    };

    if rows.is_empty() {
        return rsx! {
            p { class: "empty-message", id: "empty-message", "No suppliers yet. Click \"Open\" to load a supplier list." }
        };
    }

    rsx! {
        div {
            class: "table-container",
            id: "table-container",
            tabindex: "0",
            onclick: move |_| click_region.set(Some(ClickTarget::Grid)),
            onkeydown: move |evt: KeyboardEvent| {
                actions::route_key(grid, evt, FocusContext::on(FocusTarget::Other));
            },
            table {
                thead {
                    tr {
                        th { class: "select-col",
                            input {
                                r#type: "checkbox",
                                id: "select-all",
                                checked: all_selected,
                                onchange: move |_| grid.with_mut(|g| g.toggle_select_all()),
                                onkeydown: move |evt: KeyboardEvent| {
                                    actions::route_key(grid, evt, FocusContext::on(FocusTarget::Checkbox));
                                },
                            }
                        }
                        for field in Field::ALL {
                            th { class: "col-{field.key()}", "{field.label()}" }
                        }
                        th { class: "actions-col" }
                    }
                }
                tbody {
                    for (index, (row, editable)) in rows.into_iter().enumerate() {
                        TableRow {
                            key: "{row.id}",
                            grid,
                            index,
                            editable,
                            row,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn TableRow(grid: Signal<SupplierGrid>, index: usize, row: Row, editable: bool) -> Element {
    let row_id = row.id.clone();
    let (selected, dirty) = {
        let g = grid.read();
        (g.selection().is_selected(&row_id), g.session().has_row_changes(&row_id))
    };

    let mut row_class = if index % 2 == 0 { "even" } else { "odd" }.to_string();
    if selected {
        row_class.push_str(" selected-row");
    }
    if editable {
        row_class.push_str(" editing-row");
    }
    if dirty {
        row_class.push_str(" dirty-row");
    }

    rsx! {
        tr { class: "{row_class}", id: "row-{index}",
            td { class: "select-col",
                input {
                    r#type: "checkbox",
                    id: "select-row-{index}",
                    checked: selected,
                    onchange: {
                        let row_id = row_id.clone();
                        move |_| {
                            grid.with_mut(|g| g.toggle_selected(&row_id));
                        }
                    },
                    onkeydown: move |evt: KeyboardEvent| {
                        actions::route_key(grid, evt, FocusContext::on(FocusTarget::Checkbox));
                    },
                }
            }
            for field in Field::ALL {
                GridCell {
                    key: "{row_id}-{field.key()}",
                    grid,
                    row_index: index,
                    row_id: row_id.clone(),
                    field,
                    editable,
                }
            }
            td { class: "actions-col",
                button {
                    class: "row-btn",
                    id: "btn-edit-{index}",
                    onclick: {
                        let row_id = row_id.clone();
                        move |_| {
                            let focus = grid.with_mut(|g| g.toggle_row_edit(&row_id));
                            if let Some(request) = focus {
                                actions::apply_focus(request);
                            }
                        }
                    },
                    onkeydown: move |evt: KeyboardEvent| {
                        actions::route_key(grid, evt, FocusContext::on(FocusTarget::Button));
                    },
                    if editable { "Done" } else { "Edit" }
                }
                if dirty {
                    button {
                        class: "row-btn",
                        id: "btn-undo-{index}",
                        onclick: {
                            let row_id = row_id.clone();
                            move |_| {
                                grid.with_mut(|g| g.undo_row(&row_id));
                            }
                        },
                        onkeydown: move |evt: KeyboardEvent| {
                            actions::route_key(grid, evt, FocusContext::on(FocusTarget::Button));
                        },
                        "\u{21A9} Undo"
                    }
                }
            }
        }
    }
}
