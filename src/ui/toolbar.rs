use dioxus::prelude::*;

use crate::state::edit_session::EditMode;
use crate::state::selection::ClickTarget;
use crate::ui::actions::{self, SupplierGrid};

#[component]
pub fn Toolbar(grid: Signal<SupplierGrid>, click_region: Signal<Option<ClickTarget>>) -> Element {
    let (mode, changed_rows, file_label, fetch_error, notice) = {
        let g = grid.read();
        (
            g.mode().clone(),
            g.session().changed_row_count(),
            g.source().path().display().to_string(),
            g.fetch_error().map(str::to_string),
            g.notice().map(str::to_string),
        )
    };
    let editing = mode.is_editing();
    let editing_all = mode == EditMode::AllRows;

    rsx! {
        div {
            class: "toolbar",
            onclick: move |_| click_region.set(Some(ClickTarget::Button)),

            // File group
            div { class: "toolbar-group",
                button {
                    class: "toolbar-btn",
                    id: "btn-open",
                    onclick: move |_| {
                        spawn(actions::open_store(grid));
                    },
                    "\u{1F4C2} Open"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-refresh",
                    onclick: move |_| {
                        spawn(actions::refresh(grid));
                    },
                    "\u{21BB} Refresh"
                }
                span { class: "file-path", id: "file-path", "{file_label}" }
            }
            div { class: "toolbar-separator" }

            // Edit group
            div { class: "toolbar-group",
                if !editing_all {
                    button {
                        class: "toolbar-btn",
                        id: "btn-edit-all",
                        onclick: move |_| grid.with_mut(|g| g.edit_all()),
                        "\u{270E} Edit all"
                    }
                }
                if editing {
                    button {
                        class: "toolbar-btn",
                        id: "btn-exit-edit",
                        onclick: move |_| grid.with_mut(|g| g.exit_edit()),
                        "Done"
                    }
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-save-all",
                    disabled: changed_rows == 0,
                    onclick: move |_| {
                        spawn(actions::save_all(grid));
                    },
                    "\u{1F4BE} Save all"
                }
                button {
                    class: "toolbar-btn",
                    id: "btn-cancel-all",
                    disabled: changed_rows == 0 && !editing,
                    onclick: move |_| grid.with_mut(|g| g.cancel_all()),
                    "\u{2715} Cancel all"
                }
                if changed_rows > 0 {
                    span { class: "changed-count", id: "changed-count", "{changed_rows} changed" }
                }
            }

            if let Some(message) = fetch_error {
                span { class: "error-message", id: "fetch-error", "\u{26A0} {message}" }
            }
            if let Some(message) = notice {
                span {
                    class: "notice",
                    id: "notice",
                    onclick: move |_| grid.with_mut(|g| g.dismiss_notice()),
                    "{message}"
                }
            }
        }
    }
}

#[component]
pub fn BatchActions(grid: Signal<SupplierGrid>, click_region: Signal<Option<ClickTarget>>) -> Element {
    let selected = grid.read().selection().count();
    if selected == 0 {
        return rsx! {};
    }

    rsx! {
        div {
            class: "batch-actions",
            id: "batch-actions",
            onclick: move |_| click_region.set(Some(ClickTarget::BatchActions)),
            span { class: "selected-count", "{selected} selected" }
            button {
                class: "toolbar-btn",
                id: "btn-archive-selected",
                onclick: move |_| {
                    spawn(actions::archive_selected(grid));
                },
                "Archive"
            }
            button {
                class: "toolbar-btn danger",
                id: "btn-delete-selected",
                onclick: move |_| {
                    spawn(actions::delete_selected(grid));
                },
                "\u{1F5D1} Delete"
            }
            button {
                class: "toolbar-btn",
                id: "btn-clear-selection",
                onclick: move |_| grid.with_mut(|g| g.clear_selection()),
                "Clear"
            }
        }
    }
}
