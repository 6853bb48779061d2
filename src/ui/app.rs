use dioxus::prelude::*;

use crate::config::Settings;
use crate::io::json_store::JsonFileSource;
use crate::state::selection::ClickTarget;
use crate::ui::actions::{self, SupplierGrid};
use crate::ui::table::Table;
use crate::ui::toolbar::{BatchActions, Toolbar};

const STYLES: Asset = asset!("/assets/styles.css");

#[component]
pub fn App() -> Element {
    let settings = use_hook(Settings::load);
    let refresh_interval = settings.refresh_interval();

    let mut grid = use_signal(|| {
        let source = JsonFileSource::new(settings.resolve_data_file());
        tracing::info!(path = %source.path().display(), "supplier store");
        SupplierGrid::new(source, settings.grid_config())
    });
    // Set by whichever region saw the click first; read by the app-level
    // handler once the click has bubbled up.
    let mut click_region = use_signal::<Option<ClickTarget>>(|| None);

    use_future(move || async move {
        actions::refresh(grid).await;
        let Some(interval) = refresh_interval else {
            return;
        };
        loop {
            tokio::time::sleep(interval).await;
            actions::refresh(grid).await;
        }
    });

    use_drop(move || {
        if let Ok(mut g) = grid.try_write() {
            g.dispose();
        }
    });

    rsx! {
        document::Stylesheet { href: STYLES }
        div {
            class: "app",
            onclick: move |_| {
                let target = click_region.take().unwrap_or(ClickTarget::Outside);
                if target == ClickTarget::Outside && !grid.read().selection().is_empty() {
                    grid.with_mut(|g| g.handle_click(target));
                }
            },
            Toolbar { grid, click_region }
            BatchActions { grid, click_region }
            Table { grid, click_region }
        }
    }
}
