use supplygrid::config::Settings;
use supplygrid::ui::app::App;

fn main() {
    let settings = Settings::load_from(&Settings::config_path());
    let level = settings
        .as_ref()
        .map(Settings::log_level)
        .unwrap_or(tracing::Level::INFO);
    if let Err(err) = dioxus::logger::init(level) {
        eprintln!("logger already initialised: {err}");
    }
    if let Err(err) = settings {
        tracing::warn!(error = %err, "settings unreadable; using defaults");
    }

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::WindowBuilder::new()
                    .with_title("Suppliers")
                    .with_inner_size(dioxus::desktop::LogicalSize::new(1200.0, 800.0)),
            ),
        )
        .launch(App);
}
