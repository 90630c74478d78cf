#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> eframe::Result<()> {
    use eventline::app::EventlineApp;

    tracing_subscriber::fmt::init();

    eframe::run_native(
        "eventline",
        eframe::NativeOptions {
            ..Default::default()
        },
        Box::new(|cc| Ok(Box::new(EventlineApp::new(cc)))),
    )
}
