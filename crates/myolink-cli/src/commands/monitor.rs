use std::sync::Arc;

use super::Overrides;

pub fn run(overrides: &Overrides) {
    // Log lines would tear the alternate screen; failures are shown in the UI.
    super::init_logging("off");
    let config = super::load_config(overrides);
    let state = Arc::new(super::connect(config));

    let rt = super::runtime();
    let mut app = crate::tui::app::App::new(state, rt.handle().clone());
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
