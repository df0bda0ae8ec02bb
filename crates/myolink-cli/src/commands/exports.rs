//! `myolink exports` — list saved sessions.

use myolink_core::list_exports;

use super::Overrides;

pub fn run(overrides: &Overrides) {
    super::init_logging("warn");
    let config = super::load_config(overrides);
    let dir = &config.downloads_dir;

    let exports = match list_exports(dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading {}: {e}", dir.display());
            std::process::exit(1);
        }
    };

    if exports.is_empty() {
        println!("No sessions in {}", dir.display());
        return;
    }

    println!("{} session(s) in {}", exports.len(), dir.display());
    println!();
    println!("  {:<16} {:>8}  File", "Created (ms)", "Values");
    println!("  {}", "─".repeat(48));
    for export in &exports {
        let name = export
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  {:<16} {:>8}  {name}", export.created_ms, export.samples);
    }
}
