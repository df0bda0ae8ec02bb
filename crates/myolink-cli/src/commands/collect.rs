//! `myolink collect` — run one entropy collection session and export it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::Overrides;

pub fn run(overrides: &Overrides, duration: Option<&str>, no_save: bool) {
    super::init_logging("info");
    let max_duration = super::duration_flag(duration);
    let config = super::load_config(overrides);
    let interval = config.collect_interval();
    let url = config.base_url().to_string();
    let downloads = config.downloads_dir.clone();
    let state = super::connect(config);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    println!("Collecting entropy from {url}/random");
    println!("  Interval:  {}ms", interval.as_millis());
    match max_duration {
        Some(d) => println!("  Duration:  {}s", d.as_secs()),
        None => println!("  Duration:  until Ctrl+C"),
    }
    if no_save {
        println!("  Output:    (not saved)");
    } else {
        println!("  Output:    {}", downloads.display());
    }
    println!();

    let rt = super::runtime();
    let _guard = rt.enter();
    state.start_collection();

    let start = Instant::now();
    let mut shown = 0;
    while running.load(Ordering::SeqCst) {
        if let Some(max) = max_duration
            && start.elapsed() >= max
        {
            break;
        }

        let snap = state.collection();
        if snap.log.len() != shown
            && let Some(sample) = snap.log.latest()
        {
            shown = snap.log.len();
            println!("  [{}] {sample}", snap.status.indicator());
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    let status = state.stop_collection();
    log::info!("collection stopped after {:.1}s", start.elapsed().as_secs_f64());
    let skipped = state.collection().skipped;
    println!();
    println!("{status}  ({skipped} ticks skipped)");

    if no_save {
        return;
    }
    if state.collection().log.is_empty() {
        println!("Nothing to save.");
        return;
    }
    match state.save_session() {
        Ok(report) => println!("{report}"),
        Err(e) => {
            log::error!("session export failed: {e}");
            eprintln!("Save error: {e}");
            std::process::exit(1);
        }
    }
}
