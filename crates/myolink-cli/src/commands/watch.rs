//! `myolink watch` — auto-refresh readings and print each new one.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::Overrides;

pub fn run(overrides: &Overrides, duration: Option<&str>) {
    super::init_logging("info");
    let max_duration = super::duration_flag(duration);
    let config = super::load_config(overrides);
    let interval = config.refresh_interval();
    let url = config.base_url().to_string();
    let state = super::connect(config);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Error setting Ctrl+C handler: {e}");
        std::process::exit(1);
    }

    println!("Watching {url}");
    println!("  Interval:  {}ms", interval.as_millis());
    match max_duration {
        Some(d) => println!("  Duration:  {}s", d.as_secs()),
        None => println!("  Duration:  until Ctrl+C"),
    }
    println!();

    let rt = super::runtime();
    let _guard = rt.enter();
    state.toggle_auto_refresh();

    let start = Instant::now();
    let mut seen = 0;
    let mut last_state = None;
    while running.load(Ordering::SeqCst) {
        if let Some(max) = max_duration
            && start.elapsed() >= max
        {
            break;
        }

        let snap = state.readings();
        if snap.total_reads != seen
            && let Some(value) = snap.history.latest()
        {
            seen = snap.total_reads;
            let muscle = state.muscle_state();
            let change = if last_state != Some(muscle) { "  ◀" } else { "" };
            last_state = Some(muscle);
            println!(
                "  #{:<5} {value:>8}  {}{change}",
                snap.total_reads,
                muscle.label()
            );
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    state.shutdown();
    let snap = state.readings();
    println!();
    println!(
        "Stopped: {} readings, {} failed",
        snap.total_reads, snap.failed_reads
    );
}
