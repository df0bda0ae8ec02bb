//! `myolink read` — fetch readings on demand.

use myolink_core::MuscleState;

use super::Overrides;

pub fn run(overrides: &Overrides, count: usize) {
    super::init_logging("info");
    let config = super::load_config(overrides);
    let url = config.base_url().to_string();
    let state = super::connect(config);

    let rt = super::runtime();
    rt.block_on(async {
        for _ in 0..count.max(1) {
            if let Err(e) = state.manual_refresh().await {
                eprintln!("  read failed: {e}");
            }
        }
    });

    let snap = state.readings();
    println!("Sensor {url}");
    if snap.history.is_empty() {
        println!("  No data available.");
        std::process::exit(1);
    }

    for (n, value) in snap.history.numbered() {
        println!("  Reading #{n:<3} {value:>8}");
    }

    let muscle = state.muscle_state();
    println!();
    println!("  State: {}  ({})", muscle.label().to_uppercase(), muscle.color());
    print_scale(muscle);
}

/// Print the three-level scale with the current level marked.
pub fn print_scale(current: MuscleState) {
    for level in MuscleState::ALL {
        let marker = if level == current { "▸" } else { " " };
        println!("  {marker} {}", level.scale_label());
    }
}
