//! `myolink simulate` — serve a fake sensor for local testing.

use myolink_sim::{DeviceScript, Fallback};

pub fn run(host: &str, port: u16, fail_with: Option<u16>) {
    super::init_logging("info");

    let fallback = match fail_with {
        Some(code) => Fallback::Status(code),
        None => Fallback::Generate,
    };
    let script = DeviceScript::default().fallback(fallback);

    println!("myolink sensor simulator on http://{host}:{port}");
    println!("  GET /data     {{\"muscle\": n}}");
    println!("  GET /random   {{\"random\": n}}");
    if let Some(code) = fail_with {
        println!("  Every request answers HTTP {code}");
    }
    println!();
    println!("Point the client at it with --device http://{host}:{port}");

    let rt = super::runtime();
    if let Err(e) = rt.block_on(myolink_sim::run_server(host, port, script)) {
        eprintln!("Simulator error: {e}");
        std::process::exit(1);
    }
}
