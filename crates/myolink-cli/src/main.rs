//! CLI for myolink — watch your muscle sensor and harvest its entropy.

mod commands;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "myolink")]
#[command(about = "myolink — watch your muscle sensor and harvest its entropy")]
#[command(version = myolink_core::VERSION)]
struct Cli {
    /// Sensor base URL (overrides the config file and MYOLINK_DEVICE_URL)
    #[arg(long, global = true)]
    device: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory session exports are written to
    #[arg(long, global = true)]
    downloads: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch muscle readings once and print their classification
    Read {
        /// Number of readings to fetch
        #[arg(long, default_value = "1")]
        count: usize,
    },

    /// Auto-refresh readings, printing every new one and marking state changes
    Watch {
        /// Stop after this long (e.g. "30s", "5m"); default: until Ctrl+C
        #[arg(long)]
        duration: Option<String>,
    },

    /// Run an entropy collection session and export it
    Collect {
        /// Stop after this long (e.g. "30s", "5m"); default: until Ctrl+C
        #[arg(long)]
        duration: Option<String>,

        /// Do not write the session to the downloads directory
        #[arg(long)]
        no_save: bool,
    },

    /// Live interactive dashboard (TUI): readings, muscle state, entropy
    Monitor,

    /// Serve a simulated sensor on a local port
    Simulate {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Answer every request with this HTTP status instead of a value
        #[arg(long)]
        fail_with: Option<u16>,
    },

    /// List previously exported sessions, newest first
    Exports,
}

fn main() {
    let cli = Cli::parse();

    let overrides = commands::Overrides {
        device: cli.device,
        config: cli.config,
        downloads: cli.downloads,
    };

    match cli.command {
        Commands::Read { count } => commands::read::run(&overrides, count),
        Commands::Watch { duration } => commands::watch::run(&overrides, duration.as_deref()),
        Commands::Collect { duration, no_save } => {
            commands::collect::run(&overrides, duration.as_deref(), no_save)
        }
        Commands::Monitor => commands::monitor::run(&overrides),
        Commands::Simulate {
            port,
            host,
            fail_with,
        } => commands::simulate::run(&host, port, fail_with),
        Commands::Exports => commands::exports::run(&overrides),
    }
}
