//! Reelkit CLI: inspect, script, and play timeline documents.
//!
//! Usage:
//!   reelkit validate <FILE>                        Validate a timeline document
//!   reelkit info <FILE>                            Show timeline information
//!   reelkit visible <FILE> --frame N               List events visible at a frame
//!   reelkit apply <FILE> --actions <JSON> [-o OUT] Apply automated edit actions
//!   reelkit play <FILE> --seconds S [--realtime]   Play back headlessly

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reelkit_common::config::EditorConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "reelkit",
    about = "Timeline editing engine for short-form video",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a timeline document
    Validate {
        /// Path to the timeline JSON file
        file: PathBuf,
    },

    /// Show timeline information
    Info {
        /// Path to the timeline JSON file
        file: PathBuf,
    },

    /// List the events visible at a frame
    Visible {
        /// Path to the timeline JSON file
        file: PathBuf,

        /// Frame to query
        #[arg(short, long)]
        frame: u64,
    },

    /// Apply automated edit actions to a timeline
    Apply {
        /// Path to the timeline JSON file
        file: PathBuf,

        /// JSON file holding one action or an array of actions
        #[arg(long)]
        actions: PathBuf,

        /// JSON file listing the available assets
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Where to write the edited timeline (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Simulate playback and print the published frames
    Play {
        /// Path to the timeline JSON file
        file: PathBuf,

        /// Wall-clock seconds to simulate
        #[arg(long, default_value = "5.0")]
        seconds: f64,

        /// Frame to start from
        #[arg(long, default_value = "0")]
        from: u64,

        /// Display refresh rate driving the clock
        #[arg(long, default_value = "60")]
        refresh_hz: u32,

        /// Follow the wall clock instead of simulating time
        #[arg(long)]
        realtime: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = EditorConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    reelkit_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Validate { file } => commands::validate::run(file),
        Commands::Info { file } => commands::info::run(file, &config),
        Commands::Visible { file, frame } => commands::visible::run(file, frame).await,
        Commands::Apply {
            file,
            actions,
            assets,
            output,
        } => commands::apply::run(file, actions, assets, output, &config),
        Commands::Play {
            file,
            seconds,
            from,
            refresh_hz,
            realtime,
        } => commands::play::run(file, seconds, from, refresh_hz, realtime, &config).await,
    }
}
