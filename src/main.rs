//! Hand gesture to keystroke mapper.

use anyhow::Result;
use clap::{Parser, Subcommand};
use handtyped::{app::HandtypedApp, config::Config, config::EXAMPLE_CONFIG};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

#[derive(Parser, Debug)]
#[command(author, version, about = "Map static hand gestures to keystrokes", long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    config: Option<PathBuf>,

    /// Gesture store file (overrides the configuration)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Match threshold (overrides the configuration)
    #[arg(short, long, global = true)]
    threshold: Option<f64>,

    /// Log key presses instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a landmark recording and press the keys of matched gestures
    Run {
        /// Landmark recording (JSON Lines)
        #[arg(short, long)]
        frames: PathBuf,

        /// Gesture that ends the run (overrides the configuration)
        #[arg(short, long)]
        quit_gesture: Option<String>,
    },

    /// Save the hand of one recorded frame as a gesture
    Capture {
        /// Landmark recording (JSON Lines)
        #[arg(short, long)]
        frames: PathBuf,

        /// Frame to capture (zero-based)
        #[arg(long, default_value = "0")]
        frame: usize,

        /// Gesture name
        #[arg(short, long)]
        name: String,

        /// Key identifier, e.g. "space" or "h i enter"
        #[arg(short, long)]
        key: String,
    },

    /// List stored gestures
    List,

    /// Delete a stored gesture
    Delete {
        /// Gesture name
        #[arg(short, long)]
        name: String,
    },

    /// Write an example configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "handtyped.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if let Command::InitConfig { output } = &args.command {
        std::fs::write(output, EXAMPLE_CONFIG)?;
        println!("Wrote example configuration to {}", output.display());
        return Ok(());
    }

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if let Some(store) = args.store {
        config.store.path = store;
    }
    if let Some(threshold) = args.threshold {
        config.matching.threshold = threshold;
    }
    if let Command::Run {
        quit_gesture: Some(name), ..
    } = &args.command
    {
        config.session.quit_gesture = Some(name.clone());
    }

    let app = HandtypedApp::new(config, args.dry_run)?;

    match args.command {
        Command::Run { frames, .. } => {
            let cancel = AtomicBool::new(false);
            let summary = app.run(&frames, &cancel)?;
            println!(
                "{} frames, {} matched, {} key presses",
                summary.frames, summary.matches, summary.key_presses
            );
        }
        Command::Capture { frames, frame, name, key } => {
            let binding = app.capture(&frames, frame, &name, &key)?;
            println!("Gesture saved: {} → {}", binding.name, binding.bound_key);
        }
        Command::List => {
            let bindings = app.list()?;
            if bindings.is_empty() {
                println!("No gestures stored in {}", app.config().store.path.display());
            }
            for binding in bindings {
                println!("{}\t{}\t{} landmarks", binding.name, binding.bound_key, binding.pose.len());
            }
        }
        Command::Delete { name } => {
            if app.delete(&name)? {
                println!("Deleted gesture {name}");
            } else {
                println!("No gesture named {name}");
            }
        }
        Command::InitConfig { .. } => {}
    }

    Ok(())
}
