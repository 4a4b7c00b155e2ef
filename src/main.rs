//! spriteanimator entry point.
//!
//! Loads a sprite description from an INI file and plays it. By default the
//! animation runs headless for a fixed number of refreshes and every draw is
//! printed, which is handy for checking a sheet layout. Built with the
//! `viewer` feature, the sprite is shown in a raylib window instead:
//!
//! - `1`..`9` play the n-th registered state (sorted by id)
//! - `Space` replays the starting state
//! - `S` stops playback
//! - `D` detaches / re-attaches the sprite
//!
//! One-shot states return to the starting state when they finish.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --config sprite.ini --ticks 60
//! cargo run --release --features viewer -- --config sprite.ini
//! ```

#[cfg(not(feature = "viewer"))]
mod headless;
#[cfg(feature = "viewer")]
mod viewer;

use std::path::PathBuf;

use clap::Parser;
use log::error;

use spriteanimator::resources::canvas::RetainedCanvas;
use spriteanimator::resources::sheetimage::SheetHandle;
use spriteanimator::resources::spriteconfig::{DEFAULT_CONFIG_PATH, SpriteConfig};
use spriteanimator::systems::animator::SpriteAnimator;

type Animator = SpriteAnimator<RetainedCanvas, SheetHandle>;

/// Sprite sheet animation player
#[derive(Parser)]
#[command(version, about = "Plays the animation states of a sprite sheet.")]
struct Cli {
    /// Sprite description file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// State to start with. Defaults to the launch state.
    #[arg(long, value_name = "ID")]
    play: Option<String>,

    /// Number of display refreshes to simulate when headless.
    #[arg(long, default_value_t = 120)]
    ticks: u32,

    /// Print draw calls as JSON lines.
    #[arg(long)]
    json: bool,

    /// When a one-shot state finishes, play a random registered state.
    #[arg(long)]
    shuffle: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match SpriteConfig::load_from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };
    let start = cli.play.clone().unwrap_or_else(|| config.launch.id.clone());

    #[cfg(feature = "viewer")]
    {
        let sheet = SheetHandle::pending(config.sheet.clone());
        let signal = sheet.signal();
        let hero = build(&config, RetainedCanvas::new(), sheet);
        if let Err(e) = viewer::run(hero, &start, signal) {
            error!("{}", e);
            std::process::exit(1);
        }
    }

    #[cfg(not(feature = "viewer"))]
    {
        // Headless runs never read pixels, so the sheet counts as loaded.
        let canvas = RetainedCanvas::with_history(64);
        let hero = build(&config, canvas, SheetHandle::loaded(config.sheet.clone()));
        headless::run(hero, &start, &cli);
    }
}

fn build(config: &SpriteConfig, canvas: RetainedCanvas, sheet: SheetHandle) -> Animator {
    match SpriteAnimator::new(config, canvas, sheet) {
        Ok(animator) => animator,
        Err(e) => {
            error!("Failed to create sprite '{}': {}", config.id, e);
            std::process::exit(1);
        }
    }
}
