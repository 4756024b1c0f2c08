//! Pairlight: a barcode-driven memory pairing game against an LED strip.
//!
//! The driving loop reads scan tokens line-by-line from stdin (the barcode
//! scanner acts as a keyboard) and delivers them synchronously to the game
//! machine; a one-second tick enforces the maximum play time. The LED worker
//! runs on its own thread inside the command channel and is shut down, with
//! a strip clear, on exit.

mod config;
mod console;

use anyhow::Context;
use config::Config;
use console::{ConsoleDisplay, ConsoleReceipt};
use pairlight_game::{GameConfig, GameMachine};
use pairlight_led::LedChannel;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn load_images(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut images: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .map(|path| path.display().to_string())
                .collect();
            images.sort();
            images
        }
        Err(e) => {
            warn!("Could not read image directory {}: {e}", dir.display());
            Vec::new()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "pairlight.json".to_string());
    let config = Config::load(Path::new(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;

    let images = load_images(&config.game.image_dir);
    if images.is_empty() {
        warn!("No images found; sessions will run without imagery");
    }

    let leds = LedChannel::connect(config.led.port.as_deref(), config.led.baud_rate);

    let game_config = GameConfig {
        barcode_file: config.game.barcode_file.clone(),
        highscore_file: config.game.highscore_file.clone(),
        reset_token: config.reserved.reset.clone(),
        print_token: config.reserved.print.clone(),
        images,
    };
    let mut machine = GameMachine::new(game_config, leds, ConsoleDisplay::new(), ConsoleReceipt)
        .context("initializing game")?;

    info!(
        "pairlight {} ready; scan '{}' to start a session",
        pairlight_core::VERSION,
        config.reserved.reset
    );

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("reading scan input")? {
                    Some(line) => {
                        let token = line.trim();
                        if !token.is_empty() {
                            machine.scan(token);
                        }
                    }
                    None => break,
                }
            }
            _ = tick.tick() => {
                if machine.is_session_active()
                    && machine.elapsed_seconds() >= config.game.max_play_secs
                {
                    machine.force_end();
                }
            }
        }
    }

    info!("Input closed, shutting down");
    machine.shutdown();
    Ok(())
}
