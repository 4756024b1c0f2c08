//! Console stand-ins for the display and receipt collaborators.
//!
//! The real installation renders images on a framebuffer and prints to a
//! serial receipt printer; these implementations log the same events and
//! keep the play timer, which is all the game core needs from them.

use pairlight_game::{GameDisplay, ReceiptSink};
use std::io::Write;
use std::time::Instant;
use tracing::info;

/// Display collaborator that logs imagery and owns the play timer.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    in_session: bool,
    started_at: Option<Instant>,
    frozen_elapsed: u64,
    last_image: Option<String>,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameDisplay for ConsoleDisplay {
    fn show_image(&mut self, image: &str, first_of_attempt: bool) {
        if !self.in_session {
            return;
        }
        if first_of_attempt {
            info!("Showing image {image}");
            self.last_image = Some(image.to_string());
        } else if let Some(previous) = &self.last_image {
            info!("Showing image {image} (thumbnail: {previous})");
        } else {
            info!("Showing image {image}");
        }
    }

    fn start_session(&mut self) {
        self.in_session = true;
        self.started_at = Some(Instant::now());
        self.frozen_elapsed = 0;
        self.last_image = None;
        info!("New session, start scanning!");
    }

    fn end_session(&mut self) {
        // Freeze the timer so the final time stays readable after the round.
        self.frozen_elapsed = self.elapsed_seconds();
        self.in_session = false;
        info!("Session over after {}s", self.frozen_elapsed);
    }

    fn elapsed_seconds(&self) -> u64 {
        if self.in_session {
            self.started_at.map_or(0, |start| start.elapsed().as_secs())
        } else {
            self.frozen_elapsed
        }
    }
}

/// Receipt sink writing the remaining-barcode list to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReceipt;

impl ReceiptSink for ConsoleReceipt {
    fn emit_list(&mut self, lines: &[String]) -> pairlight_core::Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "--- remaining barcodes ---")?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "--------------------------")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_timer_lifecycle() {
        let mut display = ConsoleDisplay::new();
        assert_eq!(display.elapsed_seconds(), 0);

        display.start_session();
        assert!(display.in_session);

        display.end_session();
        assert!(!display.in_session);
        // Frozen value stays stable after the session.
        let frozen = display.elapsed_seconds();
        assert_eq!(display.elapsed_seconds(), frozen);
    }

    #[test]
    fn test_images_ignored_outside_session() {
        let mut display = ConsoleDisplay::new();
        display.show_image("a.png", true);
        assert!(display.last_image.is_none());

        display.start_session();
        display.show_image("a.png", true);
        assert_eq!(display.last_image.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_receipt_accepts_lines() {
        let mut receipt = ConsoleReceipt;
        let lines = vec!["A".to_string(), "B".to_string()];
        assert!(receipt.emit_list(&lines).is_ok());
    }
}
