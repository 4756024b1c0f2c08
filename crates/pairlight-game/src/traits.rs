//! Collaborator interfaces consumed by the game machine.
//!
//! Rendering, font layout, and printer formatting live behind these traits;
//! the core only needs the calls below. Implementations are thin I/O
//! wrappers (the binary ships console stand-ins) and run on the driving
//! thread, so methods are synchronous.

/// The display collaborator: imagery, session lifecycle, and the play timer.
pub trait GameDisplay {
    /// Show the image mapped to a scanned barcode.
    ///
    /// `first_of_attempt` tells the display whether this scan opened a new
    /// match attempt, so it can decide to keep the previous image visible as
    /// a secondary thumbnail.
    fn show_image(&mut self, image: &str, first_of_attempt: bool);

    /// A new session has started: reset the timer and clear the screen.
    fn start_session(&mut self);

    /// The session is over (all pairs found, or time exceeded).
    fn end_session(&mut self);

    /// Seconds of play time in the current session.
    fn elapsed_seconds(&self) -> u64;
}

/// Sink for the remaining-barcode list (a receipt printer in production).
pub trait ReceiptSink {
    /// Emit one line per entry.
    ///
    /// # Errors
    /// Returns an error if the sink is unreachable; the machine logs and
    /// continues.
    fn emit_list(&mut self, lines: &[String]) -> pairlight_core::Result<()>;
}
