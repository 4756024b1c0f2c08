//! The game state machine driving sessions, LED feedback, and collaborators.

use crate::error::GameResult;
use crate::pairing::Pairing;
use crate::session::Session;
use crate::traits::{GameDisplay, ReceiptSink};
use chrono::Local;
use pairlight_core::Barcode;
use pairlight_led::LedChannel;
use pairlight_storage::{HighscoreLog, HighscoreRecord, load_positions};
use rand::Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Administrative actions reachable through reserved scan tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedAction {
    /// Rebuild the pairing and start a new session.
    Reset,

    /// Emit the remaining-barcode list to the receipt sink.
    Print,
}

/// What a single `scan` call did. Diagnostic value; callers may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The token triggered an administrative action.
    Reserved(ReservedAction),

    /// The token is not part of any mapping; nothing changed.
    Unknown,

    /// The token was already matched earlier this session; nothing changed.
    AlreadyResolved,

    /// No session is running; nothing changed.
    Inactive,

    /// The first scan of a match attempt; the token is now pending.
    FirstOfAttempt,

    /// The second scan completed a pair.
    Matched {
        /// Whether this match emptied the session.
        completed: bool,
    },

    /// The second scan did not match the pending token.
    Mismatch,
}

/// Static configuration for the game machine.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Path of the barcode source, reread at every reset.
    pub barcode_file: PathBuf,

    /// Path of the append-only highscore log.
    pub highscore_file: PathBuf,

    /// Token that triggers [`ReservedAction::Reset`].
    pub reset_token: String,

    /// Token that triggers [`ReservedAction::Print`].
    pub print_token: String,

    /// Image identifiers available for pair assignment.
    pub images: Vec<String>,
}

/// The deterministic game core.
///
/// Owns the session, the per-session mappings, and the highscore log handle;
/// pushes LED feedback into the (non-blocking) command channel and session
/// notifications into the display collaborator. Driven synchronously by a
/// single thread.
pub struct GameMachine<D: GameDisplay, R: ReceiptSink> {
    config: GameConfig,
    reserved: HashMap<String, ReservedAction>,
    leds: LedChannel,
    display: D,
    receipt: R,
    highscores: HighscoreLog,
    pairing: Pairing,
    session: Session,
    first_reset_done: bool,
}

impl<D: GameDisplay, R: ReceiptSink> GameMachine<D, R> {
    /// Build the machine and run the initial reset.
    ///
    /// The initial reset loads the barcode source and builds the mappings but
    /// suppresses the LED idle sweep and the display notification, since
    /// there is nothing to reset from yet.
    ///
    /// # Errors
    /// Returns an error if the barcode source cannot be read.
    pub fn new(config: GameConfig, leds: LedChannel, display: D, receipt: R) -> GameResult<Self> {
        Self::with_rng(config, leds, display, receipt, &mut rand::rng())
    }

    /// Like [`GameMachine::new`] with an explicit randomness source, so tests
    /// get reproducible pairings.
    ///
    /// # Errors
    /// Returns an error if the barcode source cannot be read.
    pub fn with_rng(
        config: GameConfig,
        leds: LedChannel,
        display: D,
        receipt: R,
        rng: &mut impl Rng,
    ) -> GameResult<Self> {
        let reserved = HashMap::from([
            (config.reset_token.clone(), ReservedAction::Reset),
            (config.print_token.clone(), ReservedAction::Print),
        ]);
        let highscores = HighscoreLog::new(&config.highscore_file);

        let mut machine = Self {
            config,
            reserved,
            leds,
            display,
            receipt,
            highscores,
            pairing: Pairing::empty(),
            session: Session::idle(),
            first_reset_done: false,
        };
        machine.reset_with_rng(rng)?;
        Ok(machine)
    }

    /// Interpret one scanned token.
    ///
    /// Reserved tokens bypass pairing logic entirely; everything else walks
    /// the match-attempt steps. All failure modes are handled locally; this
    /// method never panics or propagates errors.
    pub fn scan(&mut self, token: &str) -> ScanOutcome {
        let token = token.trim();
        if let Some(action) = self.reserved.get(token).copied() {
            match action {
                ReservedAction::Reset => {
                    if let Err(e) = self.reset() {
                        error!("Reset failed: {e}");
                    }
                }
                ReservedAction::Print => self.print_remaining(),
            }
            return ScanOutcome::Reserved(action);
        }

        let Ok(token) = Barcode::new(token) else {
            debug!("Ignoring empty scan");
            return ScanOutcome::Unknown;
        };
        debug!("Scanning barcode '{token}'");

        let Some(partner) = self.pairing.partner(&token).cloned() else {
            info!("Barcode '{token}' unknown, try again");
            return ScanOutcome::Unknown;
        };

        if !self.session.is_active() {
            debug!("No active session; scan '{token}' ignored");
            return ScanOutcome::Inactive;
        }

        // Guards against duplicate or late scans of already-resolved items.
        // Deliberately silent: no LED or display feedback.
        if !self.session.contains(&token) {
            debug!("Barcode '{token}' already resolved this session; ignored");
            return ScanOutcome::AlreadyResolved;
        }

        let first_of_attempt = self.session.pending().is_none();

        if let Some(image) = self.pairing.image(&token) {
            self.display.show_image(image, first_of_attempt);
        }
        if let Some(position) = self.pairing.position(&token) {
            self.leds.send_pending(position);
        }

        if first_of_attempt {
            self.session.begin_attempt(token);
            return ScanOutcome::FirstOfAttempt;
        }

        let Some(pending) = self.session.take_pending() else {
            // Unreachable: !first_of_attempt implies a pending token.
            return ScanOutcome::FirstOfAttempt;
        };

        if partner == pending {
            info!("Pair found: {token} / {pending}");
            for member in [&token, &pending] {
                if let Some(position) = self.pairing.position(member) {
                    self.leds.send_matched(position);
                }
            }
            let completed = self.session.resolve(&token, &pending);
            if completed {
                self.complete_session();
            }
            ScanOutcome::Matched { completed }
        } else {
            info!("No pair: {token} / {pending}, try again");
            for member in [&token, &pending] {
                if let Some(position) = self.pairing.position(member) {
                    self.leds.send_rejected(position);
                }
            }
            ScanOutcome::Mismatch
        }
    }

    /// Rebuild the session from the persisted barcode source.
    ///
    /// # Errors
    /// Returns an error if the barcode source cannot be read; the previous
    /// session and mappings stay intact in that case.
    pub fn reset(&mut self) -> GameResult<()> {
        self.reset_with_rng(&mut rand::rng())
    }

    /// Like [`GameMachine::reset`] with an explicit randomness source.
    ///
    /// # Errors
    /// Returns an error if the barcode source cannot be read.
    pub fn reset_with_rng(&mut self, rng: &mut impl Rng) -> GameResult<()> {
        info!("Reset started");
        let reserved_tokens: Vec<String> = self.reserved.keys().cloned().collect();
        let entries = load_positions(&self.config.barcode_file, &reserved_tokens)?;

        self.pairing = Pairing::build(entries, &self.config.images, rng);
        self.session = Session::new(self.pairing.members().cloned());

        if self.first_reset_done {
            for position in self.pairing.registered_positions() {
                self.leds.send_idle(position);
            }
            self.display.start_session();
        }
        self.first_reset_done = true;

        info!("Reset complete: {} pairs in play", self.pairing.pair_count());
        Ok(())
    }

    /// Deliver the external "time exceeded" signal: end the running session
    /// without requiring the remaining set to be empty. No highscore is
    /// recorded. Idle if no session is active.
    pub fn force_end(&mut self) {
        if !self.session.is_active() {
            return;
        }
        info!("Maximum play time exceeded, ending session");
        self.session.deactivate();
        self.display.end_session();
        self.leds
            .start_animation(self.pairing.registered_positions());
    }

    /// Whether a session is currently in play.
    #[must_use]
    pub fn is_session_active(&self) -> bool {
        self.session.is_active()
    }

    /// Seconds of play time, as tracked by the display collaborator.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.display.elapsed_seconds()
    }

    /// The current session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current per-session mappings.
    #[must_use]
    pub fn pairing(&self) -> &Pairing {
        &self.pairing
    }

    /// The LED command channel.
    #[must_use]
    pub fn leds(&self) -> &LedChannel {
        &self.leds
    }

    /// Release the LED hardware (worker shutdown and strip clear).
    pub fn shutdown(mut self) {
        self.leds.stop();
    }

    fn complete_session(&mut self) {
        let elapsed = self.display.elapsed_seconds();
        info!("All pairs found in {elapsed}s, please scan reset");

        let record = HighscoreRecord::new(elapsed, Local::now().naive_local());
        if let Err(e) = self.highscores.append(&record) {
            error!("Could not save highscore: {e}");
        }

        self.display.end_session();
        self.leds
            .start_animation(self.pairing.registered_positions());
    }

    fn print_remaining(&mut self) {
        let mut lines: Vec<String> = self
            .session
            .remaining()
            .iter()
            .map(|token| token.to_string())
            .collect();
        lines.sort();
        if let Err(e) = self.receipt.emit_list(&lines) {
            error!("Receipt output failed: {e}");
        }
    }

}
