//! Game state machine for the pairlight memory game.
//!
//! A scan token arrives from the driving thread, the machine decides the
//! outcome against the session's pairing mappings, and pushes LED feedback
//! into the command channel and imagery/session notifications into the
//! display collaborator. All state here is single-writer: only the driving
//! thread mutates the session and mappings, and calls into the LED channel
//! never block on hardware.
//!
//! # Session flow
//!
//! ```text
//! NoSession ──reset()──► InSession(pending: None)
//!                          │  scan (first of attempt)
//!                          ▼
//!                        InSession(pending: Some)
//!                          │  scan (second of attempt: match / mismatch)
//!                          ▼
//!                        InSession(pending: None) ── ... ──► SessionComplete
//!                                                  (remaining empty, or
//!                                                   external force_end)
//! ```
//!
//! `SessionComplete` is only re-entered into play via `reset()`.

pub mod error;
pub mod machine;
pub mod pairing;
pub mod session;
pub mod traits;

pub use error::{GameError, GameResult};
pub use machine::{GameConfig, GameMachine, ReservedAction, ScanOutcome};
pub use pairing::Pairing;
pub use session::{Session, SessionPhase};
pub use traits::{GameDisplay, ReceiptSink};
