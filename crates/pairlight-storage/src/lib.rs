//! Flat-file persistence for the pairlight game.
//!
//! Two record formats, both plain text lines:
//!
//! - Barcode source: `token;position`, read at every session reset. Lines
//!   starting with `#` and blank lines are ignored; malformed or duplicate
//!   lines are skipped with a diagnostic, never fatal.
//! - Highscore log: `durationSeconds;YYYY-MM-DD HH:MM`, append-only, loaded
//!   sorted ascending by duration with the same skip-don't-fail policy.

pub mod error;
pub mod highscore;
pub mod positions;

pub use error::{StorageError, StorageResult};
pub use highscore::{HighscoreLog, HighscoreRecord};
pub use positions::load_positions;
