//! One playthrough from reset to completion or forced timeout.

use pairlight_core::Barcode;
use std::collections::HashSet;

/// Coarse phase of the session state machine, derived from the session's
/// fields. Useful for diagnostics and assertions; transitions happen only
/// through [`Session`] mutators driven by the game machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has been started yet (before the first reset).
    NoSession,

    /// A session is running and no match attempt is open.
    AwaitingFirstScan,

    /// A session is running and the first barcode of an attempt is pending.
    AwaitingSecondScan,

    /// The session finished (all pairs found or time exceeded); only a reset
    /// starts a new one.
    Complete,
}

/// Mutable session state: the unmatched barcodes, the optional pending first
/// scan of the current attempt, and whether play is active.
///
/// Invariant: `pending`, when present, is always a member of `remaining`.
#[derive(Debug, Clone)]
pub struct Session {
    remaining: HashSet<Barcode>,
    pending: Option<Barcode>,
    active: bool,
    ever_started: bool,
}

impl Session {
    /// The placeholder before the first reset.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            remaining: HashSet::new(),
            pending: None,
            active: false,
            ever_started: false,
        }
    }

    /// Start a fresh, active session over the given tokens.
    pub fn new(tokens: impl IntoIterator<Item = Barcode>) -> Self {
        Self {
            remaining: tokens.into_iter().collect(),
            pending: None,
            active: true,
            ever_started: true,
        }
    }

    /// Whether play is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Barcodes not yet matched this session.
    #[must_use]
    pub fn remaining(&self) -> &HashSet<Barcode> {
        &self.remaining
    }

    /// The first scan of the current match attempt, if one is open.
    #[must_use]
    pub fn pending(&self) -> Option<&Barcode> {
        self.pending.as_ref()
    }

    /// Whether the token is still unmatched this session.
    #[must_use]
    pub fn contains(&self, token: &Barcode) -> bool {
        self.remaining.contains(token)
    }

    /// Open a match attempt with the given token.
    pub fn begin_attempt(&mut self, token: Barcode) {
        debug_assert!(self.remaining.contains(&token));
        self.pending = Some(token);
    }

    /// Close the current attempt, returning its first token.
    pub fn take_pending(&mut self) -> Option<Barcode> {
        self.pending.take()
    }

    /// Remove a matched pair. Deactivates the session and returns `true` when
    /// the last pair was resolved.
    pub fn resolve(&mut self, first: &Barcode, second: &Barcode) -> bool {
        self.remaining.remove(first);
        self.remaining.remove(second);
        if self.remaining.is_empty() {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// End the session without requiring `remaining` to be empty (external
    /// timeout). Clears any open attempt.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.pending = None;
    }

    /// Derive the current phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (self.ever_started, self.active, &self.pending) {
            (false, ..) => SessionPhase::NoSession,
            (true, true, None) => SessionPhase::AwaitingFirstScan,
            (true, true, Some(_)) => SessionPhase::AwaitingSecondScan,
            (true, false, _) => SessionPhase::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barcode(token: &str) -> Barcode {
        Barcode::new(token).unwrap()
    }

    fn session(tokens: &[&str]) -> Session {
        Session::new(tokens.iter().map(|t| barcode(t)))
    }

    #[test]
    fn test_idle_session_phase() {
        let session = Session::idle();
        assert!(!session.is_active());
        assert_eq!(session.phase(), SessionPhase::NoSession);
    }

    #[test]
    fn test_new_session_is_active_with_no_attempt() {
        let session = session(&["a", "b"]);
        assert!(session.is_active());
        assert_eq!(session.phase(), SessionPhase::AwaitingFirstScan);
        assert_eq!(session.remaining().len(), 2);
    }

    #[test]
    fn test_attempt_lifecycle() {
        let mut session = session(&["a", "b"]);

        session.begin_attempt(barcode("a"));
        assert_eq!(session.phase(), SessionPhase::AwaitingSecondScan);
        assert_eq!(session.pending(), Some(&barcode("a")));

        let pending = session.take_pending().unwrap();
        assert_eq!(pending, barcode("a"));
        assert_eq!(session.phase(), SessionPhase::AwaitingFirstScan);
    }

    #[test]
    fn test_resolve_partial_keeps_session_active() {
        let mut session = session(&["a", "b", "c", "d"]);

        let completed = session.resolve(&barcode("a"), &barcode("b"));
        assert!(!completed);
        assert!(session.is_active());
        assert_eq!(session.remaining().len(), 2);
    }

    #[test]
    fn test_resolve_last_pair_completes() {
        let mut session = session(&["a", "b"]);

        let completed = session.resolve(&barcode("a"), &barcode("b"));
        assert!(completed);
        assert!(!session.is_active());
        assert_eq!(session.phase(), SessionPhase::Complete);
    }

    #[test]
    fn test_deactivate_clears_open_attempt() {
        let mut session = session(&["a", "b"]);
        session.begin_attempt(barcode("a"));

        session.deactivate();
        assert!(!session.is_active());
        assert!(session.pending().is_none());
        assert_eq!(session.phase(), SessionPhase::Complete);
    }
}
