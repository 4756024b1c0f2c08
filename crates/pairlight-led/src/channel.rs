//! The LED command channel and its background worker.
//!
//! One worker thread owns the hardware link exclusively. Callers interact
//! through [`LedChannel`], whose operations only touch the shared queue and
//! ambient state and therefore never block on hardware I/O.

use crate::command::LedCommand;
use crate::link::{AnyLedLink, LedLink, LinkOpener, NoopLink};
use pairlight_core::constants::{
    ANIMATION_STEP_MS, COMMAND_WAIT_MS, SETTLE_DELAY_MS, SWEEP_COLOR_BOUND,
};
use pairlight_core::{LedIndex, Rgb};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Delays governing the worker loop.
///
/// Defaults come from the protocol constants; tests shrink them so worker
/// assertions settle in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct LedTiming {
    /// Pause after each discrete command send.
    pub settle: Duration,

    /// Pause between LED pulses during an ambient sweep.
    pub animation_step: Duration,

    /// Bounded wait for the next queued command; also bounds how long a stop
    /// request can go unobserved.
    pub command_wait: Duration,
}

impl Default for LedTiming {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(SETTLE_DELAY_MS),
            animation_step: Duration::from_millis(ANIMATION_STEP_MS),
            command_wait: Duration::from_millis(COMMAND_WAIT_MS),
        }
    }
}

/// Ambient animation state shared between callers and the worker.
#[derive(Debug, Default)]
struct AmbientState {
    animate: AtomicBool,
    indices: Mutex<Vec<LedIndex>>,
}

impl AmbientState {
    fn snapshot(&self) -> Vec<LedIndex> {
        match self.indices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, indices: Vec<LedIndex>) {
        match self.indices.lock() {
            Ok(mut guard) => *guard = indices,
            Err(poisoned) => *poisoned.into_inner() = indices,
        }
    }
}

/// Handle to the LED strip: a serialized command queue plus ambient mode.
///
/// Commands are delivered to hardware in FIFO order by a single background
/// worker. An explicit command always disables the ambient animation; the
/// worker additionally re-checks the ambient flag between every LED of a
/// sweep, so cancellation lands at the next LED boundary.
///
/// If the hardware link cannot be opened the channel degrades to a no-op
/// link: every operation stays accepted, with no physical effect. This is
/// logged once at construction.
pub struct LedChannel {
    tx: mpsc::Sender<LedCommand>,
    ambient: Arc<AmbientState>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    opener: LinkOpener,
    timing: LedTiming,
}

impl LedChannel {
    /// Connect to the strip on the given serial port.
    ///
    /// `port: None` (hardware disabled by configuration) and a failed open
    /// both yield a degraded channel that accepts operations without
    /// physical effect.
    pub fn connect(port: Option<&str>, baud_rate: u32) -> Self {
        let opener = match port {
            Some(port) => LinkOpener::Serial {
                port: port.to_string(),
                baud_rate,
            },
            None => {
                info!("LED hardware disabled by configuration");
                LinkOpener::Disabled
            }
        };
        Self::with_opener(opener, LedTiming::default())
    }

    /// Build a channel over an explicit opener, used by tests and by callers
    /// that need custom timing.
    pub fn with_opener(opener: LinkOpener, timing: LedTiming) -> Self {
        let (opener, link) = match opener.open(true) {
            Ok(link) => (opener, link),
            Err(e) => {
                warn!("{e}; LED channel will run without hardware effect");
                (LinkOpener::Disabled, AnyLedLink::Noop(NoopLink))
            }
        };

        let (tx, rx) = mpsc::channel();
        let ambient = Arc::new(AmbientState::default());
        let stop = Arc::new(AtomicBool::new(false));

        let worker = {
            let ambient = Arc::clone(&ambient);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("pairlight-led-worker".to_string())
                .spawn(move || worker_loop(link, rx, ambient, stop, timing))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Could not spawn LED worker: {e}");
                None
            }
        };

        Self {
            tx,
            ambient,
            stop,
            worker,
            opener,
            timing,
        }
    }

    /// Queue one color command from unvalidated integers.
    ///
    /// The index must be in `[0, 50)` and each color component in `[0, 256)`.
    /// A violation is logged and dropped; it never reaches the queue and
    /// leaves ambient mode untouched. On success ambient mode is disabled
    /// before the command is appended, so explicit commands always preempt
    /// the animation.
    pub fn enqueue(&self, index: u16, r: u16, g: u16, b: u16) {
        match LedCommand::from_raw(index, r, g, b) {
            Ok(command) => self.push(command),
            Err(e) => error!("Dropping LED command: {e}"),
        }
    }

    /// Queue one color command from validated parts.
    pub fn send(&self, index: LedIndex, color: Rgb) {
        self.push(LedCommand::new(index, color));
    }

    /// Set the LED of a freshly scanned, unresolved barcode to amber.
    pub fn send_pending(&self, index: LedIndex) {
        self.send(index, Rgb::PENDING);
    }

    /// Set the LED of a resolved pair member to green.
    pub fn send_matched(&self, index: LedIndex) {
        self.send(index, Rgb::MATCHED);
    }

    /// Set the LED of a failed match attempt to red.
    pub fn send_rejected(&self, index: LedIndex) {
        self.send(index, Rgb::REJECTED);
    }

    /// Set a registered LED to the idle color shown after a reset.
    pub fn send_idle(&self, index: LedIndex) {
        self.send(index, Rgb::IDLE);
    }

    /// Turn one LED off.
    pub fn send_off(&self, index: LedIndex) {
        self.send(index, Rgb::OFF);
    }

    fn push(&self, command: LedCommand) {
        self.ambient.animate.store(false, Ordering::SeqCst);
        if self.tx.send(command).is_err() {
            debug!("LED worker gone; command dropped");
        }
    }

    /// Replace the ambient LED set and switch the animation on.
    ///
    /// Queued commands are not cleared; the worker keeps draining them with
    /// priority and only animates while the queue is idle.
    pub fn start_animation(&self, indices: Vec<LedIndex>) {
        let mut indices = indices;
        indices.sort();
        indices.dedup();
        self.ambient.replace(indices);
        self.ambient.animate.store(true, Ordering::SeqCst);
    }

    /// Whether ambient animation mode is currently on.
    pub fn is_animating(&self) -> bool {
        self.ambient.animate.load(Ordering::SeqCst)
    }

    /// The current ambient LED set, sorted.
    pub fn ambient_indices(&self) -> Vec<LedIndex> {
        self.ambient.snapshot()
    }

    /// Whether the channel runs without reachable hardware.
    pub fn is_disabled(&self) -> bool {
        self.opener.is_disabled()
    }

    /// Shut the channel down.
    ///
    /// Idempotent. Signals the worker, waits for it to finish its in-flight
    /// send (bounded by the worker's receive timeout), then runs one
    /// reconnect-and-clear cycle so every LED returns to off before the link
    /// is finally released. Clear-cycle failures are logged, not propagated.
    pub fn stop(&mut self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        self.ambient.animate.store(false, Ordering::SeqCst);

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            error!("LED worker panicked");
        }

        if self.opener.is_disabled() {
            return;
        }
        match self.opener.open(false) {
            Ok(mut link) => {
                for index in LedIndex::all() {
                    if let Err(e) = link.send(&LedCommand::new(index, Rgb::OFF)) {
                        warn!("Aborting strip clear: {e}");
                        break;
                    }
                    thread::sleep(self.timing.settle);
                }
                info!("LED strip cleared and released");
            }
            Err(e) => warn!("Could not reopen LED link to clear the strip: {e}"),
        }
    }
}

impl Drop for LedChannel {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Send one command and apply its settle delay. Returns `false` on hardware
/// failure, which terminates the worker.
fn send_one(link: &mut AnyLedLink, command: &LedCommand, delay: Duration) -> bool {
    if let Err(e) = link.send(command) {
        error!("LED send failed, stopping worker: {e}");
        return false;
    }
    thread::sleep(delay);
    true
}

fn worker_loop(
    mut link: AnyLedLink,
    rx: mpsc::Receiver<LedCommand>,
    ambient: Arc<AmbientState>,
    stop: Arc<AtomicBool>,
    timing: LedTiming,
) {
    let mut rng = rand::rng();

    while !stop.load(Ordering::SeqCst) {
        match rx.try_recv() {
            Ok(command) => {
                if !send_one(&mut link, &command, timing.settle) {
                    return;
                }
            }
            Err(TryRecvError::Empty) => {
                let sweep = if ambient.animate.load(Ordering::SeqCst) {
                    ambient.snapshot()
                } else {
                    Vec::new()
                };

                if sweep.is_empty() {
                    // Bounded wait; a timeout just re-evaluates ambient mode.
                    match rx.recv_timeout(timing.command_wait) {
                        Ok(command) => {
                            if !send_one(&mut link, &command, timing.settle) {
                                return;
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                } else {
                    let color = Rgb::new(
                        rng.random_range(0..SWEEP_COLOR_BOUND),
                        rng.random_range(0..SWEEP_COLOR_BOUND),
                        rng.random_range(0..SWEEP_COLOR_BOUND),
                    );
                    for index in sweep {
                        // Cooperative cancellation at every LED boundary.
                        if stop.load(Ordering::SeqCst) || !ambient.animate.load(Ordering::SeqCst) {
                            break;
                        }
                        if !send_one(&mut link, &LedCommand::new(index, color), timing.animation_step)
                        {
                            return;
                        }
                    }
                }
            }
            Err(TryRecvError::Disconnected) => return,
        }
    }
    debug!("LED worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MockLink;
    use pairlight_core::constants::STRIP_LED_COUNT;
    use std::time::Instant;

    fn fast_timing() -> LedTiming {
        LedTiming {
            settle: Duration::from_millis(1),
            animation_step: Duration::from_millis(2),
            command_wait: Duration::from_millis(20),
        }
    }

    fn mock_channel() -> (LedChannel, crate::link::MockLinkHandle) {
        let (_link, handle) = MockLink::new();
        let channel = LedChannel::with_opener(LinkOpener::Mock(handle.clone()), fast_timing());
        (channel, handle)
    }

    fn wait_until(timeout_ms: u64, mut pred: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        while Instant::now() < deadline {
            if pred() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        pred()
    }

    fn index(value: u16) -> LedIndex {
        LedIndex::new(value).unwrap()
    }

    #[test]
    fn test_enqueue_valid_reaches_hardware() {
        let (mut channel, handle) = mock_channel();

        channel.enqueue(3, 70, 30, 0);

        assert!(wait_until(500, || handle.sent_len() == 1));
        assert_eq!(handle.sent()[0].to_frame(), [3, 70, 30, 0]);
        channel.stop();
    }

    #[test]
    fn test_enqueue_clears_ambient_mode() {
        let (mut channel, _handle) = mock_channel();

        channel.start_animation(Vec::new());
        assert!(channel.is_animating());

        channel.enqueue(0, 1, 2, 3);
        assert!(!channel.is_animating());
        channel.stop();
    }

    #[test]
    fn test_invalid_enqueue_is_dropped_and_ambient_unchanged() {
        let (mut channel, handle) = mock_channel();

        channel.start_animation(Vec::new());
        channel.enqueue(50, 0, 0, 0);
        channel.enqueue(0, 256, 0, 0);
        channel.enqueue(0, 0, 999, 0);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.sent_len(), 0);
        assert!(channel.is_animating());
        channel.stop();
    }

    #[test]
    fn test_named_senders_map_the_palette() {
        let (mut channel, handle) = mock_channel();

        channel.send_pending(index(1));
        channel.send_matched(index(2));
        channel.send_rejected(index(3));
        channel.send_idle(index(4));
        channel.send_off(index(5));

        assert!(wait_until(500, || handle.sent_len() == 5));
        let colors: Vec<Rgb> = handle.sent().iter().map(|c| c.color()).collect();
        assert_eq!(
            colors,
            vec![Rgb::PENDING, Rgb::MATCHED, Rgb::REJECTED, Rgb::IDLE, Rgb::OFF]
        );
        channel.stop();
    }

    #[test]
    fn test_commands_delivered_in_fifo_order() {
        let (mut channel, handle) = mock_channel();

        for i in 0..5 {
            channel.enqueue(i, 10, 10, 10);
        }

        assert!(wait_until(500, || handle.sent_len() == 5));
        let indices: Vec<u8> = handle.sent().iter().map(|c| c.index().as_u8()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        channel.stop();
    }

    #[test]
    fn test_ambient_sweep_pulses_sorted_indices() {
        let (mut channel, handle) = mock_channel();

        channel.start_animation(vec![index(2), index(0), index(1)]);

        assert!(wait_until(500, || handle.sent_len() >= 3));
        let sent = handle.sent();
        assert_eq!(sent[0].index().as_u8(), 0);
        assert_eq!(sent[1].index().as_u8(), 1);
        assert_eq!(sent[2].index().as_u8(), 2);

        // One random color per sweep, components below the sweep bound.
        assert_eq!(sent[0].color(), sent[1].color());
        assert!(sent[0].color().r < SWEEP_COLOR_BOUND);
        assert!(sent[0].color().g < SWEEP_COLOR_BOUND);
        assert!(sent[0].color().b < SWEEP_COLOR_BOUND);
        channel.stop();
    }

    #[test]
    fn test_start_animation_replaces_ambient_set() {
        let (mut channel, _handle) = mock_channel();

        channel.start_animation(vec![index(0), index(3), index(3)]);
        assert_eq!(channel.ambient_indices(), vec![index(0), index(3)]);

        channel.start_animation(vec![index(7)]);
        assert_eq!(channel.ambient_indices(), vec![index(7)]);
        channel.stop();
    }

    #[test]
    fn test_enqueue_preempts_running_sweep() {
        let (mut channel, handle) = mock_channel();

        channel.start_animation(LedIndex::all().collect());
        assert!(wait_until(500, || handle.sent_len() >= 1));

        channel.enqueue(9, 0, 90, 0);
        assert!(!channel.is_animating());
        assert!(wait_until(500, || {
            handle.sent().iter().any(|c| c.to_frame() == [9, 0, 90, 0])
        }));

        // The sweep stays cancelled: no pulses follow the explicit command.
        let len_after = handle.sent_len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(handle.sent_len(), len_after);
        channel.stop();
    }

    #[test]
    fn test_stop_clears_strip_and_is_idempotent() {
        let (mut channel, handle) = mock_channel();

        channel.enqueue(5, 70, 30, 0);
        assert!(wait_until(500, || handle.sent_len() == 1));

        channel.stop();
        let sent = handle.sent();
        let clear = &sent[sent.len() - usize::from(STRIP_LED_COUNT)..];
        assert_eq!(clear.len(), 50);
        for (i, command) in clear.iter().enumerate() {
            assert_eq!(command.index().as_u8() as usize, i);
            assert_eq!(command.color(), Rgb::OFF);
        }

        let len_after_stop = handle.sent_len();
        channel.stop();
        assert_eq!(handle.sent_len(), len_after_stop);
    }

    #[test]
    fn test_write_failure_terminates_worker() {
        let (mut channel, handle) = mock_channel();

        handle.fail_writes(true);
        channel.enqueue(0, 1, 1, 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.sent_len(), 0);

        // The worker is gone; further commands are dropped without panicking.
        handle.fail_writes(false);
        channel.enqueue(1, 1, 1, 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(handle.sent_len(), 0);

        channel.stop();
    }

    #[test]
    fn test_disabled_channel_accepts_operations() {
        let mut channel = LedChannel::connect(None, 9600);
        assert!(channel.is_disabled());

        channel.enqueue(0, 10, 10, 10);
        channel.start_animation(vec![index(1)]);
        assert!(channel.is_animating());
        channel.stop();
    }
}
