//! Hardware link abstraction for the LED strip.
//!
//! The [`LedLink`] trait is the seam between the channel worker and the
//! physical transport. Concrete links are dispatched through [`AnyLedLink`]
//! so the worker stays monomorphic, and a [`LinkOpener`] knows how to
//! (re)open its link, which the shutdown clear cycle needs.

use crate::command::LedCommand;
use crate::error::{LedError, Result};
use pairlight_core::constants::PORT_BOOT_DELAY_MS;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// A byte-oriented transport that can latch one LED command.
///
/// Implementations are owned and driven by exactly one thread at a time; the
/// channel worker is the only caller during normal operation.
pub trait LedLink: Send {
    /// Write one four-byte command frame to the strip.
    ///
    /// # Errors
    /// Returns an error if the transport rejects the write; the channel
    /// worker treats this as fatal and exits.
    fn send(&mut self, command: &LedCommand) -> Result<()>;
}

/// Enum dispatch over the available link implementations.
#[derive(Debug)]
pub enum AnyLedLink {
    /// Real serial transport.
    Serial(SerialLink),

    /// In-memory recording transport for tests.
    Mock(MockLink),

    /// Discarding transport for degraded (no hardware) mode.
    Noop(NoopLink),
}

impl LedLink for AnyLedLink {
    fn send(&mut self, command: &LedCommand) -> Result<()> {
        match self {
            Self::Serial(link) => link.send(command),
            Self::Mock(link) => link.send(command),
            Self::Noop(link) => link.send(command),
        }
    }
}

/// Serial transport to the strip's microcontroller.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("port", &self.port.name())
            .finish()
    }
}

impl SerialLink {
    /// Open the serial port.
    ///
    /// With `wait_for_boot` set, sleeps [`PORT_BOOT_DELAY_MS`] after opening:
    /// the microcontroller resets on open and drops frames sent before its
    /// firmware is up. The shutdown clear cycle reopens without the wait.
    ///
    /// # Errors
    /// Returns `LedError::OpenFailed` if the port cannot be opened.
    pub fn open(port_name: &str, baud_rate: u32, wait_for_boot: bool) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(500))
            .open()
            .map_err(|e| LedError::open_failed(port_name, e.to_string()))?;

        if wait_for_boot {
            std::thread::sleep(Duration::from_millis(PORT_BOOT_DELAY_MS));
        }

        debug!("LED link open on {}", port_name);
        Ok(Self { port })
    }
}

impl LedLink for SerialLink {
    fn send(&mut self, command: &LedCommand) -> Result<()> {
        self.port
            .write_all(&command.to_frame())
            .map_err(|e| LedError::write_failed(e.to_string()))
    }
}

/// Shared state behind a mock link and its handles.
#[derive(Debug, Default)]
struct MockState {
    sent: Vec<LedCommand>,
    fail_writes: bool,
}

/// Recording transport for tests.
///
/// Every link minted from the same [`MockLinkHandle`] appends to one shared
/// command log, so the handle observes the reconnect-and-clear cycle too.
#[derive(Debug, Clone)]
pub struct MockLink {
    state: Arc<Mutex<MockState>>,
}

impl MockLink {
    /// Create a new mock link together with its observing handle.
    pub fn new() -> (Self, MockLinkHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MockLinkHandle { state },
        )
    }
}

impl LedLink for MockLink {
    fn send(&mut self, command: &LedCommand) -> Result<()> {
        let mut state = lock_state(&self.state);
        if state.fail_writes {
            return Err(LedError::write_failed("mock link failure injected"));
        }
        state.sent.push(*command);
        Ok(())
    }
}

/// Handle for observing and controlling a [`MockLink`].
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockLinkHandle {
    /// Snapshot of every command sent so far, in send order.
    pub fn sent(&self) -> Vec<LedCommand> {
        lock_state(&self.state).sent.clone()
    }

    /// Number of commands sent so far.
    pub fn sent_len(&self) -> usize {
        lock_state(&self.state).sent.len()
    }

    /// Make every subsequent write fail (simulated hardware fault).
    pub fn fail_writes(&self, fail: bool) {
        lock_state(&self.state).fail_writes = fail;
    }

    /// Mint another link sharing this handle's command log.
    pub fn link(&self) -> MockLink {
        MockLink {
            state: Arc::clone(&self.state),
        }
    }
}

fn lock_state(state: &Mutex<MockState>) -> std::sync::MutexGuard<'_, MockState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Discarding transport used when no hardware is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLink;

impl LedLink for NoopLink {
    fn send(&mut self, _command: &LedCommand) -> Result<()> {
        Ok(())
    }
}

/// Recipe for opening (and reopening) a link.
///
/// The channel keeps its opener so `stop()` can run the reconnect-and-clear
/// cycle after the worker has released the original link.
#[derive(Debug, Clone)]
pub enum LinkOpener {
    /// Open a [`SerialLink`] on the given port.
    Serial { port: String, baud_rate: u32 },

    /// Mint links from a shared mock log.
    Mock(MockLinkHandle),

    /// No hardware: links are [`NoopLink`].
    Disabled,
}

impl LinkOpener {
    /// Open a fresh link.
    ///
    /// # Errors
    /// Returns an error only for the serial variant, when the port cannot be
    /// opened.
    pub fn open(&self, wait_for_boot: bool) -> Result<AnyLedLink> {
        match self {
            Self::Serial { port, baud_rate } => Ok(AnyLedLink::Serial(SerialLink::open(
                port,
                *baud_rate,
                wait_for_boot,
            )?)),
            Self::Mock(handle) => Ok(AnyLedLink::Mock(handle.link())),
            Self::Disabled => Ok(AnyLedLink::Noop(NoopLink)),
        }
    }

    /// Whether this opener reaches real or simulated hardware at all.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}
