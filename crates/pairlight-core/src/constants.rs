//! Shared constants for the LED strip protocol and game timing.
//!
//! The wire protocol is a fixed four-byte frame per command (index, r, g, b)
//! with no acknowledgment; the settle delays below are the only flow control
//! the microcontroller gets.

// ============================================================================
// Strip geometry and color range
// ============================================================================

/// Number of addressable LEDs on the strip. Valid indices are `0..STRIP_LED_COUNT`.
pub const STRIP_LED_COUNT: u8 = 50;

/// Largest valid value for a single color component.
pub const MAX_COLOR: u16 = 255;

/// Exclusive upper bound for the random color components used by the ambient
/// sweep. Kept well below full brightness so the idle animation stays dim.
pub const SWEEP_COLOR_BOUND: u8 = 80;

// ============================================================================
// Timing
// ============================================================================

/// Delay after each discrete command send, giving the microcontroller time to
/// latch the frame before the next one arrives (milliseconds).
pub const SETTLE_DELAY_MS: u64 = 10;

/// Delay between consecutive LED pulses during an ambient animation sweep
/// (milliseconds).
pub const ANIMATION_STEP_MS: u64 = 500;

/// Bounded timeout for the worker's wait on the next queued command
/// (milliseconds). Also bounds how long a stop request can go unobserved.
pub const COMMAND_WAIT_MS: u64 = 1000;

/// Wait after opening the serial port. The microcontroller resets on open and
/// drops frames sent before its firmware is up (milliseconds).
pub const PORT_BOOT_DELAY_MS: u64 = 1500;

/// Default baud rate for the strip's serial link.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

// ============================================================================
// Game defaults
// ============================================================================

/// Default maximum play time before a session is force-ended (seconds).
pub const DEFAULT_MAX_PLAY_SECS: u64 = 600;

/// Timestamp format used by the highscore log: `2024-01-01 10:00`.
pub const HIGHSCORE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
