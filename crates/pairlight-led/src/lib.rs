//! LED strip command channel for the pairlight game.
//!
//! This crate serializes concurrent color requests into a single outbound
//! stream consumed by one background worker, the only thread allowed to touch
//! the serial link. Callers enqueue discrete commands or flip the channel into
//! a low-priority ambient animation; neither operation blocks on hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  enqueue / start_animation  ┌──────────────┐
//! │ Driving      │────────────────────────────►│ Command queue │
//! │ thread       │        (non-blocking)       │ + ambient set │
//! └──────────────┘                             └──────┬───────┘
//!                                                     │ drains
//!                                              ┌──────▼───────┐
//!                                              │ Worker thread │──► serial link
//!                                              └──────────────┘
//! ```
//!
//! Queued commands always preempt the ambient animation: `enqueue` clears the
//! ambient flag and the worker checks it between every LED of a sweep.
//!
//! A missing or unopenable serial port degrades the channel to a no-op link:
//! all operations stay accepted (and observable in tests) with no physical
//! effect.

pub mod channel;
pub mod command;
pub mod error;
pub mod link;

pub use channel::{LedChannel, LedTiming};
pub use command::LedCommand;
pub use error::{LedError, Result};
pub use link::{AnyLedLink, LedLink, LinkOpener, MockLink, MockLinkHandle, NoopLink, SerialLink};
