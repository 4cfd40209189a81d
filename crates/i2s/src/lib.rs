//! I2S audio streaming engine.
//!
//! Bridges a microcontroller I2S peripheral (DMA-driven) with application
//! audio buffers: a dual-queue buffer-exchange state machine, a DMA
//! ping-pong half-buffer protocol, and per-format copy/reformat paths.
//!
//! # Layers
//!
//! ```text
//! Application code
//!         v
//! Session (this crate) -- init / get_buffer / put_buffer / start / deinit
//!         v
//! PingPongEngine        -- queues, cursor, copy/reformat algorithm
//!         v
//! TransportBackend       -- circular (ISR) or queued (event-queue) driver coupling
//!         v
//! Concrete peripheral driver (firmware crate, board-specific)
//! ```
//!
//! Deliberately out of scope: sample-rate conversion, mixing, transcoding,
//! file I/O, compression, and any audio DSP — this crate only ever moves
//! and reshapes bytes that are already at the target sample rate.
//!
//! # Features
//!
//! - `std`: enable `std::error::Error` impls on the error types (for host
//!   tests and tooling).
//! - `hardware`: physical hardware target marker.
//! - `defmt`: enable `defmt::Format` derives on public types.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod dma_engine;
pub mod error;
pub mod queue;
pub mod reformat;
pub mod registry;
pub mod session;
pub mod types;

pub use backend::TransportBackend;
pub use dma_engine::{PingPongEngine, ReformatKind, StepOutcome};
pub use error::{CallbackError, ConfigError, I2sError, StateError};
pub use queue::Queue;
pub use registry::{Claim, PeripheralId};
pub use session::{CompletionCallback, NoCallback, Session, SessionState};
pub use types::{Bits, BufferHandle, Format, Mode, SampleRateHz};
