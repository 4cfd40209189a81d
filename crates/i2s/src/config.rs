//! Central configuration constants for the streaming engine.
//!
//! Mirrors `platform::config`'s role: named constants callers should
//! reference instead of hardcoding magic numbers, plus compile-time budget
//! checks in the style of `platform::dma_safety`.

/// Default queue capacity (idle queue and active queue each hold this many
/// buffer handles). Matches the canonical queue depth observed across I2S
/// driver implementations this engine is modeled on.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Canonical size, in bytes, of one DMA ping-pong half-buffer.
///
/// This is the transfer granularity at which the engine exchanges data with
/// the hardware: one half-complete/complete event moves exactly this many
/// bytes. Sized small deliberately — it trades a tighter interrupt rate for
/// lower worst-case latency, appropriate for a general-purpose engine rather
/// than one peripheral's throughput-optimized configuration.
pub const DEFAULT_DMA_HALF_BUFFER_BYTES: usize = 256;

/// Minimum supported sample rate, in Hz.
pub const MIN_SAMPLE_RATE_HZ: u32 = 8_000;

/// Maximum supported sample rate, in Hz.
pub const MAX_SAMPLE_RATE_HZ: u32 = 768_000;

/// Number of I2S/SAI peripheral instances [`crate::registry`] tracks claims
/// for. Boards in this corpus expose either two peripherals numbered 1/2 or
/// two numbered 0/1; either way, two is the observed instance count.
pub const MAX_PERIPHERALS: usize = 2;

const _: () = assert!(
    DEFAULT_DMA_HALF_BUFFER_BYTES % 4 == 0,
    "DMA half-buffer size must be a multiple of 4 bytes (one 32-bit stereo frame)"
);

const _: () = assert!(
    MIN_SAMPLE_RATE_HZ < MAX_SAMPLE_RATE_HZ,
    "sample rate bounds must be non-degenerate"
);
