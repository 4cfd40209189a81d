//! The platform-specific coupling between [`crate::session::Session`] and a
//! concrete hardware I2S/SAI controller.
//!
//! Two shapes exist in practice (see [`circular`] and [`queued`]): one where
//! the driver exposes circular DMA with half/complete interrupts fired
//! straight into [`crate::dma_engine::PingPongEngine::feed`]/`empty`, and one
//! where the driver only exposes a blocking write/read call and an event
//! queue drives a worker task that calls the same `feed`/`empty` with a
//! full-buffer-sized slice. Both are expressed through this one trait so
//! [`crate::session::Session`] never needs to know which shape it is driving.

pub mod circular;
pub mod queued;

use crate::dma_engine::ReformatKind;
use crate::types::{Bits, Format, Mode, SampleRateHz};

/// The platform-specific half of a streaming session: everything that
/// actually touches the I2S/SAI peripheral and its DMA controller.
///
/// Implementations own the static DMA ping-pong region and are responsible
/// for calling [`crate::dma_engine::PingPongEngine::feed`]/`empty` at the
/// right time (from an ISR for [`circular`], from a worker task for
/// [`queued`]) and then notifying the session so it can fire the
/// application's completion callback.
pub trait TransportBackend {
    /// The backend's own driver error type, surfaced to callers via
    /// [`crate::error::I2sError::Driver`].
    type Error: core::fmt::Debug + core::fmt::Display;

    /// `true` if this backend's hardware accepts 24-bit samples packed into
    /// a 32-bit container. Session-level `init` validation rejects
    /// `Bits::Bits24` when this is `false`.
    const SUPPORTS_24_BIT: bool;

    /// Which wire-level byte reformat this backend's hardware requires for
    /// the given sample width and channel format. [`crate::session::Session::init`]
    /// reads this once per `init` call and configures the engine with it, so
    /// every `feed`/`empty` step applies the right transform to each DMA
    /// half-buffer. Most (bits, format) pairs need no reformat at all —
    /// return [`ReformatKind::None`] for those.
    fn reformat_for(bits: Bits, format: Format) -> ReformatKind;

    /// Size, in bytes, of one DMA half-buffer this backend operates on.
    fn dma_half_buffer_bytes(&self) -> usize;

    /// Configure (or reconfigure) the underlying peripheral for the given
    /// direction, sample width, channel format, and sample rate. Must be
    /// called again after [`Self::stop`] before [`Self::start`].
    fn configure(
        &mut self,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate: SampleRateHz,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Start the peripheral and its DMA controller streaming.
    fn start(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop the peripheral and its DMA controller.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
