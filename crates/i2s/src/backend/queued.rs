//! Event-queue-driven backend.
//!
//! Some I2S drivers expose only a blocking (or non-blocking-with-timeout)
//! write/read call, with their own DMA management hidden behind it; the
//! only thing visible to software is a completion event delivered some time
//! later. This backend runs a dedicated worker task that blocks on a
//! per-session event queue and drives the same [`crate::dma_engine::PingPongEngine`]
//! `feed`/`empty` core as [`crate::backend::circular`], one full-block
//! transfer at a time instead of one half-buffer at a time.
//!
//! Deliberately one [`embassy_sync::channel::Channel`] per session, not a
//! single process-wide queue shared across peripherals: a shared queue
//! cannot tell which session an event belongs to once more than one
//! peripheral is active.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::dma_engine::ReformatKind;
use crate::session::{CompletionCallback, Session};
use crate::types::{Bits, Format, Mode, SampleRateHz};

/// Depth of the per-session event queue. The source used an unbounded
/// FreeRTOS queue; a small bounded queue is sufficient here because the
/// worker drains it far faster than transfer-complete events arrive.
pub const EVENT_QUEUE_DEPTH: usize = 4;

/// An event delivered by the driver's own completion notification
/// mechanism (an ISR, a callback, or a polling task — `queued` does not
/// care which).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A transmit block was fully consumed by hardware; the worker should
    /// push the next one.
    TxDone,
    /// A receive block was fully captured by hardware; the worker should
    /// drain it.
    RxDone,
}

/// Per-session event queue. Owned by whoever wires up the concrete driver's
/// completion notification (an ISR, a FreeRTOS-equivalent task, or a
/// polling loop on host) — never shared between sessions.
pub type EventQueue = Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;

/// The minimal contract a blocking-I/O I2S driver must satisfy to back a
/// [`QueuedBackend`].
///
/// `write`/`read` are expected to be non-blocking-with-immediate-return:
/// they transfer as much of `block` as the driver's internal buffer has
/// room for right now and report how many bytes were actually moved,
/// mirroring `i2s_write`/`i2s_read` called with a zero timeout.
pub trait BlockingIoDriver {
    /// The driver's own error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Which wire-level byte reformat this driver needs for the given
    /// sample width and channel format. See
    /// [`crate::backend::TransportBackend::reformat_for`].
    fn reformat_for(bits: Bits, format: Format) -> ReformatKind;

    /// Size, in bytes, of one full transfer block this driver operates on.
    fn block_bytes(&self) -> usize;

    /// Configure the peripheral for the given direction/width/format/rate.
    fn configure(
        &mut self,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate: SampleRateHz,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Arm the peripheral so it begins emitting completion events.
    fn start(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Disarm the peripheral.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Write as much of `block` as the driver will currently accept.
    /// Returns the number of bytes actually written.
    fn write(&mut self, block: &[u8]) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Read as much of `block` as the driver currently has captured.
    /// Returns the number of bytes actually read.
    fn read(&mut self, block: &mut [u8]) -> impl core::future::Future<Output = Result<usize, Self::Error>>;
}

/// Adapts a [`BlockingIoDriver`] into a [`crate::backend::TransportBackend`].
///
/// `BLOCK` is the full-transfer block size; it must equal
/// `driver.block_bytes()` (checked on first `configure`).
pub struct QueuedBackend<DRV: BlockingIoDriver, const BLOCK: usize> {
    driver: DRV,
}

impl<DRV: BlockingIoDriver, const BLOCK: usize> QueuedBackend<DRV, BLOCK> {
    /// Wrap a concrete blocking-I/O driver.
    pub const fn new(driver: DRV) -> Self {
        Self { driver }
    }
}

impl<DRV: BlockingIoDriver, const BLOCK: usize> crate::backend::TransportBackend
    for QueuedBackend<DRV, BLOCK>
{
    type Error = DRV::Error;
    const SUPPORTS_24_BIT: bool = false;

    fn reformat_for(bits: Bits, format: Format) -> ReformatKind {
        DRV::reformat_for(bits, format)
    }

    fn dma_half_buffer_bytes(&self) -> usize {
        BLOCK
    }

    async fn configure(
        &mut self,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate: SampleRateHz,
    ) -> Result<(), Self::Error> {
        self.driver.configure(mode, bits, format, sample_rate).await
    }

    async fn start(&mut self) -> Result<(), Self::Error> {
        self.driver.start().await
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.driver.stop().await
    }
}

/// Drain one event from `events` and run the corresponding `feed`/`empty`
/// step, pushing or pulling exactly one `BLOCK`-sized transfer through the
/// driver. Intended to be called in a `loop` from a free-standing async fn
/// that the firmware crate wraps with `#[embassy_executor::task]`, the way
/// `firmware::audio::sai_task::audio_task` drives its `Stm32SaiDriver` —
/// this crate does not spawn tasks itself.
pub async fn run_queued_step<DRV, C, const CAP: usize, const BLOCK: usize>(
    session: &mut Session<QueuedBackend<DRV, BLOCK>, C, CAP>,
    events: &EventQueue,
) where
    DRV: BlockingIoDriver,
    C: CompletionCallback,
{
    let event = events.receive().await;
    let mut block = [0u8; BLOCK];
    match event {
        Event::TxDone => {
            let outcome = session.engine_mut().feed(&mut block);
            if let Err(_err) = session.backend_mut().driver.write(&block).await {
                #[cfg(feature = "defmt")]
                defmt::error!("I2S TX driver write failed during streaming");
            }
            session.notify_step(outcome);
        }
        Event::RxDone => {
            if let Err(_err) = session.backend_mut().driver.read(&mut block).await {
                #[cfg(feature = "defmt")]
                defmt::error!("I2S RX driver read failed during streaming");
            }
            let outcome = session.engine_mut().empty(&mut block);
            session.notify_step(outcome);
        }
    }
}
