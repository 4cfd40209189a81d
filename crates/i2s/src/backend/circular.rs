//! ISR-driven circular-DMA backend.
//!
//! The underlying peripheral runs a single circular DMA region and fires a
//! half-complete interrupt (first half now software-owned) and a complete
//! interrupt (second half now software-owned), forever alternating. This
//! mirrors the ping-pong scheme the STM32 SAI/DMA pair implements.
//!
//! This module provides the generic plumbing (`CircularBackend`,
//! `HalfBufferDriver`, `on_half_buffer_ready`); the actual `Sai` peripheral
//! setup, clock/mclk configuration, and register-level DMA wiring belong to
//! the firmware crate's hardware init path, not here — that is board-level
//! detail, not streaming-engine logic.

use crate::dma_engine::ReformatKind;
use crate::session::{CompletionCallback, Session};
use crate::types::{Bits, Format, Mode, SampleRateHz};

/// The minimal contract a circular-DMA peripheral driver must satisfy to
/// back a [`CircularBackend`].
///
/// Implementations own the static ping-pong DMA region and the peripheral
/// handle; they do not know about queues, cursors, or reformatting — that
/// stays in [`crate::dma_engine::PingPongEngine`].
pub trait HalfBufferDriver {
    /// The driver's own error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// `true` if the peripheral accepts 24-bit samples packed into a 32-bit
    /// container.
    const SUPPORTS_24_BIT: bool;

    /// Which wire-level byte reformat this peripheral needs for the given
    /// sample width and channel format. See
    /// [`crate::backend::TransportBackend::reformat_for`].
    fn reformat_for(bits: Bits, format: Format) -> ReformatKind;

    /// Size, in bytes, of one half of the ping-pong DMA region.
    fn half_buffer_bytes(&self) -> usize;

    /// Configure the peripheral for the given direction/width/format/rate.
    fn configure(
        &mut self,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate: SampleRateHz,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Start circular DMA.
    fn start(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Stop circular DMA.
    fn stop(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Adapts a [`HalfBufferDriver`] into a [`crate::backend::TransportBackend`].
pub struct CircularBackend<DRV: HalfBufferDriver> {
    driver: DRV,
}

impl<DRV: HalfBufferDriver> CircularBackend<DRV> {
    /// Wrap a concrete half-buffer driver.
    pub const fn new(driver: DRV) -> Self {
        Self { driver }
    }
}

impl<DRV: HalfBufferDriver> crate::backend::TransportBackend for CircularBackend<DRV> {
    type Error = DRV::Error;
    const SUPPORTS_24_BIT: bool = DRV::SUPPORTS_24_BIT;

    fn reformat_for(bits: Bits, format: Format) -> ReformatKind {
        DRV::reformat_for(bits, format)
    }

    fn dma_half_buffer_bytes(&self) -> usize {
        self.driver.half_buffer_bytes()
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

/// The ISR trampoline: call this from the peripheral's half-complete and
/// complete interrupt handlers with a mutable slice over the half of the
/// ping-pong region that just became software-owned.
///
/// Dispatches to [`crate::dma_engine::PingPongEngine::feed`] or `empty`
/// depending on the session's configured direction, then fires the
/// completion callback if the step finished a buffer. Runs entirely in
/// interrupt context — no allocation, no blocking.
pub fn on_half_buffer_ready<DRV, C, const CAP: usize>(
    session: &mut Session<CircularBackend<DRV>, C, CAP>,
    half: &mut [u8],
) where
    DRV: HalfBufferDriver,
    C: CompletionCallback,
{
    let outcome = match session.mode() {
        Mode::TxMaster => session.engine_mut().feed(half),
        Mode::RxMaster => session.engine_mut().empty(half),
    };
    session.notify_step(outcome);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // tests use unwrap() for readable assertions
mod tests {
    use super::*;
    use crate::backend::TransportBackend;
    use crate::session::NoCallback;
    use crate::types::BufferHandle;

    struct FakeDriver {
        half_bytes: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FakeError;

    impl core::fmt::Display for FakeError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "fake driver error")
        }
    }

    impl HalfBufferDriver for FakeDriver {
        type Error = FakeError;
        const SUPPORTS_24_BIT: bool = false;

        fn reformat_for(_bits: Bits, _format: Format) -> ReformatKind {
            ReformatKind::None
        }

        fn half_buffer_bytes(&self) -> usize {
            self.half_bytes
        }

        async fn configure(
            &mut self,
            _mode: Mode,
            _bits: Bits,
            _format: Format,
            _sample_rate: SampleRateHz,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn start(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn block_on<F: core::future::Future>(mut fut: F) -> F::Output {
        use core::pin::Pin;
        use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            RawWaker::new(core::ptr::null(), &VTABLE)
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        let waker = unsafe { Waker::from_raw(RawWaker::new(core::ptr::null(), &VTABLE)) };
        let mut cx = Context::from_waker(&waker);
        let mut fut = unsafe { Pin::new_unchecked(&mut fut) };
        loop {
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    #[test]
    fn isr_trampoline_feeds_and_fires_callback_on_completion() {
        let backend = CircularBackend::new(FakeDriver { half_bytes: 4 });
        let mut session: Session<CircularBackend<FakeDriver>, NoCallback, 2> =
            Session::new(backend);
        let mut backing = [0xAAu8; 4];
        let handle = unsafe { BufferHandle::new(backing.as_mut_ptr(), backing.len()) };
        block_on(session.init(Mode::TxMaster, Bits::Bits16, Format::Stereo, 48_000, &[], None))
            .unwrap();
        session.put_buffer(handle).unwrap();
        block_on(session.start()).unwrap();

        let mut half = [0u8; 4];
        on_half_buffer_ready(&mut session, &mut half);
        assert_eq!(half, [0xAA; 4]);
    }
}
