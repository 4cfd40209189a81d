//! The per-peripheral session state machine: construction, (re)initialization,
//! `get_buffer`/`put_buffer`, `start`, and `deinit`.

use crate::backend::TransportBackend;
use crate::config::DEFAULT_QUEUE_CAPACITY;
use crate::dma_engine::{PingPongEngine, ReformatKind, StepOutcome};
use crate::error::{CallbackError, ConfigError, I2sError, StateError};
use crate::registry::{Claim, PeripheralId};
use crate::types::{Bits, BufferHandle, Format, Mode, SampleRateHz};

/// Lifecycle states a [`Session`] moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Constructed but never successfully `init`'d.
    Unconfigured,
    /// Configured; DMA is not running.
    Idle,
    /// DMA is running.
    Streaming,
    /// `deinit` has been called; the peripheral slot is free.
    Deinitialized,
}

/// Invoked when a buffer completes its lifecycle: fully drained back to the
/// idle queue (TX) or fully filled into the active queue (RX).
///
/// A returned `Err` clears the callback slot and is logged; the stream
/// itself keeps running, matching the source's behaviour of disabling a
/// Python callback that raised rather than aborting playback.
pub trait CompletionCallback {
    /// Called once per completed buffer, on whatever context (ISR or
    /// worker task) the active backend runs its feed/empty loop in.
    fn on_complete(&mut self) -> Result<(), CallbackError>;
}

/// A callback that never fires; the default when no completion
/// notification is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallback;

impl CompletionCallback for NoCallback {
    fn on_complete(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// One I2S peripheral's streaming session.
///
/// Generic over the concrete [`TransportBackend`] driving the hardware, the
/// [`CompletionCallback`] implementation the application supplies, and the
/// queue capacity `CAP` (default matches [`DEFAULT_QUEUE_CAPACITY`]).
pub struct Session<B: TransportBackend, C: CompletionCallback = NoCallback, const CAP: usize = DEFAULT_QUEUE_CAPACITY> {
    state: SessionState,
    mode: Mode,
    bits: Bits,
    format: Format,
    engine: PingPongEngine<CAP>,
    backend: B,
    callback: Option<C>,
    callback_faulted: bool,
    claim: Option<Claim>,
}

impl<B: TransportBackend, C: CompletionCallback, const CAP: usize> Session<B, C, CAP> {
    /// Construct a session over the given backend without claiming a
    /// peripheral id. The session starts [`SessionState::Unconfigured`];
    /// only `init` is meaningful until it has been called.
    ///
    /// Prefer [`Self::construct`] when the board exposes more than one I2S
    /// peripheral instance and a second session must not silently claim the
    /// same hardware as a live one; this constructor is for callers (and
    /// tests) that already guarantee single ownership some other way.
    pub const fn new(backend: B) -> Self {
        Self {
            state: SessionState::Unconfigured,
            mode: Mode::TxMaster,
            bits: Bits::Bits16,
            format: Format::Stereo,
            engine: PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None),
            backend,
            callback: None,
            callback_faulted: false,
            claim: None,
        }
    }

    /// Claim `id` and run `init` with the given configuration in one step.
    ///
    /// If `init` fails, the claim on `id` is released before the error is
    /// returned — a failed construction never leaves the peripheral
    /// permanently locked out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPeripheralId`] if `id` names no
    /// peripheral this build supports, [`ConfigError::AlreadyInUse`] if
    /// another live session already claimed `id`, or any error `init` can
    /// return.
    #[allow(clippy::too_many_arguments)]
    pub async fn construct(
        id: PeripheralId,
        backend: B,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate_hz: u32,
        buffers: &[BufferHandle],
        callback: Option<C>,
    ) -> Result<Self, I2sError<B::Error>> {
        let claim = Claim::acquire(id)?;
        let mut session = Self::new(backend);
        session
            .init(mode, bits, format, sample_rate_hz, buffers, callback)
            .await?;
        session.claim = Some(claim);
        Ok(session)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Direction this session is configured for.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The peripheral id this session claimed via [`Self::construct`], if
    /// any.
    #[must_use]
    pub fn peripheral_id(&self) -> Option<PeripheralId> {
        self.claim.as_ref().map(Claim::id)
    }

    /// (Re)configure the session.
    ///
    /// If currently [`SessionState::Streaming`], the backend is stopped
    /// first. Both queues are cleared and every buffer in `buffers` is
    /// enqueued onto the idle queue before the backend is reconfigured.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `bits` is rejected by the backend,
    /// `sample_rate_hz` is out of range, or `buffers` is longer than `CAP`
    /// or contains a misaligned length. Returns
    /// [`crate::error::I2sError::Driver`] if the backend itself rejects the
    /// configuration.
    pub async fn init(
        &mut self,
        mode: Mode,
        bits: Bits,
        format: Format,
        sample_rate_hz: u32,
        buffers: &[BufferHandle],
        callback: Option<C>,
    ) -> Result<(), I2sError<B::Error>> {
        if matches!(bits, Bits::Bits24) && !B::SUPPORTS_24_BIT {
            return Err(ConfigError::InvalidBits.into());
        }
        let sample_rate = SampleRateHz::new(sample_rate_hz)?;
        if buffers.len() > CAP {
            return Err(ConfigError::InvalidBufferSet.into());
        }
        let transfer_unit = self.transfer_unit_bytes(bits, format);
        for buffer in buffers {
            if transfer_unit == 0 || buffer.len() % transfer_unit != 0 {
                return Err(ConfigError::MisalignedBufferLength.into());
            }
        }

        if self.state == SessionState::Streaming {
            self.backend.stop().await.map_err(I2sError::Driver)?;
        }

        self.engine = PingPongEngine::new(bits, format, B::reformat_for(bits, format));
        for buffer in buffers {
            // `buffers.len() <= CAP` was checked above, so this cannot fail.
            let _ = self.engine.enqueue_idle(*buffer);
        }

        self.backend
            .configure(mode, bits, format, sample_rate)
            .await
            .map_err(I2sError::Driver)?;

        self.mode = mode;
        self.bits = bits;
        self.format = format;
        self.callback = callback;
        self.callback_faulted = false;
        self.state = SessionState::Idle;
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // half-buffer byte count, Format::Mono halves a fixed non-zero size
    fn transfer_unit_bytes(&self, bits: Bits, format: Format) -> usize {
        let half = self.backend.dma_half_buffer_bytes();
        match format {
            Format::Stereo => half,
            Format::Mono => half / 2,
        }
    }

    /// Pop the next buffer the application should consume.
    ///
    /// TX: pops the idle queue (a buffer ready to be filled and resubmitted
    /// via `put_buffer`). RX: pops the active queue (a buffer hardware has
    /// finished filling). Returns `Ok(None)` if that queue is currently
    /// empty — not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotInitialized`] if `init` has not succeeded.
    pub fn get_buffer(&mut self) -> Result<Option<BufferHandle>, I2sError<B::Error>> {
        self.require_initialized()?;
        Ok(match self.mode {
            Mode::TxMaster => self.engine.dequeue_idle(),
            Mode::RxMaster => self.engine.dequeue_active(),
        })
    }

    /// Hand a buffer to the engine.
    ///
    /// TX: pushes onto the active (playback) queue. RX: pushes onto the
    /// idle (fillable) queue.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotInitialized`] if `init` has not succeeded,
    /// or [`StateError::QueueFull`] if the target queue is already at
    /// capacity.
    pub fn put_buffer(&mut self, handle: BufferHandle) -> Result<(), I2sError<B::Error>> {
        self.require_initialized()?;
        match self.mode {
            Mode::TxMaster => self.engine.enqueue_active(handle),
            Mode::RxMaster => self.engine.enqueue_idle(handle),
        }
        .map_err(Into::into)
    }

    /// Begin streaming.
    ///
    /// Primes the engine with the first buffer (from the active queue for
    /// TX, the idle queue for RX) and starts the backend. Idempotent if
    /// already streaming. `put_buffer` alone never starts streaming —
    /// `start` must be called explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NotInitialized`] if `init` has not succeeded,
    /// [`StateError::NoBufferToPrime`] if the priming queue is empty, or
    /// [`crate::error::I2sError::Driver`] if the backend fails to start.
    pub async fn start(&mut self) -> Result<(), I2sError<B::Error>> {
        self.require_initialized()?;
        if self.state == SessionState::Streaming {
            return Ok(());
        }
        let primed = match self.mode {
            Mode::TxMaster => self.engine.prime_from_active(),
            Mode::RxMaster => self.engine.prime_from_idle(),
        };
        if !primed {
            return Err(StateError::NoBufferToPrime.into());
        }
        self.backend.start().await.map_err(I2sError::Driver)?;
        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Stop the backend, release all queued buffers, and free the
    /// peripheral slot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::I2sError::Driver`] if the backend fails to
    /// stop cleanly. The session is still marked deinitialized regardless.
    pub async fn deinit(&mut self) -> Result<(), I2sError<B::Error>> {
        let result = self.backend.stop().await.map_err(I2sError::Driver);
        self.engine.reset();
        self.state = SessionState::Deinitialized;
        self.claim = None;
        result
    }

    /// Direct access to the feed/empty engine, for the active backend to
    /// drive from its ISR or worker task.
    pub fn engine_mut(&mut self) -> &mut PingPongEngine<CAP> {
        &mut self.engine
    }

    /// Direct access to the concrete backend, for ISR/worker-task code that
    /// needs to reach the underlying driver (e.g. the queued backend's
    /// non-blocking write/read call).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Dispatch the completion callback after a [`StepOutcome::BufferCompleted`]
    /// step. A faulting callback is cleared and not retried.
    pub fn notify_step(&mut self, outcome: StepOutcome) {
        if outcome != StepOutcome::BufferCompleted || self.callback_faulted {
            return;
        }
        if let Some(callback) = self.callback.as_mut() {
            if callback.on_complete().is_err() {
                #[cfg(feature = "defmt")]
                defmt::error!("I2S completion callback faulted; disabling it, stream continues");
                self.callback_faulted = true;
                self.callback = None;
            }
        }
    }

    fn require_initialized(&self) -> Result<(), StateError> {
        match self.state {
            SessionState::Idle | SessionState::Streaming => Ok(()),
            SessionState::Unconfigured | SessionState::Deinitialized => {
                Err(StateError::NotInitialized)
            }
        }
    }
}
