//! The shared feed/empty core that both transport backends drive.
//!
//! The circular-DMA backend calls [`PingPongEngine::feed`]/[`PingPongEngine::empty`]
//! once per half-complete/complete interrupt with a 256-byte (by default)
//! slice. The event-queue backend calls the same methods with a
//! full-DMA-buffer-sized slice per write/read cycle. The copy, reformat,
//! cursor-advance, and queue hand-off logic is written exactly once here.

use crate::error::StateError;
use crate::queue::Queue;
use crate::reformat::{swap_32_bit_half_words_bytes, swap_32_bit_stereo_channels_bytes};
use crate::types::{BufferHandle, Bits, Format};

/// Which wire-level byte reformat, if any, the active backend requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReformatKind {
    /// No reformat; the wire layout already matches the canonical layout.
    None,
    /// Swap adjacent 32-bit stereo (L,R) pairs to (R,L).
    ChannelSwap32Stereo,
    /// Swap the high/low 16-bit half-words of every 32-bit sample.
    HalfWordSwap32,
}

/// What happened on one `feed`/`empty` step, useful for backend logging and
/// tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// No application buffer was available; the target half was silence-filled
    /// (TX) or the DMA half was discarded (RX).
    Underrun,
    /// Data was copied; the active application buffer is not yet exhausted.
    Copied,
    /// Data was copied and the active application buffer reached its end;
    /// it has been handed to the opposite queue and the completion callback
    /// (if any) should now fire.
    BufferCompleted,
}

struct CurrentBuffer {
    handle: BufferHandle,
    cursor: usize,
}

/// Owns the idle/active queues and the in-flight application buffer cursor
/// for one session, and implements the per-half-buffer copy algorithm.
pub struct PingPongEngine<const CAP: usize> {
    bits: Bits,
    format: Format,
    reformat: ReformatKind,
    idle: Queue<BufferHandle, CAP>,
    active: Queue<BufferHandle, CAP>,
    current: Option<CurrentBuffer>,
}

impl<const CAP: usize> PingPongEngine<CAP> {
    /// Construct an engine for the given sample width, channel format, and
    /// wire reformat policy. Both queues start empty.
    #[must_use]
    pub const fn new(bits: Bits, format: Format, reformat: ReformatKind) -> Self {
        Self {
            bits,
            format,
            reformat,
            idle: Queue::new(),
            active: Queue::new(),
            current: None,
        }
    }

    /// Push a buffer onto the idle queue (buffers available for filling on
    /// RX, or replenishment bookkeeping on TX after `put_buffer`).
    ///
    /// # Errors
    ///
    /// Returns [`StateError::QueueFull`] if the idle queue is at capacity.
    pub fn enqueue_idle(&mut self, handle: BufferHandle) -> Result<(), StateError> {
        critical_section::with(|_| self.idle.enqueue(handle))
    }

    /// Push a buffer onto the active queue (buffers queued for playback on
    /// TX, or filled captures awaiting the application on RX).
    ///
    /// # Errors
    ///
    /// Returns [`StateError::QueueFull`] if the active queue is at capacity.
    pub fn enqueue_active(&mut self, handle: BufferHandle) -> Result<(), StateError> {
        critical_section::with(|_| self.active.enqueue(handle))
    }

    /// Pop the oldest buffer off the idle queue.
    pub fn dequeue_idle(&mut self) -> Option<BufferHandle> {
        critical_section::with(|_| self.idle.dequeue())
    }

    /// Pop the oldest buffer off the active queue.
    pub fn dequeue_active(&mut self) -> Option<BufferHandle> {
        critical_section::with(|_| self.active.dequeue())
    }

    /// Discard all queued buffers and the in-flight cursor, returning the
    /// session to a freshly-initialized state. Used by `init`/`deinit`.
    pub fn reset(&mut self) {
        critical_section::with(|_| {
            self.idle.clear();
            self.active.clear();
        });
        self.current = None;
    }

    /// Prime the engine with the first buffer to stream from the active
    /// queue (transmit-direction `start`). Returns `false` if the active
    /// queue was empty.
    pub fn prime_from_active(&mut self) -> bool {
        self.current.is_some() || self.pull_next_tx_buffer()
    }

    /// Prime the engine with the first buffer to stream from the idle queue
    /// (receive-direction `start`). Returns `false` if the idle queue was
    /// empty.
    pub fn prime_from_idle(&mut self) -> bool {
        self.current.is_some() || self.pull_next_rx_buffer()
    }

    /// Transmit step: fill `half` (one DMA half-buffer) from the active
    /// application buffer, duplicating/reformatting per the configured
    /// (bits, format). On underrun, `half` is zero-filled and streaming
    /// continues rather than stalling the hardware.
    #[allow(clippy::arithmetic_side_effects)] // cursor advances by consumed <= src.len() - cursor
    pub fn feed(&mut self, half: &mut [u8]) -> StepOutcome {
        if self.current.is_none() && !self.pull_next_tx_buffer() {
            half.fill(0);
            return StepOutcome::Underrun;
        }
        let Some(cur) = self.current.as_mut() else {
            half.fill(0);
            return StepOutcome::Underrun;
        };
        // SAFETY: `cur.handle` is exclusively owned by the engine while
        // `current` holds it — it was removed from the active queue and has
        // not been handed back to the application.
        let src = unsafe { cur.handle.as_slice() };
        let consumed = copy_app_to_dma(src, cur.cursor, half, self.bits, self.format);
        apply_reformat(half, self.reformat);
        cur.cursor += consumed;
        self.finish_step_if_exhausted(HandoffTarget::Idle)
    }

    /// Receive step: drain `half` (one DMA half-buffer, already captured by
    /// hardware) into the active application buffer, reformatting/extracting
    /// the left channel per the configured (bits, format). On underrun (no
    /// application buffer available), the captured half is simply discarded.
    #[allow(clippy::arithmetic_side_effects)] // cursor advances by consumed <= dst.len() - cursor
    pub fn empty(&mut self, half: &mut [u8]) -> StepOutcome {
        if self.current.is_none() && !self.pull_next_rx_buffer() {
            return StepOutcome::Underrun;
        }
        apply_reformat(half, self.reformat);
        let Some(cur) = self.current.as_mut() else {
            return StepOutcome::Underrun;
        };
        // SAFETY: see `feed` — `cur.handle` is exclusively owned here.
        let dst = unsafe { cur.handle.as_mut_slice() };
        let consumed = copy_dma_to_app(half, dst, cur.cursor, self.bits, self.format);
        cur.cursor += consumed;
        self.finish_step_if_exhausted(HandoffTarget::Active)
    }

    fn pull_next_tx_buffer(&mut self) -> bool {
        match critical_section::with(|_| self.active.dequeue()) {
            Some(handle) => {
                self.current = Some(CurrentBuffer { handle, cursor: 0 });
                true
            }
            None => false,
        }
    }

    fn pull_next_rx_buffer(&mut self) -> bool {
        match critical_section::with(|_| self.idle.dequeue()) {
            Some(handle) => {
                self.current = Some(CurrentBuffer { handle, cursor: 0 });
                true
            }
            None => false,
        }
    }

    fn finish_step_if_exhausted(&mut self, target: HandoffTarget) -> StepOutcome {
        let Some(cur) = self.current.as_ref() else {
            return StepOutcome::Underrun;
        };
        if cur.cursor < cur.handle.len() {
            return StepOutcome::Copied;
        }
        let Some(completed) = self.current.take().map(|cur| cur.handle) else {
            return StepOutcome::Underrun;
        };
        critical_section::with(|_| {
            let _ = match target {
                HandoffTarget::Idle => self.idle.enqueue(completed),
                HandoffTarget::Active => self.active.enqueue(completed),
            };
        });
        StepOutcome::BufferCompleted
    }
}

/// Which queue a fully-consumed/fully-filled buffer is handed back to: the
/// idle queue when `feed` (TX) drains a buffer, the active queue when
/// `empty` (RX) fills one.
enum HandoffTarget {
    Idle,
    Active,
}

fn apply_reformat(half: &mut [u8], kind: ReformatKind) {
    match kind {
        ReformatKind::None => {}
        ReformatKind::ChannelSwap32Stereo => swap_32_bit_stereo_channels_bytes(half),
        ReformatKind::HalfWordSwap32 => swap_32_bit_half_words_bytes(half),
    }
}

#[allow(clippy::arithmetic_side_effects)] // offsets bounded by half.len()/src.len() checks before each slice
#[allow(clippy::indexing_slicing)] // every range is bounded by an explicit len check immediately above it
fn copy_app_to_dma(
    src: &[u8],
    cursor: usize,
    half: &mut [u8],
    bits: Bits,
    format: Format,
) -> usize {
    let sample_bytes = bits.container_bytes();
    match format {
        Format::Stereo => {
            let n = half.len().min(src.len().saturating_sub(cursor));
            half[..n].copy_from_slice(&src[cursor..cursor + n]);
            if n < half.len() {
                half[n..].fill(0);
            }
            n
        }
        Format::Mono => {
            let frame_bytes = sample_bytes * 2;
            let frames = half.len() / frame_bytes;
            let mut consumed = 0;
            for i in 0..frames {
                let src_off = cursor + i * sample_bytes;
                if src_off + sample_bytes > src.len() {
                    break;
                }
                let l_off = i * frame_bytes;
                let r_off = l_off + sample_bytes;
                half[l_off..l_off + sample_bytes].copy_from_slice(&src[src_off..src_off + sample_bytes]);
                half[r_off..r_off + sample_bytes].copy_from_slice(&src[src_off..src_off + sample_bytes]);
                consumed += sample_bytes;
            }
            consumed
        }
    }
}

#[allow(clippy::arithmetic_side_effects)] // offsets bounded by half.len()/dst.len() checks before each slice
#[allow(clippy::indexing_slicing)] // every range is bounded by an explicit len check immediately above it
fn copy_dma_to_app(
    half: &[u8],
    dst: &mut [u8],
    cursor: usize,
    bits: Bits,
    format: Format,
) -> usize {
    let sample_bytes = bits.container_bytes();
    match format {
        Format::Stereo => {
            let n = half.len().min(dst.len().saturating_sub(cursor));
            dst[cursor..cursor + n].copy_from_slice(&half[..n]);
            n
        }
        Format::Mono => {
            let frame_bytes = sample_bytes * 2;
            let frames = half.len() / frame_bytes;
            let mut consumed = 0;
            for i in 0..frames {
                let dst_off = cursor + i * sample_bytes;
                if dst_off + sample_bytes > dst.len() {
                    break;
                }
                let l_off = i * frame_bytes;
                dst[dst_off..dst_off + sample_bytes].copy_from_slice(&half[l_off..l_off + sample_bytes]);
                consumed += sample_bytes;
            }
            consumed
        }
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)] // test assertions on known-length fixed buffers
#[allow(clippy::unwrap_used)] // tests use unwrap() for readable assertions
mod tests {
    use super::*;

    fn leak_buffer(bytes: Vec<u8>) -> BufferHandle {
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        let ptr = Box::into_raw(boxed) as *mut u8;
        unsafe { BufferHandle::new(ptr, len) }
    }

    #[test]
    fn scenario_s1_stereo_16_bit_tx_full_buffer() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None);
        let handle = leak_buffer(vec![0xAA; 512]);
        engine.enqueue_active(handle).unwrap();
        let mut half = [0u8; 256];

        assert_eq!(engine.feed(&mut half), StepOutcome::Copied);
        assert_eq!(half, [0xAA; 256]);
        assert_eq!(engine.feed(&mut half), StepOutcome::BufferCompleted);
        assert_eq!(engine.dequeue_idle().is_some(), true);
    }

    #[test]
    fn scenario_s4_mono_16_bit_tx_duplicates_into_l_and_r() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Mono, ReformatKind::None);
        // Two mono 16-bit samples: 0xBBAA, 0xDDCC (little-endian bytes).
        let handle = leak_buffer(vec![0xAA, 0xBB, 0xCC, 0xDD]);
        engine.enqueue_active(handle).unwrap();
        let mut half = [0u8; 8];
        engine.feed(&mut half);
        assert_eq!(half, [0xAA, 0xBB, 0xAA, 0xBB, 0xCC, 0xDD, 0xCC, 0xDD]);
    }

    #[test]
    fn scenario_s6_underrun_zero_fills_and_does_not_error() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None);
        let mut half = [0xFFu8; 256];
        let outcome = engine.feed(&mut half);
        assert_eq!(outcome, StepOutcome::Underrun);
        assert_eq!(half, [0u8; 256]);
    }

    #[test]
    fn rx_discards_dma_half_when_no_application_buffer_queued() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None);
        let mut half = [0x42u8; 256];
        let outcome = engine.empty(&mut half);
        assert_eq!(outcome, StepOutcome::Underrun);
    }

    #[test]
    fn rx_stereo_round_trips_full_buffer() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None);
        let handle = leak_buffer(vec![0u8; 512]);
        engine.enqueue_idle(handle).unwrap();
        let mut half_a = [0x11u8; 256];
        let mut half_b = [0x22u8; 256];
        assert_eq!(engine.empty(&mut half_a), StepOutcome::Copied);
        assert_eq!(engine.empty(&mut half_b), StepOutcome::BufferCompleted);
        let completed = engine.dequeue_active().unwrap();
        let bytes = unsafe { completed.as_slice() };
        assert_eq!(&bytes[..256], &[0x11u8; 256][..]);
        assert_eq!(&bytes[256..], &[0x22u8; 256][..]);
    }

    #[test]
    fn buffer_handle_occupies_exactly_one_location_at_a_time() {
        let mut engine: PingPongEngine<4> = PingPongEngine::new(Bits::Bits16, Format::Stereo, ReformatKind::None);
        let handle = leak_buffer(vec![0u8; 256]);
        engine.enqueue_active(handle).unwrap();
        assert_eq!(engine.active.len(), 1);
        let mut half = [0u8; 256];
        engine.feed(&mut half);
        // Moved out of the active queue into the in-flight cursor slot.
        assert_eq!(engine.active.len(), 0);
        engine.feed(&mut half);
        // Handed off to the idle queue; never present in two places.
        assert_eq!(engine.idle.len(), 1);
    }
}
