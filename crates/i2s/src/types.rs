//! Shared value types: direction/format/width enums, the validated sample
//! rate newtype, and the opaque buffer handle exchanged across the public
//! API.

use crate::config::{MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ};
use crate::error::ConfigError;

/// Direction a session streams in. Only master-clock operation is modeled;
/// slave-mode I2S is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Receive: hardware captures samples, the application drains them.
    RxMaster,
    /// Transmit: the application supplies samples, hardware plays them.
    TxMaster,
}

/// Sample bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bits {
    /// 16 bits per sample.
    Bits16,
    /// 24 bits per sample, packed into a 32-bit container. Only accepted
    /// when the active backend's [`crate::backend::TransportBackend::SUPPORTS_24_BIT`]
    /// is `true`.
    Bits24,
    /// 32 bits per sample.
    Bits32,
}

impl Bits {
    /// Size, in bytes, of the container one sample occupies in the
    /// canonical application-facing layout.
    #[must_use]
    pub const fn container_bytes(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits24 | Self::Bits32 => 4,
        }
    }
}

/// Channel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Format {
    /// Single channel; duplicated to both L and R on TX, left-channel-only
    /// kept on RX.
    Mono,
    /// Two interleaved channels, left then right.
    Stereo,
}

impl Format {
    /// Number of channels per frame.
    #[must_use]
    pub const fn channel_count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// A validated sample rate, in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Construct a validated sample rate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSampleRate`] if `hz` falls outside
    /// `MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ`.
    pub fn new(hz: u32) -> Result<Self, ConfigError> {
        if hz < MIN_SAMPLE_RATE_HZ || hz > MAX_SAMPLE_RATE_HZ {
            return Err(ConfigError::InvalidSampleRate { hz });
        }
        Ok(Self(hz))
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// An opaque handle to an application-owned byte buffer.
///
/// The engine never allocates or frees the underlying memory; a handle is
/// only ever moved between the idle queue, the active queue, the session's
/// single active-buffer slot, and back to the application — never copied
/// into two places at once.
#[derive(Debug, Clone, Copy)]
pub struct BufferHandle {
    ptr: *mut u8,
    len: usize,
}

// SAFETY: a `BufferHandle` is a non-owning pointer/length pair. It is only
// ever moved (not aliased) between queues guarded by `critical_section`, and
// the caller that constructs it via `new` guarantees the pointed-to memory
// outlives the handle's presence in the engine. Marking it `Send` allows it
// to cross the ISR/task boundary, mirroring how `platform::dma::DmaTransfer`
// is handed between contexts.
unsafe impl Send for BufferHandle {}

impl BufferHandle {
    /// Construct a handle over `len` bytes starting at `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure `ptr` is valid for reads and writes of `len`
    /// bytes for as long as this handle (or any handle derived from it by
    /// `Copy`) remains reachable from the engine — i.e. until it is handed
    /// back out through [`crate::session::Session::get_buffer`].
    #[must_use]
    pub unsafe fn new(ptr: *mut u8, len: usize) -> Self {
        Self { ptr, len }
    }

    /// Length of the underlying buffer, in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` if the buffer has zero length.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the underlying bytes immutably.
    ///
    /// # Safety
    ///
    /// The caller must uphold the aliasing contract documented on
    /// [`Self::new`]: no other live reference to the same memory may exist
    /// for the duration of the borrow.
    #[must_use]
    pub unsafe fn as_slice(&self) -> &[u8] {
        core::slice::from_raw_parts(self.ptr, self.len)
    }

    /// Borrow the underlying bytes mutably.
    ///
    /// # Safety
    ///
    /// Same contract as [`Self::as_slice`], plus exclusivity: no other
    /// reference, mutable or shared, may be live for the duration of the
    /// borrow.
    #[must_use]
    pub unsafe fn as_mut_slice(&mut self) -> &mut [u8] {
        core::slice::from_raw_parts_mut(self.ptr, self.len)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // tests use unwrap() for readable assertions
mod tests {
    use super::*;

    #[test]
    fn sample_rate_rejects_out_of_range_values() {
        assert!(SampleRateHz::new(7_999).is_err());
        assert!(SampleRateHz::new(768_001).is_err());
    }

    #[test]
    fn sample_rate_accepts_boundary_values() {
        assert_eq!(SampleRateHz::new(8_000).unwrap().get(), 8_000);
        assert_eq!(SampleRateHz::new(768_000).unwrap().get(), 768_000);
    }

    #[test]
    fn buffer_handle_round_trips_bytes() {
        let mut backing = [1u8, 2, 3, 4];
        let mut handle = unsafe { BufferHandle::new(backing.as_mut_ptr(), backing.len()) };
        unsafe {
            handle.as_mut_slice()[0] = 42;
        }
        assert_eq!(backing[0], 42);
    }

    #[test]
    fn bits_container_bytes_matches_width() {
        assert_eq!(Bits::Bits16.container_bytes(), 2);
        assert_eq!(Bits::Bits24.container_bytes(), 4);
        assert_eq!(Bits::Bits32.container_bytes(), 4);
    }
}
