//! Error taxonomy for the I2S streaming engine.
//!
//! Mirrors the four failure classes a session can hit: bad configuration,
//! calling an operation in the wrong state, a fault surfaced by the concrete
//! transport backend, and a user completion callback that returned `Err`.

use core::fmt;

/// A value supplied to [`crate::session::Session::init`] fell outside the
/// range the engine (or the active backend) accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `peripheral_id` does not name a peripheral slot this build supports.
    InvalidPeripheralId,
    /// The peripheral slot is already claimed by another session.
    AlreadyInUse,
    /// `bits` was not one of the widths the active backend supports.
    InvalidBits,
    /// `format` was not a supported channel format.
    InvalidFormat,
    /// `sample_rate_hz` fell outside the supported range.
    InvalidSampleRate {
        /// The rejected value, in Hz.
        hz: u32,
    },
    /// The supplied buffer set was empty or exceeded queue capacity.
    InvalidBufferSet,
    /// A buffer's length was not a multiple of the required frame transfer
    /// size for the active (width, format) pair.
    MisalignedBufferLength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPeripheralId => write!(f, "invalid peripheral id"),
            Self::AlreadyInUse => write!(f, "peripheral already in use"),
            Self::InvalidBits => write!(f, "unsupported sample width"),
            Self::InvalidFormat => write!(f, "unsupported channel format"),
            Self::InvalidSampleRate { hz } => write!(f, "sample rate {hz} Hz out of range"),
            Self::InvalidBufferSet => write!(f, "invalid buffer set"),
            Self::MisalignedBufferLength => {
                write!(f, "buffer length is not a multiple of the frame transfer size")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// An operation was invoked while the session was in a state that does not
/// permit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateError {
    /// The session has not completed `init`.
    NotInitialized,
    /// `put_buffer` was called but the target queue is already full.
    QueueFull,
    /// `start` was called with no buffer available to prime the engine.
    NoBufferToPrime,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "session is not initialized"),
            Self::QueueFull => write!(f, "queue is full"),
            Self::NoBufferToPrime => write!(f, "no buffer available to start streaming"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StateError {}

/// A completion callback returned `Err`. The engine clears the callback slot
/// and continues streaming; this value is only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallbackError;

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "completion callback faulted")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CallbackError {}

/// Top-level error returned by the public session API.
///
/// Generic over `D`, the concrete backend's own driver error type, so a
/// driver fault surfaced from `start`/`init` keeps its original detail
/// instead of being flattened into a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sError<D> {
    /// See [`ConfigError`].
    Config(ConfigError),
    /// See [`StateError`].
    State(StateError),
    /// The transport backend reported a driver-level fault.
    Driver(D),
}

impl<D> From<ConfigError> for I2sError<D> {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl<D> From<StateError> for I2sError<D> {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl<D: fmt::Display> fmt::Display for I2sError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::State(e) => write!(f, "{e}"),
            Self::Driver(e) => write!(f, "driver error: {e}"),
        }
    }
}

#[cfg(feature = "std")]
impl<D: fmt::Debug + fmt::Display> std::error::Error for I2sError<D> {}
