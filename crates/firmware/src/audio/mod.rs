//! Audio subsystem — the board-level wiring between the `i2s` crate and the
//! STM32H7's SAI1/DMA peripherals.
//!
//! This module owns the concrete [`i2s::backend::queued::BlockingIoDriver`]
//! implementation and the Embassy task that drives it; the streaming state
//! machine, queue hand-off, and copy/reformat logic all live in the `i2s`
//! crate and are not duplicated here.

pub mod clock_math;
pub mod sai_recovery;
pub mod sai_task;

#[cfg(feature = "hardware")]
pub use sai_task::{Stm32SaiDriver, audio_task, audio_task_embassy};
