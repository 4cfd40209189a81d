//! Hardware Abstraction Layer (HAL) for the I2S audio streaming engine
//!
//! This crate provides trait-based abstractions for the I2S audio streaming
//! engine's hardware-facing edges, enabling development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Feature Layer (i2s)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstraction Levels
//!
//! ## High-Level Peripherals
//! - [`AudioCodec`] - Audio output
//!
//! ## Mid-Level Peripherals
//! - [`dma`] - DMA transfer management
//! - [`dma_safety`] - DMA-accessible memory region marker traits
//! - [`audio_types`] - range-checked volume/sample-rate/I2C-address newtypes
//!
//! # Features
//!
//! - `std`: Enable standard library support (for testing)
//! - `hardware`: Physical hardware implementations
//! - `defmt`: Enable defmt logging
//!
//! # Example
//!
//! ```no_run
//! use platform::AudioCodec;
//!
//! async fn example<C: AudioCodec>(codec: &mut C) {
//!     codec.set_volume(50).await.unwrap();
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod audio_types;
pub mod config;
pub mod dma;
pub mod dma_safety;

// Re-export main high-level traits
pub use audio::{AudioCodec, AudioConfig};

// Re-export DMA types
pub use dma::{CircularBuffer, DmaBuffer, DmaChannel, DmaTransfer};
