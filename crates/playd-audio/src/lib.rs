//! Audio pipeline core for the playd audio server.
//!
//! This crate contains everything between an opened audio file and the
//! sound card, but knows nothing about codecs or the network:
//!
//! - [`SampleFormat`] and samples/microseconds arithmetic
//! - [`RingBuffer`]: the single-producer/single-consumer byte queue that
//!   decouples the decoder from the device callback
//! - [`AudioSource`]: the contract concrete decoders implement
//! - [`AudioSink`] and [`DeviceSink`]: the device-facing consumer, built
//!   on a cpal raw output stream
//! - [`PipeAudio`]: one source wired to one sink
//! - [`Audio`] / [`NullAudio`]: the loaded/ejected dispatch the player
//!   drives
//!
//! # Threading
//!
//! Exactly two threads touch this crate at runtime: the main thread
//! (decoding, transfers, commands) and the device callback thread owned
//! by the host audio API. The ring buffer is the only state shared
//! between them.

#![warn(missing_docs)]

mod audio;
mod device;
mod error;
mod pipe;
mod ring_buffer;
mod sample;
mod sink;
mod source;

pub use audio::{Audio, AudioState, AudioSystem, NullAudio};
pub use device::DeviceSink;
pub use error::{AudioError, Result};
pub use pipe::PipeAudio;
pub use ring_buffer::RingBuffer;
pub use sample::{micros_from_samples, samples_from_micros, SampleFormat};
pub use sink::{AudioSink, SinkState};
pub use source::{AudioSource, DecodeResult, DecodeState};
