//! The loaded/ejected dispatch the player drives.
//!
//! The player always holds exactly one [`Audio`] object: a [`NullAudio`]
//! while nothing is loaded, or a [`PipeAudio`] wrapping a live pipeline.
//! The null object answers every query defensibly, so the player's
//! command handlers never need to special-case the ejected state beyond
//! mapping [`AudioError::NoAudio`] onto a client error.

use crate::error::{AudioError, Result};
use crate::pipe::PipeAudio;
use crate::sink::SinkState;

/// Playback state as the player sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// No file is loaded.
    Ejected,
    /// A file is loaded but not playing.
    Stopped,
    /// A file is playing.
    Playing,
    /// The loaded file has played out.
    AtEnd,
}

/// A player-visible audio object: either nothing, or a live pipeline.
pub trait Audio {
    /// Performs one cycle of work and reports the resulting state.
    fn update(&mut self) -> Result<AudioState>;

    /// Current state, without doing any work.
    fn state(&self) -> AudioState;

    /// Starts or stops playback.
    fn set_playing(&mut self, playing: bool) -> Result<()>;

    /// Current position, in microseconds.
    fn position(&self) -> Result<u64>;

    /// Seeks to an absolute position, in microseconds.
    fn set_position(&mut self, micros: u64) -> Result<()>;

    /// Path of the loaded file.
    fn file(&self) -> Result<&str>;

    /// Total length of the loaded file, in microseconds.
    fn length_micros(&self) -> Result<u64>;
}

/// The audio object used while nothing is loaded.
pub struct NullAudio;

impl Audio for NullAudio {
    fn update(&mut self) -> Result<AudioState> {
        Ok(AudioState::Ejected)
    }

    fn state(&self) -> AudioState {
        AudioState::Ejected
    }

    fn set_playing(&mut self, _playing: bool) -> Result<()> {
        Err(AudioError::NoAudio)
    }

    fn position(&self) -> Result<u64> {
        Err(AudioError::NoAudio)
    }

    fn set_position(&mut self, _micros: u64) -> Result<()> {
        Err(AudioError::NoAudio)
    }

    fn file(&self) -> Result<&str> {
        Err(AudioError::NoAudio)
    }

    fn length_micros(&self) -> Result<u64> {
        Err(AudioError::NoAudio)
    }
}

fn audio_state(sink: SinkState) -> AudioState {
    match sink {
        SinkState::Stopped => AudioState::Stopped,
        SinkState::Playing => AudioState::Playing,
        SinkState::AtEnd => AudioState::AtEnd,
    }
}

impl Audio for PipeAudio {
    fn update(&mut self) -> Result<AudioState> {
        Ok(audio_state(PipeAudio::update(self)?))
    }

    fn state(&self) -> AudioState {
        audio_state(PipeAudio::state(self))
    }

    fn set_playing(&mut self, playing: bool) -> Result<()> {
        PipeAudio::set_playing(self, playing)
    }

    fn position(&self) -> Result<u64> {
        Ok(PipeAudio::position(self))
    }

    fn set_position(&mut self, micros: u64) -> Result<()> {
        self.seek(micros)
    }

    fn file(&self) -> Result<&str> {
        Ok(PipeAudio::file(self))
    }

    fn length_micros(&self) -> Result<u64> {
        Ok(PipeAudio::length_micros(self))
    }
}

/// A factory for audio objects: the null object, and fresh pipelines
/// loaded from disk.
///
/// The server wires up a device-backed implementation; tests substitute
/// scripted ones.
pub trait AudioSystem {
    /// The audio object representing the ejected state.
    fn null(&self) -> Box<dyn Audio>;

    /// Opens `path` and builds a ready-to-play pipeline around it.
    ///
    /// # Errors
    ///
    /// File errors for unknown or undecodable files; configuration
    /// errors if the output device cannot be opened for the file's
    /// format.
    fn load(&self, path: &str) -> Result<Box<dyn Audio>>;
}
