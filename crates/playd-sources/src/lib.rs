//! Concrete audio file decoders for the playd audio server.
//!
//! Each source type implements the `AudioSource` contract from
//! `playd-audio`: open a file, negotiate a packed interleaved output
//! format, and yield whole samples until EOF. Files are dispatched to a
//! source constructor by extension:
//!
//! | Extension              | Source                         |
//! |------------------------|--------------------------------|
//! | `wav`                  | [`WavSource`] (hound)          |
//! | `mp3` `flac` `ogg` `oga` | [`DecoderSource`] (symphonia) |
//!
//! The table is the single place to extend when adding a codec; the
//! rest of the system depends only on the `AudioSource` contract.

#![warn(missing_docs)]

mod decoder;
mod system;
mod wav;

use std::path::Path;

use playd_audio::{AudioError, AudioSource, Result};

pub use decoder::DecoderSource;
pub use system::PipeAudioSystem;
pub use wav::WavSource;

type SourceConstructor = fn(&str) -> Result<Box<dyn AudioSource>>;

/// Extension dispatch table, lowercase suffixes only.
const SOURCES: &[(&str, SourceConstructor)] = &[
    ("wav", open_wav),
    ("mp3", open_decoder),
    ("flac", open_decoder),
    ("ogg", open_decoder),
    ("oga", open_decoder),
];

fn open_wav(path: &str) -> Result<Box<dyn AudioSource>> {
    Ok(Box::new(WavSource::open(path)?))
}

fn open_decoder(path: &str) -> Result<Box<dyn AudioSource>> {
    Ok(Box::new(DecoderSource::open(path)?))
}

/// Opens `path` with the source registered for its extension.
///
/// # Errors
///
/// A file error if the extension is missing or unknown, or if the
/// source itself fails to open the file.
pub fn load_source(path: &str) -> Result<Box<dyn AudioSource>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let constructor = SOURCES
        .iter()
        .find(|(suffix, _)| *suffix == extension)
        .map(|(_, constructor)| constructor)
        .ok_or_else(|| AudioError::File(format!("unknown file extension in '{path}'")))?;

    log::debug!("loading '{path}' as .{extension}");
    constructor(path)
}
