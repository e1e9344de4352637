//! Dedicated WAV source built on hound.
//!
//! WAV is already packed PCM, so this source is mostly bookkeeping: it
//! reads interleaved samples in chunks, re-emits them in the file's own
//! width, and seeks by plain frame index.

use std::fs::File;
use std::io::BufReader;

use playd_audio::{AudioError, AudioSource, DecodeResult, DecodeState, Result, SampleFormat};

/// Frames read per `decode` call. At CD stereo this is roughly a tenth
/// of a second per frame, far coarser than the update tick needs.
const FRAMES_PER_DECODE: usize = 4096;

/// An [`AudioSource`] for PCM WAV files.
pub struct WavSource {
    path: String,
    reader: hound::WavReader<BufReader<File>>,
    channels: u8,
    rate: u32,
    format: SampleFormat,
    /// Total length in frames.
    length: u64,
    /// Next frame to be decoded.
    next_frame: u64,
    /// Left shift applied to integer samples narrower than their
    /// container (24-bit audio in an i32 stream).
    shift: u32,
}

impl std::fmt::Debug for WavSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSource")
            .field("path", &self.path)
            .field("channels", &self.channels)
            .field("rate", &self.rate)
            .field("format", &self.format)
            .field("length", &self.length)
            .field("next_frame", &self.next_frame)
            .field("shift", &self.shift)
            .finish()
    }
}

impl WavSource {
    /// Opens `path` as a WAV file.
    ///
    /// # Errors
    ///
    /// A file error for unreadable files or sample widths hound cannot
    /// represent.
    pub fn open(path: &str) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .map_err(|e| AudioError::File(format!("couldn't open '{path}': {e}")))?;
        let spec = reader.spec();

        if spec.channels == 0 || spec.channels > u16::from(u8::MAX) {
            return Err(AudioError::File(format!(
                "unsupported channel count {} in '{path}'",
                spec.channels
            )));
        }

        let (format, shift) = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => (SampleFormat::F32, 0),
            (hound::SampleFormat::Int, 8) => (SampleFormat::I8, 0),
            (hound::SampleFormat::Int, 16) => (SampleFormat::I16, 0),
            (hound::SampleFormat::Int, 24) => (SampleFormat::I32, 8),
            (hound::SampleFormat::Int, 32) => (SampleFormat::I32, 0),
            (format, bits) => {
                return Err(AudioError::File(format!(
                    "unsupported sample format {bits}-bit {format:?} in '{path}'"
                )))
            }
        };

        let length = u64::from(reader.duration());

        log::debug!(
            "'{path}': {} Hz, {} ch, {format}, {length} samples",
            spec.sample_rate,
            spec.channels,
        );

        Ok(WavSource {
            path: path.to_string(),
            channels: spec.channels as u8,
            rate: spec.sample_rate,
            format,
            length,
            next_frame: 0,
            shift,
            reader,
        })
    }

    fn read_chunk<S, F>(&mut self, frames: usize, mut emit: F) -> Result<(usize, Vec<u8>)>
    where
        S: hound::Sample,
        F: FnMut(&mut Vec<u8>, S),
    {
        let channels = usize::from(self.channels);
        let want = frames * channels;
        let mut bytes = Vec::with_capacity(want * self.format.bytes_per_mono_sample());
        let mut taken = 0usize;

        let path = &self.path;
        for sample in self.reader.samples::<S>().take(want) {
            let sample =
                sample.map_err(|e| AudioError::File(format!("error reading '{path}': {e}")))?;
            emit(&mut bytes, sample);
            taken += 1;
        }

        // A trailing partial frame would mean a truncated file; drop
        // the ragged end rather than emit a partial sample.
        let whole = taken - (taken % channels);
        bytes.truncate(whole * self.format.bytes_per_mono_sample());
        Ok((whole / channels, bytes))
    }
}

impl AudioSource for WavSource {
    fn decode(&mut self) -> Result<DecodeResult> {
        if self.next_frame >= self.length {
            return Ok((DecodeState::Eof, Vec::new()));
        }

        let frames = FRAMES_PER_DECODE.min((self.length - self.next_frame) as usize);
        let shift = self.shift;

        let (read, bytes) = match self.format {
            SampleFormat::F32 => self.read_chunk::<f32, _>(frames, |bytes, s| {
                bytes.extend_from_slice(&s.to_ne_bytes())
            })?,
            SampleFormat::I8 => self.read_chunk::<i8, _>(frames, |bytes, s| {
                bytes.extend_from_slice(&s.to_ne_bytes())
            })?,
            SampleFormat::I16 => self.read_chunk::<i16, _>(frames, |bytes, s| {
                bytes.extend_from_slice(&s.to_ne_bytes())
            })?,
            SampleFormat::I32 => self.read_chunk::<i32, _>(frames, move |bytes, s| {
                bytes.extend_from_slice(&(s << shift).to_ne_bytes())
            })?,
            SampleFormat::U8 => {
                return Err(AudioError::Internal(
                    "wav source negotiated an unreachable format".to_string(),
                ))
            }
        };

        if read == 0 {
            self.next_frame = self.length;
            return Ok((DecodeState::Eof, Vec::new()));
        }

        self.next_frame += read as u64;
        Ok((DecodeState::Decoding, bytes))
    }

    fn seek(&mut self, target: u64) -> Result<u64> {
        if target > self.length {
            return Err(AudioError::Seek(format!(
                "seek target {target} lies beyond the file's {} samples",
                self.length
            )));
        }
        let frame = u32::try_from(target)
            .map_err(|_| AudioError::Seek(format!("seek target {target} overflows wav index")))?;

        self.reader
            .seek(frame)
            .map_err(|e| AudioError::Seek(format!("couldn't seek '{}': {e}", self.path)))?;
        self.next_frame = target;

        Ok(target)
    }

    fn channel_count(&self) -> u8 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn output_format(&self) -> SampleFormat {
        self.format
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn path(&self) -> &str {
        &self.path
    }
}
