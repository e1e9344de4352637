//! General compressed-audio source built on symphonia.
//!
//! Handles everything the dedicated WAV source doesn't: MP3, FLAC and
//! Ogg Vorbis. The output sample format is negotiated once, from the
//! first decoded buffer, and every subsequent buffer is repacked into
//! that format — symphonia decodes into planar buffers for some codecs,
//! and the interleaving happens inside the raw sample buffer copy.

use std::fs::File;

use symphonia::core::audio::{AudioBufferRef, RawSampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::{Time, TimeBase};

use playd_audio::{AudioError, AudioSource, DecodeResult, DecodeState, Result, SampleFormat};

/// An [`AudioSource`] that decodes through symphonia.
pub struct DecoderSource {
    path: String,
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: Option<TimeBase>,
    channels: u8,
    rate: u32,
    format: SampleFormat,
    length: u64,
    /// The frame decoded while negotiating the output format, handed
    /// out by the first `decode` call.
    pending: Option<Vec<u8>>,
    at_eof: bool,
}

impl std::fmt::Debug for DecoderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderSource")
            .field("path", &self.path)
            .field("track_id", &self.track_id)
            .field("time_base", &self.time_base)
            .field("channels", &self.channels)
            .field("rate", &self.rate)
            .field("format", &self.format)
            .field("length", &self.length)
            .field("pending", &self.pending)
            .field("at_eof", &self.at_eof)
            .finish()
    }
}

impl DecoderSource {
    /// Opens and probes `path`, decoding one frame up front to settle
    /// the output format.
    ///
    /// # Errors
    ///
    /// A file error if the container can't be probed, holds no
    /// decodable audio track, or doesn't declare rate, channel count
    /// and total length.
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| AudioError::File(format!("couldn't open '{path}': {e}")))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = std::path::Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions {
                    enable_gapless: true,
                    ..Default::default()
                },
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::File(format!("couldn't probe '{path}': {e}")))?;
        let mut reader = probed.format;

        let track = reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::File(format!("no audio track in '{path}'")))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let rate = params
            .sample_rate
            .ok_or_else(|| AudioError::File(format!("'{path}' doesn't declare a sample rate")))?;
        let channels = params
            .channels
            .map(|c| c.count())
            .filter(|&c| c >= 1 && c <= u8::MAX as usize)
            .ok_or_else(|| AudioError::File(format!("unsupported channel layout in '{path}'")))?
            as u8;
        let length = params.n_frames.ok_or_else(|| {
            AudioError::File(format!("couldn't determine the length of '{path}'"))
        })?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| AudioError::File(format!("unsupported codec in '{path}': {e}")))?;

        // Pull the first decodable frame now: its buffer type decides
        // the packed output format for the whole stream.
        let (format, first) = first_frame(reader.as_mut(), decoder.as_mut(), track_id)
            .map_err(|e| AudioError::File(format!("couldn't decode '{path}': {e}")))?;

        log::debug!(
            "'{path}': {rate} Hz, {channels} ch, {format}, {length} samples"
        );

        Ok(DecoderSource {
            path: path.to_string(),
            reader,
            decoder,
            track_id,
            time_base: params.time_base,
            channels,
            rate,
            format,
            length,
            pending: Some(first),
            at_eof: false,
        })
    }

    /// Converts a timestamp in the track's time base to samples.
    fn samples_from_ts(&self, ts: u64) -> u64 {
        match self.time_base {
            Some(tb) => {
                let time = tb.calc_time(ts);
                time.seconds * u64::from(self.rate)
                    + (time.frac * f64::from(self.rate)).round() as u64
            }
            // Without a declared time base, timestamps are sample counts.
            None => ts,
        }
    }
}

impl AudioSource for DecoderSource {
    fn decode(&mut self) -> Result<DecodeResult> {
        if let Some(bytes) = self.pending.take() {
            return Ok((DecodeState::Decoding, bytes));
        }
        if self.at_eof {
            return Ok((DecodeState::Eof, Vec::new()));
        }

        let packet = match self.reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.at_eof = true;
                return Ok((DecodeState::Eof, Vec::new()));
            }
            Err(e) => {
                return Err(AudioError::File(format!(
                    "error reading '{}': {e}",
                    self.path
                )))
            }
        };

        if packet.track_id() != self.track_id {
            return Ok((DecodeState::NeedFrame, Vec::new()));
        }

        match self.decoder.decode(&packet) {
            Ok(buffer) => Ok((DecodeState::Decoding, pack_buffer(&buffer, self.format))),
            Err(SymphoniaError::DecodeError(e)) => {
                // A corrupt packet isn't fatal; skip it and move on.
                log::warn!("skipping undecodable packet in '{}': {e}", self.path);
                Ok((DecodeState::NeedFrame, Vec::new()))
            }
            Err(e) => Err(AudioError::File(format!(
                "error decoding '{}': {e}",
                self.path
            ))),
        }
    }

    fn seek(&mut self, target: u64) -> Result<u64> {
        if target > self.length {
            return Err(AudioError::Seek(format!(
                "seek target {target} lies beyond the file's {} samples",
                self.length
            )));
        }

        let time = Time::new(
            target / u64::from(self.rate),
            (target % u64::from(self.rate)) as f64 / f64::from(self.rate),
        );
        let seeked = self
            .reader
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time,
                    track_id: Some(self.track_id),
                },
            )
            .map_err(|e| AudioError::Seek(format!("codec refused seek: {e}")))?;

        // Seeking lands on a packet boundary; the decoder must restart
        // from clean state there.
        self.decoder.reset();
        self.pending = None;
        self.at_eof = false;

        Ok(self.samples_from_ts(seeked.actual_ts))
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

/// Reads packets until one decodes, returning the negotiated output
/// format and the packed bytes of that first frame.
fn first_frame(
    reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
    track_id: u32,
) -> std::result::Result<(SampleFormat, Vec<u8>), SymphoniaError> {
    loop {
        let packet = reader.next_packet()?;
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(buffer) => {
                let format = negotiated_format(&buffer);
                let bytes = pack_buffer(&buffer, format);
                if bytes.is_empty() {
                    continue;
                }
                return Ok((format, bytes));
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Maps a decoded buffer's native sample type into the closed output
/// format set. Wider and unsigned integer types take the nearest signed
/// format that can hold them; doubles narrow to f32.
fn negotiated_format(buffer: &AudioBufferRef<'_>) -> SampleFormat {
    match buffer {
        AudioBufferRef::U8(_) => SampleFormat::U8,
        AudioBufferRef::S8(_) => SampleFormat::I8,
        AudioBufferRef::S16(_) => SampleFormat::I16,
        AudioBufferRef::U16(_) | AudioBufferRef::U24(_) | AudioBufferRef::U32(_) => {
            SampleFormat::I32
        }
        AudioBufferRef::S24(_) | AudioBufferRef::S32(_) => SampleFormat::I32,
        AudioBufferRef::F32(_) | AudioBufferRef::F64(_) => SampleFormat::F32,
    }
}

/// Repacks a decoded buffer (planar or interleaved) into packed
/// native-endian interleaved bytes of the given format.
fn pack_buffer(buffer: &AudioBufferRef<'_>, format: SampleFormat) -> Vec<u8> {
    let duration = buffer.capacity() as u64;
    let spec = *buffer.spec();

    match format {
        SampleFormat::U8 => {
            let mut raw = RawSampleBuffer::<u8>::new(duration, spec);
            raw.copy_interleaved_ref(buffer.clone());
            raw.as_bytes().to_vec()
        }
        SampleFormat::I8 => {
            let mut raw = RawSampleBuffer::<i8>::new(duration, spec);
            raw.copy_interleaved_ref(buffer.clone());
            raw.as_bytes().to_vec()
        }
        SampleFormat::I16 => {
            let mut raw = RawSampleBuffer::<i16>::new(duration, spec);
            raw.copy_interleaved_ref(buffer.clone());
            raw.as_bytes().to_vec()
        }
        SampleFormat::I32 => {
            let mut raw = RawSampleBuffer::<i32>::new(duration, spec);
            raw.copy_interleaved_ref(buffer.clone());
            raw.as_bytes().to_vec()
        }
        SampleFormat::F32 => {
            let mut raw = RawSampleBuffer::<f32>::new(duration, spec);
            raw.copy_interleaved_ref(buffer.clone());
            raw.as_bytes().to_vec()
        }
    }
}
