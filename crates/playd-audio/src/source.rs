//! The contract concrete file decoders implement.

use crate::error::Result;
use crate::sample::{self, SampleFormat};

/// What a call to [`AudioSource::decode`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// The decoder consumed input but has no samples to show for it yet
    /// (metadata, a skipped packet). Call again.
    NeedFrame,
    /// Samples were decoded.
    Decoding,
    /// The end of the file was reached. Sticky until a successful seek.
    Eof,
}

/// The result of one decode step: the new state and a (possibly empty)
/// run of whole packed samples.
pub type DecodeResult = (DecodeState, Vec<u8>);

/// An opened audio file that yields packed interleaved samples.
///
/// Implementations negotiate their decoded output into one of the
/// [`SampleFormat`]s at construction time; rate, channel count and
/// format are fixed for the lifetime of the source, so the sink and
/// ring buffer downstream see one uniform byte stream.
///
/// Successive [`AudioSource::decode`] calls make monotone forward
/// progress through the file unless interrupted by a seek. Once EOF has
/// been reported, further decodes return `(Eof, empty)` until a seek
/// resets the stream.
pub trait AudioSource: std::fmt::Debug {
    /// Decodes the next chunk of the file.
    ///
    /// The returned bytes are always a whole number of packed samples;
    /// a partial sample is never emitted.
    fn decode(&mut self) -> Result<DecodeResult>;

    /// Seeks to `target` (in samples), returning the sample actually
    /// landed on. Codecs may snap to the nearest decodable boundary.
    ///
    /// # Errors
    ///
    /// Fails with a seek error if `target` lies beyond the end of the
    /// file, or if the codec refuses the seek.
    fn seek(&mut self, target: u64) -> Result<u64>;

    /// Number of channels in the decoded output. At least 1.
    fn channel_count(&self) -> u8;

    /// Sample rate of the decoded output, in Hz.
    fn sample_rate(&self) -> u32;

    /// Format of the decoded output.
    fn output_format(&self) -> SampleFormat;

    /// Total length of the file, in samples.
    fn length(&self) -> u64;

    /// The path this source was opened from, exactly as given.
    fn path(&self) -> &str;

    /// Bytes per interleaved sample (one frame across all channels).
    fn bytes_per_sample(&self) -> usize {
        self.output_format().bytes_per_mono_sample() * usize::from(self.channel_count())
    }

    /// Converts a microsecond position to samples at this source's rate.
    fn samples_from_micros(&self, micros: u64) -> u64 {
        sample::samples_from_micros(micros, self.sample_rate())
    }

    /// Converts a sample position to microseconds at this source's rate.
    fn micros_from_samples(&self, samples: u64) -> u64 {
        sample::micros_from_samples(samples, self.sample_rate())
    }
}
