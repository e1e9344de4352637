//! Sample formats and time arithmetic.
//!
//! Throughout playd a "sample" is one interleaved frame across all
//! channels; `bytes_per_sample = channels * format_size`. Positions and
//! lengths travel as sample counts inside the pipeline and as
//! microseconds on the wire.

use std::fmt;

/// The sample formats the pipeline can carry.
///
/// The set is closed: every source must negotiate its decoded output
/// into one of these, packed and interleaved, so the ring buffer and
/// sink see a byte stream with one fixed sample size for the lifetime
/// of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Unsigned 8-bit.
    U8,
    /// Signed 8-bit.
    I8,
    /// Signed 16-bit.
    I16,
    /// Signed 32-bit.
    I32,
    /// 32-bit float.
    F32,
}

impl SampleFormat {
    /// Bytes per mono sample for this format.
    pub fn bytes_per_mono_sample(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 1,
            SampleFormat::I16 => 2,
            SampleFormat::I32 | SampleFormat::F32 => 4,
        }
    }

    /// The byte that represents silence when repeated across a buffer.
    ///
    /// Unsigned 8-bit audio is centred on 0x80; everything else is
    /// silent at all-zeroes (including f32, whose 0.0 is all zero bits).
    pub fn silence_byte(self) -> u8 {
        match self {
            SampleFormat::U8 => 0x80,
            _ => 0,
        }
    }

    /// Short lowercase name, for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SampleFormat::U8 => "u8",
            SampleFormat::I8 => "i8",
            SampleFormat::I16 => "i16",
            SampleFormat::I32 => "i32",
            SampleFormat::F32 => "f32",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a duration in microseconds to a sample count at `rate` Hz,
/// rounding down.
pub fn samples_from_micros(micros: u64, rate: u32) -> u64 {
    (u128::from(micros) * u128::from(rate) / 1_000_000) as u64
}

/// Converts a sample count at `rate` Hz to microseconds, rounding up.
///
/// Rounding up here makes the two conversions mutual inverses: a
/// microsecond value that has been through one
/// micros -> samples -> micros round trip maps back onto the same
/// sample, so repeated conversion is stable instead of drifting
/// backwards by a sample period each time.
pub fn micros_from_samples(samples: u64, rate: u32) -> u64 {
    (u128::from(samples) * 1_000_000).div_ceil(u128::from(rate)) as u64
}
