//! Sound-device sink built on a cpal raw output stream.
//!
//! cpal hands the data callback a writable byte span on its own
//! realtime thread and expects it filled before return, which is
//! exactly the pull contract [`AudioSink`] is specified against.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::{AudioError, Result};
use crate::ring_buffer::RingBuffer;
use crate::sample::SampleFormat;
use crate::sink::{AudioSink, SinkState};
use crate::source::AudioSource;

/// The ring buffer holds `1 << RING_POWER` samples' worth of bytes.
/// Large enough that the decoder catches up within one callback period
/// at realistic bit rates; the buffer never grows after construction.
const RING_POWER: usize = 16;

// SinkState encoding shared with the callback thread.
const STATE_STOPPED: u8 = 0;
const STATE_PLAYING: u8 = 1;
const STATE_AT_END: u8 = 2;

fn state_from_u8(raw: u8) -> SinkState {
    match raw {
        STATE_PLAYING => SinkState::Playing,
        STATE_AT_END => SinkState::AtEnd,
        _ => SinkState::Stopped,
    }
}

fn state_to_u8(state: SinkState) -> u8 {
    match state {
        SinkState::Stopped => STATE_STOPPED,
        SinkState::Playing => STATE_PLAYING,
        SinkState::AtEnd => STATE_AT_END,
    }
}

/// State shared between the main thread and the device callback.
///
/// Main-thread mutations (start/stop/set_position) and the callback's
/// own transitions are all plain atomic stores; the callback never
/// blocks on the main thread, and the main thread never needs to pause
/// the device to mutate these. The ring buffer flush inside
/// `set_position` is the one place the callback can briefly wait on a
/// lock, and an audible discontinuity is already expected there.
struct SinkShared {
    state: AtomicU8,
    /// Samples delivered to the device since the last position change.
    position: AtomicU64,
    /// Set once the producer has declared EOF.
    source_out: AtomicBool,
}

/// An [`AudioSink`] that feeds a real output device.
pub struct DeviceSink {
    stream: cpal::Stream,
    ring: Arc<RingBuffer>,
    shared: Arc<SinkShared>,
    bytes_per_sample: usize,
}

impl DeviceSink {
    /// Opens output device `device_id` for the given source's rate,
    /// channel count and sample format, and registers the pull
    /// callback. The stream starts paused.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the device ID is invalid or the
    /// device refuses the stream.
    pub fn new(source: &dyn AudioSource, device_id: usize) -> Result<Self> {
        let device = output_device(device_id)?;

        let config = cpal::StreamConfig {
            channels: u16::from(source.channel_count()),
            sample_rate: cpal::SampleRate(source.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };
        let format = source.output_format();
        let bytes_per_sample = source.bytes_per_sample();

        let ring = Arc::new(RingBuffer::new((1 << RING_POWER) * bytes_per_sample));
        let shared = Arc::new(SinkShared {
            state: AtomicU8::new(STATE_STOPPED),
            position: AtomicU64::new(0),
            source_out: AtomicBool::new(false),
        });

        let stream = {
            let ring = Arc::clone(&ring);
            let shared = Arc::clone(&shared);
            let silence = format.silence_byte();

            device
                .build_output_stream_raw(
                    &config,
                    cpal_format(format),
                    move |data: &mut cpal::Data, _: &cpal::OutputCallbackInfo| {
                        pull(data.bytes_mut(), &ring, &shared, bytes_per_sample, silence);
                    },
                    |err| log::warn!("output stream error: {err}"),
                    None,
                )
                .map_err(|e| AudioError::Config(format!("couldn't open device: {e}")))?
        };

        // Some hosts start streams running; playback must begin in the
        // stopped state.
        stream
            .pause()
            .map_err(|e| AudioError::Config(format!("couldn't pause new stream: {e}")))?;

        log::debug!(
            "opened device {device_id}: {} Hz, {} ch, {format}",
            source.sample_rate(),
            source.channel_count(),
        );

        Ok(DeviceSink {
            stream,
            ring,
            shared,
            bytes_per_sample,
        })
    }

    /// Lists the available output devices as `(id, name)` pairs.
    pub fn devices() -> Result<Vec<(usize, String)>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .map_err(|e| AudioError::Config(format!("couldn't enumerate devices: {e}")))?;

        Ok(devices
            .enumerate()
            .map(|(id, dev)| (id, dev.name().unwrap_or_else(|_| "(unknown)".to_string())))
            .collect())
    }

    /// Whether `device_id` names an available output device.
    pub fn is_output_device(device_id: usize) -> bool {
        Self::devices()
            .map(|devices| devices.iter().any(|(id, _)| *id == device_id))
            .unwrap_or(false)
    }
}

impl AudioSink for DeviceSink {
    fn start(&mut self) -> Result<()> {
        if self.state() != SinkState::Stopped {
            return Ok(());
        }

        self.stream
            .play()
            .map_err(|e| AudioError::Config(format!("couldn't start stream: {e}")))?;
        self.shared.state.store(STATE_PLAYING, Ordering::Release);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.state() == SinkState::Stopped {
            return Ok(());
        }

        self.stream
            .pause()
            .map_err(|e| AudioError::Config(format!("couldn't pause stream: {e}")))?;
        self.shared.state.store(STATE_STOPPED, Ordering::Release);
        Ok(())
    }

    fn state(&self) -> SinkState {
        state_from_u8(self.shared.state.load(Ordering::Acquire))
    }

    fn position(&self) -> u64 {
        self.shared.position.load(Ordering::Acquire)
    }

    fn set_position(&mut self, samples: u64) {
        self.shared.position.store(samples, Ordering::Release);

        // We may have been at the end of the file; we aren't any more.
        self.shared.source_out.store(false, Ordering::Release);
        if self.state() == SinkState::AtEnd {
            self.shared.state.store(STATE_STOPPED, Ordering::Release);
            if let Err(e) = self.stream.pause() {
                log::warn!("couldn't pause stream leaving at-end: {e}");
            }
        }

        // The ring buffer is full of samples from the old position.
        self.ring.flush();
    }

    fn source_out(&mut self) {
        self.shared.source_out.store(true, Ordering::Release);
    }

    fn transfer(&mut self, src: &[u8]) -> Result<usize> {
        if src.is_empty() {
            return Ok(0);
        }
        if src.len() % self.bytes_per_sample != 0 {
            return Err(AudioError::Internal(
                "transfer of a partial sample".to_string(),
            ));
        }

        // Take only what the ring buffer can hold, truncated to a whole
        // number of samples; the caller keeps the remainder for later.
        let mut count = src.len().min(self.ring.write_capacity());
        count -= count % self.bytes_per_sample;
        if count == 0 {
            return Ok(0);
        }

        let written = self.ring.write(&src[..count])?;
        debug_assert_eq!(written, count);
        Ok(written)
    }
}

/// The pull callback body. Runs on the device thread; must not block on
/// the decoder or allocate.
fn pull(dest: &mut [u8], ring: &RingBuffer, shared: &SinkShared, bytes_per_sample: usize, silence: u8) {
    // Anything not overwritten with sound below stays silent.
    dest.fill(silence);

    if shared.state.load(Ordering::Acquire) != STATE_PLAYING {
        return;
    }

    // Racing the producer here is fine: it can only add bytes, so the
    // capacity we see is an underestimate.
    let avail = ring.read_capacity();
    if avail == 0 {
        // Temporary underrun, or has the source genuinely run dry?
        if shared.source_out.load(Ordering::Acquire) {
            shared.state.store(STATE_AT_END, Ordering::Release);
        }
        return;
    }

    let mut want = dest.len().min(avail);
    want -= want % bytes_per_sample;
    if want == 0 {
        return;
    }

    match ring.read(&mut dest[..want]) {
        Ok(read) => {
            debug_assert_eq!(read % bytes_per_sample, 0);
            shared
                .position
                .fetch_add((read / bytes_per_sample) as u64, Ordering::AcqRel);
        }
        // Unreachable while the capacity protocol holds; there is no one
        // to propagate to on this thread.
        Err(e) => log::error!("ring buffer read failed in callback: {e}"),
    }
}

fn cpal_format(format: SampleFormat) -> cpal::SampleFormat {
    match format {
        SampleFormat::U8 => cpal::SampleFormat::U8,
        SampleFormat::I8 => cpal::SampleFormat::I8,
        SampleFormat::I16 => cpal::SampleFormat::I16,
        SampleFormat::I32 => cpal::SampleFormat::I32,
        SampleFormat::F32 => cpal::SampleFormat::F32,
    }
}

fn output_device(device_id: usize) -> Result<cpal::Device> {
    let host = cpal::default_host();
    let mut devices = host
        .output_devices()
        .map_err(|e| AudioError::Config(format!("couldn't enumerate devices: {e}")))?;

    devices
        .nth(device_id)
        .ok_or_else(|| AudioError::Config(format!("invalid device id: {device_id}")))
}
