//! One source wired to one sink.

use crate::error::Result;
use crate::sink::{AudioSink, SinkState};
use crate::source::{AudioSource, DecodeState};

/// Moves decoded frames from an [`AudioSource`] into an [`AudioSink`].
///
/// Holds the most recently decoded frame and a cursor marking how much
/// of it the sink has accepted so far; the un-transferred remainder is
/// always a suffix of the frame.
pub struct PipeAudio {
    source: Box<dyn AudioSource>,
    sink: Box<dyn AudioSink>,
    frame: Vec<u8>,
    cursor: usize,
}

impl PipeAudio {
    /// Ties a source to a sink. The sink must already be configured for
    /// the source's rate, channels and format.
    pub fn new(source: Box<dyn AudioSource>, sink: Box<dyn AudioSink>) -> Self {
        PipeAudio {
            source,
            sink,
            frame: Vec::new(),
            cursor: 0,
        }
    }

    /// Performs one scheduling step: decode if the current frame is
    /// exhausted, pass EOF along, transfer what the sink will take, and
    /// report the sink's state.
    pub fn update(&mut self) -> Result<SinkState> {
        let more_available = self.decode_if_frame_empty()?;
        if !more_available {
            self.sink.source_out();
        }

        if !self.frame_finished() {
            self.transfer_frame()?;
        }

        Ok(self.sink.state())
    }

    /// Starts or stops the sink.
    pub fn set_playing(&mut self, playing: bool) -> Result<()> {
        if playing {
            self.sink.start()
        } else {
            self.sink.stop()
        }
    }

    /// Current playback position in microseconds.
    pub fn position(&self) -> u64 {
        self.source.micros_from_samples(self.sink.position())
    }

    /// Seeks to an absolute position in microseconds.
    ///
    /// The sink's counter is set to the sample the codec actually
    /// landed on, and the in-flight frame is discarded so stale bytes
    /// from the old position never reach the sink.
    pub fn seek(&mut self, micros: u64) -> Result<()> {
        let target = self.source.samples_from_micros(micros);
        let landed = self.source.seek(target)?;
        self.sink.set_position(landed);

        self.clear_frame();
        Ok(())
    }

    /// The sink's current state.
    pub fn state(&self) -> SinkState {
        self.sink.state()
    }

    /// The path of the loaded file.
    pub fn file(&self) -> &str {
        self.source.path()
    }

    /// Total length of the loaded file, in microseconds.
    pub fn length_micros(&self) -> u64 {
        self.source.micros_from_samples(self.source.length())
    }

    /// Decodes a fresh frame if the previous one has been fully
    /// transferred. Returns whether the source has more to give.
    fn decode_if_frame_empty(&mut self) -> Result<bool> {
        if !self.frame_finished() {
            return Ok(true);
        }

        let (state, bytes) = self.source.decode()?;
        self.frame = bytes;
        self.cursor = 0;

        Ok(state != DecodeState::Eof)
    }

    /// Offers the remainder of the frame to the sink. The sink may take
    /// less than offered when the ring buffer is near-full; the rest is
    /// retained for the next update.
    fn transfer_frame(&mut self) -> Result<()> {
        let taken = self.sink.transfer(&self.frame[self.cursor..])?;
        self.cursor += taken;

        if self.frame_finished() {
            self.clear_frame();
        }
        Ok(())
    }

    fn frame_finished(&self) -> bool {
        self.cursor >= self.frame.len()
    }

    fn clear_frame(&mut self) {
        self.frame.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::sample::SampleFormat;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RATE: u32 = 10_000;
    const BYTES_PER_SAMPLE: usize = 2;

    /// Scripted source: yields fixed-size frames of a counter pattern
    /// until `total_samples` is exhausted.
    #[derive(Debug)]
    struct ScriptedSource {
        frame_samples: usize,
        total_samples: u64,
        next_sample: u64,
    }

    impl ScriptedSource {
        fn new(frame_samples: usize, total_samples: u64) -> Self {
            ScriptedSource {
                frame_samples,
                total_samples,
                next_sample: 0,
            }
        }
    }

    impl AudioSource for ScriptedSource {
        fn decode(&mut self) -> Result<crate::source::DecodeResult> {
            if self.next_sample >= self.total_samples {
                return Ok((DecodeState::Eof, Vec::new()));
            }

            let remaining = (self.total_samples - self.next_sample) as usize;
            let count = remaining.min(self.frame_samples);
            let mut bytes = Vec::with_capacity(count * BYTES_PER_SAMPLE);
            for i in 0..count {
                let sample = (self.next_sample + i as u64) as u16;
                bytes.extend_from_slice(&sample.to_ne_bytes());
            }
            self.next_sample += count as u64;

            Ok((DecodeState::Decoding, bytes))
        }

        fn seek(&mut self, target: u64) -> Result<u64> {
            if target > self.total_samples {
                return Err(AudioError::Seek("past end".to_string()));
            }
            self.next_sample = target;
            Ok(target)
        }

        fn channel_count(&self) -> u8 {
            1
        }
        fn sample_rate(&self) -> u32 {
            RATE
        }
        fn output_format(&self) -> SampleFormat {
            SampleFormat::I16
        }
        fn length(&self) -> u64 {
            self.total_samples
        }
        fn path(&self) -> &str {
            "/music/scripted.wav"
        }
    }

    #[derive(Default)]
    struct FakeSinkState {
        state: Option<SinkState>,
        accepted: Vec<u8>,
        capacity: usize,
        position: u64,
        source_out: bool,
        flushed: u32,
    }

    /// Sink double with a fixed byte capacity, recording everything.
    #[derive(Clone)]
    struct FakeSink(Rc<RefCell<FakeSinkState>>);

    impl FakeSink {
        fn new(capacity: usize) -> Self {
            let state = FakeSinkState {
                state: Some(SinkState::Stopped),
                capacity,
                ..Default::default()
            };
            FakeSink(Rc::new(RefCell::new(state)))
        }
    }

    impl AudioSink for FakeSink {
        fn start(&mut self) -> Result<()> {
            self.0.borrow_mut().state = Some(SinkState::Playing);
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.0.borrow_mut().state = Some(SinkState::Stopped);
            Ok(())
        }
        fn state(&self) -> SinkState {
            self.0.borrow().state.unwrap()
        }
        fn position(&self) -> u64 {
            self.0.borrow().position
        }
        fn set_position(&mut self, samples: u64) {
            let mut inner = self.0.borrow_mut();
            inner.position = samples;
            inner.source_out = false;
            inner.flushed += 1;
            if inner.state == Some(SinkState::AtEnd) {
                inner.state = Some(SinkState::Stopped);
            }
        }
        fn source_out(&mut self) {
            self.0.borrow_mut().source_out = true;
        }
        fn transfer(&mut self, src: &[u8]) -> Result<usize> {
            let mut inner = self.0.borrow_mut();
            let mut take = src.len().min(inner.capacity - inner.accepted.len());
            take -= take % BYTES_PER_SAMPLE;
            inner.accepted.extend_from_slice(&src[..take]);
            Ok(take)
        }
    }

    fn pipe(frame_samples: usize, total_samples: u64, sink_capacity: usize) -> (PipeAudio, FakeSink) {
        let sink = FakeSink::new(sink_capacity);
        let pipe = PipeAudio::new(
            Box::new(ScriptedSource::new(frame_samples, total_samples)),
            Box::new(sink.clone()),
        );
        (pipe, sink)
    }

    #[test]
    fn update_moves_whole_file_through_in_order() {
        let (mut pipe, sink) = pipe(16, 64, 1024);

        for _ in 0..10 {
            pipe.update().unwrap();
        }

        let accepted = &sink.0.borrow().accepted;
        assert_eq!(accepted.len(), 64 * BYTES_PER_SAMPLE);
        for i in 0..64u16 {
            let at = i as usize * BYTES_PER_SAMPLE;
            let sample = u16::from_ne_bytes([accepted[at], accepted[at + 1]]);
            assert_eq!(sample, i);
        }
    }

    #[test]
    fn remainder_is_retained_when_sink_is_full() {
        // Sink takes 10 samples total; frames are 16 samples.
        let (mut pipe, sink) = pipe(16, 64, 10 * BYTES_PER_SAMPLE);

        pipe.update().unwrap();
        assert_eq!(sink.0.borrow().accepted.len(), 10 * BYTES_PER_SAMPLE);
        // After update, either the frame is done or the sink is full.
        assert!(!pipe.frame_finished());

        // Nothing more fits; the cursor must not move.
        let cursor_before = pipe.cursor;
        pipe.update().unwrap();
        assert_eq!(pipe.cursor, cursor_before);
    }

    #[test]
    fn eof_reaches_the_sink_exactly_when_the_source_dries_up() {
        let (mut pipe, sink) = pipe(16, 32, 1024);

        pipe.update().unwrap();
        pipe.update().unwrap();
        assert!(!sink.0.borrow().source_out);

        // Third update decodes nothing and declares the source out.
        pipe.update().unwrap();
        assert!(sink.0.borrow().source_out);

        // And keeps declaring it, harmlessly.
        pipe.update().unwrap();
        assert!(sink.0.borrow().source_out);
    }

    #[test]
    fn seek_discards_the_inflight_frame() {
        let (mut pipe, sink) = pipe(16, 64, 10 * BYTES_PER_SAMPLE);

        pipe.update().unwrap();
        assert!(!pipe.frame_finished());

        // 3 000 us at 10 kHz is sample 30, inside the 64-sample file.
        pipe.seek(3_000).unwrap();
        assert!(pipe.frame_finished());
        assert_eq!(sink.0.borrow().flushed, 1);
    }

    #[test]
    fn seek_converts_micros_through_the_source_rate() {
        let (mut pipe, sink) = pipe(16, 10_000, 1024);

        // Half a second at 10 kHz is sample 5 000.
        pipe.seek(500_000).unwrap();
        assert_eq!(sink.0.borrow().position, 5_000);
        assert_eq!(pipe.position(), 500_000);
    }

    #[test]
    fn seek_past_length_propagates_the_seek_error() {
        let (mut pipe, _sink) = pipe(16, 10_000, 1024);

        let err = pipe.seek(2_000_000).unwrap_err();
        assert!(matches!(err, AudioError::Seek(_)), "got {err}");
    }

    #[test]
    fn length_is_reported_in_micros() {
        let (pipe, _sink) = pipe(16, 10_000, 1024);
        assert_eq!(pipe.length_micros(), 1_000_000);
    }
}
