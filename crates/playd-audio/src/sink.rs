//! The device-facing consumer contract.

use crate::error::Result;

/// Playback state of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// The device is paused.
    Stopped,
    /// The device is pulling samples.
    Playing,
    /// The source ran out and the ring buffer has fully drained.
    AtEnd,
}

/// A realtime consumer of decoded samples.
///
/// A sink owns the device handle and the ring buffer, services the
/// device's pull callback, and tracks how many samples it has delivered
/// since the last position change.
///
/// All methods here are called from the main thread; only the pull
/// callback (internal to the implementation) runs on the device thread.
pub trait AudioSink {
    /// Starts playback. A no-op unless currently [`SinkState::Stopped`].
    fn start(&mut self) -> Result<()>;

    /// Stops playback, from either [`SinkState::Playing`] or
    /// [`SinkState::AtEnd`]. A no-op if already stopped.
    fn stop(&mut self) -> Result<()>;

    /// Current playback state.
    fn state(&self) -> SinkState;

    /// Samples delivered to the device since the last position change.
    ///
    /// May race with the callback by up to one device buffer; that
    /// slack is documented and accepted.
    fn position(&self) -> u64;

    /// Overwrites the position counter, clears the source-out flag,
    /// discards buffered samples from the old position, and drops
    /// [`SinkState::AtEnd`] back to [`SinkState::Stopped`].
    fn set_position(&mut self, samples: u64);

    /// Tells the sink the producer has no more samples to give. The
    /// next time the ring buffer runs dry, the sink transitions to
    /// [`SinkState::AtEnd`] instead of padding silence.
    fn source_out(&mut self);

    /// Offers decoded bytes to the sink. Accepts at most the ring
    /// buffer's free space, truncated to a whole number of samples, and
    /// returns the byte count taken. Accepting less than offered is
    /// normal when the buffer is near-full.
    fn transfer(&mut self, src: &[u8]) -> Result<usize>;
}
