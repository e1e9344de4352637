//! Throttled position announcements.

/// Decides when a position update is worth broadcasting.
///
/// The player's update loop runs at a few hundred hertz, but clients
/// only want a position line every second or so. The tracker emits when
/// at least one period has elapsed since the last emission, and always
/// emits on the first update after a reset so clients see the new
/// position immediately after a load or seek.
#[derive(Debug)]
pub struct PositionTracker {
    /// Minimum gap between emissions, in microseconds.
    period: u64,
    /// The position last emitted.
    last: u64,
    /// False until the first emission after a reset.
    emitted: bool,
}

impl PositionTracker {
    /// Creates a tracker emitting at most once per `period` microseconds.
    pub fn new(period: u64) -> Self {
        PositionTracker {
            period,
            last: 0,
            emitted: false,
        }
    }

    /// Reports the current position; returns whether it should be
    /// announced. On `true`, the position is recorded as emitted.
    pub fn ready(&mut self, current: u64) -> bool {
        let due = !self.emitted || current.saturating_sub(self.last) >= self.period;
        if due {
            self.last = current;
            self.emitted = true;
        }
        due
    }

    /// Forgets the emission history, so the next update announces
    /// unconditionally. Called on load, seek and eject.
    pub fn reset(&mut self) {
        self.last = 0;
        self.emitted = false;
    }
}
