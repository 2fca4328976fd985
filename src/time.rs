use std::ops::{Add, AddAssign};
use std::time::Duration;

use derive_more::{Add, AddAssign, Display};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Position on the playback timeline, counted in frames at the queue's
/// sample rate.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[display(fmt = "{}f", _0)]
pub struct Timestamp(u64);

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Add, AddAssign)]
#[display(fmt = "{}f", _0)]
pub struct SampleDuration(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_frames(frames: u64) -> Self {
        Timestamp(frames)
    }

    pub const fn as_frames(&self) -> u64 {
        self.0
    }

    pub fn from_std_duration_lossy(duration: Duration, sample_rate: u32) -> Self {
        Timestamp(frames_from_duration(duration, sample_rate))
    }

    pub fn to_std_duration_lossy(&self, sample_rate: u32) -> Duration {
        duration_from_frames(self.0, sample_rate)
    }

    pub fn checked_add(self, duration: SampleDuration) -> Option<Timestamp> {
        self.0.checked_add(duration.0).map(Timestamp)
    }

    /// Saturates at zero when `earlier` is actually later.
    pub fn duration_since(&self, earlier: Timestamp) -> SampleDuration {
        SampleDuration(self.0.saturating_sub(earlier.0))
    }
}

impl SampleDuration {
    pub const fn zero() -> Self {
        SampleDuration(0)
    }

    pub const fn from_frames(frames: u64) -> Self {
        SampleDuration(frames)
    }

    pub const fn as_frames(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn from_std_duration_lossy(duration: Duration, sample_rate: u32) -> Self {
        SampleDuration(frames_from_duration(duration, sample_rate))
    }

    pub fn to_std_duration_lossy(&self, sample_rate: u32) -> Duration {
        duration_from_frames(self.0, sample_rate)
    }
}

impl Add<SampleDuration> for Timestamp {
    type Output = Timestamp;

    fn add(self, duration: SampleDuration) -> Timestamp {
        Timestamp(self.0 + duration.0)
    }
}

impl AddAssign<SampleDuration> for Timestamp {
    fn add_assign(&mut self, duration: SampleDuration) {
        self.0 += duration.0;
    }
}

/// Half-open interval `[start, start + duration)` on the playback timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    start: Timestamp,
    duration: SampleDuration,
}

impl Span {
    /// Returns `None` if the end of the span is not representable.
    pub fn new(start: Timestamp, duration: SampleDuration) -> Option<Self> {
        start.checked_add(duration)?;
        Some(Span { start, duration })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn duration(&self) -> SampleDuration {
        self.duration
    }

    pub fn end(&self) -> Timestamp {
        self.start + self.duration
    }

    // a zero length span contains nothing, not even its own start
    pub fn contains(&self, time: Timestamp) -> bool {
        self.start <= time && time < self.end()
    }
}

fn frames_from_duration(duration: Duration, sample_rate: u32) -> u64 {
    let frames = duration.as_nanos() * u128::from(sample_rate) / NANOS_PER_SEC;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

fn duration_from_frames(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }

    let rate = u64::from(sample_rate);
    let secs = frames / rate;
    let rem = u128::from(frames % rate);
    let nanos = rem * NANOS_PER_SEC / u128::from(rate);

    // rem < rate, so nanos is always below one second
    Duration::new(secs, nanos as u32)
}
