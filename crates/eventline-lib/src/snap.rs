//! Frame quantization. Times are seconds; the active frame rate decides the
//! grid. Carried in configuration and passed explicitly to everything that
//! rounds; there is no ambient global snap state.

use crate::Event;

pub const FRAME_30: f64 = 1.0 / 30.0;
pub const FRAME_60: f64 = 1.0 / 60.0;

/// Minimum duration enforced when snapping is off.
pub const MIN_UNSNAPPED_DURATION: f32 = 0.001;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapMode {
    /// No quantization; times stay wherever the pointer put them.
    None,
    #[default]
    Fps30,
    Fps60,
}

impl SnapMode {
    pub fn frame_duration(self) -> Option<f64> {
        match self {
            SnapMode::None => None,
            SnapMode::Fps30 => Some(FRAME_30),
            SnapMode::Fps60 => Some(FRAME_60),
        }
    }

    /// One frame, or the unsnapped fallback; the smallest legal duration.
    pub fn min_duration(self) -> f32 {
        match self.frame_duration() {
            Some(frame) => frame as f32,
            None => MIN_UNSNAPPED_DURATION,
        }
    }

    /// Rounds `time` to the nearest multiple of the active frame duration.
    /// Identity when snapping is off.
    pub fn round(self, time: f32) -> f32 {
        match self.frame_duration() {
            Some(frame) => round_time_to_frame(time, frame),
            None => time,
        }
    }

    /// Quantizes both ends of an event and enforces the one-frame minimum
    /// duration so snapping can never collapse an event to zero length.
    /// Applied once per completed drag (and on paste), not per input tick.
    pub fn apply_rounding(self, event: &mut Event) {
        event.start = self.round(event.start);
        event.end = self.round(event.end);
        event.end = event.end.max(event.start + self.min_duration());
    }
}

pub fn round_time_to_frame(time: f32, frame_duration: f64) -> f32 {
    ((time as f64 / frame_duration).round() * frame_duration) as f32
}
