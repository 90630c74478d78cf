use eventline_lib::{Event, Id, SnapMode};
use egui::{Rect, pos2};

/// The pixel mapping of the graph: how wide a second is, how tall a row is,
/// and which frame grid drags snap onto. Passed explicitly into all geometry
/// and drag math so nothing reads ambient zoom or configuration state.
#[derive(Clone, Copy, Debug)]
pub struct Metrics {
    pub pixels_per_second: f32,
    pub row_height: f32,
    pub snap: SnapMode,
}

impl Metrics {
    pub fn time_to_x(&self, time: f32) -> f32 {
        time * self.pixels_per_second
    }
    pub fn x_to_time(&self, x: f32) -> f32 {
        x / self.pixels_per_second
    }
    pub fn row_to_y(&self, row: i32) -> f32 {
        row as f32 * self.row_height
    }
    pub fn y_to_row(&self, y: f32) -> i32 {
        (y / self.row_height).floor() as i32
    }
}

/// The interactive wrapper around one event: the row it sits on plus the
/// drag primitives that retime the event from pixel positions. Geometry is
/// always derived from the event's current times and the metrics, never
/// cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventBox {
    pub event: Id<Event>,
    row: i32,
}

impl EventBox {
    /// Row value meaning "not assigned yet"; resolved during graph rebuild.
    pub const UNPLACED_ROW: i32 = -1;

    pub fn new(event: Id<Event>) -> Self {
        Self {
            event,
            row: Self::UNPLACED_ROW,
        }
    }
    pub fn with_row(event: Id<Event>, row: i32) -> Self {
        Self { event, row }
    }

    pub fn row(&self) -> i32 {
        self.row
    }

    /// Returns the previous row so the caller can relocate this box in the
    /// row index.
    #[must_use = "relocate the box in the row index with the previous row"]
    pub fn set_row(&mut self, row: i32) -> i32 {
        std::mem::replace(&mut self.row, row)
    }

    pub fn left(&self, event: &Event, metrics: &Metrics) -> f32 {
        metrics.time_to_x(event.start)
    }
    pub fn right(&self, event: &Event, metrics: &Metrics) -> f32 {
        metrics.time_to_x(event.end)
    }
    pub fn width(&self, event: &Event, metrics: &Metrics) -> f32 {
        self.right(event, metrics) - self.left(event, metrics)
    }
    pub fn top(&self, metrics: &Metrics) -> f32 {
        metrics.row_to_y(self.row)
    }
    pub fn bottom(&self, metrics: &Metrics) -> f32 {
        self.top(metrics) + metrics.row_height
    }

    /// Bounding rect in virtual graph space (y = 0 is the first row, below
    /// the timeline strip).
    pub fn rect(&self, event: &Event, metrics: &Metrics) -> Rect {
        Rect::from_min_max(
            pos2(self.left(event, metrics), self.top(metrics)),
            pos2(self.right(event, metrics), self.bottom(metrics)),
        )
    }

    /// Moves the whole box so its left edge lands on `target_left` pixels,
    /// preserving duration. The new start snaps to the frame grid and is
    /// clamped to zero. Returns whether the event's times actually changed.
    pub fn drag_whole_to_x(&self, event: &mut Event, metrics: &Metrics, target_left: f32) -> bool {
        let duration = event.duration();
        let new_start = metrics.snap.round(metrics.x_to_time(target_left)).max(0.0);

        let changed = new_start != event.start;
        event.start = new_start;
        event.end = new_start + duration;
        changed
    }

    /// Retimes only the start. Snapped, then clamped so the duration never
    /// drops below one frame and the start never goes negative.
    pub fn drag_left_edge_to_x(
        &self,
        event: &mut Event,
        metrics: &Metrics,
        target_left: f32,
    ) -> bool {
        let new_start = metrics
            .snap
            .round(metrics.x_to_time(target_left))
            .min(event.end - metrics.snap.min_duration())
            .max(0.0);

        let changed = new_start != event.start;
        event.start = new_start;
        changed
    }

    /// Retimes only the end. Snapped, clamped to one frame past the start;
    /// no upper bound.
    pub fn drag_right_edge_to_x(
        &self,
        event: &mut Event,
        metrics: &Metrics,
        target_right: f32,
    ) -> bool {
        let new_end = metrics
            .snap
            .round(metrics.x_to_time(target_right))
            .max(event.start + metrics.snap.min_duration());

        let changed = new_end != event.end;
        event.end = new_end;
        changed
    }
}
