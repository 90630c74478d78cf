use eventline_lib::{Event, Id};
use egui::{Pos2, Rect, Vec2};
use smallvec::SmallVec;

use super::event_box::{EventBox, Metrics};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragKind {
    #[default]
    None,
    ResizeLeft,
    ResizeRight,
    Move,
    MultiResizeLeft,
    MultiResizeRight,
    MultiMove,
    Marquee(MarqueeMode),
}

impl DragKind {
    pub fn is_box_drag(self) -> bool {
        !matches!(self, DragKind::None | DragKind::Marquee(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarqueeMode {
    /// Replaces the multi-selection with whatever the rectangle covers.
    Replace,
    /// Adds covered boxes, keeping the existing selection.
    Add,
    /// Removes covered boxes from the existing selection.
    Subtract,
}

/// Everything captured about one box when a drag starts, so live preview and
/// the release-time transaction both work from the same frozen baseline.
#[derive(Clone, Copy, Debug)]
pub struct DragOrigin {
    pub box_id: Id<EventBox>,
    /// Pointer position minus box top-left at the moment of mouse-down.
    pub offset: Vec2,
    pub original_width: f32,
    pub original_start: f32,
    pub original_end: f32,
    pub original_row: i32,
    /// Row the pointer was over when the drag started.
    pub start_mouse_row: i32,
}

impl DragOrigin {
    pub fn capture(
        box_id: Id<EventBox>,
        bx: &EventBox,
        event: &Event,
        metrics: &Metrics,
        pointer: Pos2,
        mouse_row: i32,
    ) -> Self {
        Self {
            box_id,
            offset: Vec2::new(
                pointer.x - bx.left(event, metrics),
                pointer.y - bx.top(metrics),
            ),
            original_width: bx.width(event, metrics),
            original_start: event.start,
            original_end: event.end,
            original_row: bx.row(),
            start_mouse_row: mouse_row,
        }
    }

    pub fn original_duration(&self) -> f32 {
        self.original_end - self.original_start
    }

    /// Applies this origin's share of a drag tick: resolves the effective
    /// pointer into a target pixel edge and forwards to the box's drag
    /// primitive. Returns whether the event's times changed.
    pub fn drag_to(
        &self,
        kind: DragKind,
        bx: &EventBox,
        event: &mut Event,
        metrics: &Metrics,
        pointer: Pos2,
    ) -> bool {
        match kind {
            DragKind::Move | DragKind::MultiMove => {
                bx.drag_whole_to_x(event, metrics, pointer.x - self.offset.x)
            }
            DragKind::ResizeLeft | DragKind::MultiResizeLeft => {
                bx.drag_left_edge_to_x(event, metrics, pointer.x - self.offset.x)
            }
            DragKind::ResizeRight | DragKind::MultiResizeRight => bx.drag_right_edge_to_x(
                event,
                metrics,
                pointer.x - self.offset.x + self.original_width,
            ),
            DragKind::None | DragKind::Marquee(_) => false,
        }
    }

    /// The row this box should move to when the pointer is over
    /// `new_mouse_row`; `None` when the pointer has left the row area.
    pub fn shifted_row(&self, new_mouse_row: i32) -> Option<i32> {
        (new_mouse_row >= 0).then(|| self.original_row + (new_mouse_row - self.start_mouse_row))
    }
}

/// The in-progress manipulation, if any. Created on mouse-down over an
/// eligible region, updated every tick the button stays held, and consumed
/// (turned into a transaction, or dropped) on release.
#[derive(Debug, Default)]
pub struct DragState {
    kind: DragKind,
    single: Option<DragOrigin>,
    multi: SmallVec<[DragOrigin; 8]>,
    start_point: Pos2,
    current_point: Pos2,
}

impl DragState {
    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.kind != DragKind::None
    }

    pub fn single(&self) -> Option<&DragOrigin> {
        self.single.as_ref()
    }

    pub fn multi(&self) -> &[DragOrigin] {
        &self.multi
    }

    pub fn start_point(&self) -> Pos2 {
        self.start_point
    }
    pub fn current_point(&self) -> Pos2 {
        self.current_point
    }
    pub fn set_current_point(&mut self, point: Pos2) {
        self.current_point = point;
    }

    pub fn marquee_rect(&self) -> Rect {
        Rect::from_two_pos(self.start_point, self.current_point)
    }

    pub fn begin_single(&mut self, kind: DragKind, origin: DragOrigin, point: Pos2) {
        debug_assert!(matches!(
            kind,
            DragKind::ResizeLeft | DragKind::ResizeRight | DragKind::Move
        ));
        self.kind = kind;
        self.single = Some(origin);
        self.multi.clear();
        self.start_point = point;
        self.current_point = point;
    }

    pub fn begin_multi(
        &mut self,
        kind: DragKind,
        origins: impl IntoIterator<Item = DragOrigin>,
        point: Pos2,
    ) {
        debug_assert!(matches!(
            kind,
            DragKind::MultiResizeLeft | DragKind::MultiResizeRight | DragKind::MultiMove
        ));
        self.kind = kind;
        self.single = None;
        self.multi.clear();
        self.multi.extend(origins);
        self.start_point = point;
        self.current_point = point;
    }

    pub fn begin_marquee(&mut self, mode: MarqueeMode, point: Pos2) {
        self.kind = DragKind::Marquee(mode);
        self.single = None;
        self.multi.clear();
        self.start_point = point;
        self.current_point = point;
    }

    /// Drops the gesture without committing anything; used both for normal
    /// release cleanup and for cancellation by a mode switch.
    pub fn abandon(&mut self) {
        *self = Self::default();
    }
}
