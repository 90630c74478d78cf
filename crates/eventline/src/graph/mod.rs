//! The event graph: a scrollable, zoomable grid of event boxes on rows,
//! with direct-manipulation editing on top of a transactional mutation
//! protocol. All mutation funnels through graph commands at gesture
//! boundaries; the only exception is live drag preview, which retimes
//! events directly for per-frame feedback and is reconciled into one
//! command at release.

mod event_box;
pub use event_box::{EventBox, Metrics};
mod row_index;
pub use row_index::RowIndex;
mod selection;
pub use selection::Selection;
mod drag;
pub use drag::{DragKind, DragOrigin, DragState, MarqueeMode};
mod scroll;
pub use scroll::ScrollViewer;
mod clipboard;
pub use clipboard::{Clipboard, ClipboardEvent, ClipboardSnapshot, MemoryClipboard};
mod draw;

#[cfg(test)]
mod tests;

use eventline_lib::{Animation, Event, EventGroup, Id, IdMap, ModifiedTracker, SnapMode, State};
use egui::{Pos2, Rect, Vec2, pos2, vec2};
use smallvec::SmallVec;

use crate::command::{
    BoxBatchDragCommit, BoxDragCommit, DeleteEntry, DragEntry, EventBoxDeleteBatch, EventBoxPlace,
    GraphCommand, GraphCtx, PasteCommit, PasteEntry,
};
use crate::input::InputState;
use crate::undo::UndoHistory;

pub const TIMELINE_HEIGHT: f32 = 24.0;
pub const DEFAULT_ROW_HEIGHT: f32 = 24.0;

pub const DEFAULT_PIXELS_PER_SECOND: f32 = 256.0;
pub const MIN_PIXELS_PER_SECOND: f32 = 8.0;
pub const MAX_PIXELS_PER_SECOND: f32 = DEFAULT_PIXELS_PER_SECOND * 256.0;
pub const ZOOM_SPEED: f32 = 1.25;

/// Pixel margin on each box edge that grabs as a resize handle.
pub const BOX_EDGE_MARGIN: f32 = 4.0;
/// Boxes narrower than this have no edge handles; they can only be moved.
pub const MIN_EDGE_DRAG_WIDTH: f32 = 16.0;

/// Row for events of a grouped animation that belong to no group.
const UNGROUPED_EVENT_ROW: i32 = 20;

/// Pointer-follow rate while scrubbing; the first tick jumps instead.
const SCRUB_LERP: f32 = 30.0;
/// Kept visible ahead of the playback cursor when autoscrolling.
const AUTOSCROLL_MARGIN: f32 = 48.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphKind {
    /// The editable graph of the current animation.
    Owner,
    /// A read-only mirror of the animation this one imports events from.
    /// Never receives input, drags, or transactions; the owner renders it
    /// dimmed and redirects simulation queries to it.
    Ghost,
}

#[derive(Clone, Copy, Debug)]
pub struct GraphConfig {
    pub snap: SnapMode,
    pub read_only: bool,
    pub autoscroll_during_playback: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            snap: SnapMode::Fps30,
            read_only: false,
            autoscroll_during_playback: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("this event graph can only delete event boxes that it owns")]
    ForeignBox,
    #[error("clipboard does not contain pasteable events: {0}")]
    ClipboardParse(#[from] serde_json::Error),
}

/// Where the initiating mouse-down landed. Exactly one is active at a time
/// and only `EventSelecting` permits entering a box drag, so a click on a
/// scrollbar or the timeline can never also select a box underneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum PaneDrag {
    #[default]
    Idle,
    Scrubbing,
    HorizontalScrollDrag,
    VerticalScrollDrag,
    EventSelecting,
}

/// The narrow playback contract: where the cursor is and whether the user
/// is scrubbing it. Simulation and audio triggering live outside this crate
/// and only observe these fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaybackCursor {
    pub current_time: f32,
    pub start_time: f32,
    pub is_playing: bool,
    pub scrubbing: bool,
}

impl PlaybackCursor {
    pub fn toggle_playing(&mut self) {
        self.is_playing = !self.is_playing;
        if self.is_playing {
            self.current_time = self.start_time;
        }
    }

    pub fn advance(&mut self, dt: f32, end: f32) {
        if self.is_playing && !self.scrubbing {
            self.current_time += dt;
            if end > 0.0 && self.current_time > end {
                self.current_time = 0.0;
            }
        }
    }
}

/// The synchronized trio every transaction keeps consistent: the box
/// collection, the per-row index over it, and the selection referencing it.
/// Commands mutate these through the helpers here so a box can never be
/// present in one structure and missing from another.
#[derive(Debug)]
pub struct GraphView {
    anim_id: Id<Animation>,
    pub boxes: IdMap<EventBox>,
    pub row_index: RowIndex,
    pub selection: Selection,
}

impl GraphView {
    pub fn new(anim_id: Id<Animation>) -> Self {
        Self {
            anim_id,
            boxes: IdMap::new(),
            row_index: RowIndex::new(),
            selection: Selection::default(),
        }
    }

    pub fn anim_id(&self) -> Id<Animation> {
        self.anim_id
    }

    pub fn insert_box(&mut self, bx: EventBox) {
        let id = bx.event.cast();
        self.row_index.register(id, bx.row());
        self.boxes.insert(id, bx);
    }

    pub fn remove_box(&mut self, id: Id<EventBox>) -> Option<EventBox> {
        let bx = self.boxes.remove(id)?;
        self.row_index.remove(id, bx.row());
        self.selection.remove(id);
        Some(bx)
    }

    pub fn set_box_row(&mut self, id: Id<EventBox>, new_row: i32) {
        if let Some(bx) = self.boxes.get_mut(id) {
            let old_row = bx.set_row(new_row);
            self.row_index.relocate(id, old_row, new_row);
        }
    }

    /// Rebuilds the animation's group list from scratch from current box
    /// rows. Always a full rebuild: incremental patching of group
    /// boundaries is error-prone when rows are reordered. Guarantees the
    /// dense-prefix invariant (no trailing empty groups) and that a group's
    /// kind is its first member's kind.
    pub fn recreate_groups(&self, state: &mut State) {
        // grouping is a per-file convention; capture the answer before
        // touching this animation's list
        if !state.any_groups() {
            return;
        }
        let Some(anim) = state.animations.get_mut(self.anim_id) else {
            return;
        };

        let order: Vec<Id<Event>> = anim.event_ids().collect();
        let mut groups: Vec<EventGroup> = Vec::new();
        for (index, event_id) in order.into_iter().enumerate() {
            let Some(bx) = self.boxes.get(event_id.cast()) else {
                tracing::warn!(event = ?event_id, "event has no box during group rebuild; skipping");
                continue;
            };
            if bx.row() < 0 {
                continue;
            }
            let row = bx.row() as usize;
            let kind = anim.event(event_id).map(|ev| ev.kind).unwrap_or(0);

            while groups.len() <= row {
                // filler groups for skipped rows keep group i == row i
                groups.push(EventGroup::new(0));
            }
            let group = &mut groups[row];
            if group.is_empty() {
                group.kind = kind;
            }
            group.insert(index);
        }
        while groups.last().is_some_and(EventGroup::is_empty) {
            groups.pop();
        }
        anim.groups = groups;
    }

    /// Bounding box of all boxes plus a margin; reported to the scroll
    /// viewer as the virtual content size.
    pub fn virtual_size(&self, state: &State, metrics: &Metrics) -> Vec2 {
        let Some(anim) = state.animations.get(self.anim_id) else {
            return Vec2::ZERO;
        };
        if self.boxes.is_empty() {
            return Vec2::ZERO;
        }
        let mut max_right = 0.0f32;
        let mut max_bottom = 0.0f32;
        for bx in self.boxes.values() {
            if let Some(ev) = anim.event(bx.event) {
                max_right = max_right.max(bx.right(ev, metrics));
            }
            max_bottom = max_bottom.max(bx.bottom(metrics));
        }
        vec2(max_right + 64.0, max_bottom + TIMELINE_HEIGHT + 64.0)
    }
}

pub struct EventGraph {
    kind: GraphKind,
    pub view: GraphView,
    pub scroll: ScrollViewer,
    pub playback: PlaybackCursor,
    pub pixels_per_second: f32,
    pub row_height: f32,

    drag: DragState,
    pane: PaneDrag,
    prev_pane: PaneDrag,
    mouse_row: i32,
    last_rel_mouse: Pos2,
    hovered: Option<Id<EventBox>>,
    middle_pan_anchor: Option<Pos2>,
    rect: Rect,

    ghost: Option<Box<EventGraph>>,
}

impl EventGraph {
    pub fn new(anim_id: Id<Animation>) -> Self {
        Self::with_kind(GraphKind::Owner, anim_id)
    }

    fn with_kind(kind: GraphKind, anim_id: Id<Animation>) -> Self {
        Self {
            kind,
            view: GraphView::new(anim_id),
            scroll: ScrollViewer::new(),
            playback: PlaybackCursor::default(),
            pixels_per_second: DEFAULT_PIXELS_PER_SECOND,
            row_height: DEFAULT_ROW_HEIGHT,

            drag: DragState::default(),
            pane: PaneDrag::Idle,
            prev_pane: PaneDrag::Idle,
            mouse_row: -1,
            last_rel_mouse: Pos2::ZERO,
            hovered: None,
            middle_pan_anchor: None,
            rect: Rect::ZERO,

            ghost: None,
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }
    pub fn ghost(&self) -> Option<&EventGraph> {
        self.ghost.as_deref()
    }
    pub fn hovered(&self) -> Option<Id<EventBox>> {
        self.hovered
    }
    pub fn mouse_row(&self) -> i32 {
        self.mouse_row
    }
    pub fn rect(&self) -> Rect {
        self.rect
    }
    pub(crate) fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
        self.scroll.set_viewport(rect);
    }

    pub fn metrics(&self, config: &GraphConfig) -> Metrics {
        Metrics {
            pixels_per_second: self.pixels_per_second,
            row_height: self.row_height,
            snap: config.snap,
        }
    }

    /// Simulation/hover queries target the ghost's events while one is
    /// shown, the own boxes otherwise.
    pub fn simulated_view(&self) -> &GraphView {
        match &self.ghost {
            Some(ghost) => &ghost.view,
            None => &self.view,
        }
    }

    /// Pointer position in virtual graph space: origin at the left edge of
    /// time zero, row zero; the timeline strip sits above y = 0.
    fn rel_mouse(&self, input: &InputState) -> Pos2 {
        pos2(
            input.mouse.x - self.rect.left() + self.scroll.scroll.x,
            input.mouse.y - self.rect.top() + self.scroll.scroll.y - TIMELINE_HEIGHT,
        )
    }

    // ---- animation switching ----

    /// Tears down all boxes and rebuilds from the new animation's event
    /// list. Grouped animations put each event on its group's row (or a
    /// fixed fallback row when ungrouped); legacy animations are packed
    /// greedily left-to-right. Also resolves the ghost companion graph.
    pub fn change_animation(
        &mut self,
        state: &State,
        anim_id: Id<Animation>,
        config: &GraphConfig,
    ) {
        self.view = GraphView::new(anim_id);
        self.drag.abandon();
        self.hovered = None;
        self.ghost = None;

        let Some(anim) = state.animations.get(anim_id) else {
            return;
        };
        let metrics = self.metrics(config);

        let legacy_row_mode = !anim.has_groups();
        let mut current_row = 0i32;
        let mut farthest_right = 0.0f32;

        for (index, event_id) in anim.event_ids().enumerate() {
            let Some(ev) = anim.event(event_id) else {
                continue;
            };
            let row = if legacy_row_mode {
                // greedy packing: stay on the current row while the event
                // starts at or past everything placed so far, else bump to
                // a new row. Order-dependent on purpose; downstream files
                // rely on the exact assignment for visual stability.
                let left = metrics.time_to_x(ev.start);
                let right = metrics.time_to_x(ev.end);
                if left < farthest_right {
                    current_row += 1;
                    farthest_right = right;
                } else if right > farthest_right {
                    farthest_right = right;
                }
                current_row
            } else {
                current_row = match anim.group_of(index) {
                    Some(group) => group as i32,
                    None => UNGROUPED_EVENT_ROW,
                };
                current_row
            };
            self.view.insert_box(EventBox::with_row(event_id, row));
        }

        if self.kind == GraphKind::Owner
            && let Some(source) = anim.import_from
            && state.animations.has(source)
        {
            let mut ghost = EventGraph::with_kind(GraphKind::Ghost, source);
            ghost.change_animation(state, source, config);
            self.ghost = Some(Box::new(ghost));
        }
    }

    // ---- zoom ----

    fn rezoom_keeping_mouse_time(&mut self, pane_x: f32, new_pixels_per_second: f32) {
        let mouse_time = (pane_x + self.scroll.scroll.x) / self.pixels_per_second;
        self.pixels_per_second = new_pixels_per_second;
        let new_offset = mouse_time * self.pixels_per_second;
        self.scroll
            .scroll_by(vec2(new_offset - (pane_x + self.scroll.scroll.x), 0.0));
    }

    pub fn zoom_in_one_notch(&mut self, pane_x: f32) {
        let pps = (self.pixels_per_second * ZOOM_SPEED).min(MAX_PIXELS_PER_SECOND);
        self.rezoom_keeping_mouse_time(pane_x, pps);
    }

    pub fn zoom_out_one_notch(&mut self, pane_x: f32) {
        let pps = (self.pixels_per_second / ZOOM_SPEED).max(MIN_PIXELS_PER_SECOND);
        self.rezoom_keeping_mouse_time(pane_x, pps);
    }

    pub fn reset_zoom(&mut self, pane_x: f32) {
        self.rezoom_keeping_mouse_time(pane_x, DEFAULT_PIXELS_PER_SECOND);
    }

    pub fn zoom(&mut self, delta: f32, pane_x: f32) {
        if delta > 0.0 {
            self.zoom_in_one_notch(pane_x);
        } else if delta < 0.0 {
            self.zoom_out_one_notch(pane_x);
        }
    }

    // ---- per-tick update ----

    /// One tick of the interaction state machine. Single-threaded and
    /// synchronous: drag application happens before selection promotion,
    /// which happens before hover bookkeeping, so hit-testing always sees
    /// this tick's geometry.
    pub fn update(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
        input: &InputState,
        dt: f32,
    ) {
        debug_assert_eq!(self.kind, GraphKind::Owner, "ghost graphs are not updated");

        let metrics = self.metrics(config);
        let content_size = self.simulated_view().virtual_size(state, &metrics);
        self.scroll.set_content_size(content_size);

        let end = self.latest_end_time(state);
        self.playback.advance(dt, end);
        if self.playback.is_playing && config.autoscroll_during_playback {
            self.autoscroll_to_cursor();
            // a drag can't survive the view scrolling out from under it
            if self.drag.kind().is_box_drag() {
                self.abandon_drag();
            }
        }

        // middle-click pan wins over everything else
        if input.middle.down && self.rect.contains(input.mouse) {
            self.middle_pan_anchor = Some(input.mouse);
        }
        if !input.middle.held {
            self.middle_pan_anchor = None;
        }
        if input.middle.held
            && self
                .middle_pan_anchor
                .is_some_and(|anchor| self.rect.contains(anchor))
        {
            self.scroll.scroll_by(-input.mouse_delta);
            self.hovered = None;
            return;
        }

        if !input.left.held && !input.left.released {
            self.pane = PaneDrag::Idle;
            self.playback.scrubbing = false;
        }

        if input.ctrl {
            self.zoom(input.scroll_delta.y, input.mouse.x - self.rect.left());
        } else if input.scroll_delta != Vec2::ZERO && self.rect.contains(input.mouse) {
            self.scroll.scroll_by(-input.scroll_delta);
        }

        match self.pane {
            PaneDrag::Scrubbing => {
                self.update_scrub(input, dt);
                return;
            }
            PaneDrag::HorizontalScrollDrag => {
                self.scroll.drag_horizontal_scrollbar(input.mouse_delta.x);
                if !input.left.held {
                    self.pane = PaneDrag::Idle;
                }
                self.prev_pane = self.pane;
                return;
            }
            PaneDrag::VerticalScrollDrag => {
                self.scroll.drag_vertical_scrollbar(input.mouse_delta.y);
                if !input.left.held {
                    self.pane = PaneDrag::Idle;
                }
                self.prev_pane = self.pane;
                return;
            }
            _ => {}
        }

        let rel = self.rel_mouse(input);
        self.last_rel_mouse = rel;
        self.mouse_row = metrics.y_to_row(rel.y);
        if input.mouse.y - self.rect.top() < TIMELINE_HEIGHT {
            // nothing highlights while the pointer is over the timeline
            self.mouse_row = -1;
        }

        let inside = self.rect.contains(input.mouse);
        if !(inside || input.left.held || input.left.released) {
            self.hovered = None;
            self.prev_pane = self.pane;
            return;
        }

        if self.pane == PaneDrag::Idle {
            if input.mouse.y - self.rect.top() < TIMELINE_HEIGHT {
                if input.left.down {
                    self.pane = PaneDrag::Scrubbing;
                    self.update_scrub(input, dt);
                    return;
                }
            } else if self.scroll.in_horizontal_scrollbar(input.mouse) {
                if input.left.down {
                    self.pane = PaneDrag::HorizontalScrollDrag;
                }
                // return so the initial click doesn't also select events
                self.prev_pane = self.pane;
                return;
            } else if self.scroll.in_vertical_scrollbar(input.mouse) {
                if input.left.down {
                    self.pane = PaneDrag::VerticalScrollDrag;
                }
                self.prev_pane = self.pane;
                return;
            } else if input.left.down {
                self.pane = PaneDrag::EventSelecting;
            }
        }

        // while a ghost is shown the pane is effectively read-only
        if self.ghost.is_some() {
            self.view.selection.clear();
        }

        if input.left.down && !input.shift && !input.ctrl {
            // cleared here, re-selected below if the click lands on a box
            self.view.selection.clear_primary();
        }

        if input.right.down && self.drag.kind() == DragKind::None {
            if let Some(hovered) = self.hovered
                && !input.shift
            {
                // preview-trigger contract; the simulation side lives
                // outside this crate and only needs to know which box
                tracing::debug!(box_id = ?hovered, "preview trigger on hovered box");
            } else if self.ghost.is_none()
                && self.view.selection.multi().len() <= 1
                && input.shift
            {
                self.place_event_at_mouse(state, config, modified, undo);
            }
        }

        self.hovered = None;
        if self.ghost.is_some() {
            self.prev_pane = self.pane;
            return;
        }

        let clicked_box = self.hit_test_row(state, config, &metrics, rel, input);

        if self.drag.kind() == DragKind::None
            && input.left.down
            && !clicked_box
            && !(input.mouse.y - self.rect.top() < TIMELINE_HEIGHT)
        {
            self.view.selection.demote_primary_into_multi();
            let mode = if input.shift && !input.ctrl && !input.alt {
                MarqueeMode::Add
            } else if input.ctrl && !input.shift && !input.alt {
                MarqueeMode::Subtract
            } else {
                MarqueeMode::Replace
            };
            self.drag.begin_marquee(mode, rel);
        }

        if input.left.held {
            self.drag.set_current_point(rel);
            let not_autoscrolling =
                !(self.playback.is_playing && config.autoscroll_during_playback);
            match self.drag.kind() {
                DragKind::None => {}
                DragKind::ResizeLeft | DragKind::ResizeRight | DragKind::Move => {
                    if not_autoscrolling {
                        self.apply_single_drag(state, &metrics, rel);
                    }
                }
                DragKind::MultiResizeLeft => {
                    if not_autoscrolling {
                        self.apply_multi_resize_left(state, &metrics, rel);
                    }
                }
                DragKind::MultiResizeRight => {
                    if not_autoscrolling {
                        self.apply_multi_resize_right(state, &metrics, rel);
                    }
                }
                DragKind::MultiMove => {
                    if not_autoscrolling {
                        self.apply_multi_move(state, &metrics, rel);
                    }
                }
                // the marquee keeps tracking even during playback autoscroll
                DragKind::Marquee(mode) => self.apply_marquee(state, &metrics, mode),
            }
        } else {
            self.release_drag(state, config, modified, undo);
        }

        self.prev_pane = self.pane;
    }

    fn update_scrub(&mut self, input: &InputState, dt: f32) {
        self.scroll.clamp_scroll();

        let desired = ((input.mouse.x - self.rect.left() + self.scroll.scroll.x)
            / self.pixels_per_second)
            .max(0.0);

        // jump on the first tick; lerping toward a far-away point while
        // zoomed in feels broken
        if input.left.down || self.prev_pane != PaneDrag::Scrubbing {
            self.playback.current_time = desired;
        } else {
            let t = (SCRUB_LERP * dt).clamp(0.0, 1.0);
            self.playback.current_time =
                self.playback.current_time + (desired - self.playback.current_time) * t;
        }

        if !self.playback.is_playing {
            self.playback.start_time = self.playback.current_time;
        }
        self.playback.scrubbing = true;
        self.mouse_row = -1;

        if !input.left.held {
            self.pane = PaneDrag::Idle;
        }
        self.prev_pane = self.pane;
    }

    fn autoscroll_to_cursor(&mut self) {
        let cursor_x = self.playback.current_time * self.pixels_per_second;
        let viewport_width = self.scroll.viewport().width();
        if cursor_x < self.scroll.scroll.x
            || cursor_x > self.scroll.scroll.x + viewport_width - AUTOSCROLL_MARGIN
        {
            self.scroll.scroll.x = (cursor_x - AUTOSCROLL_MARGIN).max(0.0);
            self.scroll.clamp_scroll();
        }
    }

    fn latest_end_time(&self, state: &State) -> f32 {
        let view = self.simulated_view();
        let Some(anim) = state.animations.get(view.anim_id()) else {
            return 0.0;
        };
        let mut end = 0.0f32;
        for bx in view.boxes.values() {
            if let Some(ev) = anim.event(bx.event) {
                end = end.max(ev.end);
            }
        }
        end
    }

    // ---- hit testing and drag entry ----

    /// Walks the boxes in the pointer row (latest-starting first), updating
    /// hover and entering drags or selection clicks on mouse-down. Returns
    /// whether a mouse-down landed on a box, so the caller knows not to
    /// start a marquee.
    fn hit_test_row(
        &mut self,
        state: &State,
        config: &GraphConfig,
        metrics: &Metrics,
        rel: Pos2,
        input: &InputState,
    ) -> bool {
        if self.drag.kind() != DragKind::None {
            return false;
        }

        let anim_id = self.view.anim_id();
        let Some(anim) = state.animations.get(anim_id) else {
            return false;
        };

        let mut row_boxes: SmallVec<[(Id<EventBox>, f32, f32); 8]> = SmallVec::new();
        for &box_id in self.view.row_index.boxes_in_row(self.mouse_row) {
            let Some(bx) = self.view.boxes.get(box_id) else {
                continue;
            };
            match anim.event(bx.event) {
                Some(ev) => row_boxes.push((box_id, ev.start, ev.end)),
                None => {
                    tracing::warn!(event = ?bx.event, "box references a missing event; skipping hit test");
                }
            }
        }
        row_boxes.sort_by(|a, b| b.1.total_cmp(&a.1));

        let not_autoscrolling = !(self.playback.is_playing && config.autoscroll_during_playback);
        let mut clicked_box = false;

        for (box_id, start, end) in row_boxes {
            let left = metrics.time_to_x(start);
            let right = metrics.time_to_x(end);
            let width = right - left;

            let manipulable = self.view.selection.can_manipulate(box_id);
            let edge_eligible = manipulable && width >= MIN_EDGE_DRAG_WIDTH && not_autoscrolling;

            if edge_eligible && (rel.x - left).abs() <= BOX_EDGE_MARGIN {
                if input.left.down {
                    clicked_box = true;
                    self.begin_edge_drag(
                        state,
                        metrics,
                        DragKind::ResizeLeft,
                        DragKind::MultiResizeLeft,
                        box_id,
                        rel,
                    );
                    break;
                }
            } else if edge_eligible && (rel.x - right).abs() <= BOX_EDGE_MARGIN {
                if input.left.down {
                    clicked_box = true;
                    self.begin_edge_drag(
                        state,
                        metrics,
                        DragKind::ResizeRight,
                        DragKind::MultiResizeRight,
                        box_id,
                        rel,
                    );
                    break;
                }
            } else if rel.x >= left && rel.x < right {
                if self.rect.contains(input.mouse) {
                    self.hovered = Some(box_id);
                }
                if input.left.down {
                    clicked_box = true;
                    self.click_box(state, metrics, box_id, rel, input);
                    break;
                }
            }
        }

        clicked_box
    }

    fn capture_origin(
        &self,
        state: &State,
        metrics: &Metrics,
        box_id: Id<EventBox>,
        rel: Pos2,
    ) -> Option<DragOrigin> {
        let bx = self.view.boxes.get(box_id)?;
        let ev = state.animations.get(self.view.anim_id())?.event(bx.event)?;
        Some(DragOrigin::capture(
            box_id,
            bx,
            ev,
            metrics,
            rel,
            self.mouse_row,
        ))
    }

    fn begin_edge_drag(
        &mut self,
        state: &State,
        metrics: &Metrics,
        single_kind: DragKind,
        multi_kind: DragKind,
        box_id: Id<EventBox>,
        rel: Pos2,
    ) {
        if self.view.selection.multi().is_empty() {
            if let Some(origin) = self.capture_origin(state, metrics, box_id, rel) {
                self.drag.begin_single(single_kind, origin, rel);
            }
        } else {
            let origins: Vec<DragOrigin> = self
                .view
                .selection
                .multi()
                .iter()
                .filter_map(|&id| self.capture_origin(state, metrics, id, rel))
                .collect();
            self.drag.begin_multi(multi_kind, origins, rel);
        }
    }

    /// Body mouse-down: the same entry point serves selection clicks and
    /// move drags; a zero-delta move resolves to just the click at release.
    fn click_box(
        &mut self,
        state: &State,
        metrics: &Metrics,
        box_id: Id<EventBox>,
        rel: Pos2,
        input: &InputState,
    ) {
        let multi_empty = self.view.selection.multi().is_empty();
        let in_multi = self.view.selection.multi().contains(&box_id);

        let mut began_multi_move = false;
        if multi_empty {
            if let Some(origin) = self.capture_origin(state, metrics, box_id, rel) {
                self.drag.begin_single(DragKind::Move, origin, rel);
            }
        } else if in_multi && !input.ctrl {
            let origins: Vec<DragOrigin> = self
                .view
                .selection
                .multi()
                .iter()
                .filter_map(|&id| self.capture_origin(state, metrics, id, rel))
                .collect();
            self.drag.begin_multi(DragKind::MultiMove, origins, rel);
            began_multi_move = true;
        }

        if !began_multi_move {
            if input.shift && !input.ctrl && !input.alt {
                self.view.selection.shift_click(box_id);
            } else if input.ctrl && !input.shift && !input.alt {
                self.view.selection.ctrl_click(box_id);
            } else {
                self.view.selection.click(box_id);
            }
        }
    }

    // ---- live drag application ----

    /// Live preview: retimes events directly for per-frame feedback. The
    /// modified flag and grouping metadata are untouched here; both are
    /// reconciled by the transaction at release.
    fn apply_single_drag(&mut self, state: &mut State, metrics: &Metrics, rel: Pos2) {
        let kind = self.drag.kind();
        let Some(origin) = self.drag.single().copied() else {
            return;
        };
        let Some(&bx) = self.view.boxes.get(origin.box_id) else {
            return;
        };

        let anim_id = self.view.anim_id();
        if let Some(ev) = state
            .animations
            .get_mut(anim_id)
            .and_then(|anim| anim.event_mut(bx.event))
        {
            origin.drag_to(kind, &bx, ev, metrics, rel);
        }

        if kind == DragKind::Move
            && let Some(new_row) = origin.shifted_row(self.mouse_row)
        {
            self.view.set_box_row(origin.box_id, new_row);
        }
    }

    fn apply_multi_drag(
        &mut self,
        state: &mut State,
        metrics: &Metrics,
        pointer: Pos2,
        row_target: Option<i32>,
    ) {
        let kind = self.drag.kind();
        let origins: SmallVec<[DragOrigin; 8]> = self.drag.multi().iter().copied().collect();
        let anim_id = self.view.anim_id();

        for origin in &origins {
            let Some(&bx) = self.view.boxes.get(origin.box_id) else {
                continue;
            };
            if let Some(ev) = state
                .animations
                .get_mut(anim_id)
                .and_then(|anim| anim.event_mut(bx.event))
            {
                origin.drag_to(kind, &bx, ev, metrics, pointer);
            }
            if let Some(mouse_row) = row_target
                && let Some(new_row) = origin.shifted_row(mouse_row)
            {
                self.view.set_box_row(origin.box_id, new_row);
            }
        }
    }

    /// The pointer is clamped per batch so the box that would hit its limit
    /// first bounds everyone: left-resize is bounded by the earliest-ending
    /// box, and no start may go negative.
    fn apply_multi_resize_left(&mut self, state: &mut State, metrics: &Metrics, rel: Pos2) {
        let origins = self.drag.multi();
        let Some(earliest_end) = origins
            .iter()
            .copied()
            .min_by(|a, b| a.original_end.total_cmp(&b.original_end))
        else {
            return;
        };
        let Some(earliest_start) = origins
            .iter()
            .copied()
            .min_by(|a, b| a.original_start.total_cmp(&b.original_start))
        else {
            return;
        };

        let frame_px = metrics.time_to_x(metrics.snap.min_duration());
        let mouse_max_x = self
            .drag
            .start_point()
            .x
            .max(earliest_end.offset.x + metrics.time_to_x(earliest_end.original_end) - frame_px);
        let mouse_min_x = earliest_start.offset.x;

        let pointer = pos2(rel.x.min(mouse_max_x).max(mouse_min_x), rel.y);
        self.apply_multi_drag(state, metrics, pointer, None);
    }

    /// Right-resize is bounded by the shortest box in the batch.
    fn apply_multi_resize_right(&mut self, state: &mut State, metrics: &Metrics, rel: Pos2) {
        let Some(shortest) = self
            .drag
            .multi()
            .iter()
            .copied()
            .min_by(|a, b| a.original_duration().total_cmp(&b.original_duration()))
        else {
            return;
        };

        let frame_px = metrics.time_to_x(metrics.snap.min_duration());
        let mouse_min_x =
            self.drag.start_point().x - metrics.time_to_x(shortest.original_duration()) + frame_px;

        let pointer = pos2(rel.x.max(mouse_min_x), rel.y);
        self.apply_multi_drag(state, metrics, pointer, None);
    }

    /// The whole batch shifts rows together, computed from the box with the
    /// smallest original row so no box can end up on a negative row; the
    /// earliest-starting box bounds the time shift at zero.
    fn apply_multi_move(&mut self, state: &mut State, metrics: &Metrics, rel: Pos2) {
        let origins = self.drag.multi();
        let Some(top) = origins.iter().copied().min_by_key(|o| o.original_row) else {
            return;
        };
        let Some(earliest) = origins
            .iter()
            .copied()
            .min_by(|a, b| a.original_start.total_cmp(&b.original_start))
        else {
            return;
        };

        let minimum_mouse_row = top.start_mouse_row - top.original_row;
        let mouse_min_x = earliest.offset.x;

        let pointer = pos2(rel.x.max(mouse_min_x), rel.y);
        let row_target = Some(self.mouse_row.max(minimum_mouse_row));
        self.apply_multi_drag(state, metrics, pointer, row_target);
    }

    /// Every box intersecting the rectangle joins (or, in subtract mode,
    /// leaves) the multi-selection. Only rows overlapping the rectangle's
    /// vertical span, widened by one row of slack per side, are tested.
    fn apply_marquee(&mut self, state: &State, metrics: &Metrics, mode: MarqueeMode) {
        if mode == MarqueeMode::Replace {
            self.view.selection.clear_multi();
        }

        let rect = self.drag.marquee_rect();
        let first_row = metrics.y_to_row(rect.top()) - 1;
        let last_row = metrics.y_to_row(rect.bottom()) + 1;

        let Some(anim) = state.animations.get(self.view.anim_id()) else {
            return;
        };

        let GraphView {
            boxes,
            row_index,
            selection,
            ..
        } = &mut self.view;

        for row in first_row..=last_row {
            for &box_id in row_index.boxes_in_row(row) {
                let Some(bx) = boxes.get(box_id) else {
                    continue;
                };
                let Some(ev) = anim.event(bx.event) else {
                    continue;
                };
                if bx.rect(ev, metrics).intersects(rect) {
                    match mode {
                        MarqueeMode::Subtract => selection.remove(box_id),
                        MarqueeMode::Replace | MarqueeMode::Add => selection.add_multi(box_id),
                    }
                }
            }
        }
        self.view.selection.clear_primary();
    }

    // ---- release protocol ----

    /// Converts the finished gesture into a transaction: one command per
    /// single drag, one command spanning the whole batch for multi drags,
    /// nothing for marquees (selection is not undoable). Releasing during
    /// playback autoscroll abandons the gesture instead of committing a
    /// partial change.
    fn release_drag(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
    ) {
        let kind = self.drag.kind();
        if kind == DragKind::None {
            return;
        }
        let not_autoscrolling = !(self.playback.is_playing && config.autoscroll_during_playback);
        let anim_id = self.view.anim_id();

        match kind {
            DragKind::ResizeLeft | DragKind::ResizeRight | DragKind::Move => {
                let committed = if not_autoscrolling {
                    self.drag.single().copied().and_then(|origin| {
                        let bx = self.view.boxes.get(origin.box_id)?;
                        let ev = state.animations.get(anim_id)?.event(bx.event)?;
                        Some((origin, bx.event, ev.start, ev.end, bx.row()))
                    })
                } else {
                    None
                };
                self.drag.abandon();

                if let Some((origin, event_id, new_start, new_end, new_row)) = committed {
                    let command = BoxDragCommit::new(
                        anim_id,
                        event_id,
                        origin.original_start,
                        origin.original_end,
                        origin.original_row,
                        new_start,
                        new_end,
                        new_row,
                    );
                    // a zero-delta move is just a click; no transaction
                    if !command.is_noop() {
                        self.commit(state, config, modified, undo, Box::new(command));
                    }
                }
            }
            DragKind::MultiResizeLeft | DragKind::MultiResizeRight | DragKind::MultiMove => {
                let entries: Vec<DragEntry> = if not_autoscrolling {
                    self.drag
                        .multi()
                        .iter()
                        .filter_map(|origin| {
                            let bx = self.view.boxes.get(origin.box_id)?;
                            let ev = state.animations.get(anim_id)?.event(bx.event)?;
                            Some(DragEntry {
                                event_id: bx.event,
                                old_start: origin.original_start,
                                old_end: origin.original_end,
                                old_row: origin.original_row,
                                new_start: ev.start,
                                new_end: ev.end,
                                new_row: bx.row(),
                            })
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                self.drag.abandon();

                if !entries.is_empty() {
                    let command = BoxBatchDragCommit::new(anim_id, entries);
                    if !command.is_noop() {
                        self.commit(state, config, modified, undo, Box::new(command));
                    }
                }
            }
            DragKind::Marquee(_) => {
                self.drag.abandon();
                self.view.selection.promote_single();
            }
            DragKind::None => {}
        }
    }

    /// Silently drops an in-progress gesture, including the multi-drag
    /// buffer, without emitting a transaction. Used when the owning pane
    /// goes inactive or playback autoscroll takes over mid-drag.
    pub fn abandon_drag(&mut self) {
        self.drag.abandon();
    }

    fn commit(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
        command: Box<dyn GraphCommand>,
    ) {
        let mut ctx = GraphCtx {
            state,
            view: &mut self.view,
            config,
            modified,
        };
        undo.commit(&mut ctx, command);
    }

    // ---- structural operations ----

    /// Places a new event box on `row` as a reversible transaction (or
    /// directly, for internal replay). Events with no parameters pick up
    /// the bank's template for their kind.
    pub fn place_event(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
        mut event: Event,
        row: i32,
        undoable: bool,
    ) -> Id<Event> {
        if event.params.is_empty()
            && let Some(template) = state.bank.template(event.kind)
        {
            event.params = template.to_vec();
        }

        let anim_id = self.view.anim_id();
        let event_id = Id::arbitrary();
        let index = state.animations.force_get(anim_id).event_count();
        let mut command = EventBoxPlace::new(anim_id, event_id, index, event, row);

        if undoable {
            self.commit(state, config, modified, undo, Box::new(command));
        } else {
            let mut ctx = GraphCtx {
                state,
                view: &mut self.view,
                config,
                modified,
            };
            command.execute(&mut ctx);
        }
        event_id
    }

    /// Shift+right-click: duplicate the primary selection's event at the
    /// pointer, or place the bank's default event when nothing is selected.
    fn place_event_at_mouse(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
    ) {
        if self.mouse_row < 0 {
            return;
        }
        let mouse_time = self.last_rel_mouse.x / self.pixels_per_second;

        let event = if let Some(primary) = self.view.selection.primary() {
            let Some(current) = self
                .view
                .boxes
                .get(primary)
                .and_then(|bx| state.animations.get(self.view.anim_id())?.event(bx.event))
            else {
                return;
            };
            Event::with_params(
                mouse_time,
                mouse_time + current.duration(),
                current.kind,
                current.params.clone(),
            )
        } else if let Some(template) = state.bank.template(0) {
            Event::with_params(mouse_time, mouse_time + 1.0, 0, template.to_vec())
        } else {
            return;
        };

        let row = self.mouse_row;
        self.place_event(state, config, modified, undo, event, row, true);
    }

    /// Deletes the given boxes as one transaction. Refuses outright if any
    /// box is not owned by this graph; silently ignoring that would desync
    /// selection and undo state.
    pub fn delete_boxes(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
        box_ids: &[Id<EventBox>],
    ) -> Result<(), GraphError> {
        if box_ids.iter().any(|&id| !self.view.boxes.has(id)) {
            return Err(GraphError::ForeignBox);
        }
        if box_ids.is_empty() {
            return Ok(());
        }

        let entries: Vec<DeleteEntry> = box_ids
            .iter()
            .filter_map(|&id| {
                let bx = self.view.boxes.get(id)?;
                Some(DeleteEntry::new(bx.event, bx.row()))
            })
            .collect();

        let command = EventBoxDeleteBatch::new(self.view.anim_id(), entries);
        self.commit(state, config, modified, undo, Box::new(command));
        Ok(())
    }

    /// Deletes the multi-selection, or the primary box. Returns whether
    /// anything was deleted.
    pub fn delete_selected(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
    ) -> Result<bool, GraphError> {
        let targets = self.view.selection.ids();
        if targets.is_empty() {
            return Ok(false);
        }
        self.delete_boxes(state, config, modified, undo, &targets)?;
        Ok(true)
    }

    // ---- clipboard ----

    /// Captures the selection into the clipboard. Returns false when
    /// nothing is selected.
    pub fn copy(&self, state: &State, clipboard: &mut dyn Clipboard) -> bool {
        let Some(snapshot) = self.clipboard_snapshot(state) else {
            return false;
        };
        clipboard.set_text(snapshot.to_json());
        true
    }

    fn clipboard_snapshot(&self, state: &State) -> Option<ClipboardSnapshot> {
        let anim = state.animations.get(self.view.anim_id())?;
        let selected = self.view.selection.ids();
        if selected.is_empty() {
            return None;
        }

        let mut entries = Vec::with_capacity(selected.len());
        for id in selected {
            let bx = self.view.boxes.get(id)?;
            let ev = anim.event(bx.event)?;
            entries.push(ClipboardEvent {
                row: bx.row(),
                start: ev.start,
                end: ev.end,
                kind: ev.kind,
                params: ev.params.clone(),
            });
        }

        let start_time = entries
            .iter()
            .map(|e| e.start)
            .fold(f32::INFINITY, f32::min);
        let start_row = entries.iter().map(|e| e.row).min().unwrap_or(0);

        Some(ClipboardSnapshot {
            start_row,
            start_time,
            entries,
        })
    }

    /// Parses the clipboard and pastes its events as one transaction.
    /// Absolute mode restores original times and rows; relative mode
    /// offsets everything from the snapshot's reference corner to the
    /// pointer, with the time offset snapped to the frame grid. The parse
    /// completes before any mutation, so a failed paste changes nothing.
    pub fn paste(
        &mut self,
        state: &mut State,
        config: &GraphConfig,
        modified: &ModifiedTracker,
        undo: &mut UndoHistory,
        clipboard: &mut dyn Clipboard,
        absolute: bool,
    ) -> Result<bool, GraphError> {
        let Some(text) = clipboard.text() else {
            return Ok(false);
        };
        let snapshot = ClipboardSnapshot::from_json(&text)?;
        if snapshot.entries.is_empty() {
            return Ok(false);
        }

        let base_time = config
            .snap
            .round(self.last_rel_mouse.x / self.pixels_per_second);
        let base_row = self.mouse_row.max(0);

        let entries: Vec<PasteEntry> = snapshot
            .entries
            .iter()
            .map(|entry| {
                let (start, end, row) = if absolute {
                    (entry.start, entry.end, entry.row)
                } else {
                    let start = entry.start - snapshot.start_time + base_time;
                    (
                        start,
                        start + (entry.end - entry.start),
                        entry.row - snapshot.start_row + base_row,
                    )
                };
                PasteEntry::new(
                    Id::arbitrary(),
                    row,
                    Event::with_params(start, end, entry.kind, entry.params.clone()),
                )
            })
            .collect();

        let command = PasteCommit::new(self.view.anim_id(), entries);
        self.commit(state, config, modified, undo, Box::new(command));
        Ok(true)
    }
}
