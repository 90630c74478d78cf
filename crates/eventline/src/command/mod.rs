//! Graph-level commands: like `eventline-command`, but aware of boxes, the
//! row index, selection, and grouping metadata. Each command is a value
//! snapshot of everything its forward and reverse actions need, so replaying
//! in either direction never recomputes or recaptures state.

use eventline_command::StateCommand;
use eventline_command::event::{EventAddOrRemove, EventRetime};
use eventline_lib::{Animation, Event, Id, ModifiedTracker, State};

use crate::graph::{EventBox, GraphConfig, GraphView};

/// Borrowed bundle of everything a command may touch.
pub struct GraphCtx<'a> {
    pub state: &'a mut State,
    pub view: &'a mut GraphView,
    pub config: &'a GraphConfig,
    pub modified: &'a ModifiedTracker,
}

impl GraphCtx<'_> {
    fn anim_id(&self) -> Id<Animation> {
        self.view.anim_id()
    }

    /// Flags the animation as edited, unless nothing changed or the file is
    /// open read-only.
    fn mark_modified(&self, changed: bool) {
        if changed && !self.config.read_only {
            self.modified.set_modified(self.anim_id(), true);
        }
    }
}

/// A reversible transaction over the graph. From the caller's perspective a
/// command applies atomically; multi-box operations are single commands
/// precisely so a partial undo cannot exist.
pub trait GraphCommand: 'static + Send {
    fn execute(&mut self, ctx: &mut GraphCtx);
    fn rollback(&mut self, ctx: &mut GraphCtx);
}

/// Commit of a completed single-box drag: retime plus row move, with frame
/// rounding applied exactly once on the forward path.
pub struct BoxDragCommit {
    retime: EventRetime,
    box_id: Id<EventBox>,
    old_row: i32,
    new_row: i32,
    prev_modified: bool,
}

impl BoxDragCommit {
    pub fn new(
        anim_id: Id<Animation>,
        event_id: Id<Event>,
        old_start: f32,
        old_end: f32,
        old_row: i32,
        new_start: f32,
        new_end: f32,
        new_row: i32,
    ) -> Self {
        Self {
            retime: EventRetime::new(anim_id, event_id, old_start, old_end, new_start, new_end),
            box_id: event_id.cast(),
            old_row,
            new_row,
            prev_modified: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.retime.is_noop() && self.old_row == self.new_row
    }
}

impl GraphCommand for BoxDragCommit {
    fn execute(&mut self, ctx: &mut GraphCtx) {
        let anim_id = ctx.anim_id();
        self.prev_modified = ctx.modified.is_modified(anim_id);

        self.retime.execute(ctx.state);
        if let Some(event) = ctx
            .state
            .animations
            .force_get_mut(anim_id)
            .event_mut(self.retime.id())
        {
            ctx.config.snap.apply_rounding(event);
        }
        ctx.view.set_box_row(self.box_id, self.new_row);
        ctx.view.recreate_groups(ctx.state);
        ctx.mark_modified(!self.is_noop());
    }

    fn rollback(&mut self, ctx: &mut GraphCtx) {
        self.retime.rollback(ctx.state);
        ctx.view.set_box_row(self.box_id, self.old_row);
        ctx.view.recreate_groups(ctx.state);
        ctx.modified.set_modified(ctx.anim_id(), self.prev_modified);
    }
}

/// One box's slice of a multi-drag commit.
#[derive(Clone, Copy, Debug)]
pub struct DragEntry {
    pub event_id: Id<Event>,
    pub old_start: f32,
    pub old_end: f32,
    pub old_row: i32,
    pub new_start: f32,
    pub new_end: f32,
    pub new_row: i32,
}

impl DragEntry {
    fn is_noop(&self) -> bool {
        self.old_start == self.new_start
            && self.old_end == self.new_end
            && self.old_row == self.new_row
    }
}

/// Commit of a completed multi-box drag. One command for the whole batch so
/// undo and redo restore or reapply every box together.
pub struct BoxBatchDragCommit {
    anim_id: Id<Animation>,
    entries: Vec<DragEntry>,
    prev_modified: bool,
}

impl BoxBatchDragCommit {
    pub fn new(anim_id: Id<Animation>, entries: Vec<DragEntry>) -> Self {
        Self {
            anim_id,
            entries,
            prev_modified: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.entries.iter().all(DragEntry::is_noop)
    }
}

impl GraphCommand for BoxBatchDragCommit {
    fn execute(&mut self, ctx: &mut GraphCtx) {
        self.prev_modified = ctx.modified.is_modified(self.anim_id);

        for entry in &self.entries {
            let anim = ctx.state.animations.force_get_mut(self.anim_id);
            if let Some(event) = anim.event_mut(entry.event_id) {
                event.start = entry.new_start;
                event.end = entry.new_end;
                ctx.config.snap.apply_rounding(event);
            }
            ctx.view.set_box_row(entry.event_id.cast(), entry.new_row);
        }
        ctx.view.recreate_groups(ctx.state);
        ctx.mark_modified(!self.is_noop());
    }

    fn rollback(&mut self, ctx: &mut GraphCtx) {
        for entry in &self.entries {
            let anim = ctx.state.animations.force_get_mut(self.anim_id);
            if let Some(event) = anim.event_mut(entry.event_id) {
                event.start = entry.old_start;
                event.end = entry.old_end;
            }
            ctx.view.set_box_row(entry.event_id.cast(), entry.old_row);
        }
        ctx.view.recreate_groups(ctx.state);
        ctx.modified.set_modified(self.anim_id, self.prev_modified);
    }
}

/// Places one event box into the graph; the reverse action fully retracts
/// it (event list, box, row bucket, groups, selection references).
pub struct EventBoxPlace {
    inner: EventAddOrRemove,
    row: i32,
    prev_modified: bool,
}

impl EventBoxPlace {
    pub fn new(
        anim_id: Id<Animation>,
        event_id: Id<Event>,
        index: usize,
        event: Event,
        row: i32,
    ) -> Self {
        debug_assert!(row >= 0, "events are always placed on a real row");
        Self {
            inner: EventAddOrRemove::addition(anim_id, event_id, index, event),
            row,
            prev_modified: false,
        }
    }

    pub fn box_id(&self) -> Id<EventBox> {
        self.inner.id().cast()
    }
}

impl GraphCommand for EventBoxPlace {
    fn execute(&mut self, ctx: &mut GraphCtx) {
        self.prev_modified = ctx.modified.is_modified(ctx.anim_id());

        self.inner.execute(ctx.state);
        ctx.view
            .insert_box(EventBox::with_row(self.inner.id(), self.row));
        ctx.view.recreate_groups(ctx.state);
        ctx.mark_modified(true);
    }

    fn rollback(&mut self, ctx: &mut GraphCtx) {
        ctx.view.remove_box(self.box_id());
        self.inner.rollback(ctx.state);
        ctx.view.recreate_groups(ctx.state);
        ctx.modified.set_modified(ctx.anim_id(), self.prev_modified);
    }
}

/// One deleted box: enough to put the event back exactly where it was.
pub struct DeleteEntry {
    pub event_id: Id<Event>,
    pub row: i32,
    index: usize,
    event: Option<Event>,
}

impl DeleteEntry {
    pub fn new(event_id: Id<Event>, row: i32) -> Self {
        Self {
            event_id,
            row,
            index: 0,
            event: None,
        }
    }
}

/// Deletes a batch of boxes as one transaction. Undo restores the events at
/// their original list positions and re-selects what was deleted: a single
/// deletion comes back as the primary selection, a batch as the
/// multi-selection.
pub struct EventBoxDeleteBatch {
    anim_id: Id<Animation>,
    entries: Vec<DeleteEntry>,
    prev_modified: bool,
}

impl EventBoxDeleteBatch {
    pub fn new(anim_id: Id<Animation>, entries: Vec<DeleteEntry>) -> Self {
        Self {
            anim_id,
            entries,
            prev_modified: false,
        }
    }
}

impl GraphCommand for EventBoxDeleteBatch {
    fn execute(&mut self, ctx: &mut GraphCtx) {
        self.prev_modified = ctx.modified.is_modified(self.anim_id);

        for entry in &mut self.entries {
            ctx.view.remove_box(entry.event_id.cast());

            let (index, event) = ctx
                .state
                .animations
                .force_get_mut(self.anim_id)
                .remove_event(entry.event_id)
                .expect("deleted box references a missing event");
            entry.index = index;
            entry.event = Some(event);
        }
        ctx.view.recreate_groups(ctx.state);
        ctx.mark_modified(true);
    }

    fn rollback(&mut self, ctx: &mut GraphCtx) {
        // reverse order so every recorded index is valid again when its
        // event goes back in
        for entry in self.entries.iter_mut().rev() {
            let event = entry.event.take().expect("delete rollback ran twice");
            ctx.state
                .animations
                .force_get_mut(self.anim_id)
                .insert_event_at(entry.index, entry.event_id, event);
            ctx.view
                .insert_box(EventBox::with_row(entry.event_id, entry.row));
        }
        ctx.view.recreate_groups(ctx.state);

        if self.entries.len() == 1 {
            ctx.view.selection.set_primary(self.entries[0].event_id.cast());
        } else {
            ctx.view.selection.set_multi(
                self.entries
                    .iter()
                    .map(|entry| entry.event_id.cast())
                    .collect(),
            );
        }

        ctx.modified.set_modified(self.anim_id, self.prev_modified);
    }
}

/// One pasted box; times and row are already offset and snapped.
pub struct PasteEntry {
    pub event_id: Id<Event>,
    pub row: i32,
    event: Option<Event>,
}

impl PasteEntry {
    pub fn new(event_id: Id<Event>, row: i32, event: Event) -> Self {
        Self {
            event_id,
            row,
            event: Some(event),
        }
    }
}

/// Pastes a whole clipboard snapshot as one transaction and selects the
/// result (a lone pasted box becomes the primary selection).
pub struct PasteCommit {
    anim_id: Id<Animation>,
    entries: Vec<PasteEntry>,
    prev_modified: bool,
}

impl PasteCommit {
    pub fn new(anim_id: Id<Animation>, entries: Vec<PasteEntry>) -> Self {
        Self {
            anim_id,
            entries,
            prev_modified: false,
        }
    }
}

impl GraphCommand for PasteCommit {
    fn execute(&mut self, ctx: &mut GraphCtx) {
        self.prev_modified = ctx.modified.is_modified(self.anim_id);

        ctx.view.selection.clear();
        for entry in &mut self.entries {
            let event = entry.event.take().expect("paste executed twice");
            let anim = ctx.state.animations.force_get_mut(self.anim_id);
            anim.insert_event_at(anim.event_count(), entry.event_id, event);
            ctx.view
                .insert_box(EventBox::with_row(entry.event_id, entry.row));
        }
        ctx.view.recreate_groups(ctx.state);

        for entry in &self.entries {
            ctx.view.selection.add_multi(entry.event_id.cast());
        }
        ctx.view.selection.promote_single();

        ctx.mark_modified(true);
    }

    fn rollback(&mut self, ctx: &mut GraphCtx) {
        for entry in self.entries.iter_mut().rev() {
            ctx.view.remove_box(entry.event_id.cast());
            let (_, event) = ctx
                .state
                .animations
                .force_get_mut(self.anim_id)
                .remove_event(entry.event_id)
                .expect("pasted box references a missing event");
            entry.event = Some(event);
        }
        ctx.view.recreate_groups(ctx.state);
        ctx.modified.set_modified(self.anim_id, self.prev_modified);
    }
}
