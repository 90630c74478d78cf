use eventline_lib::{Animation, Event, Id};

use crate::StateCommand;

pub struct EventAddOrRemove {
    anim_id: Id<Animation>,
    id: Id<Event>,
    /// Position in the flat event list. Valid whenever this command runs
    /// because undo history replays strictly in LIFO order.
    index: usize,
    data: Option<Event>,
    is_removal: bool,
}

impl EventAddOrRemove {
    pub fn addition(anim_id: Id<Animation>, id: Id<Event>, index: usize, data: Event) -> Self {
        Self {
            anim_id,
            id,
            index,
            data: Some(data),
            is_removal: false,
        }
    }
    pub fn removal(anim_id: Id<Animation>, id: Id<Event>, index: usize) -> Self {
        Self {
            anim_id,
            id,
            index,
            data: None,
            is_removal: true,
        }
    }

    pub fn anim_id(&self) -> Id<Animation> {
        self.anim_id
    }
    pub fn id(&self) -> Id<Event> {
        self.id
    }
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn is_removal(&self) -> bool {
        self.is_removal
    }

    fn execute_add(&mut self, state: &mut eventline_lib::State) {
        let event = self
            .data
            .take()
            .expect("called execute_add on empty EventAddOrRemove");

        state
            .animations
            .force_get_mut(self.anim_id)
            .insert_event_at(self.index, self.id, event);
    }
    fn execute_remove(&mut self, state: &mut eventline_lib::State) {
        let (index, event) = state
            .animations
            .force_get_mut(self.anim_id)
            .remove_event(self.id)
            .expect("tried to remove nonexistent event");
        self.index = index;

        if self.data.replace(event).is_some() {
            panic!("called execute_remove on nonempty EventAddOrRemove");
        }
    }
}

impl StateCommand for EventAddOrRemove {
    fn execute(&mut self, state: &mut eventline_lib::State) {
        if self.is_removal {
            self.execute_remove(state);
        } else {
            self.execute_add(state);
        }
    }
    fn rollback(&mut self, state: &mut eventline_lib::State) {
        if self.is_removal {
            self.execute_add(state);
        } else {
            self.execute_remove(state);
        }
    }
}

/// Retimes one event; before/after values are plain snapshots so the command
/// can be replayed in either direction without recomputing anything.
pub struct EventRetime {
    anim_id: Id<Animation>,
    id: Id<Event>,
    old_start: f32,
    old_end: f32,
    new_start: f32,
    new_end: f32,
}

impl EventRetime {
    pub fn new(
        anim_id: Id<Animation>,
        id: Id<Event>,
        old_start: f32,
        old_end: f32,
        new_start: f32,
        new_end: f32,
    ) -> Self {
        Self {
            anim_id,
            id,
            old_start,
            old_end,
            new_start,
            new_end,
        }
    }

    pub fn id(&self) -> Id<Event> {
        self.id
    }

    pub fn is_noop(&self) -> bool {
        self.old_start == self.new_start && self.old_end == self.new_end
    }

    fn set(&self, state: &mut eventline_lib::State, start: f32, end: f32) {
        let event = state
            .animations
            .force_get_mut(self.anim_id)
            .event_mut(self.id)
            .expect("nonexistent event id in EventRetime");
        event.start = start;
        event.end = end;
    }
}

impl StateCommand for EventRetime {
    fn execute(&mut self, state: &mut eventline_lib::State) {
        self.set(state, self.new_start, self.new_end);
    }
    fn rollback(&mut self, state: &mut eventline_lib::State) {
        self.set(state, self.old_start, self.old_end);
    }
}
