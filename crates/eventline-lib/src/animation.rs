use crate::{Event, EventGroup, Id, IdMap};

/// One animation's worth of editable data: the flat ordered event list,
/// the grouping metadata tied to graph rows, and an optional reference to
/// another animation whose events this one imports (shown as a ghost graph).
#[derive(Clone, Debug, Default)]
pub struct Animation {
    pub name: String,

    // these two fields are kept synchronized with one another;
    // group indices are positions in `event_order`.
    event_order: Vec<Id<Event>>,
    events: IdMap<Event>,

    pub groups: Vec<EventGroup>,

    pub import_from: Option<Id<Animation>>,
}

impl Animation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn push_event(&mut self, id: Id<Event>, event: Event) {
        self.events.insert(id, event);
        self.event_order.push(id);
    }

    pub fn insert_event_at(&mut self, index: usize, id: Id<Event>, event: Event) {
        self.events.insert(id, event);
        self.event_order.insert(index, id);
    }

    pub fn remove_event(&mut self, id: Id<Event>) -> Option<(usize, Event)> {
        let index = self.index_of(id)?;
        self.event_order.remove(index);
        Some((index, self.events.take(id)))
    }

    pub fn index_of(&self, id: Id<Event>) -> Option<usize> {
        self.event_order.iter().position(|&other| other == id)
    }

    pub fn event(&self, id: Id<Event>) -> Option<&Event> {
        self.events.get(id)
    }
    pub fn event_mut(&mut self, id: Id<Event>) -> Option<&mut Event> {
        self.events.get_mut(id)
    }
    pub fn event_at(&self, index: usize) -> Option<&Event> {
        self.event_order
            .get(index)
            .and_then(|&id| self.events.get(id))
    }

    /// Event ids in flat-list order.
    pub fn event_ids(&self) -> impl ExactSizeIterator<Item = Id<Event>> + '_ {
        self.event_order.iter().copied()
    }

    pub fn event_count(&self) -> usize {
        self.event_order.len()
    }

    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Drops trailing empty groups so the list stays a dense prefix.
    pub fn trim_trailing_empty_groups(&mut self) {
        let last_nonempty = self
            .groups
            .iter()
            .rposition(|group| !group.is_empty());
        self.groups.truncate(match last_nonempty {
            Some(i) => i + 1,
            None => 0,
        });
    }

    /// The group index holding `event_index`, if any.
    pub fn group_of(&self, event_index: usize) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.contains(event_index))
    }
}
