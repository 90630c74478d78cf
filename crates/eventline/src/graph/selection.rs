use eventline_lib::Id;

use super::event_box::EventBox;

/// Zero, one ("primary") or many ("multi") selected boxes. The two slots are
/// mutually exclusive: promoting to a multi-selection empties the primary
/// slot and vice versa. Stale ids are cleared by `remove` whenever a box
/// leaves the graph; selection changes themselves are never undoable.
#[derive(Debug, Default)]
pub struct Selection {
    primary: Option<Id<EventBox>>,
    multi: Vec<Id<EventBox>>,
}

impl Selection {
    pub fn primary(&self) -> Option<Id<EventBox>> {
        self.primary
    }
    pub fn multi(&self) -> &[Id<EventBox>] {
        &self.multi
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.multi.is_empty()
    }

    pub fn is_selected(&self, id: Id<EventBox>) -> bool {
        self.primary == Some(id) || self.multi.contains(&id)
    }

    /// Whether a drag on this box may manipulate it: either nothing else is
    /// selected, or the box is part of the multi-selection.
    pub fn can_manipulate(&self, id: Id<EventBox>) -> bool {
        self.multi.is_empty() || self.multi.contains(&id)
    }

    /// All selected ids, primary first.
    pub fn ids(&self) -> Vec<Id<EventBox>> {
        match self.primary {
            Some(primary) => vec![primary],
            None => self.multi.clone(),
        }
    }

    pub fn set_primary(&mut self, id: Id<EventBox>) {
        self.multi.clear();
        self.primary = Some(id);
    }

    pub fn clear(&mut self) {
        self.primary = None;
        self.multi.clear();
    }

    pub fn clear_primary(&mut self) {
        self.primary = None;
    }

    pub fn clear_multi(&mut self) {
        self.multi.clear();
    }

    /// Plain click: replace whatever was selected.
    pub fn click(&mut self, id: Id<EventBox>) {
        self.set_primary(id);
    }

    /// Shift-click: additive. A lone primary is promoted into a two-element
    /// multi-selection together with the new box; later clicks append.
    pub fn shift_click(&mut self, id: Id<EventBox>) {
        match self.primary {
            None if self.multi.is_empty() => self.primary = Some(id),
            Some(primary) => {
                self.multi = vec![primary, id];
                self.primary = None;
            }
            None => {
                if !self.multi.contains(&id) {
                    self.multi.push(id);
                }
            }
        }
    }

    /// Ctrl-click: subtractive.
    pub fn ctrl_click(&mut self, id: Id<EventBox>) {
        self.multi.retain(|&other| other != id);
        if self.primary == Some(id) {
            self.primary = None;
        }
    }

    /// Adds to the multi-selection, folding a lingering primary in first.
    pub fn add_multi(&mut self, id: Id<EventBox>) {
        if let Some(primary) = self.primary.take()
            && !self.multi.contains(&primary)
        {
            self.multi.push(primary);
        }
        if !self.multi.contains(&id) {
            self.multi.push(id);
        }
    }

    /// Moves the primary (if any) into the multi set; used when a marquee
    /// gesture starts so it composes with the existing selection.
    pub fn demote_primary_into_multi(&mut self) {
        if let Some(primary) = self.primary.take()
            && !self.multi.contains(&primary)
        {
            self.multi.push(primary);
        }
    }

    /// A multi-selection that ended up with exactly one box collapses into
    /// the primary slot (marquee release rule).
    pub fn promote_single(&mut self) {
        if self.multi.len() == 1 {
            self.primary = Some(self.multi[0]);
            self.multi.clear();
        }
    }

    /// Drops any reference to a box that no longer exists.
    pub fn remove(&mut self, id: Id<EventBox>) {
        if self.primary == Some(id) {
            self.primary = None;
        }
        self.multi.retain(|&other| other != id);
    }

    pub fn set_multi(&mut self, ids: Vec<Id<EventBox>>) {
        self.primary = None;
        self.multi = ids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_click_promotes_primary_into_multi() {
        let mut sel = Selection::default();
        let a = Id::arbitrary();
        let b = Id::arbitrary();
        let c = Id::arbitrary();

        sel.shift_click(a);
        assert_eq!(sel.primary(), Some(a));

        sel.shift_click(b);
        assert_eq!(sel.primary(), None);
        assert_eq!(sel.multi(), &[a, b]);

        sel.shift_click(c);
        assert_eq!(sel.multi(), &[a, b, c]);
    }

    #[test]
    fn ctrl_click_subtracts() {
        let mut sel = Selection::default();
        let a = Id::arbitrary();
        let b = Id::arbitrary();
        sel.set_multi(vec![a, b]);

        sel.ctrl_click(a);
        assert_eq!(sel.multi(), &[b]);

        let mut sel = Selection::default();
        sel.set_primary(a);
        sel.ctrl_click(a);
        assert!(sel.is_empty());
    }

    #[test]
    fn promote_single_collapses_multi() {
        let mut sel = Selection::default();
        let a = Id::arbitrary();
        sel.set_multi(vec![a]);
        sel.promote_single();
        assert_eq!(sel.primary(), Some(a));
        assert!(sel.multi().is_empty());
    }

    #[test]
    fn plain_click_replaces_everything() {
        let mut sel = Selection::default();
        let a = Id::arbitrary();
        let b = Id::arbitrary();
        sel.set_multi(vec![a, b]);
        sel.click(a);
        assert_eq!(sel.primary(), Some(a));
        assert!(sel.multi().is_empty());
    }
}
