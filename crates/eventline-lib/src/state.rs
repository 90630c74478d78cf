use crate::{Animation, Id, IdMap, TemplateBank};

/// Everything loaded from one animation file: the animations themselves and
/// the bank of parameter templates that ships alongside them.
#[derive(Clone, Debug, Default)]
pub struct State {
    pub animations: IdMap<Animation>,
    pub bank: TemplateBank,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any animation in the file carries group metadata. Grouping is
    /// a per-file convention; files without it stay in legacy row mode.
    pub fn any_groups(&self) -> bool {
        self.animations.values().any(Animation::has_groups)
    }

    pub fn add_animation(&mut self, anim: Animation) -> Id<Animation> {
        let id = Id::arbitrary();
        self.animations.insert(id, anim);
        id
    }
}
