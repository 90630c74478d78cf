use std::sync::{Arc, Mutex};

use ahash::HashMap;

use crate::{Animation, Id};

/// Per-animation "has unsaved edits" flags.
///
/// Everything else in the editor core is single-threaded, but these flags
/// are also read from UI chrome outside the per-frame update path, so they
/// sit behind a lock. Cloning yields another handle to the same flags;
/// ownership is explicit rather than process-global.
#[derive(Clone, Debug, Default)]
pub struct ModifiedTracker {
    flags: Arc<Mutex<HashMap<Id<Animation>, bool>>>,
}

impl ModifiedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_modified(&self, anim: Id<Animation>) -> bool {
        let flags = self.flags.lock().expect("modified flags poisoned");
        flags.get(&anim).copied().unwrap_or(false)
    }

    pub fn set_modified(&self, anim: Id<Animation>, modified: bool) {
        let mut flags = self.flags.lock().expect("modified flags poisoned");
        flags.insert(anim, modified);
    }

    pub fn any_modified(&self) -> bool {
        let flags = self.flags.lock().expect("modified flags poisoned");
        flags.values().any(|&v| v)
    }

    pub fn clear(&self) {
        let mut flags = self.flags.lock().expect("modified flags poisoned");
        flags.clear();
    }
}
