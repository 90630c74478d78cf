/// Persisted grouping metadata. Group *i* corresponds to row *i* of the
/// event graph; `indices` point into the owning animation's flat event list
/// and are kept sorted so rebuilds are canonical.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventGroup {
    pub kind: u32,
    pub indices: Vec<usize>,
}

impl EventGroup {
    pub fn new(kind: u32) -> Self {
        Self {
            kind,
            indices: Vec::new(),
        }
    }

    /// Inserts `index` keeping the list sorted. Idempotent.
    pub fn insert(&mut self, index: usize) {
        if let Err(pos) = self.indices.binary_search(&index) {
            self.indices.insert(pos, index);
        }
    }

    pub fn remove(&mut self, index: usize) -> bool {
        match self.indices.binary_search(&index) {
            Ok(pos) => {
                self.indices.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
