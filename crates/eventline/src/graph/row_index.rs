use ahash::HashMap;
use eventline_lib::Id;

use super::event_box::EventBox;

/// Row number → the boxes currently on that row. Buckets are created lazily
/// and unknown rows read as empty, never as an error. Kept in lockstep with
/// every row assignment through explicit `register`/`relocate`/`remove`
/// calls from the controller and the command layer.
#[derive(Debug, Default)]
pub struct RowIndex {
    rows: HashMap<i32, Vec<Id<EventBox>>>,
}

impl RowIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the box to `row`'s bucket. Idempotent.
    pub fn register(&mut self, id: Id<EventBox>, row: i32) {
        let bucket = self.rows.entry(row).or_default();
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    /// Moves a box between buckets. Safe to call when the box is already
    /// where it should be, or was never in the old bucket.
    pub fn relocate(&mut self, id: Id<EventBox>, old_row: i32, new_row: i32) {
        if old_row != new_row
            && let Some(bucket) = self.rows.get_mut(&old_row)
        {
            bucket.retain(|&other| other != id);
        }
        self.register(id, new_row);
    }

    pub fn remove(&mut self, id: Id<EventBox>, row: i32) {
        if let Some(bucket) = self.rows.get_mut(&row) {
            bucket.retain(|&other| other != id);
        }
    }

    pub fn boxes_in_row(&self, row: i32) -> &[Id<EventBox>] {
        self.rows.get(&row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: Id<EventBox>, row: i32) -> bool {
        self.boxes_in_row(row).contains(&id)
    }

    /// Rows that currently have a bucket, including empty leftovers.
    pub fn rows(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.keys().copied()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
