/// A timestamped, typed record within an animation. Parameters are opaque
/// bytes interpreted by whatever template the bank associates with `kind`.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Start time in seconds.
    pub start: f32,
    /// End time in seconds. Always past `start` by at least one frame once
    /// rounding has been applied.
    pub end: f32,
    pub kind: u32,
    pub params: Vec<u8>,
}

impl Event {
    pub fn new(start: f32, end: f32, kind: u32) -> Self {
        Self {
            start,
            end,
            kind,
            params: Vec::new(),
        }
    }

    pub fn with_params(start: f32, end: f32, kind: u32, params: Vec<u8>) -> Self {
        Self {
            start,
            end,
            kind,
            params,
        }
    }

    pub fn duration(&self) -> f32 {
        self.end - self.start
    }
}
