use serde::{Deserialize, Serialize};

/// One copied event: its payload plus the row it sat on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEvent {
    pub row: i32,
    pub start: f32,
    pub end: f32,
    pub kind: u32,
    pub params: Vec<u8>,
}

/// Immutable capture of a selection for copy/paste. `start_row` and
/// `start_time` are the reference corner relative pastes offset from.
/// Serialized as JSON so it survives the OS clipboard and later sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    pub start_row: i32,
    pub start_time: f32,
    pub entries: Vec<ClipboardEvent>,
}

impl ClipboardSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).expect("clipboard snapshot is always serializable")
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// External clipboard surface. The graph only produces and parses snapshot
/// text; where that text actually lives is the caller's business.
pub trait Clipboard {
    fn set_text(&mut self, text: String);
    fn text(&mut self) -> Option<String>;
}

/// In-process clipboard used by tests and as the app-side store backing the
/// egui copy event.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: String) {
        self.contents = Some(text);
    }
    fn text(&mut self) -> Option<String> {
        self.contents.clone()
    }
}
