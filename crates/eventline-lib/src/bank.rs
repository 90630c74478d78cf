use ahash::HashMap;

/// Read-only lookup of default parameter templates by event kind, applied
/// when a freshly placed event has no parameters of its own.
#[derive(Clone, Debug, Default)]
pub struct TemplateBank {
    templates: HashMap<u32, Vec<u8>>,
}

impl TemplateBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_template(&mut self, kind: u32, params: Vec<u8>) {
        self.templates.insert(kind, params);
    }

    pub fn template(&self, kind: u32) -> Option<&[u8]> {
        self.templates.get(&kind).map(Vec::as_slice)
    }
}
