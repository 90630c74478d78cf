use egui::{Pos2, Rect, Vec2, vec2};

/// The narrow viewport contract the graph drives: current scroll offset,
/// the visible screen rect, virtual content size, and clamping after any
/// mutation. Scrollbar hit margins live here too so the controller's pane
/// state machine can route clicks that land on them.
#[derive(Debug)]
pub struct ScrollViewer {
    pub scroll: Vec2,
    viewport: Rect,
    content_size: Vec2,
    pub scrollbar_thickness: f32,
}

impl Default for ScrollViewer {
    fn default() -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport: Rect::ZERO,
            content_size: Vec2::ZERO,
            scrollbar_thickness: 12.0,
        }
    }
}

impl ScrollViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub fn content_size(&self) -> Vec2 {
        self.content_size
    }
    pub fn set_content_size(&mut self, size: Vec2) {
        self.content_size = size;
        self.clamp_scroll();
    }

    pub fn max_scroll(&self) -> Vec2 {
        (self.content_size - self.viewport.size()).max(Vec2::ZERO)
    }

    pub fn clamp_scroll(&mut self) {
        self.scroll = self.scroll.clamp(Vec2::ZERO, self.max_scroll());
    }

    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll += delta;
        self.clamp_scroll();
    }

    /// Pointer movement on a scrollbar maps proportionally to content size.
    pub fn drag_horizontal_scrollbar(&mut self, delta_x: f32) {
        if self.viewport.width() > 0.0 {
            self.scroll_by(vec2(
                delta_x * (self.content_size.x / self.viewport.width()).max(1.0),
                0.0,
            ));
        }
    }
    pub fn drag_vertical_scrollbar(&mut self, delta_y: f32) {
        if self.viewport.height() > 0.0 {
            self.scroll_by(vec2(
                0.0,
                delta_y * (self.content_size.y / self.viewport.height()).max(1.0),
            ));
        }
    }

    /// The bottom margin reserved for the horizontal scrollbar.
    pub fn in_horizontal_scrollbar(&self, pos: Pos2) -> bool {
        self.viewport.contains(pos) && pos.y > self.viewport.bottom() - self.scrollbar_thickness
    }
    /// The right margin reserved for the vertical scrollbar.
    pub fn in_vertical_scrollbar(&self, pos: Pos2) -> bool {
        self.viewport.contains(pos) && pos.x > self.viewport.right() - self.scrollbar_thickness
    }
}
