use egui::{Align2, Color32, CornerRadius, FontId, Pos2, Rangef, Rect, Stroke, pos2, vec2};
use eventline_lib::State;

use super::{
    BOX_EDGE_MARGIN, DragKind, EventGraph, GraphConfig, GraphKind, Metrics, TIMELINE_HEIGHT,
};

const BOX_FILL: Color32 = Color32::from_rgb(60, 92, 146);
const BOX_OUTLINE: Color32 = Color32::from_rgb(122, 160, 216);
const BOX_SELECTED_FILL: Color32 = Color32::from_rgb(116, 78, 26);
const BOX_SELECTED_OUTLINE: Color32 = Color32::from_rgb(235, 180, 76);
const MARQUEE_COLOR: Color32 = Color32::from_rgb(0, 96, 220);
const PLAYBACK_CURSOR_COLOR: Color32 = Color32::from_rgb(232, 64, 64);
const GHOST_OPACITY: f32 = 0.35;

/// Pixels between frame lines below which they aren't worth drawing.
const MIN_PIXELS_BETWEEN_FRAME_LINES: f32 = 4.0;

impl EventGraph {
    /// Paints the graph into its rect: row lines, second/frame grid,
    /// timeline strip, boxes (ghost first, dimmed), marquee, playback
    /// cursor, scrollbars. Pure read of geometry; never mutates.
    pub fn draw(&self, state: &State, config: &GraphConfig, ui: &egui::Ui) {
        let painter = ui.painter_at(self.rect);
        let metrics = self.metrics(config);

        painter.rect_filled(self.rect, CornerRadius::ZERO, ui.visuals().extreme_bg_color);

        self.draw_grid(ui, &painter, &metrics);

        if let Some(ghost) = self.ghost() {
            ghost.draw_boxes_with(state, &metrics, self, ui, &painter, GHOST_OPACITY);
        } else {
            self.draw_boxes_with(state, &metrics, self, ui, &painter, 1.0);
        }

        self.draw_timeline_strip(ui, &painter);
        self.draw_playback_cursor(&painter);

        if let DragKind::Marquee(_) = self.drag().kind() {
            let rect = self.virtual_to_screen_rect(self.drag().marquee_rect());
            painter.rect(
                rect,
                CornerRadius::ZERO,
                MARQUEE_COLOR.gamma_multiply(0.25),
                Stroke::new(1.0, MARQUEE_COLOR.gamma_multiply(0.8)),
                egui::StrokeKind::Inside,
            );
        }

        self.draw_scrollbars(ui, &painter);
    }

    fn virtual_to_screen(&self, pos: Pos2) -> Pos2 {
        pos2(
            pos.x + self.rect.left() - self.scroll.scroll.x,
            pos.y + self.rect.top() + TIMELINE_HEIGHT - self.scroll.scroll.y,
        )
    }

    fn virtual_to_screen_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(
            self.virtual_to_screen(rect.min),
            self.virtual_to_screen(rect.max),
        )
    }

    fn draw_grid(&self, ui: &egui::Ui, painter: &egui::Painter, metrics: &Metrics) {
        let visuals = ui.visuals();

        // horizontal row lines
        let first_row = (self.scroll.scroll.y / metrics.row_height).floor() as i32;
        let last_row =
            ((self.scroll.scroll.y + self.rect.height()) / metrics.row_height).ceil() as i32;
        for row in first_row..=last_row {
            let y = self.virtual_to_screen(pos2(0.0, metrics.row_to_y(row))).y;
            painter.hline(
                self.rect.x_range(),
                y,
                Stroke::new(1.0, visuals.faint_bg_color),
            );
        }

        // frame snap lines, only when zoomed in enough to resolve them
        if let Some(frame) = metrics.snap.frame_duration() {
            let frame_px = metrics.time_to_x(frame as f32);
            if frame_px >= MIN_PIXELS_BETWEEN_FRAME_LINES {
                let first = (self.scroll.scroll.x / frame_px).floor() as i32;
                let last = ((self.scroll.scroll.x + self.rect.width()) / frame_px).ceil() as i32;
                for i in first..=last {
                    let x = self.virtual_to_screen(pos2(i as f32 * frame_px, 0.0)).x;
                    painter.vline(
                        x,
                        Rangef::new(self.rect.top() + TIMELINE_HEIGHT, self.rect.bottom()),
                        Stroke::new(1.0, visuals.faint_bg_color),
                    );
                }
            }
        }

        // whole-second lines
        let first_second = (self.scroll.scroll.x / metrics.pixels_per_second).floor() as i32;
        let last_second =
            ((self.scroll.scroll.x + self.rect.width()) / metrics.pixels_per_second).ceil() as i32;
        for second in first_second..=last_second {
            let x = self
                .virtual_to_screen(pos2(metrics.time_to_x(second as f32), 0.0))
                .x;
            painter.vline(
                x,
                Rangef::new(self.rect.top() + TIMELINE_HEIGHT, self.rect.bottom()),
                visuals.widgets.hovered.bg_stroke,
            );
        }
    }

    fn draw_timeline_strip(&self, ui: &egui::Ui, painter: &egui::Painter) {
        let strip = Rect::from_x_y_ranges(
            self.rect.x_range(),
            Rangef::new(self.rect.top(), self.rect.top() + TIMELINE_HEIGHT),
        );
        painter.rect_filled(strip, CornerRadius::ZERO, ui.visuals().extreme_bg_color);
        painter.hline(strip.x_range(), strip.bottom(), ui.visuals().window_stroke);

        let first_second = (self.scroll.scroll.x / self.pixels_per_second).floor() as i32;
        let last_second =
            ((self.scroll.scroll.x + self.rect.width()) / self.pixels_per_second).ceil() as i32;
        for second in first_second..=last_second.max(0) {
            if second < 0 {
                continue;
            }
            let x = self.rect.left() + second as f32 * self.pixels_per_second
                - self.scroll.scroll.x;
            painter.text(
                pos2(x + 4.0, strip.top() + 3.0),
                Align2::LEFT_TOP,
                second.to_string(),
                FontId::proportional(11.0),
                ui.visuals().weak_text_color(),
            );
        }
    }

    /// Draws `view`'s boxes using `host`'s scroll and selection (ghost
    /// graphs are painted inside the owner's pane). A box whose event no
    /// longer resolves is skipped with a warning rather than aborting the
    /// whole pass.
    fn draw_boxes_with(
        &self,
        state: &State,
        metrics: &Metrics,
        host: &EventGraph,
        ui: &egui::Ui,
        painter: &egui::Painter,
        opacity: f32,
    ) {
        let Some(anim) = state.animations.get(self.view.anim_id()) else {
            return;
        };

        for (&box_id, bx) in self.view.boxes.iter() {
            let Some(ev) = anim.event(bx.event) else {
                tracing::warn!(event = ?bx.event, "box references a missing event; not drawn");
                continue;
            };

            let rect = host.virtual_to_screen_rect(bx.rect(ev, metrics));
            if rect.right() < host.rect.left() || rect.left() > host.rect.right() {
                continue;
            }

            let selected =
                self.kind == GraphKind::Owner && host.view.selection.is_selected(box_id);
            let hovered = self.kind == GraphKind::Owner && host.hovered() == Some(box_id);

            let (fill, outline) = if selected {
                (BOX_SELECTED_FILL, BOX_SELECTED_OUTLINE)
            } else {
                (BOX_FILL, BOX_OUTLINE)
            };
            let fill = fill.gamma_multiply(if hovered { 1.2 * opacity } else { opacity });

            let inner = rect.shrink2(vec2(0.5, 1.0));
            painter.rect(
                inner,
                CornerRadius::same(2),
                fill,
                Stroke::new(1.0, outline.gamma_multiply(opacity)),
                egui::StrokeKind::Inside,
            );

            if rect.width() >= MIN_PIXELS_BETWEEN_FRAME_LINES * 4.0 {
                painter.text(
                    pos2(inner.left() + BOX_EDGE_MARGIN, inner.center().y),
                    Align2::LEFT_CENTER,
                    format!("{}", ev.kind),
                    FontId::monospace(10.0),
                    ui.visuals()
                        .strong_text_color()
                        .gamma_multiply(opacity),
                );
            }
        }
    }

    fn draw_playback_cursor(&self, painter: &egui::Painter) {
        let x = self.rect.left() + self.playback.current_time * self.pixels_per_second
            - self.scroll.scroll.x;
        if x >= self.rect.left() && x <= self.rect.right() {
            painter.vline(
                x,
                Rangef::new(self.rect.top(), self.rect.bottom()),
                Stroke::new(2.0, PLAYBACK_CURSOR_COLOR),
            );
        }
    }

    fn draw_scrollbars(&self, ui: &egui::Ui, painter: &egui::Painter) {
        let thickness = self.scroll.scrollbar_thickness;
        let content = self.scroll.content_size();
        let visuals = ui.visuals();

        if content.x > self.rect.width() {
            let track = Rect::from_x_y_ranges(
                self.rect.x_range(),
                Rangef::new(self.rect.bottom() - thickness, self.rect.bottom()),
            );
            painter.rect_filled(track, CornerRadius::ZERO, visuals.faint_bg_color);

            let frac = self.rect.width() / content.x;
            let thumb_w = (track.width() * frac).max(16.0);
            let thumb_x =
                track.left() + (self.scroll.scroll.x / content.x) * track.width();
            painter.rect_filled(
                Rect::from_min_size(pos2(thumb_x, track.top()), vec2(thumb_w, thickness)),
                CornerRadius::same(3),
                visuals.widgets.inactive.bg_fill,
            );
        }

        if content.y > self.rect.height() {
            let track = Rect::from_x_y_ranges(
                Rangef::new(self.rect.right() - thickness, self.rect.right()),
                self.rect.y_range(),
            );
            painter.rect_filled(track, CornerRadius::ZERO, visuals.faint_bg_color);

            let frac = self.rect.height() / content.y;
            let thumb_h = (track.height() * frac).max(16.0);
            let thumb_y =
                track.top() + (self.scroll.scroll.y / content.y) * track.height();
            painter.rect_filled(
                Rect::from_min_size(pos2(track.left(), thumb_y), vec2(thickness, thumb_h)),
                CornerRadius::same(3),
                visuals.widgets.inactive.bg_fill,
            );
        }
    }
}
