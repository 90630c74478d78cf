use anyhow::Result;
use eventline_lib::Id;

use crate::{Context, app::Tab};

/// Read-only side pane: the animation list, details of the current
/// selection, and session state (playback, undo depth, modified flags).
#[derive(Debug)]
pub struct InspectorTab {
    id: Id<Tab>,
}

impl crate::Screen for InspectorTab {
    fn create(_ctx: &mut Context) -> Self {
        Self {
            id: Id::arbitrary(),
        }
    }

    fn id(&self) -> Id<Tab> {
        self.id
    }

    fn title(&self) -> egui::WidgetText {
        "Inspector".into()
    }

    fn update(&mut self, ctx: &mut Context, ui: &mut egui::Ui) -> Result<()> {
        ui.heading("Animations");
        let current = ctx.graph.view.anim_id();
        let mut animations: Vec<(Id<eventline_lib::Animation>, String)> = ctx
            .state
            .animations
            .iter()
            .map(|(&id, anim)| (id, anim.name.clone()))
            .collect();
        animations.sort_by(|a, b| a.1.cmp(&b.1));

        for (anim_id, name) in animations {
            let modified = ctx.modified.is_modified(anim_id);
            let label = if modified {
                format!("{name}*")
            } else {
                name
            };
            if ui.selectable_label(anim_id == current, label).clicked() && anim_id != current {
                ctx.select_animation(anim_id);
            }
        }

        ui.separator();
        ui.heading("Selection");
        self.selection_section(ctx, ui);

        ui.separator();
        ui.heading("Session");
        ui.label(format!(
            "playback: {:.3}s{}{}",
            ctx.graph.playback.current_time,
            if ctx.graph.playback.is_playing {
                " (playing)"
            } else {
                ""
            },
            if ctx.graph.playback.scrubbing {
                " (scrubbing)"
            } else {
                ""
            },
        ));
        ui.label(format!("undo depth: {}", ctx.undo.depth()));
        ui.label(format!("zoom: {:.0} px/s", ctx.graph.pixels_per_second));
        if ctx.graph.ghost().is_some() {
            ui.label("showing imported events (read-only)");
        }

        if let Some(status) = &ctx.status {
            ui.separator();
            ui.colored_label(ui.visuals().warn_fg_color, status);
        }

        Ok(())
    }
}

impl InspectorTab {
    fn selection_section(&self, ctx: &Context, ui: &mut egui::Ui) {
        let view = &ctx.graph.view;
        let Some(anim) = ctx.state.animations.get(view.anim_id()) else {
            return;
        };

        if let Some(primary) = view.selection.primary() {
            let Some(bx) = view.boxes.get(primary) else {
                return;
            };
            match anim.event(bx.event) {
                Some(ev) => {
                    ui.monospace(format!("kind    {}", ev.kind));
                    ui.monospace(format!("start   {:.4}s", ev.start));
                    ui.monospace(format!("end     {:.4}s", ev.end));
                    ui.monospace(format!("row     {}", bx.row()));
                    ui.monospace(format!("params  {} bytes", ev.params.len()));
                }
                None => {
                    ui.weak("selection references a missing event");
                }
            }
        } else if !view.selection.multi().is_empty() {
            ui.label(format!("{} boxes selected", view.selection.multi().len()));
        } else {
            ui.weak("nothing selected");
        }
    }
}
