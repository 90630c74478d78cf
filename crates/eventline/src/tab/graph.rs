use anyhow::Result;
use eventline_lib::Id;

use crate::{Context, app::Tab, input::InputState};

/// The event graph pane. Translates egui input into the graph's per-tick
/// snapshot, runs one update tick, and hands the geometry to the draw pass.
#[derive(Debug)]
pub struct GraphTab {
    id: Id<Tab>,
}

impl crate::Screen for GraphTab {
    fn create(_ctx: &mut Context) -> Self {
        Self {
            id: Id::arbitrary(),
        }
    }

    fn id(&self) -> Id<Tab> {
        self.id
    }

    fn title(&self) -> egui::WidgetText {
        "Event Graph".into()
    }

    fn update(&mut self, ctx: &mut Context, ui: &mut egui::Ui) -> Result<()> {
        let rect = ui.available_rect_before_wrap();
        // claim the space so egui routes pointer interaction to this pane
        ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let input = ui.input(|i| InputState::from_egui(i));
        let dt = ui.input(|i| i.stable_dt).min(0.1);

        ctx.graph.set_rect(rect);
        ctx.graph.update(
            &mut ctx.state,
            &ctx.config,
            &ctx.modified,
            &mut ctx.undo,
            &input,
            dt,
        );
        ctx.graph.draw(&ctx.state, &ctx.config, ui);
        ctx.graph_updated = true;

        Ok(())
    }
}
