use std::any::Any;

use anyhow::Result;
use eventline_lib::Id;

use crate::{Context, app::Tab};

pub trait Screen: Any {
    fn create(ctx: &mut Context) -> Self
    where
        Self: Sized;

    fn id(&self) -> Id<Tab>;

    fn title(&self) -> egui::WidgetText;

    fn update(&mut self, ctx: &mut Context, ui: &mut egui::Ui) -> Result<()>;
}
