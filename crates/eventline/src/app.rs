use egui_dock::{DockArea, DockState, NodeIndex};
use eventline_lib::{Id, SnapMode};
use smallvec::SmallVec;

use crate::{
    Context, Screen,
    graph::Clipboard,
    tab::{graph::GraphTab, inspector::InspectorTab},
};

pub type Tab = Box<dyn Screen>;

pub struct EventlineApp {
    ctx: Context,
    dock_state: DockState<Id<Tab>>,
}

impl EventlineApp {
    pub fn new(_: &eframe::CreationContext) -> Self {
        let mut ctx = Context::new();

        let graph_tab = ctx.create_tab::<GraphTab>();
        let inspector_tab = ctx.create_tab::<InspectorTab>();

        let mut dock_state = DockState::new(vec![graph_tab]);
        dock_state
            .main_surface_mut()
            .split_right(NodeIndex::root(), 0.78, vec![inspector_tab]);

        Self { ctx, dock_state }
    }

    fn copy_to_system_clipboard(&mut self, egui_ctx: &egui::Context) {
        if let Some(text) = self.ctx.clipboard.text() {
            egui_ctx.copy_text(text);
        }
    }

    fn handle_shortcuts(&mut self, egui_ctx: &egui::Context) {
        use egui::{Key, KeyboardShortcut, Modifiers};

        const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
        const REDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);
        const COPY: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::C);
        const CUT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::X);
        const PASTE: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::V);
        const PASTE_ABSOLUTE: KeyboardShortcut =
            KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::V);

        let mut copied = false;
        egui_ctx.input_mut(|i| {
            if i.consume_shortcut(&UNDO) {
                self.ctx.undo();
            }
            if i.consume_shortcut(&REDO) {
                self.ctx.redo();
            }
            if i.consume_shortcut(&PASTE_ABSOLUTE) {
                self.ctx.paste(true);
            } else if i.consume_shortcut(&PASTE) {
                self.ctx.paste(false);
            }
            if i.consume_shortcut(&COPY) {
                copied = self.ctx.copy();
            }
            if i.consume_shortcut(&CUT) {
                copied = self.ctx.cut();
            }
            if i.key_pressed(Key::Delete) {
                self.ctx.delete_selected();
            }
            if i.key_pressed(Key::Space) {
                self.ctx.graph.playback.toggle_playing();
            }
        });
        if copied {
            self.copy_to_system_clipboard(egui_ctx);
        }
    }
}

impl eframe::App for EventlineApp {
    fn update(&mut self, egui_ctx: &egui::Context, _egui_frame: &mut eframe::Frame) {
        self.handle_shortcuts(egui_ctx);

        let mut copied = false;
        egui::TopBottomPanel::top("top_panel").show(egui_ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                let ctx = &mut self.ctx;
                ui.menu_button("File", |ui| {
                    #[cfg(not(target_arch = "wasm32"))]
                    if ui.button("Quit").clicked() {
                        egui_ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Edit", |ui| {
                    if ui
                        .add_enabled(ctx.undo.can_undo(), egui::Button::new("Undo"))
                        .clicked()
                    {
                        ctx.undo();
                    }
                    if ui
                        .add_enabled(ctx.undo.can_redo(), egui::Button::new("Redo"))
                        .clicked()
                    {
                        ctx.redo();
                    }
                    ui.separator();
                    let has_selection = !ctx.graph.view.selection.is_empty();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Cut"))
                        .clicked()
                    {
                        copied = ctx.cut();
                    }
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Copy"))
                        .clicked()
                    {
                        copied = ctx.copy();
                    }
                    if ui.button("Paste").clicked() {
                        ctx.paste(false);
                    }
                    if ui.button("Paste (absolute)").clicked() {
                        ctx.paste(true);
                    }
                    ui.separator();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete"))
                        .clicked()
                    {
                        ctx.delete_selected();
                    }
                });
                ui.menu_button("View", |ui| {
                    ui.label("Event snapping");
                    ui.radio_value(&mut ctx.config.snap, SnapMode::None, "Off");
                    ui.radio_value(&mut ctx.config.snap, SnapMode::Fps30, "30 fps");
                    ui.radio_value(&mut ctx.config.snap, SnapMode::Fps60, "60 fps");
                    ui.separator();
                    ui.checkbox(&mut ctx.config.read_only, "Read-only file mode");
                    ui.checkbox(
                        &mut ctx.config.autoscroll_during_playback,
                        "Autoscroll during playback",
                    );
                    ui.separator();
                    if ui.button("Reset zoom").clicked() {
                        let center = ctx.graph.rect().width() / 2.0;
                        ctx.graph.reset_zoom(center);
                    }
                });
                ui.menu_button("Window", |ui| {
                    if ui.button("Event Graph").clicked() && !ctx.tabs.has_tab::<GraphTab>() {
                        let id = ctx.create_tab::<GraphTab>();
                        self.dock_state.push_to_focused_leaf(id);
                    }
                    if ui.button("Inspector").clicked() && !ctx.tabs.has_tab::<InspectorTab>() {
                        let id = ctx.create_tab::<InspectorTab>();
                        self.dock_state.push_to_focused_leaf(id);
                    }
                });
                #[cfg(debug_assertions)]
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    egui::warn_if_debug_build(ui);
                });
            });
        });
        if copied {
            self.copy_to_system_clipboard(egui_ctx);
        }

        egui::TopBottomPanel::bottom("status_bar").show(egui_ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.ctx.status {
                    ui.colored_label(ui.visuals().warn_fg_color, status);
                } else {
                    ui.weak("ready");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if self.ctx.modified.any_modified() {
                        ui.label("unsaved changes");
                    }
                });
            });
        });

        self.ctx.graph_updated = false;
        let deleted_tabs = egui::CentralPanel::default()
            .show(egui_ctx, |ui| {
                let mut tab_viewer = EventlineTabViewer {
                    ctx: &mut self.ctx,
                    deleted_tabs: SmallVec::new(),
                };
                DockArea::new(&mut self.dock_state)
                    .style(egui_dock::Style::from_egui(ui.style().as_ref()))
                    .show_inside(ui, &mut tab_viewer);
                tab_viewer.deleted_tabs
            })
            .inner;

        for tab in deleted_tabs {
            self.ctx.tabs.map.remove(&tab);
        }

        // the graph pane going inactive mid-gesture cancels the gesture
        // rather than committing a partial change
        if !self.ctx.graph_updated && self.ctx.graph.drag().is_active() {
            self.ctx.graph.abandon_drag();
        }

        if self.ctx.graph.playback.is_playing {
            egui_ctx.request_repaint();
        }
    }
}

pub struct EventlineTabViewer<'a> {
    ctx: &'a mut Context,
    deleted_tabs: SmallVec<[Id<Tab>; 2]>,
}

impl egui_dock::TabViewer for EventlineTabViewer<'_> {
    type Tab = Id<Tab>;

    fn title(&mut self, id: &mut Self::Tab) -> egui::WidgetText {
        match self.ctx.tabs.map.get(id) {
            Some(tab) => tab.title(),
            None => "<closed>".into(),
        }
    }

    fn id(&mut self, id: &mut Self::Tab) -> egui::Id {
        (*id).into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, &mut id: &mut Self::Tab) {
        let Some(mut tab) = self.ctx.tabs.map.remove(&id) else {
            return;
        };
        if let Err(err) = tab.update(self.ctx, ui) {
            tracing::error!(%err, "tab update failed");
        }
        self.ctx.tabs.map.insert(tab.id(), tab);
    }

    fn on_close(&mut self, id: &mut Self::Tab) -> bool {
        self.deleted_tabs.push(*id);
        true
    }
}
