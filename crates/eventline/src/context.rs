use std::any::Any;

use eventline_lib::{Animation, Event, Id, ModifiedTracker, State};

use crate::{
    Screen, UndoHistory,
    app::Tab,
    command::GraphCtx,
    graph::{EventGraph, GraphConfig, MemoryClipboard},
};

/// Everything the editor session owns: the data model, the graph pane, the
/// undo history, configuration, and the tab registry. Screens receive this
/// mutably each frame; the data model itself is only ever mutated through
/// commands committed to the undo history.
pub struct Context {
    pub state: State,
    pub config: GraphConfig,
    pub modified: ModifiedTracker,
    pub undo: UndoHistory,
    pub graph: EventGraph,
    pub clipboard: MemoryClipboard,
    /// Transient user-facing notification (e.g. a failed paste).
    pub status: Option<String>,
    pub tabs: Tabs,

    /// Set by the graph tab each frame it runs; when the pane goes
    /// inactive mid-drag the app abandons the gesture.
    pub graph_updated: bool,
}

impl Context {
    pub fn new() -> Self {
        let config = GraphConfig::default();
        let (state, anim_id) = demo_state();

        let mut graph = EventGraph::new(anim_id);
        graph.change_animation(&state, anim_id, &config);

        Self {
            state,
            config,
            modified: ModifiedTracker::new(),
            undo: UndoHistory::new(),
            graph,
            clipboard: MemoryClipboard::default(),
            status: None,
            tabs: Tabs::default(),
            graph_updated: false,
        }
    }

    pub fn undo(&mut self) -> bool {
        let mut ctx = GraphCtx {
            state: &mut self.state,
            view: &mut self.graph.view,
            config: &self.config,
            modified: &self.modified,
        };
        self.undo.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> bool {
        let mut ctx = GraphCtx {
            state: &mut self.state,
            view: &mut self.graph.view,
            config: &self.config,
            modified: &self.modified,
        };
        self.undo.redo(&mut ctx)
    }

    pub fn copy(&mut self) -> bool {
        self.graph.copy(&self.state, &mut self.clipboard)
    }

    /// Copy, then delete. Deliberately two independent transactions, so cut
    /// is two undo steps rather than one.
    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.delete_selected();
        true
    }

    pub fn paste(&mut self, absolute: bool) {
        match self.graph.paste(
            &mut self.state,
            &self.config,
            &self.modified,
            &mut self.undo,
            &mut self.clipboard,
            absolute,
        ) {
            Ok(_) => {}
            Err(err) => {
                // the parse happens before any mutation, so nothing to roll
                // back; just tell the user
                tracing::warn!(%err, "paste failed");
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn delete_selected(&mut self) {
        if let Err(err) = self.graph.delete_selected(
            &mut self.state,
            &self.config,
            &self.modified,
            &mut self.undo,
        ) {
            tracing::error!(%err, "delete failed");
            self.status = Some(err.to_string());
        }
    }

    /// Switches the graph to another animation. The undo history is scoped
    /// to the animation being edited, so it resets.
    pub fn select_animation(&mut self, anim_id: Id<Animation>) {
        self.graph.change_animation(&self.state, anim_id, &self.config);
        self.undo.clear();
        self.status = None;
    }

    pub fn create_tab<T: Screen>(&mut self) -> Id<Tab> {
        let tab = T::create(self);
        let id = tab.id();
        self.tabs.map.insert(id, Box::new(tab));
        id
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct Tabs {
    pub map: ahash::HashMap<Id<Tab>, Tab>,
}

impl Tabs {
    pub fn get_tab<T: Screen>(&mut self) -> Option<&mut T> {
        self.map
            .iter_mut()
            .find_map(|(_, tab)| (&mut **tab as &mut dyn Any).downcast_mut::<T>())
    }
    pub fn has_tab<T: Screen>(&self) -> bool {
        self.map.iter().any(|(_, tab)| (&**tab as &dyn Any).is::<T>())
    }
}

/// Starter content so the editor opens onto something draggable: a base
/// animation plus a companion that imports it (shown as a ghost graph).
fn demo_state() -> (State, Id<Animation>) {
    let mut state = State::new();
    state.bank.set_template(0, vec![0; 16]);
    state.bank.set_template(96, vec![0; 32]);

    let mut base = Animation::new("a00_3000");
    for (start, end, kind) in [
        (0.0, 0.8, 0u32),
        (0.2, 1.4, 96),
        (0.9, 1.6, 0),
        (1.5, 2.3, 193),
        (2.0, 3.2, 96),
    ] {
        base.push_event(Id::arbitrary(), Event::new(start, end, kind));
    }
    let base_id = state.add_animation(base);

    let mut importer = Animation::new("a00_3001");
    importer.import_from = Some(base_id);
    state.add_animation(importer);

    (state, base_id)
}
