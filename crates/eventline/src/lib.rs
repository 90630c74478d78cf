pub mod app;
mod screen;
pub use screen::Screen;
mod context;
pub use context::{Context, Tabs};
pub mod command;
pub mod graph;
pub mod input;
mod undo;
pub use undo::UndoHistory;
pub mod tab;
