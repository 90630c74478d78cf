use crate::command::{GraphCommand, GraphCtx};

/// Linear undo/redo history over graph commands. `commit` runs the forward
/// action synchronously before storing it, so a command is always in its
/// "applied" state while it sits below the cursor. Committing with redo
/// entries pending discards them.
#[derive(Default)]
pub struct UndoHistory {
    commands: Vec<Box<dyn GraphCommand>>,
    cursor: usize,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, ctx: &mut GraphCtx, mut command: Box<dyn GraphCommand>) {
        command.execute(ctx);
        self.commands.truncate(self.cursor);
        self.commands.push(command);
        self.cursor = self.commands.len();
    }

    pub fn undo(&mut self, ctx: &mut GraphCtx) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.commands[self.cursor].rollback(ctx);
        true
    }

    pub fn redo(&mut self, ctx: &mut GraphCtx) -> bool {
        if self.cursor == self.commands.len() {
            return false;
        }
        self.commands[self.cursor].execute(ctx);
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    pub fn can_redo(&self) -> bool {
        self.cursor < self.commands.len()
    }
    pub fn depth(&self) -> usize {
        self.cursor
    }

    /// Forgets everything; used when switching animations.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.cursor = 0;
    }
}
