use crate::command::{Command, DecodeError};
use crate::host::EditContext;
use serde_json::Value;
use tracing::{info, warn};

/// Undo and redo stacks of committed commands.
///
/// The history only stores and replays commands. It never touches the scene
/// itself; commands do, through the [`EditContext`] handed to them.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    limit: Option<usize>,
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that evicts its oldest entry past `limit` commands.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record a command that has already been applied. Clears the redo stack.
    pub fn push(&mut self, command: impl Into<Command>) {
        let command = command.into();
        info!(kind = command.kind(), "Action: {}", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
    }

    /// Undo the last edit. Returns true if an operation was undone.
    pub fn undo(&mut self, ctx: &mut EditContext<'_>) -> bool {
        let Some(mut cmd) = self.undo_stack.pop() else {
            return false;
        };
        info!(kind = cmd.kind(), "Undo: {}", cmd.description());
        cmd.undo(ctx);
        self.redo_stack.push(cmd);
        true
    }

    /// Redo the last undone edit. Returns true if an operation was redone.
    pub fn redo(&mut self, ctx: &mut EditContext<'_>) -> bool {
        let Some(mut cmd) = self.redo_stack.pop() else {
            return false;
        };
        info!(kind = cmd.kind(), "Redo: {}", cmd.description());
        cmd.redo(ctx);
        self.undo_stack.push(cmd);
        true
    }

    /// Number of operations on the undo stack.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of operations on the redo stack.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether there are operations that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there are operations that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Undo-stack descriptions, newest first.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> + '_ {
        self.undo_stack.iter().rev().map(Command::description)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// The undo stack as a replayable edit log, oldest first. Entries that
    /// fail to serialize are skipped.
    pub fn serialize(&self) -> Vec<Value> {
        self.undo_stack
            .iter()
            .filter_map(|cmd| match cmd.to_json() {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(kind = cmd.kind(), %err, "history entry skipped");
                    None
                }
            })
            .collect()
    }

    /// Rebuild a history from a saved log without re-executing anything.
    ///
    /// Entries that cannot be decoded are dropped; the rest keep their
    /// order. The redo stack starts empty.
    pub fn deserialize(log: &[Value]) -> RestoredHistory {
        let mut history = Self::new();
        let mut dropped = Vec::new();
        for entry in log {
            match Command::from_json(entry.clone()) {
                Ok(cmd) => history.undo_stack.push(cmd),
                Err(err) => dropped.push(err),
            }
        }
        let restored = RestoredHistory { history, dropped };
        if let Some(message) = restored.warning() {
            warn!("{message}");
        }
        restored
    }
}

/// A deserialized history plus whatever had to be left out.
#[derive(Debug)]
pub struct RestoredHistory {
    pub history: History,
    pub dropped: Vec<DecodeError>,
}

impl RestoredHistory {
    /// One user-facing line summarizing dropped entries, if any.
    pub fn warning(&self) -> Option<String> {
        let first = self.dropped.first()?;
        Some(match self.dropped.len() {
            1 => format!("1 history entry could not be restored ({first})"),
            n => format!("{n} history entries could not be restored (first: {first})"),
        })
    }
}
