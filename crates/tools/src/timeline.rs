use worldedit_author::History;

/// Entries shown by the history panel.
pub const DEFAULT_TIMELINE_LEN: usize = 10;

/// The most recent edits, newest first, as the history panel lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTimeline {
    pub entries: Vec<String>,
    pub undo_count: usize,
    pub redo_count: usize,
}

impl HistoryTimeline {
    pub fn recent(history: &History, limit: usize) -> Self {
        Self {
            entries: history
                .descriptions()
                .take(limit)
                .map(str::to_owned)
                .collect(),
            undo_count: history.undo_count(),
            redo_count: history.redo_count(),
        }
    }

    /// Entries older than the visible window.
    pub fn hidden(&self) -> usize {
        self.undo_count.saturating_sub(self.entries.len())
    }
}

impl std::fmt::Display for HistoryTimeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "History: undo={} redo={}", self.undo_count, self.redo_count)?;
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "  {:>2}. {entry}", i + 1)?;
        }
        if self.hidden() > 0 {
            writeln!(f, "  ... {} older", self.hidden())?;
        }
        Ok(())
    }
}
