use crate::draw::buffer::Snapshot;
use std::collections::VecDeque;

/// Undo/redo stacks of whole-buffer snapshots. Most recent entry is at the
/// back of each deque; when a limit is set the oldest entries fall off the
/// front.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryStack {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    limit: Option<usize>,
}

impl HistoryStack {
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.map(|l| l.max(1)),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Records the state before a fresh user action. Any redo entries are
    /// invalidated.
    pub fn push_undo(&mut self, snapshot: Snapshot) {
        push_bounded(&mut self.undo_stack, snapshot, self.limit);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current, self.limit);
        Some(previous)
    }

    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current, self.limit);
        Some(next)
    }

    pub fn clear_all(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Bytes held by snapshots in both stacks.
    pub fn retained_bytes(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .map(|s| s.pixels().len())
            .sum()
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, limit: Option<usize>) {
    stack.push_back(snapshot);
    if let Some(limit) = limit {
        while stack.len() > limit {
            stack.pop_front();
        }
    }
}
