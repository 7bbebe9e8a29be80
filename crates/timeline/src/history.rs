//! Bounded undo/redo history of whole-document snapshots.

use crate::document::Document;

/// Snapshot history with a cursor.
///
/// `cursor` indexes the snapshot matching the current document. Pushing
/// truncates everything after the cursor, then evicts from the front once
/// `max_size` is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Document>,
    cursor: Option<usize>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: None,
            max_size: max_size.max(1),
        }
    }

    /// Record `document` as the newest state.
    pub fn push(&mut self, document: Document) {
        if let Some(cursor) = self.cursor {
            self.snapshots.truncate(cursor + 1);
        } else {
            self.snapshots.clear();
        }
        self.snapshots.push(document);
        if self.snapshots.len() > self.max_size {
            let excess = self.snapshots.len() - self.max_size;
            self.snapshots.drain(..excess);
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back and return the snapshot to restore.
    pub fn undo(&mut self) -> Option<&Document> {
        let cursor = self.cursor.filter(|c| *c > 0)? - 1;
        self.cursor = Some(cursor);
        self.snapshots.get(cursor)
    }

    /// Step forward and return the snapshot to restore.
    pub fn redo(&mut self) -> Option<&Document> {
        let cursor = self.cursor? + 1;
        if cursor >= self.snapshots.len() {
            return None;
        }
        self.cursor = Some(cursor);
        self.snapshots.get(cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.snapshots.len())
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> Option<&Document> {
        self.cursor.and_then(|c| self.snapshots.get(c))
    }
}
