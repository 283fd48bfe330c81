//! Bounded undo/redo history over combined vector+raster state.

use crate::component::Component;
use serde::{Deserialize, Serialize};

/// Maximum number of retained history entries.
pub const MAX_HISTORY: usize = 50;

/// One undoable snapshot of editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Full component list at this point.
    pub components: Vec<Component>,
    /// Opaque encoded raster image (`data:image/png;base64,...`), or `None`
    /// when no ink has ever been captured. Consumers treat it as opaque.
    pub raster_image: Option<String>,
}

impl HistoryEntry {
    pub fn new(components: Vec<Component>, raster_image: Option<String>) -> Self {
        Self {
            components,
            raster_image,
        }
    }

    /// Serialize the snapshot for external consumers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a snapshot produced by [`HistoryEntry::to_json`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Bounded, coalescing log of [`HistoryEntry`] snapshots.
///
/// Invariant: `0 <= index < entries.len()`. Entries past `index` are
/// redo-available; recording truncates them before appending. The cap
/// evicts from the oldest end, never past the current position.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    index: usize,
    /// Set while an undo/redo snapshot is being applied, suppressing
    /// `record` so restoring state cannot re-enter the log.
    restoring: bool,
    /// Entry opened by the current tick's first mutation. Later mutations
    /// from the same user action update it in place; `flush` pushes it.
    pending: Option<HistoryEntry>,
}

impl HistoryLog {
    /// Create a log seeded with the initial editor state.
    pub fn new(initial: HistoryEntry) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            restoring: false,
            pending: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Record a snapshot of the current state.
    ///
    /// Calls within one tick coalesce: the component list overwrites the
    /// pending entry, and a raster image updates it in place, so one user
    /// action lands as one entry no matter how many mutations it made.
    /// Suppressed while a programmatic undo/redo is being applied.
    pub fn record(&mut self, components: Vec<Component>, raster_image: Option<String>) {
        if self.restoring {
            log::debug!("history record during restore suppressed");
            return;
        }
        match &mut self.pending {
            Some(pending) => {
                pending.components = components;
                if raster_image.is_some() {
                    pending.raster_image = raster_image;
                }
            }
            None => {
                self.pending = Some(HistoryEntry::new(components, raster_image));
            }
        }
    }

    /// Push the pending entry, if any. Called at the end of the tick so the
    /// recorded entry reflects the settled state, not intermediates.
    /// Returns true if an entry was pushed.
    pub fn flush(&mut self) -> bool {
        let Some(mut entry) = self.pending.take() else {
            return false;
        };
        // A vector-only mutation inherits the last captured raster so every
        // entry restores completely on its own.
        if entry.raster_image.is_none() {
            entry.raster_image = self.entries[self.index].raster_image.clone();
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;
        true
    }

    /// Step back and return the entry to apply, or `None` at the boundary.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        self.flush();
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&self.entries[self.index])
    }

    /// Step forward and return the entry to apply, or `None` at the boundary.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        self.flush();
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&self.entries[self.index])
    }

    /// The entry at the current position.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.index]
    }

    /// Mark the start of applying an undo/redo snapshot.
    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    /// Mark the end of applying an undo/redo snapshot.
    pub fn end_restore(&mut self) {
        self.restoring = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentKind};
    use kurbo::Point;

    fn entry_with(count: usize) -> HistoryEntry {
        let components = (0..count)
            .map(|i| Component::new(ComponentKind::Button, Point::new(i as f64 * 10.0, 0.0)))
            .collect();
        HistoryEntry::new(components, None)
    }

    fn log_with_initial() -> HistoryLog {
        HistoryLog::new(entry_with(0))
    }

    #[test]
    fn test_record_flush_undo_redo() {
        let mut log = log_with_initial();

        log.record(entry_with(1).components, None);
        assert!(log.flush());
        log.record(entry_with(2).components, None);
        assert!(log.flush());

        assert_eq!(log.len(), 3);
        assert_eq!(log.undo().unwrap().components.len(), 1);
        assert_eq!(log.undo().unwrap().components.len(), 0);
        assert!(log.undo().is_none());

        assert_eq!(log.redo().unwrap().components.len(), 1);
        assert_eq!(log.redo().unwrap().components.len(), 2);
        assert!(log.redo().is_none());
    }

    #[test]
    fn test_record_truncates_redo_tail() {
        let mut log = log_with_initial();
        log.record(entry_with(1).components, None);
        log.flush();
        log.record(entry_with(2).components, None);
        log.flush();

        log.undo();
        assert!(log.can_redo());

        log.record(entry_with(3).components, None);
        log.flush();
        assert!(!log.can_redo());
        assert_eq!(log.current().components.len(), 3);
    }

    #[test]
    fn test_coalescing_single_entry() {
        let mut log = log_with_initial();

        // A drag mutates components, then the same action reports a raster
        // change; both land in one entry.
        log.record(entry_with(2).components, None);
        log.record(entry_with(2).components, Some("data:raster".to_string()));
        log.flush();

        assert_eq!(log.len(), 2);
        assert_eq!(log.current().components.len(), 2);
        assert_eq!(log.current().raster_image.as_deref(), Some("data:raster"));
    }

    #[test]
    fn test_flush_without_pending_is_noop() {
        let mut log = log_with_initial();
        assert!(!log.flush());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_vector_only_entry_inherits_raster() {
        let mut log = log_with_initial();
        log.record(entry_with(1).components, Some("data:ink".to_string()));
        log.flush();
        log.record(entry_with(2).components, None);
        log.flush();

        assert_eq!(log.current().raster_image.as_deref(), Some("data:ink"));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut log = log_with_initial();
        for i in 1..=60 {
            log.record(entry_with(i).components, None);
            log.flush();
        }
        assert_eq!(log.len(), MAX_HISTORY);

        // Walk back to the oldest retained state; it is a real state, not
        // an error.
        let mut undos = 0;
        while log.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, MAX_HISTORY - 1);
        assert_eq!(log.current().components.len(), 11);
        assert!(log.undo().is_none());
    }

    #[test]
    fn test_record_suppressed_during_restore() {
        let mut log = log_with_initial();
        log.record(entry_with(1).components, None);
        log.flush();

        log.begin_restore();
        log.record(entry_with(9).components, None);
        log.end_restore();
        log.flush();

        assert_eq!(log.len(), 2);
        assert_eq!(log.current().components.len(), 1);
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = HistoryEntry::new(
            entry_with(2).components,
            Some("data:image/png;base64,AAAA".to_string()),
        );
        let json = entry.to_json().unwrap();
        let back = HistoryEntry::from_json(&json).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn test_undo_flushes_pending_first() {
        let mut log = log_with_initial();
        log.record(entry_with(1).components, None);

        // Pending entry settles before the undo walks back.
        let entry = log.undo().unwrap();
        assert_eq!(entry.components.len(), 0);
        assert_eq!(log.len(), 2);
    }
}
