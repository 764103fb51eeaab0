//! Snapshot-based undo/redo for the annotation set.
//!
//! Every add or remove commits a full copy of the annotation list. The
//! history is linear: committing after an undo drops the redo branch.
//! Geometry tweaks made through [`AnnotationHistoryStore::update`] change the
//! live set only; they ride along with the next commit.

use super::types::Annotation;
use uuid::Uuid;

pub struct AnnotationHistoryStore {
    /// `snapshots[0]` is always the empty set.
    snapshots: Vec<Vec<Annotation>>,
    cursor: usize,
    live: Vec<Annotation>,
}

impl Default for AnnotationHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationHistoryStore {
    pub fn new() -> Self {
        Self {
            snapshots: vec![Vec::new()],
            cursor: 0,
            live: Vec::new(),
        }
    }

    /// Current annotations, including uncommitted updates.
    pub fn annotations(&self) -> &[Annotation] {
        &self.live
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Record `set` as the new current state, discarding any redo states.
    pub fn commit(&mut self, set: Vec<Annotation>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(set.clone());
        self.cursor = self.snapshots.len() - 1;
        self.live = set;
        log::debug!(
            "[HISTORY] Commit #{} ({} annotations)",
            self.cursor,
            self.live.len()
        );
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.live = self.snapshots[self.cursor].clone();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.live = self.snapshots[self.cursor].clone();
        true
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn add(&mut self, annotation: Annotation) {
        let mut next = self.live.clone();
        next.push(annotation);
        self.commit(next);
    }

    /// Remove by id. Unknown ids leave history untouched.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if !self.live.iter().any(|a| a.id == id) {
            return false;
        }
        let next = self.live.iter().filter(|a| a.id != id).cloned().collect();
        self.commit(next);
        true
    }

    /// Replace an annotation in place without creating a history entry.
    pub fn update(&mut self, annotation: Annotation) -> bool {
        match self.live.iter_mut().find(|a| a.id == annotation.id) {
            Some(slot) => {
                *slot = annotation;
                true
            }
            None => false,
        }
    }

    /// Remove every annotation as one undoable step.
    pub fn clear(&mut self) {
        if !self.live.is_empty() {
            self.commit(Vec::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::types::{Shape, Style};
    use crate::capture::Region;

    fn rect(n: f64) -> Annotation {
        Annotation::new(Shape::Rectangle(Region::new(n, n, 10.0, 10.0)), Style::default())
    }

    fn assert_invariant(h: &AnnotationHistoryStore) {
        assert!(h.cursor() < h.len());
        assert!(h.snapshots[0].is_empty());
        assert_eq!(h.can_undo(), h.cursor() > 0);
        assert_eq!(h.can_redo(), h.cursor() < h.len() - 1);
    }

    #[test]
    fn starts_empty() {
        let h = AnnotationHistoryStore::new();
        assert!(h.is_empty());
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_invariant(&h);
    }

    #[test]
    fn invariant_holds_over_operation_sequences() {
        // 0 = commit, 1 = undo, 2 = redo
        let scripts: [&[u8]; 6] = [
            &[0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2],
            &[1, 2, 1, 0, 1, 1, 2, 0],
            &[0, 1, 0, 1, 0, 1, 2, 2],
            &[0, 0, 1, 0, 2, 2, 1, 1, 1],
            &[2, 2, 1, 1],
            &[0, 0, 0, 0, 0, 1, 1, 1, 0, 2, 1],
        ];
        for script in scripts {
            let mut h = AnnotationHistoryStore::new();
            for (i, op) in script.iter().enumerate() {
                match op {
                    0 => h.add(rect(i as f64)),
                    1 => {
                        h.undo();
                    }
                    _ => {
                        h.redo();
                    }
                }
                assert_invariant(&h);
            }
        }
    }

    #[test]
    fn commit_after_undo_discards_redo_branch() {
        let mut h = AnnotationHistoryStore::new();
        for i in 0..4 {
            h.add(rect(i as f64));
        }
        assert_eq!(h.len(), 5);
        h.undo();
        h.undo();
        assert_eq!(h.cursor(), 2);
        assert!(h.can_redo());

        let x = rect(99.0);
        let mut next = h.annotations().to_vec();
        next.push(x.clone());
        h.commit(next);

        assert_eq!(h.len(), 4);
        assert_eq!(h.cursor(), 3);
        assert!(!h.can_redo());
        assert_eq!(h.annotations().last(), Some(&x));
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = AnnotationHistoryStore::new();
        let n = 5;
        for i in 0..n {
            h.add(rect(i as f64));
        }
        let last = h.annotations().to_vec();
        for _ in 0..n - 1 {
            assert!(h.undo());
        }
        assert_eq!(h.annotations().len(), 1);
        for _ in 0..n - 1 {
            assert!(h.redo());
        }
        assert_eq!(h.annotations(), last.as_slice());
    }

    #[test]
    fn undo_at_start_and_redo_at_end_are_noops() {
        let mut h = AnnotationHistoryStore::new();
        assert!(!h.undo());
        h.add(rect(1.0));
        assert!(!h.redo());
        assert_eq!(h.cursor(), 1);
    }

    #[test]
    fn update_does_not_create_history() {
        let mut h = AnnotationHistoryStore::new();
        let mut a = rect(1.0);
        h.add(a.clone());
        a.shape.translate(5.0, 5.0);
        assert!(h.update(a.clone()));
        assert_eq!(h.len(), 2);
        assert_eq!(h.annotations()[0], a);
        assert!(!h.update(rect(2.0)));
    }

    #[test]
    fn remove_and_clear_are_undoable() {
        let mut h = AnnotationHistoryStore::new();
        let a = rect(1.0);
        let b = rect(2.0);
        h.add(a.clone());
        h.add(b.clone());
        assert!(h.remove(a.id));
        assert_eq!(h.annotations(), &[b.clone()]);
        assert!(!h.remove(a.id));
        h.clear();
        assert!(h.is_empty());
        h.undo();
        assert_eq!(h.annotations(), &[b]);
        h.undo();
        assert_eq!(h.annotations().len(), 2);
    }

    #[test]
    fn reset_returns_to_fresh_state() {
        let mut h = AnnotationHistoryStore::new();
        h.add(rect(1.0));
        h.add(rect(2.0));
        h.undo();
        h.reset();
        assert_eq!((h.len(), h.cursor()), (1, 0));
        assert!(h.is_empty());
        assert_invariant(&h);
    }
}
