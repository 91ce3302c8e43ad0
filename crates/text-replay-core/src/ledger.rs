use std::{
    collections::{BTreeMap, HashSet},
    fmt,
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::utils::row::RowId;

/// Every decision recorded under one tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    name: String,
    marks: BTreeMap<RowId, bool>,
}

impl TagEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` when the row was never part of a chunk tagged with this name.
    pub fn get(&self, id: RowId) -> Option<bool> {
        self.marks.get(&id).copied()
    }

    pub fn is_marked(&self, id: RowId) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn marked_count(&self) -> usize {
        self.marks.values().filter(|&&v| v).count()
    }

    pub fn summary(&self) -> TagSummary {
        TagSummary {
            name: self.name.clone(),
            total: self.len(),
            marked: self.marked_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub name: String,
    pub total: usize,
    pub marked: usize,
}

impl fmt::Display for TagSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}': {} total rows, {} selected",
            self.name, self.total, self.marked
        )
    }
}

/// Tag name -> (row id -> marked), in tag creation order.
///
/// Entries only ever get overwritten, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagLedger {
    tags: Vec<TagEntry>,
}

impl TagLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` for every row of `chunk`: `true` for rows in `selected`,
    /// `false` for the rest. Rows outside `chunk` keep whatever they had.
    pub fn apply_tag(
        &mut self,
        name: &str,
        chunk: &[RowId],
        selected: &HashSet<RowId>,
    ) -> TagSummary {
        let stray = selected.iter().filter(|&&id| !chunk.contains(&id)).count();
        if stray > 0 {
            warn!("ignoring {stray} selected rows outside the current chunk");
        }

        let entry = match self.tags.iter().position(|t| t.name == name) {
            Some(idx) => &mut self.tags[idx],
            None => {
                self.tags.push(TagEntry {
                    name: name.to_string(),
                    marks: BTreeMap::new(),
                });
                let last = self.tags.len() - 1;
                &mut self.tags[last]
            }
        };
        for &id in chunk {
            entry.marks.insert(id, selected.contains(&id));
        }

        let summary = entry.summary();
        debug!(tag = name, rows = chunk.len(), marked = summary.marked, "tagged chunk");
        summary
    }

    pub fn get(&self, name: &str) -> Option<&TagEntry> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &TagEntry> {
        self.tags.iter()
    }

    pub fn summarize(&self) -> Vec<TagSummary> {
        self.tags.iter().map(TagEntry::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Whether any row is marked `true` under any tag.
    pub fn has_marked_rows(&self) -> bool {
        self.tags.iter().any(|t| t.marks.values().any(|&v| v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[RowId]) -> HashSet<RowId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_tag_writes_whole_chunk() {
        let mut ledger = TagLedger::new();
        let chunk: Vec<RowId> = (0..25).collect();
        let summary = ledger.apply_tag("interesting", &chunk, &ids(&[2, 5, 9]));

        assert_eq!(summary.total, 25);
        assert_eq!(summary.marked, 3);
        let entry = ledger.get("interesting").unwrap();
        for id in 0..25 {
            assert_eq!(entry.get(id), Some([2, 5, 9].contains(&id)));
        }
        assert_eq!(entry.get(25), None);
    }

    #[test]
    fn test_retag_overwrites_only_current_chunk() {
        let mut ledger = TagLedger::new();
        let first: Vec<RowId> = (0..25).collect();
        let second: Vec<RowId> = (25..50).collect();

        ledger.apply_tag("t", &first, &ids(&[1, 2]));
        ledger.apply_tag("t", &second, &ids(&[30]));
        ledger.apply_tag("t", &first, &ids(&[3]));

        let entry = ledger.get("t").unwrap();
        assert!(!entry.is_marked(1));
        assert!(!entry.is_marked(2));
        assert!(entry.is_marked(3));
        assert!(entry.is_marked(30));
        assert_eq!(entry.len(), 50);
        assert_eq!(entry.marked_count(), 2);
    }

    #[test]
    fn test_tags_are_independent_and_ordered() {
        let mut ledger = TagLedger::new();
        let chunk: Vec<RowId> = (0..5).collect();
        ledger.apply_tag("b", &chunk, &ids(&[0]));
        ledger.apply_tag("a", &chunk, &ids(&[]));
        ledger.apply_tag("b", &chunk, &ids(&[4]));

        let names: Vec<&str> = ledger.entries().map(TagEntry::name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(
            ledger.summarize(),
            vec![
                TagSummary { name: "b".into(), total: 5, marked: 1 },
                TagSummary { name: "a".into(), total: 5, marked: 0 },
            ]
        );
        assert_eq!(ledger.summarize()[0].to_string(), "'b': 5 total rows, 1 selected");
    }

    #[test]
    fn test_selection_outside_chunk_is_ignored() {
        let mut ledger = TagLedger::new();
        let summary = ledger.apply_tag("t", &[10, 11], &ids(&[11, 99]));
        assert_eq!(summary.total, 2);
        assert_eq!(ledger.get("t").unwrap().get(99), None);
    }

    #[test]
    fn test_has_marked_rows() {
        let mut ledger = TagLedger::new();
        assert!(!ledger.has_marked_rows());
        ledger.apply_tag("t", &[0, 1], &ids(&[]));
        assert!(!ledger.has_marked_rows());
        ledger.apply_tag("u", &[0, 1], &ids(&[1]));
        assert!(ledger.has_marked_rows());
    }
}
