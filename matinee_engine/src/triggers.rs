//! Script-trigger cells: named cell groups that arm a script group when the
//! actor's feet probes land on them.

use std::collections::HashSet;

use matinee_formats::ScriptCellsDoc;

use crate::grid::Cell;

#[derive(Debug, Clone)]
pub struct TriggerGroup {
    pub script_group: String,
    /// True: fires on the action key while occupied. False: fires on entry.
    pub needs_action: bool,
    cells: HashSet<Cell>,
}

impl TriggerGroup {
    pub fn from_doc(doc: &ScriptCellsDoc) -> Self {
        TriggerGroup {
            script_group: doc.script_group.clone(),
            needs_action: doc.need_use_key,
            cells: doc
                .cells
                .iter()
                .map(|cell| Cell::new(cell.row, cell.col))
                .collect(),
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriggerIndex {
    groups: Vec<TriggerGroup>,
}

impl TriggerIndex {
    pub fn from_docs(docs: &[ScriptCellsDoc]) -> Self {
        TriggerIndex {
            groups: docs.iter().map(TriggerGroup::from_doc).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The first group, in document order, whose mode matches `action` and
    /// whose cell set contains any probe cell.
    pub fn match_probes(&self, probes: &[Cell], action: bool) -> Option<&TriggerGroup> {
        self.groups
            .iter()
            .filter(|group| group.needs_action == action)
            .find(|group| probes.iter().any(|&cell| group.contains(cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matinee_formats::CellDoc;

    fn index() -> TriggerIndex {
        TriggerIndex::from_docs(&[
            ScriptCellsDoc {
                need_use_key: false,
                script_group: "doorway".into(),
                cells: vec![CellDoc { row: 2, col: 4 }, CellDoc { row: 2, col: 5 }],
            },
            ScriptCellsDoc {
                need_use_key: true,
                script_group: "lever".into(),
                cells: vec![CellDoc { row: 6, col: 1 }],
            },
        ])
    }

    #[test]
    fn auto_groups_match_on_entry_probes() {
        let index = index();
        let hit = index
            .match_probes(&[Cell::new(2, 5)], false)
            .expect("auto hit");
        assert_eq!(hit.script_group, "doorway");
        assert!(index.match_probes(&[Cell::new(2, 5)], true).is_none());
    }

    #[test]
    fn action_groups_only_match_with_the_action_flag() {
        let index = index();
        assert!(index.match_probes(&[Cell::new(6, 1)], false).is_none());
        let hit = index
            .match_probes(&[Cell::new(6, 1)], true)
            .expect("action hit");
        assert_eq!(hit.script_group, "lever");
        assert!(hit.needs_action);
    }

    #[test]
    fn unmarked_cells_match_nothing() {
        let index = index();
        let probes = [Cell::new(0, 0), Cell::new(11, 15)];
        assert!(index.match_probes(&probes, false).is_none());
        assert!(index.match_probes(&probes, true).is_none());
    }

    #[test]
    fn any_probe_point_can_hit() {
        let index = index();
        let probes = [Cell::new(9, 9), Cell::new(2, 4), Cell::new(9, 10)];
        assert!(index.match_probes(&probes, false).is_some());
    }
}
