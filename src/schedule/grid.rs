use super::types::{Calendar, Cell, SlotId};

/// Assignment table: the slots currently placed in each (day, shift) cell,
/// in placement order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleGrid {
    num_shifts: usize,
    cells: Vec<Vec<SlotId>>,
}

impl ScheduleGrid {
    pub fn new(calendar: &Calendar) -> Self {
        Self {
            num_shifts: calendar.num_shifts(),
            cells: vec![Vec::new(); calendar.num_cells()],
        }
    }

    fn index(&self, cell: Cell) -> usize {
        cell.day * self.num_shifts + cell.shift
    }

    pub fn assigned(&self, cell: Cell) -> &[SlotId] {
        &self.cells[self.index(cell)]
    }

    pub fn contains(&self, cell: Cell, slot: SlotId) -> bool {
        self.assigned(cell).contains(&slot)
    }

    pub(crate) fn insert(&mut self, cell: Cell, slot: SlotId) {
        let i = self.index(cell);
        self.cells[i].push(slot);
    }

    /// Returns false when the slot was not in the cell.
    pub(crate) fn remove(&mut self, cell: Cell, slot: SlotId) -> bool {
        let i = self.index(cell);
        match self.cells[i].iter().position(|&s| s == slot) {
            Some(pos) => {
                self.cells[i].remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Every slot in every cell.
    pub fn iter_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.cells.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove_keeps_order() {
        let calendar = Calendar::new(vec!["Mon".into()], vec!["AM".into(), "PM".into()]);
        let mut grid = ScheduleGrid::new(&calendar);
        let cell = Cell::new(0, 1);
        grid.insert(cell, SlotId(3));
        grid.insert(cell, SlotId(1));
        grid.insert(cell, SlotId(7));
        assert!(grid.remove(cell, SlotId(1)));
        assert!(!grid.remove(cell, SlotId(1)));
        assert_eq!(grid.assigned(cell), &[SlotId(3), SlotId(7)]);
        assert!(grid.assigned(Cell::new(0, 0)).is_empty());
        assert_eq!(grid.iter_slots().count(), 2);

        grid.clear();
        assert_eq!(grid.iter_slots().count(), 0);
    }
}
