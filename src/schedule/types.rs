use serde::{Deserialize, Serialize};

/// Handle of a worker inside a [`Roster`](super::Roster).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

/// Handle of an availability slot inside a [`Roster`](super::Roster).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub usize);

impl WorkerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A (day, shift) pair of the weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub day: usize,
    pub shift: usize,
}

impl Cell {
    pub fn new(day: usize, shift: usize) -> Self {
        Self { day, shift }
    }

    /// Back-to-back shifts on the same day.
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.day == other.day && self.shift.abs_diff(other.shift) == 1
    }
}

/// Which base priority a score starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// The stated preference.
    True,
    /// The stated preference plus the run's seeded jitter.
    Jittered,
}

/// Day and shift names of the week being scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    days: Vec<String>,
    shifts: Vec<String>,
}

impl Calendar {
    pub fn new(days: Vec<String>, shifts: Vec<String>) -> Self {
        Self { days, shifts }
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn shifts(&self) -> &[String] {
        &self.shifts
    }

    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn num_shifts(&self) -> usize {
        self.shifts.len()
    }

    pub fn num_cells(&self) -> usize {
        self.days.len() * self.shifts.len()
    }

    pub fn day_index(&self, name: &str) -> Option<usize> {
        self.days.iter().position(|d| d == name)
    }

    pub fn shift_index(&self, name: &str) -> Option<usize> {
        self.shifts.iter().position(|s| s == name)
    }

    pub fn day_name(&self, cell: Cell) -> &str {
        &self.days[cell.day]
    }

    pub fn shift_name(&self, cell: Cell) -> &str {
        &self.shifts[cell.shift]
    }

    /// Flat index of a cell, row-major by day.
    pub fn cell_index(&self, cell: Cell) -> usize {
        cell.day * self.shifts.len() + cell.shift
    }

    /// All cells, Monday first shift first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.days.len())
            .flat_map(move |day| (0..self.shifts.len()).map(move |shift| Cell::new(day, shift)))
    }
}

/// Required headcount per cell, indexed `[day][shift]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementTable {
    rows: Vec<Vec<u32>>,
}

impl RequirementTable {
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Self {
        Self { rows }
    }

    /// Cells outside the table require nobody.
    pub fn get(&self, cell: Cell) -> u32 {
        self.rows
            .get(cell.day)
            .and_then(|row| row.get(cell.shift))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn set(&mut self, cell: Cell, required: u32) {
        if let Some(slot) = self.rows.get_mut(cell.day).and_then(|row| row.get_mut(cell.shift)) {
            *slot = required;
        }
    }

    pub fn total(&self) -> u32 {
        self.rows.iter().flatten().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> Calendar {
        Calendar::new(
            vec!["Mon".into(), "Tue".into()],
            vec!["AM".into(), "Noon".into(), "PM".into()],
        )
    }

    #[test]
    fn test_cell_adjacency() {
        assert!(Cell::new(0, 1).is_adjacent(&Cell::new(0, 0)));
        assert!(Cell::new(0, 1).is_adjacent(&Cell::new(0, 2)));
        assert!(!Cell::new(0, 0).is_adjacent(&Cell::new(0, 2)));
        assert!(!Cell::new(0, 1).is_adjacent(&Cell::new(1, 1)));
        assert!(!Cell::new(0, 1).is_adjacent(&Cell::new(0, 1)));
    }

    #[test]
    fn test_calendar_lookup() {
        let cal = calendar();
        assert_eq!(cal.day_index("Tue"), Some(1));
        assert_eq!(cal.shift_index("PM"), Some(2));
        assert_eq!(cal.shift_index("Night"), None);
        assert_eq!(cal.num_cells(), 6);
        assert_eq!(cal.cell_index(Cell::new(1, 0)), 3);
        let cells: Vec<Cell> = cal.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[4], Cell::new(1, 1));
    }

    #[test]
    fn test_requirements_out_of_range_is_zero() {
        let mut table = RequirementTable::from_rows(vec![vec![1, 2], vec![3, 0]]);
        assert_eq!(table.get(Cell::new(1, 0)), 3);
        assert_eq!(table.get(Cell::new(5, 0)), 0);
        assert_eq!(table.total(), 6);
        table.set(Cell::new(0, 1), 1);
        assert_eq!(table.get(Cell::new(0, 1)), 1);
    }
}
