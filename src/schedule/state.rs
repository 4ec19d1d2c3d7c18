//! Run-scoped mutable state: the grid, every worker's bookings, and the
//! per-slot flags. Everything here is reset between runs; the [`Roster`] is not.

use rand::Rng;

use super::grid::ScheduleGrid;
use super::roster::Roster;
use super::types::{SlotId, WorkerId};
use super::worker_state::{BookingError, WorkerState};
use crate::error::InvariantViolation;

/// Per-slot run state.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    pub jittered_priority: f64,
    pub used: bool,
    /// Search-scoped; only meaningful during one path search.
    pub seen: bool,
    /// Search-scoped; only meaningful during one path search.
    pub predecessor: Option<SlotId>,
}

#[derive(Debug, Clone)]
pub struct ScheduleState {
    pub(crate) grid: ScheduleGrid,
    pub(crate) workers: Vec<WorkerState>,
    pub(crate) slots: Vec<SlotState>,
}

impl ScheduleState {
    pub fn new(roster: &Roster) -> Self {
        let workers = roster
            .workers()
            .iter()
            .map(|w| WorkerState::new(w.max_shifts))
            .collect();
        let slots = (0..roster.num_slots())
            .map(|i| SlotState {
                jittered_priority: roster.slot(SlotId(i)).true_priority,
                used: false,
                seen: false,
                predecessor: None,
            })
            .collect();
        Self {
            grid: ScheduleGrid::new(roster.calendar()),
            workers,
            slots,
        }
    }

    /// Back to the state right after construction, without reallocating.
    pub fn reset(&mut self, roster: &Roster) {
        self.grid.clear();
        for worker in &mut self.workers {
            worker.reset();
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            slot.jittered_priority = roster.slot(SlotId(i)).true_priority;
            slot.used = false;
            slot.seen = false;
            slot.predecessor = None;
        }
    }

    /// Adds a small seeded offset to every slot's priority, in slot order.
    pub fn apply_jitter<R: Rng>(&mut self, roster: &Roster, rng: &mut R, divisor: f64) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let tiny_change = rng.gen::<f64>() / divisor;
            slot.jittered_priority = roster.slot(SlotId(i)).true_priority + tiny_change;
        }
    }

    pub fn grid(&self) -> &ScheduleGrid {
        &self.grid
    }

    pub fn worker(&self, id: WorkerId) -> &WorkerState {
        &self.workers[id.index()]
    }

    pub fn workers(&self) -> &[WorkerState] {
        &self.workers
    }

    pub fn slot(&self, id: SlotId) -> &SlotState {
        &self.slots[id.index()]
    }

    pub fn is_used(&self, id: SlotId) -> bool {
        self.slots[id.index()].used
    }

    pub fn is_seen(&self, id: SlotId) -> bool {
        self.slots[id.index()].seen
    }

    pub(crate) fn mark_seen(&mut self, id: SlotId, predecessor: Option<SlotId>) {
        let slot = &mut self.slots[id.index()];
        slot.seen = true;
        slot.predecessor = predecessor;
    }

    pub fn predecessor(&self, id: SlotId) -> Option<SlotId> {
        self.slots[id.index()].predecessor
    }

    pub(crate) fn reset_search(&mut self) {
        for slot in &mut self.slots {
            slot.seen = false;
            slot.predecessor = None;
        }
    }

    pub(crate) fn reset_no_path(&mut self) {
        for worker in &mut self.workers {
            worker.no_path = false;
        }
    }

    /// Places a slot: grid cell, owner's allocation set, booking counters and
    /// the used flag change together or not at all.
    pub fn allocate(&mut self, roster: &Roster, id: SlotId) -> Result<(), InvariantViolation> {
        let slot = roster.slot(id);
        let owner = &self.workers[slot.owner.index()];
        let reason = if self.slots[id.index()].used {
            Some("slot is already marked used".to_string())
        } else if self.grid.contains(slot.cell, id) {
            Some("slot is already in the grid".to_string())
        } else if owner.holds(id) {
            Some(BookingError::AlreadyAllocated(id).to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(transition("allocate", roster, id, reason));
        }

        self.workers[slot.owner.index()]
            .allocate(id)
            .map_err(|e| transition("allocate", roster, id, e.to_string()))?;
        self.grid.insert(slot.cell, id);
        self.slots[id.index()].used = true;
        Ok(())
    }

    /// Inverse of [`allocate`](Self::allocate).
    pub fn deallocate(&mut self, roster: &Roster, id: SlotId) -> Result<(), InvariantViolation> {
        let slot = roster.slot(id);
        let owner = &self.workers[slot.owner.index()];
        let reason = if !self.slots[id.index()].used {
            Some("slot is not marked used".to_string())
        } else if !self.grid.contains(slot.cell, id) {
            Some("slot is not in the grid".to_string())
        } else if !owner.holds(id) {
            Some(BookingError::NotAllocated(id).to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(transition("deallocate", roster, id, reason));
        }

        self.workers[slot.owner.index()]
            .deallocate(id)
            .map_err(|e| transition("deallocate", roster, id, e.to_string()))?;
        self.grid.remove(slot.cell, id);
        self.slots[id.index()].used = false;
        Ok(())
    }

    /// `max - min` relative booking over every worker, or 0 with no workers.
    pub fn booking_gap(&self) -> i32 {
        let bookings = self.workers.iter().map(|w| w.relative_booking());
        match (bookings.clone().max(), bookings.min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        }
    }
}

fn transition(action: &'static str, roster: &Roster, id: SlotId, reason: String) -> InvariantViolation {
    let cell = roster.slot(id).cell;
    InvariantViolation::Transition {
        action,
        worker: roster.owner_name(id).to_string(),
        day: roster.day_name(cell).to_string(),
        shift: roster.shift_name(cell).to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::roster::WorkerInput;
    use crate::schedule::types::{Calendar, Cell, RequirementTable};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster() -> Roster {
        Roster::new(
            Calendar::new(vec!["Mon".into()], vec!["AM".into(), "PM".into()]),
            RequirementTable::from_rows(vec![vec![1, 1]]),
            vec![
                WorkerInput {
                    name: "Ana".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.9), (0, 1, 0.2)],
                    liked: vec![],
                },
                WorkerInput {
                    name: "Bo".into(),
                    max_shifts: 2,
                    availability: vec![(0, 0, 0.5)],
                    liked: vec![],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_allocate_updates_everything() {
        let roster = roster();
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(0)).unwrap();

        assert!(state.is_used(SlotId(0)));
        assert_eq!(state.grid().assigned(Cell::new(0, 0)), &[SlotId(0)]);
        assert_eq!(state.worker(WorkerId(0)).allocated(), &[SlotId(0)]);
        assert_eq!(state.worker(WorkerId(0)).relative_booking(), 0);
        assert_eq!(state.booking_gap(), 2);
    }

    #[test]
    fn test_double_allocate_is_violation_and_leaves_state() {
        let roster = roster();
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(1)).unwrap();
        let before = state.workers().to_vec();

        let err = state.allocate(&roster, SlotId(1)).unwrap_err();
        assert!(matches!(err, InvariantViolation::Transition { action: "allocate", .. }));
        assert_eq!(state.workers(), before.as_slice());
        assert_eq!(state.grid().assigned(Cell::new(0, 1)).len(), 1);
    }

    #[test]
    fn test_deallocate_unused_is_violation() {
        let roster = roster();
        let mut state = ScheduleState::new(&roster);
        let err = state.deallocate(&roster, SlotId(2)).unwrap_err();
        assert!(err.to_string().contains("Bo"));
    }

    #[test]
    fn test_deallocate_round_trip() {
        let roster = roster();
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(2)).unwrap();
        state.deallocate(&roster, SlotId(2)).unwrap();
        assert!(!state.is_used(SlotId(2)));
        assert!(state.grid().assigned(Cell::new(0, 0)).is_empty());
        assert_eq!(state.worker(WorkerId(1)).relative_booking(), -2);
    }

    #[test]
    fn test_jitter_is_seeded_and_small() {
        let roster = roster();
        let mut a = ScheduleState::new(&roster);
        let mut b = ScheduleState::new(&roster);
        a.apply_jitter(&roster, &mut StdRng::seed_from_u64(5), 1_000_000.0);
        b.apply_jitter(&roster, &mut StdRng::seed_from_u64(5), 1_000_000.0);
        for i in 0..roster.num_slots() {
            let id = SlotId(i);
            assert_eq!(a.slot(id).jittered_priority, b.slot(id).jittered_priority);
            let delta = a.slot(id).jittered_priority - roster.slot(id).true_priority;
            assert!((0.0..1e-6).contains(&delta));
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let roster = roster();
        let mut state = ScheduleState::new(&roster);
        state.apply_jitter(&roster, &mut StdRng::seed_from_u64(1), 10.0);
        state.allocate(&roster, SlotId(0)).unwrap();
        state.mark_seen(SlotId(2), Some(SlotId(0)));
        state.workers[1].no_path = true;

        state.reset(&roster);
        let fresh = ScheduleState::new(&roster);
        assert_eq!(state.slots, fresh.slots);
        assert_eq!(state.workers, fresh.workers);
        assert_eq!(state.grid, fresh.grid);
    }
}
