use std::collections::HashSet;

use super::roster::Roster;
use super::state::ScheduleState;
use super::types::SlotId;
use crate::error::InvariantViolation;

/// Checks the finished state: headcount, one slot per worker per cell,
/// grid/worker agreement and booking counters. Returns the first failure.
pub fn validate(roster: &Roster, state: &ScheduleState) -> Result<(), InvariantViolation> {
    check_cells(roster, state)?;
    check_bijection(roster, state)?;
    check_bookings(roster, state)
}

fn check_cells(roster: &Roster, state: &ScheduleState) -> Result<(), InvariantViolation> {
    for cell in roster.calendar().cells() {
        let assigned = state.grid().assigned(cell);
        let expected = roster.required(cell);
        if assigned.len() != expected as usize {
            return Err(InvariantViolation::Headcount {
                day: roster.day_name(cell).to_string(),
                shift: roster.shift_name(cell).to_string(),
                expected,
                found: assigned.len(),
            });
        }

        let mut owners = HashSet::new();
        for &slot in assigned {
            if !owners.insert(roster.owner(slot)) {
                return Err(InvariantViolation::DuplicateWorker {
                    worker: roster.owner_name(slot).to_string(),
                    day: roster.day_name(cell).to_string(),
                    shift: roster.shift_name(cell).to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_bijection(roster: &Roster, state: &ScheduleState) -> Result<(), InvariantViolation> {
    let in_grid: HashSet<SlotId> = state.grid().iter_slots().collect();
    let mut in_workers = HashSet::new();

    for id in roster.worker_ids() {
        for &slot in state.worker(id).allocated() {
            in_workers.insert(slot);
            if !in_grid.contains(&slot) {
                return Err(missing(roster, slot, true));
            }
            if !state.is_used(slot) {
                return Err(used_flag(roster, slot, false));
            }
        }
    }
    for &slot in &in_grid {
        if !in_workers.contains(&slot) {
            return Err(missing(roster, slot, false));
        }
    }
    for i in 0..roster.num_slots() {
        let slot = SlotId(i);
        if state.is_used(slot) && !in_grid.contains(&slot) {
            return Err(used_flag(roster, slot, true));
        }
    }
    Ok(())
}

fn check_bookings(roster: &Roster, state: &ScheduleState) -> Result<(), InvariantViolation> {
    for id in roster.worker_ids() {
        let worker = state.worker(id);
        let count = worker.allocated_count() as i32;
        let expected_booking = count - worker.max_shifts();
        let expected_remaining = worker.max_shifts() - count;
        if worker.relative_booking() != expected_booking || worker.shifts_remaining() != expected_remaining {
            return Err(InvariantViolation::Booking {
                worker: roster.worker(id).name.clone(),
                relative_booking: worker.relative_booking(),
                remaining: worker.shifts_remaining(),
                expected_booking,
                expected_remaining,
            });
        }
    }
    Ok(())
}

fn missing(roster: &Roster, slot: SlotId, from_grid: bool) -> InvariantViolation {
    let cell = roster.slot(slot).cell;
    let worker = roster.owner_name(slot).to_string();
    let day = roster.day_name(cell).to_string();
    let shift = roster.shift_name(cell).to_string();
    if from_grid {
        InvariantViolation::MissingFromGrid { worker, day, shift }
    } else {
        InvariantViolation::MissingFromWorker { worker, day, shift }
    }
}

fn used_flag(roster: &Roster, slot: SlotId, used: bool) -> InvariantViolation {
    let cell = roster.slot(slot).cell;
    InvariantViolation::UsedFlag {
        worker: roster.owner_name(slot).to_string(),
        day: roster.day_name(cell).to_string(),
        shift: roster.shift_name(cell).to_string(),
        used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::roster::WorkerInput;
    use crate::schedule::types::{Calendar, Cell, RequirementTable};

    fn roster(required: u32) -> Roster {
        Roster::new(
            Calendar::new(vec!["Mon".into()], vec!["AM".into()]),
            RequirementTable::from_rows(vec![vec![required]]),
            vec![
                WorkerInput {
                    name: "Ana".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.9)],
                    liked: vec![],
                },
                WorkerInput {
                    name: "Bo".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.5)],
                    liked: vec![],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_state_passes() {
        let roster = roster(1);
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(1)).unwrap();
        assert_eq!(validate(&roster, &state), Ok(()));
    }

    #[test]
    fn test_headcount_short() {
        let roster = roster(2);
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(0)).unwrap();
        assert_eq!(
            validate(&roster, &state),
            Err(InvariantViolation::Headcount {
                day: "Mon".into(),
                shift: "AM".into(),
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_duplicate_owner_in_cell() {
        let roster = roster(2);
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(0)).unwrap();
        state.grid.insert(Cell::new(0, 0), SlotId(0));
        assert!(matches!(
            validate(&roster, &state),
            Err(InvariantViolation::DuplicateWorker { worker, .. }) if worker == "Ana"
        ));
    }

    #[test]
    fn test_grid_slot_without_owner_allocation() {
        let roster = roster(1);
        let mut state = ScheduleState::new(&roster);
        state.grid.insert(Cell::new(0, 0), SlotId(1));
        assert!(matches!(
            validate(&roster, &state),
            Err(InvariantViolation::MissingFromWorker { worker, .. }) if worker == "Bo"
        ));
    }

    #[test]
    fn test_stray_used_flag() {
        let roster = roster(1);
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(0)).unwrap();
        state.slots[1].used = true;
        assert!(matches!(
            validate(&roster, &state),
            Err(InvariantViolation::UsedFlag { used: true, .. })
        ));
    }
}
