use rand::seq::SliceRandom;
use rand::Rng;

use super::roster::Roster;
use super::score::ScoreModel;
use super::state::ScheduleState;
use super::types::{Cell, Priority, SlotId};
use crate::error::ScheduleError;

/// Greedily fills every cell to its required headcount.
///
/// Cells are visited in a seeded random order. Within a cell the best
/// jittered score wins; ties go to the owner with the most shifts remaining,
/// then to the lowest slot id.
pub fn initial_allocation<R: Rng>(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    rng: &mut R,
) -> Result<(), ScheduleError> {
    let mut cells: Vec<Cell> = roster
        .calendar()
        .cells()
        .filter(|&cell| roster.required(cell) > 0)
        .collect();
    cells.shuffle(rng);

    for cell in cells {
        fill_cell(roster, model, state, cell)?;
    }
    Ok(())
}

fn fill_cell(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    cell: Cell,
) -> Result<(), ScheduleError> {
    let required = roster.required(cell);
    for filled in 0..required {
        let chosen = pick_slot(roster, model, state, cell).ok_or_else(|| {
            ScheduleError::SupplyExhausted {
                day: roster.day_name(cell).to_string(),
                shift: roster.shift_name(cell).to_string(),
                required,
                filled,
            }
        })?;
        state.allocate(roster, chosen)?;
    }
    Ok(())
}

/// Best unused slot for `cell`, or `None` when every candidate is used.
fn pick_slot(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &ScheduleState,
    cell: Cell,
) -> Option<SlotId> {
    let scored: Vec<(SlotId, f64)> = roster
        .slots_in(cell)
        .iter()
        .filter(|&&id| !state.is_used(id))
        .map(|&id| (id, model.score(state, id, Priority::Jittered)))
        .collect();

    let highest = scored
        .iter()
        .map(|&(_, score)| score)
        .fold(None, |best: Option<f64>, s| match best {
            Some(b) if b >= s => Some(b),
            _ => Some(s),
        })?;

    // Among the top scores, prefer the least booked worker.
    let mut chosen: Option<(SlotId, i32)> = None;
    let mut tied = 0;
    for &(id, score) in &scored {
        if score != highest {
            continue;
        }
        tied += 1;
        let remaining = state.worker(roster.owner(id)).shifts_remaining();
        match chosen {
            Some((_, best)) if best >= remaining => {}
            _ => chosen = Some((id, remaining)),
        }
    }
    if tied > 1 {
        tracing::debug!(
            day = %roster.day_name(cell),
            shift = %roster.shift_name(cell),
            tied,
            "multiple slots tied for highest priority"
        );
    }
    chosen.map(|(id, _)| id)
}
