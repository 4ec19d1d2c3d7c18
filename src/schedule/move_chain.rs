//! Exchange chains: alternating remove/add sequences that move one shift
//! from an overbooked worker to an underbooked one without changing any
//! cell's headcount.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::roster::Roster;
use super::score::ScoreModel;
use super::state::ScheduleState;
use super::types::{Priority, SlotId};
use crate::error::InvariantViolation;

/// Queue entry: cumulative score delta of the chain ending at `slot`.
#[derive(Debug, Clone, Copy)]
struct ChainEntry {
    value: f64,
    slot: SlotId,
}

impl PartialEq for ChainEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChainEntry {}

impl PartialOrd for ChainEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChainEntry {
    /// Highest value first; equal values pop the lower slot first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

/// Best chain terminus found by [`find_move_chain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainEnd {
    pub value: f64,
    pub terminus: SlotId,
}

/// Best-first search for the best-scoring chain that removes `start`.
///
/// Even positions on a chain are allocated slots to drop, odd positions are
/// unused slots in the same cell to take instead. A chain may end on any
/// unused slot whose owner is booked at least two below the start owner. The whole queue is drained so the best such end is returned,
/// not the first. Predecessors are left on the state for [`build_chain`].
pub fn find_move_chain(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    start: SlotId,
) -> Option<ChainEnd> {
    state.reset_search();

    let overbooked = state.worker(roster.owner(start)).relative_booking();
    let mut paths = BinaryHeap::new();
    paths.push(ChainEntry {
        value: -model.score(state, start, Priority::Jittered),
        slot: start,
    });
    state.mark_seen(start, None);

    let mut best: Option<ChainEnd> = None;
    while let Some(current) = paths.pop() {
        find_node_to_add(roster, model, state, &mut paths, &mut best, current, overbooked);
    }
    best
}

/// Expands `current` with every unused, unseen slot in its cell.
fn find_node_to_add(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    paths: &mut BinaryHeap<ChainEntry>,
    best: &mut Option<ChainEnd>,
    current: ChainEntry,
    overbooked: i32,
) {
    let cell = roster.slot(current.slot).cell;
    for &neighbor in roster.slots_in(cell) {
        if state.is_seen(neighbor) || state.is_used(neighbor) {
            continue;
        }
        state.mark_seen(neighbor, Some(current.slot));

        let gained = model.score(state, neighbor, Priority::Jittered);
        let neighbor_booking = state.worker(roster.owner(neighbor)).relative_booking();
        if overbooked - neighbor_booking > 1 {
            let value = current.value + gained;
            if best.map_or(true, |b| value > b.value) {
                *best = Some(ChainEnd {
                    value,
                    terminus: neighbor,
                });
            }
        }

        find_node_to_drop(roster, model, state, paths, neighbor, current.value + gained);
    }
}

/// The neighbor's owner keeps their booking by dropping one of their other
/// allocated shifts; each candidate becomes a new chain head.
fn find_node_to_drop(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    paths: &mut BinaryHeap<ChainEntry>,
    neighbor: SlotId,
    value_with_neighbor: f64,
) {
    let owner = roster.owner(neighbor);
    let allocations: Vec<SlotId> = state.worker(owner).allocated().to_vec();
    for allocated in allocations {
        if allocated == neighbor || state.is_seen(allocated) {
            continue;
        }
        state.mark_seen(allocated, Some(neighbor));
        let value = value_with_neighbor - model.score(state, allocated, Priority::Jittered);
        paths.push(ChainEntry {
            value,
            slot: allocated,
        });
    }
}

/// Follows predecessors back from `terminus`; the returned chain starts at
/// the removed root.
pub fn build_chain(state: &ScheduleState, terminus: SlotId) -> Vec<SlotId> {
    let mut chain = Vec::new();
    let mut current = Some(terminus);
    while let Some(slot) = current {
        chain.push(slot);
        current = state.predecessor(slot);
    }
    chain.reverse();
    chain
}

/// Applies a chain: index 0 is deallocated, index 1 allocated, and so on,
/// ending on an allocation.
pub fn apply_move_chain(
    roster: &Roster,
    state: &mut ScheduleState,
    chain: &[SlotId],
) -> Result<(), InvariantViolation> {
    for (i, &slot) in chain.iter().enumerate() {
        if i % 2 == 0 {
            state.deallocate(roster, slot)?;
        } else {
            state.allocate(roster, slot)?;
        }
    }
    Ok(())
}
