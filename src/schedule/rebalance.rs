use serde::Serialize;

use super::move_chain::{apply_move_chain, build_chain, find_move_chain};
use super::roster::Roster;
use super::score::ScoreModel;
use super::state::ScheduleState;
use super::types::{SlotId, WorkerId};
use crate::error::InvariantViolation;

/// What one rebalance pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RebalanceReport {
    pub exchanges: usize,
    /// Booking gap over every worker after each applied exchange.
    pub gaps: Vec<i32>,
    /// Workers still flagged as having no improving exchange at the end.
    pub flagged: usize,
}

/// Moves shifts from the most booked worker to less booked ones until the
/// booking gap among unflagged workers is at most one.
///
/// A worker with no improving exchange is flagged and left out of the
/// min/max until some other exchange succeeds. Running out of unflagged
/// workers is a normal stop.
pub fn rebalance(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
) -> Result<RebalanceReport, InvariantViolation> {
    let mut report = RebalanceReport::default();

    while let Some((target, gap)) = most_booked(roster, state) {
        if gap <= 1 {
            break;
        }
        match search_worker(roster, model, state, target) {
            Some(chain) => {
                apply_move_chain(roster, state, &chain)?;
                state.reset_no_path();
                report.exchanges += 1;
                report.gaps.push(state.booking_gap());
                tracing::debug!(
                    worker = %roster.worker(target).name,
                    length = chain.len(),
                    gap = state.booking_gap(),
                    "applied exchange"
                );
            }
            None => {
                tracing::debug!(worker = %roster.worker(target).name, "no improving exchange");
                state.workers[target.index()].no_path = true;
            }
        }
    }

    report.flagged = state.workers().iter().filter(|w| w.no_path).count();
    Ok(report)
}

/// The most booked unflagged worker (first in roster order) and the gap to
/// the least booked unflagged one.
fn most_booked(roster: &Roster, state: &ScheduleState) -> Option<(WorkerId, i32)> {
    let mut max: Option<(WorkerId, i32)> = None;
    let mut min: Option<i32> = None;
    for id in roster.worker_ids() {
        let worker = state.worker(id);
        if worker.no_path {
            continue;
        }
        let booking = worker.relative_booking();
        if max.map_or(true, |(_, m)| booking > m) {
            max = Some((id, booking));
        }
        if min.map_or(true, |m| booking < m) {
            min = Some(booking);
        }
    }
    let (target, highest) = max?;
    Some((target, highest - min?))
}

/// Tries every allocated slot of `target` as the chain root and keeps the
/// best chain. Predecessors are overwritten by each search, so the chain is
/// built as soon as a better end is found.
fn search_worker(
    roster: &Roster,
    model: &ScoreModel<'_>,
    state: &mut ScheduleState,
    target: WorkerId,
) -> Option<Vec<SlotId>> {
    let roots: Vec<SlotId> = state.worker(target).allocated().to_vec();
    let mut best: Option<(f64, Vec<SlotId>)> = None;
    for root in roots {
        if let Some(end) = find_move_chain(roster, model, state, root) {
            if best.as_ref().map_or(true, |(value, _)| end.value > *value) {
                best = Some((end.value, build_chain(state, end.terminus)));
            }
        }
    }
    best.map(|(_, chain)| chain)
}
