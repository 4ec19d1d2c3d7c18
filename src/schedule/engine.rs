use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::initial::initial_allocation;
use super::rebalance::{rebalance, RebalanceReport};
use super::roster::Roster;
use super::score::ScoreModel;
use super::state::ScheduleState;
use super::stats::ScheduleStats;
use super::types::Priority;
use super::validate::validate;
use crate::config::ScorePolicy;
use crate::error::Result;

/// Workers on one cell, by name, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellAssignment {
    pub day: String,
    pub shift: String,
    pub workers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerLoad {
    pub name: String,
    pub allocated: usize,
    pub max_shifts: u32,
    /// Average true score of the worker's shifts, `None` without shifts.
    pub average_priority: Option<f64>,
}

/// Everything reported about one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub seed: u64,
    pub schedule: Vec<CellAssignment>,
    pub workers: Vec<WorkerLoad>,
    pub stats: ScheduleStats,
    pub rebalance: RebalanceReport,
}

impl RunResult {
    /// Names on `day`/`shift`, empty if the cell is unknown.
    pub fn assigned(&self, day: &str, shift: &str) -> &[String] {
        self.schedule
            .iter()
            .find(|c| c.day == day && c.shift == shift)
            .map(|c| c.workers.as_slice())
            .unwrap_or(&[])
    }
}

/// Owns the run state for one roster. Runs are sequential; use one
/// scheduler per thread to run seeds in parallel.
pub struct Scheduler<'a> {
    roster: &'a Roster,
    policy: &'a ScorePolicy,
    state: ScheduleState,
    dirty: bool,
}

impl<'a> Scheduler<'a> {
    pub fn new(roster: &'a Roster, policy: &'a ScorePolicy) -> Self {
        Self {
            roster,
            policy,
            state: ScheduleState::new(roster),
            dirty: false,
        }
    }

    pub fn roster(&self) -> &Roster {
        self.roster
    }

    /// State of the last run.
    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    /// Clears everything a run changed. The roster is untouched.
    pub fn reset(&mut self) {
        self.state.reset(self.roster);
        self.dirty = false;
    }

    /// One full run: jitter, greedy fill, rebalance, validate, summarise.
    pub fn run(&mut self, seed: u64) -> Result<RunResult> {
        if self.dirty {
            self.reset();
        }
        self.dirty = true;

        let roster = self.roster;
        let model = ScoreModel::new(roster, self.policy);
        let mut rng = StdRng::seed_from_u64(seed);

        self.state.apply_jitter(roster, &mut rng, self.policy.jitter_divisor);
        initial_allocation(roster, &model, &mut self.state, &mut rng)?;
        let report = rebalance(roster, &model, &mut self.state)?;
        validate(roster, &self.state)?;

        let stats = ScheduleStats::compute(roster, &model, &self.state);
        tracing::debug!(
            seed,
            exchanges = report.exchanges,
            average = stats.average(),
            range = stats.range(),
            "run finished"
        );
        Ok(RunResult {
            seed,
            schedule: self.snapshot(),
            workers: self.loads(&model),
            stats,
            rebalance: report,
        })
    }

    fn snapshot(&self) -> Vec<CellAssignment> {
        let roster = self.roster;
        roster
            .calendar()
            .cells()
            .map(|cell| CellAssignment {
                day: roster.day_name(cell).to_string(),
                shift: roster.shift_name(cell).to_string(),
                workers: self
                    .state
                    .grid()
                    .assigned(cell)
                    .iter()
                    .map(|&slot| roster.owner_name(slot).to_string())
                    .collect(),
            })
            .collect()
    }

    fn loads(&self, model: &ScoreModel<'_>) -> Vec<WorkerLoad> {
        self.roster
            .worker_ids()
            .map(|id| {
                let allocated = self.state.worker(id).allocated();
                let average_priority = (!allocated.is_empty()).then(|| {
                    allocated
                        .iter()
                        .map(|&slot| model.score(&self.state, slot, Priority::True))
                        .sum::<f64>()
                        / allocated.len() as f64
                });
                WorkerLoad {
                    name: self.roster.worker(id).name.clone(),
                    allocated: allocated.len(),
                    max_shifts: self.roster.worker(id).max_shifts,
                    average_priority,
                }
            })
            .collect()
    }
}
