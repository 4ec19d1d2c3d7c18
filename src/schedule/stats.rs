use serde::Serialize;

use super::roster::Roster;
use super::score::ScoreModel;
use super::state::ScheduleState;
use super::types::Priority;

/// A worker and the average true score of their shifts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerHappiness {
    pub name: String,
    pub average: f64,
}

/// Happiness summary of a finished schedule, scored without jitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleStats {
    average: f64,
    least_happy: Option<WorkerHappiness>,
    most_happy: Option<WorkerHappiness>,
    range: i32,
}

impl ScheduleStats {
    pub fn compute(roster: &Roster, model: &ScoreModel<'_>, state: &ScheduleState) -> Self {
        let mut total = 0.0;
        let mut total_shifts = 0usize;
        let mut least_happy: Option<WorkerHappiness> = None;
        let mut most_happy: Option<WorkerHappiness> = None;

        for id in roster.worker_ids() {
            let allocated = state.worker(id).allocated();
            if allocated.is_empty() {
                continue;
            }
            let sum: f64 = allocated
                .iter()
                .map(|&slot| model.score(state, slot, Priority::True))
                .sum();
            total += sum;
            total_shifts += allocated.len();

            let average = sum / allocated.len() as f64;
            if least_happy.as_ref().map_or(true, |w| average < w.average) {
                least_happy = Some(WorkerHappiness {
                    name: roster.worker(id).name.clone(),
                    average,
                });
            }
            if most_happy.as_ref().map_or(true, |w| average > w.average) {
                most_happy = Some(WorkerHappiness {
                    name: roster.worker(id).name.clone(),
                    average,
                });
            }
        }

        Self {
            average: if total_shifts == 0 {
                0.0
            } else {
                total / total_shifts as f64
            },
            least_happy,
            most_happy,
            range: state.booking_gap(),
        }
    }

    /// Average true score over every allocated shift.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// 0 when nobody works.
    pub fn least_happy_average(&self) -> f64 {
        self.least_happy.as_ref().map_or(0.0, |w| w.average)
    }

    pub fn most_happy_average(&self) -> f64 {
        self.most_happy.as_ref().map_or(0.0, |w| w.average)
    }

    pub fn least_happy(&self) -> Option<&WorkerHappiness> {
        self.least_happy.as_ref()
    }

    pub fn most_happy(&self) -> Option<&WorkerHappiness> {
        self.most_happy.as_ref()
    }

    /// Spread between the most and least booked worker.
    pub fn range(&self) -> i32 {
        self.range
    }
}
