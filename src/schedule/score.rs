//! Live slot scoring.
//!
//! A slot's score is never stored: the penalty depends on what else its owner
//! currently holds and the bonus on who else currently occupies its cell, so
//! every call reads the current [`ScheduleState`].

use super::roster::Roster;
use super::state::ScheduleState;
use super::types::{Priority, SlotId};
use crate::config::ScorePolicy;

/// Penalty for `times` infractions of one kind.
///
/// Grows by `factor` per extra infraction but is divided by `times + 1`,
/// since every other slot involved is penalised for the same pair.
pub fn exponentiate_penalty(times: u32, factor: f64, penalty: f64) -> f64 {
    if times == 0 {
        return 0.0;
    }
    let final_factor = factor.powi(times as i32 - 1);
    (final_factor * penalty) / (times as f64 + 1.0)
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreModel<'a> {
    roster: &'a Roster,
    policy: &'a ScorePolicy,
}

impl<'a> ScoreModel<'a> {
    pub fn new(roster: &'a Roster, policy: &'a ScorePolicy) -> Self {
        Self { roster, policy }
    }

    pub fn policy(&self) -> &ScorePolicy {
        self.policy
    }

    /// `base - penalty + bonus` against the current state.
    pub fn score(&self, state: &ScheduleState, id: SlotId, priority: Priority) -> f64 {
        let base = match priority {
            Priority::True => self.roster.slot(id).true_priority,
            Priority::Jittered => state.slot(id).jittered_priority,
        };
        base - self.penalty(state, id) + self.bonus(state, id)
    }

    pub fn penalty(&self, state: &ScheduleState, id: SlotId) -> f64 {
        let slot = self.roster.slot(id);
        let mut double_day = 0;
        let mut double_shift = 0;
        for &other in state.worker(slot.owner).allocated() {
            if other == id {
                continue;
            }
            let other_cell = self.roster.slot(other).cell;
            if other_cell.day != slot.cell.day {
                continue;
            }
            if other_cell.is_adjacent(&slot.cell) {
                double_shift += 1;
            } else {
                double_day += 1;
            }
        }

        let p = self.policy;
        exponentiate_penalty(double_day, p.penalty_factor, p.double_day_penalty)
            + exponentiate_penalty(double_shift, p.penalty_factor, p.double_shift_penalty)
    }

    /// One bonus per liked coworker currently on the same cell.
    pub fn bonus(&self, state: &ScheduleState, id: SlotId) -> f64 {
        let slot = self.roster.slot(id);
        let owner = self.roster.worker(slot.owner);
        let liked_on_shift = state
            .grid()
            .assigned(slot.cell)
            .iter()
            .filter(|&&other| owner.likes(self.roster.owner(other)))
            .count();
        liked_on_shift as f64 * self.policy.coworker_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::roster::WorkerInput;
    use crate::schedule::types::{Calendar, RequirementTable};

    const EPS: f64 = 1e-12;

    fn roster() -> Roster {
        // Ana: Mon AM, Mon Noon, Mon PM, Tue AM. Bo: Mon AM. Cy: Mon AM.
        Roster::new(
            Calendar::new(
                vec!["Mon".into(), "Tue".into()],
                vec!["AM".into(), "Noon".into(), "PM".into()],
            ),
            RequirementTable::from_rows(vec![vec![3, 1, 1], vec![1, 0, 0]]),
            vec![
                WorkerInput {
                    name: "Ana".into(),
                    max_shifts: 4,
                    availability: vec![(0, 0, 0.8), (0, 1, 0.6), (0, 2, 0.4), (1, 0, 0.7)],
                    liked: vec!["Bo".into(), "Cy".into()],
                },
                WorkerInput {
                    name: "Bo".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.5)],
                    liked: vec![],
                },
                WorkerInput {
                    name: "Cy".into(),
                    max_shifts: 1,
                    availability: vec![(0, 0, 0.3)],
                    liked: vec!["Ana".into()],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_penalty_function_values() {
        assert_eq!(exponentiate_penalty(0, 2.0, 0.5), 0.0);
        assert!((exponentiate_penalty(1, 2.0, 0.5) - 0.25).abs() < EPS);
        assert!((exponentiate_penalty(2, 2.0, 0.5) - 1.0 / 3.0).abs() < EPS);
        assert!((exponentiate_penalty(3, 2.0, 0.5) - 0.5).abs() < EPS);
        assert!((exponentiate_penalty(1, 2.0, 1.0) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_empty_state_scores_base_priority() {
        let roster = roster();
        let policy = ScorePolicy::default();
        let model = ScoreModel::new(&roster, &policy);
        let state = ScheduleState::new(&roster);
        assert!((model.score(&state, SlotId(0), Priority::True) - 0.8).abs() < EPS);
        assert!((model.score(&state, SlotId(0), Priority::Jittered) - 0.8).abs() < EPS);
    }

    #[test]
    fn test_double_shift_and_double_day() {
        let roster = roster();
        let policy = ScorePolicy::default();
        let model = ScoreModel::new(&roster, &policy);
        let mut state = ScheduleState::new(&roster);

        // Ana holds Mon AM; Mon Noon is back to back, Mon PM is a double day.
        state.allocate(&roster, SlotId(0)).unwrap();
        assert!((model.penalty(&state, SlotId(1)) - 0.5).abs() < EPS);
        assert!((model.penalty(&state, SlotId(2)) - 0.25).abs() < EPS);
        assert_eq!(model.penalty(&state, SlotId(3)), 0.0);
        // A slot never penalises itself.
        assert_eq!(model.penalty(&state, SlotId(0)), 0.0);

        // Mon Noon taken too: PM now has one double shift and one double day.
        state.allocate(&roster, SlotId(1)).unwrap();
        assert!((model.penalty(&state, SlotId(2)) - 0.75).abs() < EPS);
        // AM sees Noon as a double shift.
        assert!((model.penalty(&state, SlotId(0)) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_bonus_is_directional() {
        let roster = roster();
        let policy = ScorePolicy::default();
        let model = ScoreModel::new(&roster, &policy);
        let mut state = ScheduleState::new(&roster);

        // Bo (4) and Cy (5) on Mon AM.
        state.allocate(&roster, SlotId(4)).unwrap();
        state.allocate(&roster, SlotId(5)).unwrap();

        // Ana likes both.
        assert!((model.bonus(&state, SlotId(0)) - 2.0).abs() < EPS);
        // Bo likes nobody even though Ana likes Bo.
        assert_eq!(model.bonus(&state, SlotId(4)), 0.0);
        // Cy likes Ana, who is not on the shift yet.
        assert_eq!(model.bonus(&state, SlotId(5)), 0.0);

        state.allocate(&roster, SlotId(0)).unwrap();
        assert!((model.bonus(&state, SlotId(5)) - 1.0).abs() < EPS);
        assert!((model.score(&state, SlotId(5), Priority::True) - 1.3).abs() < EPS);
    }

    #[test]
    fn test_policy_constants_are_used() {
        let roster = roster();
        let policy = ScorePolicy {
            double_shift_penalty: 3.0,
            coworker_bonus: 0.0,
            ..ScorePolicy::default()
        };
        let model = ScoreModel::new(&roster, &policy);
        let mut state = ScheduleState::new(&roster);
        state.allocate(&roster, SlotId(0)).unwrap();
        state.allocate(&roster, SlotId(4)).unwrap();
        assert!((model.score(&state, SlotId(1), Priority::True) - (0.6 - 1.5)).abs() < EPS);
        assert!((model.score(&state, SlotId(0), Priority::True) - 0.8).abs() < EPS);
    }
}
