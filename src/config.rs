use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule::{Calendar, RequirementTable};

/// Penalty and bonus constants used by the score model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePolicy {
    /// Two shifts on the same day that are not back to back.
    pub double_day_penalty: f64,
    /// Two shifts back to back. Does not also count as a double day.
    pub double_shift_penalty: f64,
    /// Growth factor applied per repeated infraction.
    pub penalty_factor: f64,
    /// Added once per liked coworker sharing the shift.
    pub coworker_bonus: f64,
    /// Jitter is drawn uniformly from `[0, 1 / jitter_divisor)`.
    pub jitter_divisor: f64,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            double_day_penalty: 0.5,
            double_shift_penalty: 1.0,
            penalty_factor: 2.0,
            coworker_bonus: 1.0,
            jitter_divisor: 1_000_000.0,
        }
    }
}

/// Weights for ranking runs against each other during a seed sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub average: f64,
    pub least_happy: f64,
    /// Subtracted per unit of booking range.
    pub range: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            average: 0.7,
            least_happy: 0.2,
            range: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// Spaces on either side of each name inside a box.
    pub padding: usize,
    /// When a name cannot be centred exactly, lean it left instead of right.
    pub center_left: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            padding: 2,
            center_left: false,
        }
    }
}

/// Everything about a schedule that is not per-worker input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub days: Vec<String>,
    pub shifts: Vec<String>,
    /// Required headcount, indexed `[day][shift]`.
    pub workers_per_shift: Vec<Vec<u32>>,
    pub policy: ScorePolicy,
    pub fitness: FitnessWeights,
    pub printing: PrintOptions,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let days = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Sunday"];
        let shifts = [
            "10:30-11:45",
            "12:00-1:15",
            "1:30-2:45",
            "3:00-4:15",
            "4:30-5:45",
            "6:00-7:15",
            "7:30-8:45",
            "9:00-10:15",
        ];
        Self {
            days: days.iter().map(|d| d.to_string()).collect(),
            shifts: shifts.iter().map(|s| s.to_string()).collect(),
            workers_per_shift: vec![
                vec![2, 2, 2, 2, 2, 2, 2, 2],
                vec![2, 2, 2, 2, 2, 3, 3, 3],
                vec![2, 2, 2, 2, 2, 2, 2, 2],
                vec![2, 2, 2, 2, 2, 2, 2, 2],
                vec![2, 2, 2, 2, 2, 0, 0, 0],
                vec![2, 2, 2, 2, 2, 2, 2, 2],
            ],
            policy: ScorePolicy::default(),
            fitness: FitnessWeights::default(),
            printing: PrintOptions::default(),
        }
    }
}

impl ScheduleConfig {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScheduleConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() || self.shifts.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one day and one shift are required".to_string(),
            ));
        }
        if self.workers_per_shift.len() != self.days.len() {
            return Err(ConfigError::Invalid(format!(
                "workers_per_shift has {} rows but there are {} days",
                self.workers_per_shift.len(),
                self.days.len()
            )));
        }
        for (day, row) in self.days.iter().zip(&self.workers_per_shift) {
            if row.len() != self.shifts.len() {
                return Err(ConfigError::Invalid(format!(
                    "workers_per_shift row for {} has {} entries but there are {} shifts",
                    day,
                    row.len(),
                    self.shifts.len()
                )));
            }
        }
        // Day and shift names are matched as single whitespace-free tokens.
        for name in self.days.iter().chain(&self.shifts) {
            if name.is_empty() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "day and shift names must be non-empty without spaces: {:?}",
                    name
                )));
            }
        }

        let p = &self.policy;
        let constants = [
            ("double_day_penalty", p.double_day_penalty),
            ("double_shift_penalty", p.double_shift_penalty),
            ("penalty_factor", p.penalty_factor),
            ("coworker_bonus", p.coworker_bonus),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if !p.jitter_divisor.is_finite() || p.jitter_divisor <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "jitter_divisor must be positive, got {}",
                p.jitter_divisor
            )));
        }
        Ok(())
    }

    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.days.clone(), self.shifts.clone())
    }

    pub fn requirements(&self) -> RequirementTable {
        RequirementTable::from_rows(self.workers_per_shift.clone())
    }
}
