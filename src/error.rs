use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a single scheduling run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("cannot fill {day} {shift}: {required} workers required but only {filled} could be assigned")]
    SupplyExhausted {
        day: String,
        shift: String,
        required: u32,
        filled: u32,
    },

    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Bookkeeping inconsistencies. Any of these indicates a bug in
/// allocate/deallocate, never a data condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("wrong number of workers on {day} {shift}: expected {expected}, found {found}")]
    Headcount {
        day: String,
        shift: String,
        expected: u32,
        found: usize,
    },

    #[error("{worker} is on {day} {shift} more than once")]
    DuplicateWorker {
        worker: String,
        day: String,
        shift: String,
    },

    #[error("{worker} holds {day} {shift} but the grid does not")]
    MissingFromGrid {
        worker: String,
        day: String,
        shift: String,
    },

    #[error("grid holds {worker} on {day} {shift} but the worker does not")]
    MissingFromWorker {
        worker: String,
        day: String,
        shift: String,
    },

    #[error("{worker} on {day} {shift} has used = {used}, inconsistent with the allocation")]
    UsedFlag {
        worker: String,
        day: String,
        shift: String,
        used: bool,
    },

    #[error("{worker} has booking {relative_booking} with {remaining} remaining, expected {expected_booking} and {expected_remaining}")]
    Booking {
        worker: String,
        relative_booking: i32,
        remaining: i32,
        expected_booking: i32,
        expected_remaining: i32,
    },

    #[error("cannot {action} {worker} on {day} {shift}: {reason}")]
    Transition {
        action: &'static str,
        worker: String,
        day: String,
        shift: String,
        reason: String,
    },
}

/// Errors raised while reading worker files and building a roster.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("more than one worker named {0}")]
    DuplicateWorker(String),

    #[error("worker {worker} has duplicate availability on {day} {shift}")]
    DuplicateAvailability {
        worker: String,
        day: String,
        shift: String,
    },

    #[error("worker {worker} has priority {value} on {day} {shift}; priorities must be finite")]
    InvalidPriority {
        worker: String,
        day: String,
        shift: String,
        value: f64,
    },

    #[error("worker {worker} has a maximum of {max_shifts} shifts; at most {} is supported", i32::MAX)]
    MaxShiftsTooLarge { worker: String, max_shifts: u32 },

    #[error("too few workers available for {} shift(s); rerun with --accept-shortfalls to lower the requirements", .0.len())]
    InsufficientSupply(Vec<crate::schedule::Shortfall>),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors in the schedule configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
