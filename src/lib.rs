pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod schedule;
pub mod sweep;
pub mod web;

pub use config::ScheduleConfig;
pub use error::{ConfigError, InvariantViolation, LoadError, ScheduleError};
pub use schedule::{Roster, RunResult, Scheduler};
