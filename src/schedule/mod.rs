pub mod types;
pub mod roster;
pub mod worker_state;
pub mod grid;
pub mod state;
pub mod score;
pub mod initial;
pub mod move_chain;
pub mod rebalance;
pub mod validate;
pub mod stats;
pub mod engine;

pub use types::{Calendar, Cell, Priority, RequirementTable, SlotId, WorkerId};
pub use roster::{Roster, Shortfall, Worker, WorkerInput};
pub use state::ScheduleState;
pub use score::ScoreModel;
pub use rebalance::RebalanceReport;
pub use stats::{ScheduleStats, WorkerHappiness};
pub use engine::{CellAssignment, RunResult, Scheduler, WorkerLoad};
