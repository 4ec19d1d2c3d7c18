use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{Calendar, Cell, RequirementTable, SlotId, WorkerId};
use crate::error::LoadError;

/// One worker as handed over by the input loader, before names are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerInput {
    pub name: String,
    pub max_shifts: u32,
    /// `(day, shift, true_priority)`
    pub availability: Vec<(usize, usize, f64)>,
    pub liked: Vec<String>,
}

/// Immutable part of a worker.
#[derive(Debug, Clone)]
pub struct Worker {
    pub name: String,
    pub max_shifts: u32,
    /// Owned availability, in input order.
    pub slots: Vec<SlotId>,
    /// Sorted, deduplicated.
    pub liked: Vec<WorkerId>,
}

impl Worker {
    pub fn likes(&self, other: WorkerId) -> bool {
        self.liked.binary_search(&other).is_ok()
    }
}

/// Immutable part of an availability slot.
#[derive(Debug, Clone)]
pub struct AvailabilitySlot {
    pub owner: WorkerId,
    pub cell: Cell,
    pub true_priority: f64,
}

/// A cell that has fewer available workers than it requires.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shortfall {
    pub day: String,
    pub shift: String,
    pub required: u32,
    pub available: u32,
}

/// The availability graph: workers, their slots, and the per-cell index.
///
/// Built once from input and shared read-only by every run.
#[derive(Debug, Clone)]
pub struct Roster {
    calendar: Calendar,
    requirements: RequirementTable,
    workers: Vec<Worker>,
    slots: Vec<AvailabilitySlot>,
    /// Slots registered for each cell, by flat cell index, ascending `SlotId`.
    by_cell: Vec<Vec<SlotId>>,
}

impl Roster {
    /// Resolves worker inputs into the slot arena.
    ///
    /// Duplicate names, duplicate availability within one worker, non-finite
    /// priorities and maximums above `i32::MAX` are fatal.
    /// Availability outside the calendar, unknown liked names and self-likes
    /// are skipped with a warning.
    pub fn new(
        calendar: Calendar,
        requirements: RequirementTable,
        inputs: Vec<WorkerInput>,
    ) -> Result<Self, LoadError> {
        let mut ids: HashMap<&str, WorkerId> = HashMap::new();
        for (i, input) in inputs.iter().enumerate() {
            if ids.insert(input.name.as_str(), WorkerId(i)).is_some() {
                return Err(LoadError::DuplicateWorker(input.name.clone()));
            }
        }

        let mut workers = Vec::with_capacity(inputs.len());
        let mut slots = Vec::new();
        let mut by_cell = vec![Vec::new(); calendar.num_cells()];

        for (i, input) in inputs.iter().enumerate() {
            let owner = WorkerId(i);
            if i32::try_from(input.max_shifts).is_err() {
                return Err(LoadError::MaxShiftsTooLarge {
                    worker: input.name.clone(),
                    max_shifts: input.max_shifts,
                });
            }
            let mut owned = Vec::with_capacity(input.availability.len());
            for &(day, shift, true_priority) in &input.availability {
                if day >= calendar.num_days() || shift >= calendar.num_shifts() {
                    tracing::warn!(worker = %input.name, day, shift, "availability outside the calendar, skipped");
                    continue;
                }
                let cell = Cell::new(day, shift);
                if !true_priority.is_finite() {
                    return Err(LoadError::InvalidPriority {
                        worker: input.name.clone(),
                        day: calendar.day_name(cell).to_string(),
                        shift: calendar.shift_name(cell).to_string(),
                        value: true_priority,
                    });
                }
                let cell_slots: &mut Vec<SlotId> = &mut by_cell[calendar.cell_index(cell)];
                if cell_slots.iter().any(|s| slots_owner(&slots, *s) == owner) {
                    return Err(LoadError::DuplicateAvailability {
                        worker: input.name.clone(),
                        day: calendar.day_name(cell).to_string(),
                        shift: calendar.shift_name(cell).to_string(),
                    });
                }
                let id = SlotId(slots.len());
                slots.push(AvailabilitySlot {
                    owner,
                    cell,
                    true_priority,
                });
                cell_slots.push(id);
                owned.push(id);
            }

            let mut liked = Vec::new();
            for name in &input.liked {
                match ids.get(name.as_str()) {
                    Some(&id) if id == owner => {
                        tracing::warn!(worker = %input.name, "worker lists themselves as a liked coworker, skipped");
                    }
                    Some(&id) => liked.push(id),
                    None => {
                        tracing::warn!(liked = %name, worker = %input.name, "liked coworker was not found");
                    }
                }
            }
            liked.sort();
            liked.dedup();

            workers.push(Worker {
                name: input.name.clone(),
                max_shifts: input.max_shifts,
                slots: owned,
                liked,
            });
        }

        Ok(Self {
            calendar,
            requirements,
            workers,
            slots,
            by_cell,
        })
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn requirements(&self) -> &RequirementTable {
        &self.requirements
    }

    pub fn required(&self, cell: Cell) -> u32 {
        self.requirements.get(cell)
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn worker(&self, id: WorkerId) -> &Worker {
        &self.workers[id.index()]
    }

    pub fn worker_ids(&self) -> impl Iterator<Item = WorkerId> {
        (0..self.workers.len()).map(WorkerId)
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn find_worker(&self, name: &str) -> Option<WorkerId> {
        self.workers.iter().position(|w| w.name == name).map(WorkerId)
    }

    pub fn slot(&self, id: SlotId) -> &AvailabilitySlot {
        &self.slots[id.index()]
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn owner(&self, id: SlotId) -> WorkerId {
        self.slots[id.index()].owner
    }

    /// Every slot registered for `cell`, whether used or not.
    pub fn slots_in(&self, cell: Cell) -> &[SlotId] {
        &self.by_cell[self.calendar.cell_index(cell)]
    }

    pub fn owner_name(&self, id: SlotId) -> &str {
        &self.worker(self.owner(id)).name
    }

    pub fn day_name(&self, cell: Cell) -> &str {
        self.calendar.day_name(cell)
    }

    pub fn shift_name(&self, cell: Cell) -> &str {
        self.calendar.shift_name(cell)
    }

    /// Cells whose requirement exceeds the number of available workers.
    pub fn supply_shortfalls(&self) -> Vec<Shortfall> {
        self.calendar
            .cells()
            .filter_map(|cell| {
                let required = self.required(cell);
                let available = self.slots_in(cell).len() as u32;
                (available < required).then(|| Shortfall {
                    day: self.day_name(cell).to_string(),
                    shift: self.shift_name(cell).to_string(),
                    required,
                    available,
                })
            })
            .collect()
    }

    /// Lowers every short requirement to the available headcount and returns
    /// the changes made.
    pub fn adjust_to_supply(&mut self) -> Vec<Shortfall> {
        let shortfalls = self.supply_shortfalls();
        let cells: Vec<Cell> = self.calendar.cells().collect();
        for cell in cells {
            let available = self.slots_in(cell).len() as u32;
            if available < self.required(cell) {
                tracing::warn!(
                    day = %self.day_name(cell),
                    shift = %self.shift_name(cell),
                    from = self.required(cell),
                    to = available,
                    "lowering requirement to available workers"
                );
                self.requirements.set(cell, available);
            }
        }
        shortfalls
    }

    /// Fails with [`LoadError::InsufficientSupply`] unless every cell can be
    /// staffed, or lowers the short requirements when `accept` is set.
    pub fn reconcile_supply(&mut self, accept: bool) -> Result<Vec<Shortfall>, LoadError> {
        let shortfalls = self.supply_shortfalls();
        if shortfalls.is_empty() {
            return Ok(shortfalls);
        }
        if !accept {
            for s in &shortfalls {
                tracing::warn!(day = %s.day, shift = %s.shift, required = s.required, available = s.available, "not enough workers");
            }
            return Err(LoadError::InsufficientSupply(shortfalls));
        }
        Ok(self.adjust_to_supply())
    }
}

fn slots_owner(slots: &[AvailabilitySlot], id: SlotId) -> WorkerId {
    slots[id.index()].owner
}
