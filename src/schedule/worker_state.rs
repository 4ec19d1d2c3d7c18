use thiserror::Error;

use super::types::SlotId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingError {
    #[error("slot is already allocated to this worker")]
    AlreadyAllocated(SlotId),
    #[error("slot is not allocated to this worker")]
    NotAllocated(SlotId),
}

/// Run-scoped bookkeeping of one worker.
///
/// `relative_booking` is always `allocated.len() - max_shifts` and
/// `shifts_remaining` its negation.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerState {
    max_shifts: i32,
    allocated: Vec<SlotId>,
    shifts_remaining: i32,
    relative_booking: i32,
    /// No improving exchange was found for this worker since the last change.
    pub no_path: bool,
}

impl WorkerState {
    /// Maximums above `i32::MAX` are rejected by the roster; here they saturate.
    pub fn new(max_shifts: u32) -> Self {
        let max_shifts = i32::try_from(max_shifts).unwrap_or(i32::MAX);
        Self {
            max_shifts,
            allocated: Vec::new(),
            shifts_remaining: max_shifts,
            relative_booking: -max_shifts,
            no_path: false,
        }
    }

    pub fn reset(&mut self) {
        self.allocated.clear();
        self.shifts_remaining = self.max_shifts;
        self.relative_booking = -self.max_shifts;
        self.no_path = false;
    }

    /// Allocated slots in allocation order.
    pub fn allocated(&self) -> &[SlotId] {
        &self.allocated
    }

    pub fn allocated_count(&self) -> usize {
        self.allocated.len()
    }

    pub fn holds(&self, slot: SlotId) -> bool {
        self.allocated.contains(&slot)
    }

    pub fn max_shifts(&self) -> i32 {
        self.max_shifts
    }

    pub fn shifts_remaining(&self) -> i32 {
        self.shifts_remaining
    }

    pub fn relative_booking(&self) -> i32 {
        self.relative_booking
    }

    pub fn allocate(&mut self, slot: SlotId) -> Result<(), BookingError> {
        if self.holds(slot) {
            return Err(BookingError::AlreadyAllocated(slot));
        }
        self.allocated.push(slot);
        self.update_shifts_remaining(-1);
        Ok(())
    }

    pub fn deallocate(&mut self, slot: SlotId) -> Result<(), BookingError> {
        let pos = self
            .allocated
            .iter()
            .position(|&s| s == slot)
            .ok_or(BookingError::NotAllocated(slot))?;
        self.allocated.remove(pos);
        self.update_shifts_remaining(1);
        Ok(())
    }

    fn update_shifts_remaining(&mut self, delta: i32) {
        self.shifts_remaining += delta;
        self.relative_booking -= delta;
    }
}
