use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::schedule::RunResult;

#[derive(Debug, Serialize)]
struct ScheduleRow<'a> {
    day: &'a str,
    shift: &'a str,
    worker: &'a str,
}

#[derive(Debug, Serialize)]
struct WorkerLoadRow<'a> {
    worker: &'a str,
    allocated: usize,
    max_shifts: u32,
    average_priority: Option<f64>,
}

/// One `day,shift,worker` row per assignment, cells in calendar order.
pub fn write_schedule_csv<W: Write>(writer: W, result: &RunResult) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for cell in &result.schedule {
        for worker in &cell.workers {
            wtr.serialize(ScheduleRow {
                day: &cell.day,
                shift: &cell.shift,
                worker: worker.as_str(),
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// One `worker,allocated,max_shifts,average_priority` row per worker. Idle
/// workers get an empty average.
pub fn write_worker_loads_csv<W: Write>(writer: W, result: &RunResult) -> csv::Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for load in &result.workers {
        wtr.serialize(WorkerLoadRow {
            worker: &load.name,
            allocated: load.allocated,
            max_shifts: load.max_shifts,
            average_priority: load.average_priority,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_schedule_csv<P: AsRef<Path>>(result: &RunResult, csv_path: P) -> csv::Result<()> {
    let file = std::fs::File::create(csv_path)?;
    write_schedule_csv(file, result)
}

pub fn export_worker_loads_csv<P: AsRef<Path>>(result: &RunResult, csv_path: P) -> csv::Result<()> {
    let file = std::fs::File::create(csv_path)?;
    write_worker_loads_csv(file, result)
}
