use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ScheduleConfig;
use crate::error::LoadError;
use crate::schedule::{Calendar, Roster, Shortfall, WorkerInput};

/// Parses one worker file:
///
/// ```text
/// <name>
/// <max shifts>
///
/// <Day> <Shift> <priority>
/// ...
///
/// <liked coworker>
/// ...
/// ```
///
/// Availability lines that name an unknown day or shift, or whose priority
/// is not a number, are skipped with a warning.
pub fn parse_worker_file(text: &str, path: &Path, calendar: &Calendar) -> Result<WorkerInput, LoadError> {
    let mut lines = text.lines().map(str::trim);

    let name = match lines.next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(malformed(path, "first line must be the worker name")),
    };
    let max_line = lines
        .next()
        .ok_or_else(|| malformed(path, "second line must be the maximum number of shifts"))?;
    let max_shifts: u32 = max_line
        .parse()
        .map_err(|_| malformed(path, format!("invalid maximum number of shifts: {:?}", max_line)))?;

    let mut lines = lines.skip_while(|line| line.is_empty());
    let mut availability = Vec::new();
    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }
        if let Some(entry) = parse_availability_line(line, path, calendar) {
            availability.push(entry);
        }
    }

    let liked = lines
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Ok(WorkerInput {
        name,
        max_shifts,
        availability,
        liked,
    })
}

/// `<Day> <Shift> <priority>` to `(day, shift, priority)`.
fn parse_availability_line(line: &str, path: &Path, calendar: &Calendar) -> Option<(usize, usize, f64)> {
    let mut parts = line.split_whitespace();
    let (day_name, shift_name, priority) = (parts.next()?, parts.next(), parts.next());

    let Some(day) = calendar.day_index(day_name) else {
        tracing::warn!(file = %path.display(), day = day_name, "invalid day name, line skipped");
        return None;
    };
    let Some(shift) = shift_name.and_then(|s| calendar.shift_index(s)) else {
        tracing::warn!(file = %path.display(), shift = shift_name.unwrap_or(""), "invalid shift name, line skipped");
        return None;
    };
    match priority.and_then(|p| p.parse::<f64>().ok()).filter(|p| p.is_finite()) {
        Some(priority) => Some((day, shift, priority)),
        None => {
            tracing::warn!(file = %path.display(), line, "could not read priority, line skipped");
            None
        }
    }
}

fn malformed(path: &Path, message: impl Into<String>) -> LoadError {
    LoadError::Malformed {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Every regular, non-hidden file in `dir`, in sorted order.
fn worker_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden || !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

/// Reads every worker file in a directory.
pub fn load_workers<P: AsRef<Path>>(dir: P, calendar: &Calendar) -> Result<Vec<WorkerInput>, LoadError> {
    let mut workers = Vec::new();
    for path in worker_files(dir.as_ref())? {
        let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        workers.push(parse_worker_file(&text, &path, calendar)?);
    }
    Ok(workers)
}

/// Loads a worker directory into a roster for `config`, then checks that
/// every cell has enough available workers. With `accept_shortfalls` the
/// short requirements are lowered and returned; otherwise they are an error.
pub fn load_roster<P: AsRef<Path>>(
    dir: P,
    config: &ScheduleConfig,
    accept_shortfalls: bool,
) -> Result<(Roster, Vec<Shortfall>), LoadError> {
    config.validate()?;
    let calendar = config.calendar();
    let workers = load_workers(dir, &calendar)?;
    let mut roster = Roster::new(calendar, config.requirements(), workers)?;
    let shortfalls = roster.reconcile_supply(accept_shortfalls)?;
    tracing::info!(
        workers = roster.num_workers(),
        slots = roster.num_slots(),
        adjusted = shortfalls.len(),
        "loaded roster"
    );
    Ok((roster, shortfalls))
}
