use std::io::{self, Write};

use crate::config::PrintOptions;
use crate::schedule::{Calendar, Roster, RunResult};

/// Names to show in each cell, indexed by [`Calendar::cell_index`].
pub type CellNames = Vec<Vec<String>>;

/// The schedule of a run, each cell sorted alphabetically.
pub fn schedule_names(calendar: &Calendar, result: &RunResult) -> CellNames {
    calendar
        .cells()
        .map(|cell| {
            let mut names = result
                .assigned(calendar.day_name(cell), calendar.shift_name(cell))
                .to_vec();
            names.sort();
            names
        })
        .collect()
}

/// Everyone available for each cell, in roster order.
pub fn availability_names(roster: &Roster) -> CellNames {
    roster
        .calendar()
        .cells()
        .map(|cell| {
            roster
                .slots_in(cell)
                .iter()
                .map(|&slot| roster.owner_name(slot).to_string())
                .collect()
        })
        .collect()
}

fn width(s: &str) -> usize {
    s.chars().count()
}

/// Writes `text` centred in a box of `size` plus padding, then the right border.
fn write_even<W: Write>(out: &mut W, text: &str, size: usize, options: &PrintOptions) -> io::Result<()> {
    let to_fill = size.saturating_sub(width(text));
    let odd = to_fill % 2;
    let left = to_fill / 2 + if options.center_left { 0 } else { odd };
    let right = to_fill / 2 + if options.center_left { odd } else { 0 };
    let pad = options.padding;
    write!(out, "{:pad_l$}{}{:pad_r$}|", "", text, "", pad_l = pad + left, pad_r = right + pad)
}

fn write_blank_line<W: Write>(out: &mut W, widths: &[usize], options: &PrintOptions) -> io::Result<()> {
    write!(out, "|")?;
    for &w in widths {
        write!(out, "{:1$}|", "", w + 2 * options.padding)?;
    }
    writeln!(out)
}

/// Day-by-shift box table. The first column holds shift names, each other
/// column one day; a shift's block is as tall as its fullest cell.
pub fn write_schedule_table<W: Write>(
    out: &mut W,
    calendar: &Calendar,
    names: &CellNames,
    options: &PrintOptions,
) -> io::Result<()> {
    let empty: Vec<String> = Vec::new();
    let cell_names = |day: usize, shift: usize| {
        names
            .get(day * calendar.num_shifts() + shift)
            .unwrap_or(&empty)
    };

    // widths[0] is the shift-name column.
    let mut widths = Vec::with_capacity(calendar.num_days() + 1);
    widths.push(calendar.shifts().iter().map(|s| width(s)).max().unwrap_or(0));
    for (day, day_name) in calendar.days().iter().enumerate() {
        let widest = (0..calendar.num_shifts())
            .flat_map(|shift| cell_names(day, shift).iter())
            .map(|n| width(n))
            .max()
            .unwrap_or(0);
        widths.push(widest.max(width(day_name)));
    }
    let line_length = widths.len() + 1 + widths.iter().map(|w| w + 2 * options.padding).sum::<usize>();
    let dashes = "-".repeat(line_length);

    writeln!(out, "{}", dashes)?;
    write_blank_line(out, &widths, options)?;
    write!(out, "|")?;
    write_even(out, "", widths[0], options)?;
    for (day, day_name) in calendar.days().iter().enumerate() {
        write_even(out, day_name, widths[day + 1], options)?;
    }
    writeln!(out)?;
    write_blank_line(out, &widths, options)?;
    writeln!(out, "{}", dashes)?;

    for (shift, shift_name) in calendar.shifts().iter().enumerate() {
        let rows = (0..calendar.num_days())
            .map(|day| cell_names(day, shift).len())
            .max()
            .unwrap_or(0)
            .max(1);
        // Middle row, upper one when the height is even.
        let label_row = rows / 2 + rows % 2 - 1;

        write_blank_line(out, &widths, options)?;
        for row in 0..rows {
            write!(out, "|")?;
            let label = if row == label_row { shift_name.as_str() } else { "" };
            write_even(out, label, widths[0], options)?;
            for day in 0..calendar.num_days() {
                let name = cell_names(day, shift).get(row).map_or("", String::as_str);
                write_even(out, name, widths[day + 1], options)?;
            }
            writeln!(out)?;
        }
        write_blank_line(out, &widths, options)?;
        writeln!(out, "{}", dashes)?;
    }
    Ok(())
}

/// `<name> on N out of M shifts`, one line per worker.
pub fn write_worker_loads<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
    for load in &result.workers {
        writeln!(out, "{} on {} out of {} shifts", load.name, load.allocated, load.max_shifts)?;
    }
    Ok(())
}

pub fn write_stats<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
    let stats = &result.stats;
    writeln!(out, "Stats (seed = {}):", result.seed)?;
    writeln!(out, "Average Happiness: {:.4}", stats.average())?;
    match stats.most_happy() {
        Some(w) => writeln!(out, "Most Happy Worker: {} with {:.4}", w.name, w.average)?,
        None => writeln!(out, "Most Happy Worker: none")?,
    }
    match stats.least_happy() {
        Some(w) => writeln!(out, "Least Happy Worker: {} with {:.4}", w.name, w.average)?,
        None => writeln!(out, "Least Happy Worker: none")?,
    }
    writeln!(out, "Booking Range: {}", stats.range())?;
    writeln!(out, "Exchanges: {}", result.rebalance.exchanges)
}

/// Basic roster listing; with `full`, every availability slot too.
pub fn write_workers<W: Write>(out: &mut W, roster: &Roster, full: bool) -> io::Result<()> {
    for worker in roster.workers() {
        writeln!(
            out,
            "Name: {}, Max Shifts: {}, Total Shifts Available: {}",
            worker.name,
            worker.max_shifts,
            worker.slots.len()
        )?;
        if full {
            for &id in &worker.slots {
                let slot = roster.slot(id);
                writeln!(
                    out,
                    "{} : {} ({})",
                    roster.day_name(slot.cell),
                    roster.shift_name(slot.cell),
                    slot.true_priority
                )?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Loads, table and stats, the way the CLI prints a result.
pub fn write_report<W: Write>(
    out: &mut W,
    calendar: &Calendar,
    result: &RunResult,
    options: &PrintOptions,
) -> io::Result<()> {
    write_worker_loads(out, result)?;
    writeln!(out)?;
    write_schedule_table(out, calendar, &schedule_names(calendar, result), options)?;
    writeln!(out)?;
    write_stats(out, result)
}

pub fn render_report(calendar: &Calendar, result: &RunResult, options: &PrintOptions) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_report(&mut buf, calendar, result, options);
    String::from_utf8_lossy(&buf).into_owned()
}
