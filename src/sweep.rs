//! Seed sweep: run many seeds over one roster and keep the fittest result.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::{FitnessWeights, ScheduleConfig};
use crate::error::ScheduleError;
use crate::schedule::{Roster, RunResult, ScheduleStats, Scheduler};

const PROGRESS_EVERY: u64 = 1000;

/// Weighted score used to rank runs. Higher is better.
pub fn fitness(stats: &ScheduleStats, weights: &FitnessWeights) -> f64 {
    stats.average() * weights.average + stats.least_happy_average() * weights.least_happy
        - stats.range() as f64 * weights.range
}

#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub start_seed: u64,
    /// `None` runs until stopped.
    pub max_seeds: Option<u64>,
    pub jobs: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            start_seed: 1,
            max_seeds: None,
            jobs: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub best: Option<RunResult>,
    pub best_fitness: f64,
    pub seeds_checked: u64,
    pub elapsed: Duration,
}

impl SweepOutcome {
    pub fn runs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.seeds_checked as f64 / secs
        } else {
            0.0
        }
    }
}

/// A better run has higher fitness, or equal fitness and a lower seed.
pub(crate) fn is_better(fitness: f64, seed: u64, best: &Option<(f64, RunResult)>) -> bool {
    match best {
        None => true,
        Some((best_fitness, best_run)) => {
            fitness > *best_fitness || (fitness == *best_fitness && seed < best_run.seed)
        }
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared<'a> {
    roster: &'a Roster,
    config: &'a ScheduleConfig,
    start: u64,
    end: u64,
    next_seed: AtomicU64,
    checked: AtomicU64,
    best: Mutex<Option<(f64, RunResult)>>,
    failure: Mutex<Option<ScheduleError>>,
    stop: &'a AtomicBool,
}

impl Shared<'_> {
    fn worker(&self) {
        let mut scheduler = Scheduler::new(self.roster, &self.config.policy);
        while !self.stop.load(Ordering::Relaxed) {
            let seed = self.next_seed.fetch_add(1, Ordering::Relaxed);
            if seed >= self.end {
                break;
            }
            let result = match scheduler.run(seed) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(seed, error = %e, "run failed, stopping sweep");
                    lock(&self.failure).get_or_insert(e);
                    self.stop.store(true, Ordering::Relaxed);
                    break;
                }
            };
            self.checked.fetch_add(1, Ordering::Relaxed);

            let score = fitness(&result.stats, &self.config.fitness);
            let mut best = lock(&self.best);
            if is_better(score, seed, &best) {
                tracing::info!(
                    seed,
                    fitness = score,
                    average = result.stats.average(),
                    least_happy = result.stats.least_happy_average(),
                    range = result.stats.range(),
                    "new best result"
                );
                *best = Some((score, result));
            }
            drop(best);

            let done = seed - self.start + 1;
            if done % PROGRESS_EVERY == 0 {
                tracing::info!(seed, "sweep progress");
            }
        }
    }
}

/// Runs seeds from `options.start_seed` on `options.jobs` threads until
/// `max_seeds` have run or `stop` is set.
///
/// A bounded sweep picks the same best seed for any number of jobs. A
/// failed run stops the sweep and is returned as the error.
pub fn sweep(
    roster: &Roster,
    config: &ScheduleConfig,
    options: &SweepOptions,
    stop: &AtomicBool,
) -> Result<SweepOutcome, ScheduleError> {
    let start = options.start_seed;
    let end = match options.max_seeds {
        Some(n) => start.saturating_add(n),
        None => u64::MAX,
    };
    let shared = Shared {
        roster,
        config,
        start,
        end,
        next_seed: AtomicU64::new(start),
        checked: AtomicU64::new(0),
        best: Mutex::new(None),
        failure: Mutex::new(None),
        stop,
    };

    let started = Instant::now();
    let jobs = options.jobs.max(1);
    std::thread::scope(|s| {
        for _ in 0..jobs {
            s.spawn(|| shared.worker());
        }
    });
    let elapsed = started.elapsed();

    if let Some(e) = lock(&shared.failure).take() {
        return Err(e);
    }
    let seeds_checked = shared.checked.load(Ordering::Relaxed);
    let best = lock(&shared.best).take();
    tracing::info!(seeds_checked, elapsed_ms = elapsed.as_millis() as u64, "sweep finished");

    let (best_fitness, best) = match best {
        Some((f, run)) => (f, Some(run)),
        None => (f64::NEG_INFINITY, None),
    };
    Ok(SweepOutcome {
        best,
        best_fitness,
        seeds_checked,
        elapsed,
    })
}
