//! The poll loop behind `gearaxis run`

use anyhow::Context;
use gearaxis_shifter::{ButtonSource, GearAxisWriter, ShifterResult, VirtualAxis};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub writes: u64,
    pub read_failures: u64,
}

/// Installs a Ctrl-C handler that raises the returned flag.
pub fn install_stop_flag() -> anyhow::Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(stop)
}

/// Polls `source` into `writer` every `interval` until `stop` is raised or
/// `max_cycles` have run.
///
/// `interval` is the whole cycle: time spent waiting on the device is taken
/// out of the sleep, and a cycle that overruns starts the next one at once.
///
/// Read failures are counted and absorbed; a failed axis write ends the
/// loop with that error. The caller re-centers the axis afterwards.
pub fn run_loop<S, A>(
    source: &mut S,
    writer: &mut GearAxisWriter<A>,
    stop: &AtomicBool,
    interval: Duration,
    max_cycles: Option<u64>,
) -> ShifterResult<LoopStats>
where
    S: ButtonSource + ?Sized,
    A: VirtualAxis,
{
    let mut stats = LoopStats::default();
    let mut failing = false;

    while !stop.load(Ordering::Relaxed) && max_cycles.is_none_or(|max| stats.cycles < max) {
        let started = Instant::now();
        let reading = source.poll();
        match (&reading, failing) {
            (Err(err), false) => {
                warn!(error = %err, "shifter not responding, holding last mode");
                failing = true;
            }
            (Ok(_), true) => {
                info!("shifter responding again");
                failing = false;
            }
            _ => {}
        }
        if reading.is_err() {
            stats.read_failures = stats.read_failures.saturating_add(1);
        }

        if writer.step(reading)?.is_some() {
            stats.writes = stats.writes.saturating_add(1);
        }
        stats.cycles = stats.cycles.saturating_add(1);

        let remaining = interval.saturating_sub(started.elapsed());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }

    info!(
        cycles = stats.cycles,
        writes = stats.writes,
        read_failures = stats.read_failures,
        "poll loop finished"
    );
    Ok(stats)
}
