use crate::collector::StopSignal;
use log::info;
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

const SLICE: Duration = Duration::from_millis(100);

/// Pause between result pages: `base` plus a random share of `jitter`.
/// Returns early once `stop` is raised.
pub fn page_delay(base: Duration, jitter: Duration, stop: &StopSignal) {
    let extra_ms = jitter.as_millis() as u64;
    let extra = if extra_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rand::thread_rng().gen_range(0..=extra_ms))
    };

    let wait = base + extra;
    if wait.is_zero() {
        return;
    }
    info!("Waiting for {} ms (Page Delay)...", wait.as_millis());
    pause(wait, stop);
}

/// Sleeps for `total` in short slices, checking `stop` between them.
pub fn pause(total: Duration, stop: &StopSignal) {
    let deadline = Instant::now() + total;
    while !stop.is_stopped() {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep(SLICE.min(deadline - now));
    }
}
