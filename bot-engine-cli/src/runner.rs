//! Local run loop
//!
//! Executes one invocation through the host, then keeps firing timers until
//! the queue is empty. Time is either virtual (jump straight to the next due
//! time) or real (sleep until it).

use crate::report;
use bot_engine::{Execution, LocalHost};
use std::thread;
use std::time::{Duration, Instant};

/// How the run loop advances time between timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Virtual,
    Realtime,
}

/// What happened during a run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// False when the runtime subscription filtered the event out
    pub executed: bool,
    pub timers_fired: usize,
    pub timer_failures: usize,
}

/// Run the invocation and every timer it (transitively) schedules
pub fn run(host: &mut LocalHost<'_>, execution: &Execution, clock: Clock) -> bot_engine::Result<RunSummary> {
    let mut summary = RunSummary::default();

    let Some(response) = host.execute(execution)? else {
        return Ok(summary);
    };
    summary.executed = true;
    report::print_response("run", &response);

    // Map wall-clock progress onto the payload's timeline
    let started = Instant::now();
    let mut now = execution.time;

    while let Some(due) = host.next_due() {
        match clock {
            Clock::Virtual => now = now.max(due),
            Clock::Realtime => {
                let elapsed = started.elapsed().as_millis() as i64;
                let wait = due - (execution.time + elapsed);
                if wait > 0 {
                    log::info!("Waiting {} ms for the next timer", wait);
                    thread::sleep(Duration::from_millis(wait as u64));
                }
                now = execution.time + started.elapsed().as_millis() as i64;
            }
        }

        for fired in host.fire_due(now) {
            summary.timers_fired += 1;
            match &fired.result {
                Ok(response) => report::print_response(fired.name, response),
                Err(e) => {
                    summary.timer_failures += 1;
                    log::error!("Timer '{}' ({}) failed: {}", fired.name, fired.argument, e);
                }
            }
        }
    }

    Ok(summary)
}
