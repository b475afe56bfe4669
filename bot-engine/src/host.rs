//! Local host
//!
//! Stands in for the cloud platform: runs one invocation at a time, applies
//! the runtime subscription filter, and keeps the queue of pending timers.
//! A timer fires as its own invocation, with only its argument carried over.

use crate::config::RuntimeConfig;
use crate::context::{BotContext, Response, TimerCallback};
use crate::execution::Execution;
use crate::types::{Result, TriggerType};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A bot: one entry point invoked per platform event
pub trait Bot {
    /// Short identifier (used on the command line)
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// The subscriptions this bot ships with
    fn runtime(&self) -> RuntimeConfig;

    /// Handle one invocation
    fn run(&self, bot: &mut BotContext<'_>) -> Result<()>;
}

/// A timer waiting in the host queue
#[derive(Debug)]
struct PendingTimer {
    /// Earliest time (ms) the timer may fire
    due: i64,
    /// Scheduling order, breaks ties between equal due times
    seq: u64,
    callback: TimerCallback,
    argument: String,
}

impl PartialEq for PendingTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for PendingTimer {}

impl PartialOrd for PendingTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Outcome of a fired timer
#[derive(Debug)]
pub struct TimerFired {
    pub name: &'static str,
    pub argument: String,
    /// Time the timer was due
    pub due: i64,
    /// Time it actually ran
    pub fired_at: i64,
    pub result: Result<Response>,
}

/// In-process replacement for the platform's execution engine
pub struct LocalHost<'b> {
    bot: &'b dyn Bot,
    runtime: RuntimeConfig,
    queue: BinaryHeap<Reverse<PendingTimer>>,
    next_seq: u64,
}

impl<'b> LocalHost<'b> {
    /// Create a host using the bot's own runtime configuration
    pub fn new(bot: &'b dyn Bot) -> Self {
        Self::with_runtime(bot, bot.runtime())
    }

    /// Create a host with an explicit runtime configuration
    pub fn with_runtime(bot: &'b dyn Bot, runtime: RuntimeConfig) -> Self {
        Self {
            bot,
            runtime,
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    /// Run the bot for one platform event
    ///
    /// Returns `Ok(None)` when the runtime subscription filters the event out.
    /// A failed run schedules nothing.
    pub fn execute(&mut self, execution: &Execution) -> Result<Option<Response>> {
        if !self.runtime.accepts(execution) {
            log::info!(
                "Bot '{}' not subscribed to this {} event, skipping",
                self.bot.name(),
                execution.trigger_type
            );
            return Ok(None);
        }

        log::debug!("Executing bot '{}' on {} trigger", self.bot.name(), execution.trigger_type);
        let mut context = BotContext::new(execution);
        self.bot.run(&mut context)?;

        let response = context.into_response();
        self.schedule(execution.time, &response);
        Ok(Some(response))
    }

    /// Earliest due time among pending timers
    pub fn next_due(&self) -> Option<i64> {
        self.queue.peek().map(|Reverse(timer)| timer.due)
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Fire every timer due at or before `now`, in due order
    ///
    /// Only timers queued before this call fire. Timers a callback schedules
    /// wait for the next call, even when they are already due.
    pub fn fire_due(&mut self, now: i64) -> Vec<TimerFired> {
        let mut fired = Vec::new();
        let cutoff = self.next_seq;

        while self
            .queue
            .peek()
            .is_some_and(|Reverse(timer)| timer.due <= now && timer.seq < cutoff)
        {
            let Some(Reverse(timer)) = self.queue.pop() else {
                break;
            };

            log::debug!(
                "Firing timer '{}' (due {}, now {}) with argument '{}'",
                timer.callback.name,
                timer.due,
                now,
                timer.argument
            );

            let execution = Execution::new(TriggerType::ExecuteAgain, now);
            let mut context = BotContext::new(&execution);
            let result = (timer.callback.func)(&mut context, &timer.argument).map(|()| {
                let response = context.into_response();
                self.schedule(now, &response);
                response
            });

            if let Err(e) = &result {
                log::warn!("Timer '{}' failed: {}", timer.callback.name, e);
            }

            fired.push(TimerFired {
                name: timer.callback.name,
                argument: timer.argument,
                due: timer.due,
                fired_at: now,
                result,
            });
        }

        fired
    }

    fn schedule(&mut self, now: i64, response: &Response) {
        for request in &response.timers {
            let delay_ms = i64::try_from(request.seconds)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000);
            let due = now.saturating_add(delay_ms);
            log::info!(
                "Timer '{}' scheduled for {} (argument: '{}')",
                request.callback.name,
                due,
                request.argument
            );
            self.queue.push(Reverse(PendingTimer {
                due,
                seq: self.next_seq,
                callback: request.callback,
                argument: request.argument.clone(),
            }));
            self.next_seq += 1;
        }
    }
}
