//! Bot context - the capability surface handed to a bot
//!
//! A [`BotContext`] lives for exactly one invocation. It exposes the parsed
//! payload, records every line the bot logs or prints, and collects timer
//! requests. Nothing the bot does through the context takes effect until the
//! host turns the finished context into a [`Response`].

use crate::execution::Execution;
use crate::measures::Measures;
use crate::types::{Access, Alert, Result, TriggerRecord, TriggerType};
use log::Level;
use std::fmt;

/// Log target used for everything a bot logs
pub const BOT_LOG_TARGET: &str = "bot";

/// Signature of a timer entry point
pub type TimerFn = fn(&mut BotContext<'_>, &str) -> Result<()>;

/// A named timer entry point
#[derive(Clone, Copy)]
pub struct TimerCallback {
    pub name: &'static str,
    pub func: TimerFn,
}

impl TimerCallback {
    pub const fn new(name: &'static str, func: TimerFn) -> Self {
        Self { name, func }
    }
}

impl fmt::Debug for TimerCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TimerCallback").field(&self.name).finish()
    }
}

impl PartialEq for TimerCallback {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A delayed callback requested by a bot
#[derive(Debug, Clone, PartialEq)]
pub struct TimerRequest {
    /// Minimum delay before the callback runs
    pub seconds: u64,
    pub callback: TimerCallback,
    /// Handed back to the callback unchanged
    pub argument: String,
}

/// Where a transcript line was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Plain console output
    Print,
    /// Bot logger at the given level
    Log(Level),
}

/// One line of bot output
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub channel: Channel,
    pub message: String,
}

/// Everything a finished invocation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub lines: Vec<LogLine>,
    pub timers: Vec<TimerRequest>,
}

impl Response {
    /// All transcript messages, in order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|line| line.message.as_str())
    }

    /// True if any transcript line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().any(|m| m.contains(needle))
    }
}

/// Per-invocation handle given to bots and timer callbacks
pub struct BotContext<'a> {
    execution: &'a Execution,
    lines: Vec<LogLine>,
    timers: Vec<TimerRequest>,
}

impl<'a> BotContext<'a> {
    pub fn new(execution: &'a Execution) -> Self {
        Self {
            execution,
            lines: Vec::new(),
            timers: Vec::new(),
        }
    }

    /// The parsed payload; borrowed independently of the context itself
    pub fn execution(&self) -> &'a Execution {
        self.execution
    }

    pub fn trigger_type(&self) -> TriggerType {
        self.execution.trigger_type
    }

    pub fn triggers(&self) -> &'a [TriggerRecord] {
        &self.execution.triggers
    }

    pub fn measures(&self) -> &'a Measures {
        &self.execution.measures
    }

    pub fn alerts(&self) -> &'a [Alert] {
        &self.execution.alerts
    }

    pub fn access(&self) -> &'a [Access] {
        &self.execution.access
    }

    /// Invocation time in milliseconds since epoch
    pub fn time(&self) -> i64 {
        self.execution.time
    }

    pub fn log(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        log::log!(target: BOT_LOG_TARGET, level, "{}", message);
        self.lines.push(LogLine {
            channel: Channel::Log(level),
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Console output; rendered by the host, not forwarded to the logger
    pub fn print(&mut self, message: impl Into<String>) {
        self.lines.push(LogLine {
            channel: Channel::Print,
            message: message.into(),
        });
    }

    /// Ask the host to call `callback` with `argument` no earlier than `seconds` from now.
    ///
    /// Returns immediately. Timers may fire late but never early.
    pub fn start_timer(&mut self, seconds: u64, callback: TimerCallback, argument: impl Into<String>) {
        let argument = argument.into();
        log::debug!(
            "Timer '{}' requested in {}s (argument: '{}')",
            callback.name,
            seconds,
            argument
        );
        self.timers.push(TimerRequest {
            seconds,
            callback,
            argument,
        });
    }

    pub fn into_response(self) -> Response {
        Response {
            lines: self.lines,
            timers: self.timers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_bot: &mut BotContext<'_>, _argument: &str) -> Result<()> {
        Ok(())
    }

    const NOOP: TimerCallback = TimerCallback::new("noop", noop);

    #[test]
    fn test_transcript_and_timers() {
        let execution = Execution::new(TriggerType::Schedule, 42);
        let mut bot = BotContext::new(&execution);
        assert_eq!(bot.time(), 42);
        assert_eq!(bot.trigger_type(), TriggerType::Schedule);

        bot.info("hello");
        bot.print("plain");
        bot.warn("careful");
        bot.start_timer(5, NOOP, "Front Door");

        let response = bot.into_response();
        assert_eq!(response.lines.len(), 3);
        assert_eq!(response.lines[0].channel, Channel::Log(Level::Info));
        assert_eq!(response.lines[1].channel, Channel::Print);
        assert!(response.contains("care"));
        assert_eq!(
            response.timers,
            vec![TimerRequest {
                seconds: 5,
                callback: NOOP,
                argument: "Front Door".to_string(),
            }]
        );
    }

    #[test]
    fn test_timer_callback_debug() {
        assert_eq!(format!("{:?}", NOOP), "TimerCallback(\"noop\")");
    }
}
