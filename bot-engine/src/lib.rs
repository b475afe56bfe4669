//! Bot Engine Library
//!
//! Typed event payloads and a local execution host for home-automation bots,
//! plus the lesson bots built on top of them.
//!
//! # Architecture
//!
//! A bot is a single entry point the platform invokes once per event:
//! - The inputs JSON is parsed and validated into an [`Execution`]
//! - [`Execution::event`] classifies it (schedule, mode, alert, measurement)
//! - The bot logs through a [`BotContext`] and may request delayed callbacks
//! - The [`LocalHost`] applies the runtime subscription filter, runs the bot,
//!   and fires timers no earlier than requested
//!
//! Bots keep no state between invocations. A timer carries only its argument
//! to the later invocation.
//!
//! # Example Usage
//!
//! ```no_run
//! use bot_engine::{lessons, load_inputs, LocalHost};
//! use std::path::Path;
//!
//! let bot = lessons::find("combining-triggers").unwrap();
//! let mut host = LocalHost::new(bot);
//!
//! let execution = load_inputs(Path::new("inputs.json")).unwrap();
//! if let Some(response) = host.execute(&execution).unwrap() {
//!     for line in response.messages() {
//!         println!("{}", line);
//!     }
//! }
//!
//! // Fire the timers once they are due
//! while let Some(due) = host.next_due() {
//!     for fired in host.fire_due(due) {
//!         println!("Timer {} fired at {}", fired.name, fired.fired_at);
//!     }
//! }
//! ```

// Public modules
pub mod config;
pub mod context;
pub mod execution;
pub mod host;
pub mod inputs;
pub mod lessons;
pub mod measures;
pub mod types;

// Re-export main types for convenience
pub use config::{load_runtime, DeviceTypeSubscription, RuntimeConfig};
pub use context::{BotContext, Channel, LogLine, Response, TimerCallback, TimerFn, TimerRequest};
pub use execution::{Event, Execution};
pub use host::{Bot, LocalHost, TimerFired};
pub use inputs::{inputs_from_value, load_inputs, parse_inputs};
pub use measures::Measures;
pub use types::{
    Access, AccessCategory, Alert, AlertParam, BotError, Device, DeviceKind, Location,
    Measurement, Result, Timestamp, TriggerMask, TriggerRecord, TriggerType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: every lesson can be hosted
        for bot in lessons::all() {
            let host = LocalHost::new(bot);
            assert_eq!(host.pending(), 0);
        }
    }
}
