//! Lesson bots
//!
//! Each lesson is a complete bot with its own runtime subscriptions.

pub mod combining_triggers;
pub mod measurements;

pub use combining_triggers::CombiningTriggers;
pub use measurements::Measurements;

use crate::host::Bot;

static MEASUREMENTS: Measurements = Measurements;
static COMBINING_TRIGGERS: CombiningTriggers = CombiningTriggers;

/// All lessons, in lesson order
pub fn all() -> [&'static dyn Bot; 2] {
    [&MEASUREMENTS, &COMBINING_TRIGGERS]
}

/// Look up a lesson by its command-line name
pub fn find(name: &str) -> Option<&'static dyn Bot> {
    all().into_iter().find(|bot| bot.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_lessons() {
        assert_eq!(find("measurements").unwrap().name(), "measurements");
        assert_eq!(find("combining-triggers").unwrap().name(), "combining-triggers");
        assert!(find("lesson-42").is_none());
    }
}
