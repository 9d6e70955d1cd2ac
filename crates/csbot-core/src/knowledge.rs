//! Static knowledge map: exact-match canned answers for greetings and basics.
//!
//! First stop of the cascade. A hit requires the lowercased, trimmed query to
//! equal one of a fixed set of keys; anything else is absence, never an error.
//! Two entries are time-sensitive ("what is the date" / "what is the time");
//! [`ClockMode`] decides whether they reflect the boot instant or "now".

use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Rendering policy for time-sensitive canned answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMode {
    /// Answers are computed from the boot instant and never refreshed. A
    /// long-running process will drift; callers opted into this by default
    /// because it matches the original service.
    #[default]
    FrozenAtStartup,
    /// Answers are computed from `Local::now()` on every lookup.
    PerRequest,
}

/// One canned answer: fixed text or a clock-dependent value.
#[derive(Debug, Clone, Copy)]
enum Canned {
    Text(&'static str),
    CurrentDate,
    CurrentTime,
}

/// Exact-match table built once at startup and read-only afterwards.
pub struct StaticKnowledge {
    entries: HashMap<&'static str, Canned>,
    clock: ClockMode,
    booted_at: DateTime<Local>,
}

impl StaticKnowledge {
    pub fn new(clock: ClockMode) -> Self {
        let mut entries = HashMap::new();
        entries.insert("hello", Canned::Text("Hi there! How can I assist you today?"));
        entries.insert("hi", Canned::Text("Hello! What can I do for you?"));
        entries.insert("hey", Canned::Text("Hey! How can I help you?"));
        entries.insert(
            "how are you",
            Canned::Text("I'm an AI, so I don't have feelings, but thanks for asking!"),
        );
        entries.insert(
            "what is your name",
            Canned::Text("I'm your Ultimate Computer Science Chatbot."),
        );
        entries.insert("what is the date", Canned::CurrentDate);
        entries.insert("what is the time", Canned::CurrentTime);
        Self {
            entries,
            clock,
            booted_at: Local::now(),
        }
    }

    /// `Some(answer)` iff the case-lowered, trimmed query exactly equals a key.
    pub fn lookup(&self, query: &str) -> Option<String> {
        let key = query.trim().to_lowercase();
        self.entries.get(key.as_str()).map(|c| self.render(*c))
    }

    fn render(&self, canned: Canned) -> String {
        let at = match self.clock {
            ClockMode::FrozenAtStartup => self.booted_at,
            ClockMode::PerRequest => Local::now(),
        };
        match canned {
            Canned::Text(t) => t.to_string(),
            Canned::CurrentDate => format!("Today's date is {}.", at.format("%Y-%m-%d")),
            Canned::CurrentTime => format!("The current time is {}.", at.format("%H:%M:%S")),
        }
    }
}

impl Default for StaticKnowledge {
    fn default() -> Self {
        Self::new(ClockMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_hits_exactly() {
        let kb = StaticKnowledge::default();
        assert_eq!(
            kb.lookup("hello").as_deref(),
            Some("Hi there! How can I assist you today?")
        );
        assert_eq!(
            kb.lookup("what is your name").as_deref(),
            Some("I'm your Ultimate Computer Science Chatbot.")
        );
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        let kb = StaticKnowledge::default();
        assert_eq!(
            kb.lookup("  HeLLo  ").as_deref(),
            Some("Hi there! How can I assist you today?")
        );
    }

    #[test]
    fn near_miss_is_absence() {
        let kb = StaticKnowledge::default();
        assert!(kb.lookup("hello there").is_none());
        assert!(kb.lookup("").is_none());
    }

    #[test]
    fn frozen_clock_renders_boot_instant() {
        let kb = StaticKnowledge::new(ClockMode::FrozenAtStartup);
        let expected = format!("Today's date is {}.", kb.booted_at.format("%Y-%m-%d"));
        assert_eq!(kb.lookup("what is the date").as_deref(), Some(expected.as_str()));

        let expected = format!("The current time is {}.", kb.booted_at.format("%H:%M:%S"));
        assert_eq!(kb.lookup("what is the time").as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn frozen_answers_are_idempotent() {
        let kb = StaticKnowledge::new(ClockMode::FrozenAtStartup);
        assert_eq!(kb.lookup("what is the time"), kb.lookup("what is the time"));
    }
}
