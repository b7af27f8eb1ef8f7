//! In-memory run transcript. Dotted event lines ("scene.load intro",
//! "dialog.open barkeep") are the operator-visible record of a run; the host
//! prints them after the loop and integration tests assert on them.

use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
pub struct EventLog {
    entries: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::debug!("{line}");
        self.entries.push(line);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|line| line.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_lines_in_order() {
        let mut events = EventLog::new();
        events.push("scene.load intro");
        events.push(format!("script.start {}", "welcome"));
        assert_eq!(events.len(), 2);
        assert!(events.contains("script.start welcome"));
        assert_eq!(events.entries()[0], "scene.load intro");
    }
}
