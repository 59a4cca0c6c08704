//! # Narration Log
//!
//! The fire-and-forget, order-preserving sink for player-facing text. The UI
//! reads it to fill its message pane; tests read it to assert on narration
//! sequences. This is distinct from diagnostic logging, which goes through
//! the `log` crate.

/// Ordered collection of narration lines.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    lines: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line. Order is preserved; there is no return channel.
    pub fn print<S: Into<String>>(&mut self, line: S) {
        let line = line.into();
        log::debug!("narration: {}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line contains the given fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.lines.iter().any(|line| line.contains(fragment))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = MessageLog::new();
        log.print("first");
        log.print(String::from("second"));
        assert_eq!(log.lines(), &["first", "second"]);
        assert_eq!(log.last(), Some("second"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_log_contains_fragment() {
        let mut log = MessageLog::new();
        log.print("The skeleton dies!");
        assert!(log.contains("skeleton dies"));
        assert!(!log.contains("ghost"));
        log.clear();
        assert!(log.is_empty());
    }
}
