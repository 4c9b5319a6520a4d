use chrono::Local;

/// Most recent lines kept in memory.
const MAX_ENTRIES: usize = 500;

/// Timestamped activity log shown in the side panel.
#[derive(Debug, Clone, Default)]
pub struct LogsState {
    entries: Vec<String>,
    pub is_visible: bool,
    /// Lines scrolled up from the newest entry
    pub scroll_from_bottom: usize,
}

impl LogsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append a line prefixed with the local time.
    pub fn append(&mut self, message: impl AsRef<str>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.entries.push(format!("{stamp} {}", message.as_ref()));
        if self.entries.len() > MAX_ENTRIES {
            let overflow = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..overflow);
        }
    }

    pub fn toggle_visible(&mut self) {
        self.is_visible = !self.is_visible;
        self.scroll_from_bottom = 0;
    }

    pub fn scroll(&mut self, up: bool, lines: usize) {
        self.scroll_from_bottom = if up {
            (self.scroll_from_bottom + lines).min(self.entries.len().saturating_sub(1))
        } else {
            self.scroll_from_bottom.saturating_sub(lines)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_stamped_and_capped() {
        let mut logs = LogsState::new();
        for index in 0..(MAX_ENTRIES + 5) {
            logs.append(format!("line {index}"));
        }
        assert_eq!(logs.entries().len(), MAX_ENTRIES);
        assert!(logs.entries()[0].ends_with("line 5"));
        assert_eq!(logs.entries()[0].as_bytes()[2], b':');
    }

    #[test]
    fn scrolling_stays_within_the_entries() {
        let mut logs = LogsState::new();
        logs.append("a");
        logs.append("b");
        logs.scroll(true, 10);
        assert_eq!(logs.scroll_from_bottom, 1);
        logs.scroll(false, 10);
        assert_eq!(logs.scroll_from_bottom, 0);
    }
}
