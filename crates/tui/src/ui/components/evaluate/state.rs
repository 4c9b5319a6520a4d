use ratatui::widgets::TableState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluateFocus {
    #[default]
    Plugin,
    Datasets,
    Submit,
    Metrics,
}

impl EvaluateFocus {
    const ORDER: [EvaluateFocus; 4] = [
        EvaluateFocus::Plugin,
        EvaluateFocus::Datasets,
        EvaluateFocus::Submit,
        EvaluateFocus::Metrics,
    ];

    pub fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let index = Self::ORDER.iter().position(|focus| *focus == self).unwrap_or(0);
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        Self::ORDER[next]
    }
}

#[derive(Debug, Default)]
pub struct EvaluateState {
    pub focus: EvaluateFocus,
    /// Row of the dataset checklist under the cursor
    pub dataset_cursor: usize,
    pub metrics_table: TableState,
}

impl EvaluateState {
    pub fn move_dataset_cursor(&mut self, dataset_count: usize, forward: bool) {
        if dataset_count == 0 {
            self.dataset_cursor = 0;
            return;
        }
        self.dataset_cursor = if forward {
            (self.dataset_cursor + 1).min(dataset_count - 1)
        } else {
            self.dataset_cursor.saturating_sub(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_in_both_directions() {
        assert_eq!(EvaluateFocus::Plugin.step(true), EvaluateFocus::Datasets);
        assert_eq!(EvaluateFocus::Metrics.step(true), EvaluateFocus::Plugin);
        assert_eq!(EvaluateFocus::Plugin.step(false), EvaluateFocus::Metrics);
    }

    #[test]
    fn dataset_cursor_is_clamped() {
        let mut state = EvaluateState::default();
        state.move_dataset_cursor(2, true);
        state.move_dataset_cursor(2, true);
        assert_eq!(state.dataset_cursor, 1);
        state.move_dataset_cursor(2, false);
        state.move_dataset_cursor(2, false);
        assert_eq!(state.dataset_cursor, 0);
        state.move_dataset_cursor(0, true);
        assert_eq!(state.dataset_cursor, 0);
    }
}
