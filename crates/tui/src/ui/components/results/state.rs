use crate::ui::utils::clamp_scroll;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultsTab {
    /// Pretty-printed, highlighted JSON
    #[default]
    Viewer,
    /// Body as received, URLs highlighted
    Raw,
    /// Triples of the same analysis as an adjacency listing
    Graph,
}

impl ResultsTab {
    pub const ALL: [ResultsTab; 3] = [ResultsTab::Viewer, ResultsTab::Raw, ResultsTab::Graph];

    pub fn title(&self) -> &'static str {
        match self {
            ResultsTab::Viewer => "Viewer",
            ResultsTab::Raw => "Raw",
            ResultsTab::Graph => "Graph",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|tab| tab == self).unwrap_or(0)
    }

    pub fn step(&self, forward: bool) -> Self {
        let length = Self::ALL.len();
        let index = self.index();
        let next = if forward { (index + 1) % length } else { (index + length - 1) % length };
        Self::ALL[next]
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultsState {
    pub tab: ResultsTab,
    pub scroll: u16,
    /// Layout of the last render, used to clamp scrolling
    pub viewport_height: u16,
    pub line_count: usize,
}

impl ResultsState {
    pub fn select_tab(&mut self, tab: ResultsTab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll = 0;
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = (self.scroll as i32 + delta).max(0);
        let target = u16::try_from(target).unwrap_or(u16::MAX);
        self.scroll = clamp_scroll(target, self.line_count, self.viewport_height);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_wrap_in_both_directions() {
        assert_eq!(ResultsTab::Viewer.step(false), ResultsTab::Graph);
        assert_eq!(ResultsTab::Graph.step(true), ResultsTab::Viewer);
        assert_eq!(ResultsTab::Raw.index(), 1);
    }

    #[test]
    fn switching_tabs_resets_scroll() {
        let mut state = ResultsState {
            line_count: 100,
            viewport_height: 10,
            ..ResultsState::default()
        };
        state.scroll_by(25);
        assert_eq!(state.scroll, 25);
        state.scroll_by(500);
        assert_eq!(state.scroll, 90);
        state.select_tab(ResultsTab::Raw);
        assert_eq!(state.scroll, 0);
        state.scroll_by(-3);
        assert_eq!(state.scroll, 0);
    }
}
