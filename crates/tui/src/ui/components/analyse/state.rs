use senpy_engine::{Control, FormField, FormKind, SessionState};

use crate::ui::components::common::TextInputState;
use crate::ui::components::results::ResultsState;

/// Focus targets of the analysis view, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyseFocus {
    #[default]
    Input,
    Plugin,
    Pipeline,
    OutFormat,
    /// A generated parameter control, by position in its form
    Field(FormKind, usize),
    Submit,
    Results,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyseState {
    pub focus: AnalyseFocus,
    /// Mirror of `SessionState::input` with a cursor
    pub input: TextInputState,
    /// Editor for the focused free-text parameter
    pub field_editor: TextInputState,
    /// Plugin offered by the pipeline's add/remove controls
    pub stage_candidate: Option<String>,
    pub results: ResultsState,
    /// First form row shown when the form is taller than its area
    pub form_offset: usize,
}

impl AnalyseState {
    pub fn focus_order(session: &SessionState) -> Vec<AnalyseFocus> {
        let mut order = vec![
            AnalyseFocus::Input,
            AnalyseFocus::Plugin,
            AnalyseFocus::Pipeline,
            AnalyseFocus::OutFormat,
        ];
        for kind in [FormKind::Basic, FormKind::Extra] {
            let count = session.form(kind).fields().len();
            order.extend((0..count).map(|index| AnalyseFocus::Field(kind, index)));
        }
        order.push(AnalyseFocus::Submit);
        order.push(AnalyseFocus::Results);
        order
    }

    pub fn move_focus(&mut self, session: &SessionState, forward: bool) {
        let order = Self::focus_order(session);
        let length = order.len();
        let position = order.iter().position(|focus| *focus == self.focus).unwrap_or(0);
        let next = if forward { (position + 1) % length } else { (position + length - 1) % length };
        self.focus = order[next];
        self.load_editor(session);
    }

    /// The parameter under focus, with the form it belongs to.
    pub fn focused_field<'a>(&self, session: &'a SessionState) -> Option<(FormKind, &'a FormField)> {
        match self.focus {
            AnalyseFocus::Field(kind, index) => session.form(kind).fields().get(index).map(|field| (kind, field)),
            _ => None,
        }
    }

    /// Load the focused text parameter into the editor.
    pub fn load_editor(&mut self, session: &SessionState) {
        let value = match self.focused_field(session) {
            Some((_, FormField { control: Control::Text { value }, .. })) => value.clone(),
            _ => String::new(),
        };
        self.field_editor.set_input(value);
    }

    /// Bring the view state back in line with the session after a reducer
    /// step: a vanished field moves focus to the pipeline, the input mirror
    /// follows the session and the stage candidate stays selectable.
    pub fn reconcile(&mut self, session: &SessionState, reload_editor: bool) {
        if !Self::focus_order(session).contains(&self.focus) {
            self.focus = AnalyseFocus::Pipeline;
        }
        if self.input.input() != session.input {
            self.input.set_input(session.input.clone());
        }
        let candidate_valid = self
            .stage_candidate
            .as_deref()
            .is_some_and(|name| session.catalog.is_selectable(name));
        if !candidate_valid {
            self.stage_candidate = session.catalog.step_selection(None, true).map(str::to_string);
        }
        if reload_editor {
            self.load_editor(session);
        }
    }

    pub fn step_candidate(&mut self, session: &SessionState, forward: bool) {
        self.stage_candidate = session
            .catalog
            .step_selection(self.stage_candidate.as_deref(), forward)
            .map(str::to_string);
    }
}
