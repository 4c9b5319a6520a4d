//! Parameter forms generated from a [`ParameterSchema`].
//!
//! A schema becomes a list of fields sorted by parameter name. Each field is
//! either a closed choice (when the descriptor carries `options`) or a free
//! text entry. [`FormState`] holds the user's edits and reads them back as the
//! query parameters to send.

use indexmap::IndexMap;
use senpy_types::{ParameterDescriptor, ParameterSchema};

/// Shown instead of an empty field list.
pub const NO_PARAMETERS_MESSAGE: &str = "This plugin does not take any extra parameters";

/// Values never forwarded from a form.
const SKIPPED_VALUES: [&str; 2] = ["", "undefined"];

/// Parameter name to the string value to send, in form order.
pub type FormValues = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Closed set of options; `selected` indexes into `options`.
    Choice { options: Vec<String>, selected: Option<usize> },
    Text { value: String },
}

impl Control {
    fn from_descriptor(descriptor: &ParameterDescriptor) -> Self {
        let default = descriptor.default_text();
        match descriptor.effective_options() {
            Some(options) => {
                let selected = default
                    .as_deref()
                    .and_then(|default| options.iter().position(|option| option == default));
                Control::Choice { options, selected }
            }
            None => Control::Text {
                value: default.unwrap_or_default(),
            },
        }
    }

    /// Current value, `None` for a choice without a selection.
    pub fn value(&self) -> Option<&str> {
        match self {
            Control::Choice { options, selected } => selected.and_then(|index| options.get(index)).map(String::as_str),
            Control::Text { value } => Some(value.as_str()),
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Control::Choice { .. })
    }
}

/// One rendered parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    /// Parameter name, also used as the label
    pub name: String,
    /// Tooltip text from the schema
    pub help: Option<String>,
    pub required: bool,
    pub control: Control,
    /// Set once the user changes the control; only edited values survive a rebuild
    pub edited: bool,
}

/// What a form container shows for a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormDescription {
    /// Informational text instead of controls
    Placeholder(&'static str),
    Fields(Vec<FormField>),
}

/// Describe the controls for `schema`, sorted by parameter name, with
/// defaults applied.
pub fn describe(schema: &ParameterSchema) -> FormDescription {
    if schema.is_empty() {
        return FormDescription::Placeholder(NO_PARAMETERS_MESSAGE);
    }

    let mut names: Vec<&String> = schema.keys().collect();
    names.sort();

    let fields = names
        .into_iter()
        .map(|name| {
            let descriptor = &schema[name];
            FormField {
                name: name.clone(),
                help: descriptor.description.clone(),
                required: descriptor.required,
                control: Control::from_descriptor(descriptor),
                edited: false,
            }
        })
        .collect();
    FormDescription::Fields(fields)
}

/// Editable form container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    description: FormDescription,
}

impl Default for FormState {
    fn default() -> Self {
        Self::from_schema(&ParameterSchema::new())
    }
}

impl FormState {
    pub fn from_schema(schema: &ParameterSchema) -> Self {
        Self {
            description: describe(schema),
        }
    }

    /// Replace the controls with those of `schema`.
    ///
    /// A parameter the user edited keeps its value when the new schema still
    /// has it (and, for a choice, still offers that value). Every other field
    /// starts from the new schema's default.
    pub fn rebuild(&mut self, schema: &ParameterSchema) {
        let mut next = describe(schema);
        if let FormDescription::Fields(fields) = &mut next {
            for field in fields.iter_mut() {
                let Some(previous) = self.field(&field.name).filter(|previous| previous.edited) else {
                    continue;
                };
                if field.control.is_choice() != previous.control.is_choice() {
                    continue;
                }
                let Some(old_value) = previous.control.value() else {
                    continue;
                };
                match &mut field.control {
                    Control::Text { value } => {
                        *value = old_value.to_string();
                        field.edited = true;
                    }
                    Control::Choice { options, selected } => {
                        if let Some(index) = options.iter().position(|option| option == old_value) {
                            *selected = Some(index);
                            field.edited = true;
                        }
                    }
                }
            }
        }
        self.description = next;
    }

    pub fn description(&self) -> &FormDescription {
        &self.description
    }

    pub fn fields(&self) -> &[FormField] {
        match &self.description {
            FormDescription::Fields(fields) => fields,
            FormDescription::Placeholder(_) => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self.description {
            FormDescription::Placeholder(message) => Some(message),
            FormDescription::Fields(_) => None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields().iter().find(|field| field.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        match &mut self.description {
            FormDescription::Fields(fields) => fields.iter_mut().find(|field| field.name == name),
            FormDescription::Placeholder(_) => None,
        }
    }

    /// Move a choice control to the next (or previous) option, wrapping.
    /// From no selection, forward picks the first option and backward the
    /// last. Returns `false` when `name` is not a choice control.
    pub fn cycle_choice(&mut self, name: &str, forward: bool) -> bool {
        let Some(FormField {
            control: Control::Choice { options, selected },
            edited,
            ..
        }) = self.field_mut(name)
        else {
            return false;
        };
        if options.is_empty() {
            return true;
        }
        *edited = true;
        let last = options.len() - 1;
        *selected = Some(match (*selected, forward) {
            (None, true) => 0,
            (None, false) => last,
            (Some(index), true) => (index + 1) % options.len(),
            (Some(0), false) => last,
            (Some(index), false) => index - 1,
        });
        true
    }

    /// Replace the value of a text control. Returns `false` when `name` is
    /// not a text control.
    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> bool {
        match self.field_mut(name) {
            Some(FormField {
                control: Control::Text { value },
                edited,
                ..
            }) => {
                *value = text.into();
                *edited = true;
                true
            }
            _ => false,
        }
    }

    /// Read every control back as a parameter value, omitting empty and
    /// `"undefined"` values and choices without a selection.
    pub fn extract_values(&self) -> FormValues {
        self.fields()
            .iter()
            .filter_map(|field| {
                let value = field.control.value()?;
                (!SKIPPED_VALUES.contains(&value)).then(|| (field.name.clone(), value.to_string()))
            })
            .collect()
    }
}

/// Overlay `extra` on `basic`; extra values win on collision.
pub fn merge_values(basic: FormValues, extra: FormValues) -> FormValues {
    let mut merged = basic;
    merged.extend(extra);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> ParameterSchema {
        serde_json::from_value(value).expect("schema")
    }

    #[test]
    fn fields_are_sorted_by_name() {
        let form = FormState::from_schema(&schema(json!({
            "zeta": {}, "alpha": {}, "mid": { "options": ["a", "b"] }
        })));
        let names: Vec<&str> = form.fields().iter().map(|field| field.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn boolean_options_become_true_false_choice() {
        let form = FormState::from_schema(&schema(json!({
            "expanded": { "options": ["boolean"], "default": true }
        })));
        assert_eq!(
            form.fields()[0].control,
            Control::Choice {
                options: vec!["true".into(), "false".into()],
                selected: Some(0),
            }
        );
    }

    #[test]
    fn defaults_select_and_prefill_controls() {
        let form = FormState::from_schema(&schema(json!({
            "language": { "options": ["en", "es"], "default": "es" },
            "unknown_default": { "options": ["en", "es"], "default": "fr" },
            "no_default": { "options": ["en", "es"] },
            "min": { "default": 0.5, "description": "threshold" },
            "prefix": {}
        })));
        assert_eq!(form.field("language").and_then(|f| f.control.value()), Some("es"));
        assert_eq!(form.field("unknown_default").and_then(|f| f.control.value()), None);
        assert_eq!(form.field("no_default").and_then(|f| f.control.value()), None);
        assert_eq!(form.field("min").and_then(|f| f.control.value()), Some("0.5"));
        assert_eq!(form.field("min").and_then(|f| f.help.as_deref()), Some("threshold"));
        assert_eq!(form.field("prefix").and_then(|f| f.control.value()), Some(""));
    }

    #[test]
    fn empty_schema_shows_placeholder() {
        let form = FormState::from_schema(&ParameterSchema::new());
        assert_eq!(form.placeholder(), Some(NO_PARAMETERS_MESSAGE));
        assert!(form.fields().is_empty());
        assert!(form.extract_values().is_empty());
    }

    #[test]
    fn extract_skips_empty_and_undefined_values() {
        let mut form = FormState::from_schema(&schema(json!({
            "a": { "default": "keep" },
            "b": {},
            "c": { "default": "undefined" },
            "d": { "options": ["x", "y"] },
            "e": { "options": ["x", "y"], "default": "y" }
        })));
        let values = form.extract_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("a").map(String::as_str), Some("keep"));
        assert_eq!(values.get("e").map(String::as_str), Some("y"));

        assert!(form.set_text("a", ""));
        assert!(!form.extract_values().contains_key("a"));
        assert!(form.extract_values().values().all(|value| !value.is_empty() && value != "undefined"));
    }

    #[test]
    fn choices_cycle_in_both_directions() {
        let mut form = FormState::from_schema(&schema(json!({
            "language": { "options": ["en", "es", "fr"] }
        })));
        let value = |form: &FormState| form.field("language").and_then(|f| f.control.value()).map(str::to_string);

        assert!(form.cycle_choice("language", false));
        assert_eq!(value(&form).as_deref(), Some("fr"));
        form.cycle_choice("language", true);
        assert_eq!(value(&form).as_deref(), Some("en"));
        form.cycle_choice("language", false);
        assert_eq!(value(&form).as_deref(), Some("fr"));
        assert!(!form.cycle_choice("missing", true));
        assert!(!form.set_text("language", "en"));
    }

    #[test]
    fn rebuild_keeps_edited_values_that_still_fit() {
        let mut form = FormState::from_schema(&schema(json!({
            "language": { "options": ["en", "es"], "default": "en" },
            "prefix": { "default": "a" },
            "gone": { "default": "x" }
        })));
        form.cycle_choice("language", true);
        form.set_text("prefix", "edited");

        form.rebuild(&schema(json!({
            "language": { "options": ["es", "it"], "default": "it" },
            "prefix": { "default": "b" },
            "new": { "default": "n" }
        })));
        assert_eq!(form.field("language").and_then(|f| f.control.value()), Some("es"));
        assert_eq!(form.field("prefix").and_then(|f| f.control.value()), Some("edited"));
        assert_eq!(form.field("new").and_then(|f| f.control.value()), Some("n"));
        assert!(form.field("gone").is_none());

        form.rebuild(&schema(json!({ "language": { "options": ["de"], "default": "de" } })));
        assert_eq!(form.field("language").and_then(|f| f.control.value()), Some("de"));
    }

    #[test]
    fn rebuild_applies_new_defaults_to_untouched_fields() {
        let mut form = FormState::from_schema(&schema(json!({
            "language": { "options": ["en", "es"], "default": "en" },
            "prefix": { "default": "a" },
            "suffix": { "default": "z" }
        })));
        form.set_text("suffix", "kept");

        form.rebuild(&schema(json!({
            "language": { "options": ["en", "es"], "default": "es" },
            "prefix": { "default": "b" },
            "suffix": { "default": "y" }
        })));
        let values = form.extract_values();
        assert_eq!(values.get("language").map(String::as_str), Some("es"));
        assert_eq!(values.get("prefix").map(String::as_str), Some("b"));
        assert_eq!(values.get("suffix").map(String::as_str), Some("kept"));
        assert!(!form.field("language").is_some_and(|f| f.edited));

        // An edit survives more than one rebuild.
        form.rebuild(&schema(json!({ "suffix": { "default": "w" } })));
        assert_eq!(form.field("suffix").and_then(|f| f.control.value()), Some("kept"));
    }

    #[test]
    fn extra_values_override_basic_ones() {
        let basic = FormValues::from([("language".to_string(), "en".to_string()), ("informat".to_string(), "text".to_string())]);
        let extra = FormValues::from([("language".to_string(), "es".to_string())]);
        let merged = merge_values(basic, extra);
        assert_eq!(merged.get("language").map(String::as_str), Some("es"));
        assert_eq!(merged.get("informat").map(String::as_str), Some("text"));
    }
}
