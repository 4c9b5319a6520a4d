//! Ordered list of plugins applied before the selected one.

use senpy_types::ParameterSchema;

use crate::catalog::PluginCatalog;

/// Extra stages of an analysis. The selected plugin is implicitly the last
/// stage and is not stored here. Duplicates are allowed; insertion order is
/// execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<String>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn add_stage(&mut self, name: impl Into<String>) {
        self.stages.push(name.into());
    }

    /// Remove the first stage named `name`. Returns whether one was removed.
    pub fn remove_stage(&mut self, name: &str) -> bool {
        match self.stages.iter().position(|stage| stage == name) {
            Some(index) => {
                self.stages.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.stages.clear();
    }

    /// Fold every stage's `extra_params` in order, then the selected
    /// plugin's. A later definition of a parameter replaces an earlier one.
    /// Names missing from the catalog contribute nothing.
    pub fn merged_schema(&self, selected: Option<&str>, catalog: &PluginCatalog) -> ParameterSchema {
        let mut merged = ParameterSchema::new();
        for name in self.stages.iter().map(String::as_str).chain(selected) {
            if let Some(params) = catalog.extra_params(name) {
                for (key, descriptor) in params {
                    merged.insert(key.clone(), descriptor.clone());
                }
            }
        }
        merged
    }

    /// The `algo` request value: stage names then the selected plugin,
    /// comma-joined.
    pub fn serialized_argument(&self, selected: &str) -> String {
        let mut names: Vec<&str> = self.stages.iter().map(String::as_str).collect();
        names.push(selected);
        names.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{catalog, plugin};

    #[test]
    fn serialized_argument_joins_stages_and_selection() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.serialized_argument("C"), "C");
        pipeline.add_stage("A");
        pipeline.add_stage("B");
        assert_eq!(pipeline.serialized_argument("C"), "A,B,C");
    }

    #[test]
    fn remove_stage_drops_first_match_only() {
        let mut pipeline = Pipeline::new();
        assert!(!pipeline.remove_stage("A"));
        assert!(pipeline.is_empty());

        pipeline.add_stage("A");
        pipeline.add_stage("B");
        pipeline.add_stage("A");
        assert!(pipeline.remove_stage("A"));
        assert_eq!(pipeline.stages(), ["B".to_string(), "A".to_string()]);
        assert!(!pipeline.remove_stage("missing"));
        assert_eq!(pipeline.stages().len(), 2);
    }

    #[test]
    fn selected_plugin_wins_merged_parameters() {
        let catalog = catalog(
            vec![
                plugin("A", "t", true, &[("k", &["a"], Some("a")), ("only_a", &[], None)]),
                plugin("B", "t", true, &[("k", &["b"], Some("b"))]),
                plugin("C", "t", true, &[("k", &["c"], Some("c"))]),
            ],
            None,
        );
        let mut pipeline = Pipeline::new();
        pipeline.add_stage("A");
        pipeline.add_stage("B");
        pipeline.add_stage("unknown");

        let merged = pipeline.merged_schema(Some("C"), &catalog);
        assert_eq!(merged["k"].default_text().as_deref(), Some("c"));
        assert!(merged.contains_key("only_a"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merged_schema_without_selection_uses_stages() {
        let catalog = catalog(vec![plugin("A", "t", true, &[("k", &[], Some("a"))])], None);
        let mut pipeline = Pipeline::new();
        assert!(pipeline.merged_schema(None, &catalog).is_empty());
        pipeline.add_stage("A");
        assert_eq!(pipeline.merged_schema(None, &catalog)["k"].default_text().as_deref(), Some("a"));
    }
}
