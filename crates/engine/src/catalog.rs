//! Plugin catalog built from the startup metadata.
//!
//! The catalog owns the plugin list, the default selection, the datasets
//! available for evaluation and the service-wide ("basic") parameter schema.
//! It is immutable once built; every selector in the UI reads from it.

use indexmap::IndexMap;
use senpy_types::{CatalogSnapshot, Dataset, ParameterSchema, Plugin};
use tracing::warn;

use crate::request::strip_reserved;

/// Plugins sharing one `@type`, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginGroup<'a> {
    pub plugin_type: &'a str,
    pub plugins: Vec<&'a Plugin>,
}

#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    plugins: Vec<Plugin>,
    default_plugin: Option<String>,
    datasets: Vec<Dataset>,
    basic_schema: ParameterSchema,
}

impl PluginCatalog {
    /// Build the catalog from a freshly loaded snapshot.
    ///
    /// Plugins without a name are skipped, as are repeated names (the first
    /// entry wins). Reserved parameters are removed from the basic schema.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let mut plugins: Vec<Plugin> = Vec::with_capacity(snapshot.plugins.len());
        for plugin in snapshot.plugins {
            if !plugin.has_name() {
                warn!(plugin_type = %plugin.plugin_type, "skipping plugin without a name");
                continue;
            }
            if plugins.iter().any(|known| known.name == plugin.name) {
                warn!(name = %plugin.name, "skipping duplicate plugin");
                continue;
            }
            plugins.push(plugin);
        }

        Self {
            plugins,
            default_plugin: snapshot.default_plugin.map(|plugin| plugin.name).filter(|name| !name.is_empty()),
            datasets: snapshot.datasets,
            basic_schema: strip_reserved(&snapshot.basic_parameters),
        }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    /// Plugin-specific parameters; `None` for unknown plugins.
    pub fn extra_params(&self, name: &str) -> Option<&ParameterSchema> {
        self.get(name).map(|plugin| &plugin.extra_params)
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn basic_schema(&self) -> &ParameterSchema {
        &self.basic_schema
    }

    pub fn is_selectable(&self, name: &str) -> bool {
        self.get(name).is_some_and(|plugin| plugin.is_activated)
    }

    /// Plugins grouped by `@type`. Groups appear in the order their first
    /// member appears in the server listing.
    pub fn groups(&self) -> Vec<PluginGroup<'_>> {
        let mut grouped: IndexMap<&str, Vec<&Plugin>> = IndexMap::new();
        for plugin in &self.plugins {
            grouped.entry(plugin.plugin_type.as_str()).or_default().push(plugin);
        }
        grouped
            .into_iter()
            .map(|(plugin_type, plugins)| PluginGroup { plugin_type, plugins })
            .collect()
    }

    /// Names in selector order (grouped), including disabled entries.
    pub fn selector_order(&self) -> Vec<&str> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.plugins.into_iter().map(|plugin| plugin.name.as_str()))
            .collect()
    }

    /// The preselected plugin: the server default when it can be selected,
    /// otherwise the first selectable entry in selector order.
    pub fn default_selection(&self) -> Option<&str> {
        if let Some(name) = self.default_plugin.as_deref()
            && self.is_selectable(name)
        {
            return self.get(name).map(|plugin| plugin.name.as_str());
        }
        self.selector_order().into_iter().find(|name| self.is_selectable(name))
    }

    /// The next selectable plugin after `current` in selector order, wrapping.
    /// Disabled plugins are skipped.
    pub fn step_selection(&self, current: Option<&str>, forward: bool) -> Option<&str> {
        let mut order = self.selector_order();
        if !forward {
            order.reverse();
        }
        let start = current
            .and_then(|name| order.iter().position(|candidate| *candidate == name))
            .map(|index| index + 1)
            .unwrap_or(0);
        (0..order.len())
            .map(|offset| order[(start + offset) % order.len()])
            .find(|name| self.is_selectable(name))
    }
}
