use ratatui::widgets::ListState;
use senpy_engine::PluginCatalog;

/// One line of the grouped plugin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginRow {
    Header(String),
    Plugin(String),
}

/// Cursor over the plugin list. Headers are never selected.
#[derive(Debug, Default)]
pub struct PluginsState {
    pub list_state: ListState,
}

impl PluginsState {
    /// Catalog rows in display order: each type header followed by its plugins.
    pub fn rows(catalog: &PluginCatalog) -> Vec<PluginRow> {
        catalog
            .groups()
            .into_iter()
            .flat_map(|group| {
                std::iter::once(PluginRow::Header(group.plugin_type.to_string()))
                    .chain(group.plugins.into_iter().map(|plugin| PluginRow::Plugin(plugin.name.clone())))
            })
            .collect()
    }

    /// Name of the plugin under the cursor.
    pub fn selected_plugin(&self, catalog: &PluginCatalog) -> Option<String> {
        let index = self.list_state.selected()?;
        match Self::rows(catalog).into_iter().nth(index)? {
            PluginRow::Plugin(name) => Some(name),
            PluginRow::Header(_) => None,
        }
    }

    /// Move the cursor to the next plugin row, skipping headers and
    /// stopping at either end.
    pub fn move_cursor(&mut self, catalog: &PluginCatalog, forward: bool) {
        let rows = Self::rows(catalog);
        let plugin_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row, PluginRow::Plugin(_)))
            .map(|(index, _)| index)
            .collect();
        let Some(&first) = plugin_rows.first() else {
            self.list_state.select(None);
            return;
        };
        let next = match self.list_state.selected() {
            None => first,
            Some(current) if forward => plugin_rows.iter().copied().find(|&row| row > current).unwrap_or(current),
            Some(current) => plugin_rows.iter().rev().copied().find(|&row| row < current).unwrap_or(current),
        };
        self.list_state.select(Some(next));
    }

    /// Put the cursor on the first plugin when nothing valid is selected.
    pub fn ensure_selection(&mut self, catalog: &PluginCatalog) {
        if self.selected_plugin(catalog).is_none() {
            self.list_state.select(None);
            self.move_cursor(catalog, true);
        }
    }
}
