//! Plain-text renderings for the subcommands.

use std::fmt::Write;

use senpy_engine::{Control, FormDescription, MetricRow, PluginCatalog};
use senpy_types::{CatalogSnapshot, Plugin};

/// Plugins grouped by type, one line per plugin.
pub fn plugin_listing(plugins: &[Plugin]) -> String {
    let catalog = PluginCatalog::from_snapshot(CatalogSnapshot {
        plugins: plugins.to_vec(),
        ..Default::default()
    });
    let mut out = String::new();
    for group in catalog.groups() {
        let _ = writeln!(out, "{}", group.plugin_type);
        for plugin in group.plugins {
            let version = plugin.version.as_deref().unwrap_or("-");
            let status = if plugin.is_activated { "" } else { "  (not activated)" };
            let _ = writeln!(out, "  {:<24} {version}{status}", plugin.name);
            if let Some(description) = plugin.description.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
                let _ = writeln!(out, "      {description}");
            }
        }
    }
    out
}

/// Parameter names with their control, default and help text.
pub fn form_listing(description: &FormDescription) -> String {
    let fields = match description {
        FormDescription::Placeholder(message) => return format!("{message}\n"),
        FormDescription::Fields(fields) => fields,
    };
    let mut out = String::new();
    for field in fields {
        let required = if field.required { " (required)" } else { "" };
        let control = match &field.control {
            Control::Choice { options, .. } => format!("one of {}", options.join(", ")),
            Control::Text { .. } => "text".to_string(),
        };
        let default = field
            .control
            .value()
            .filter(|value| !value.is_empty())
            .map(|value| format!(" [default: {value}]"))
            .unwrap_or_default();
        let _ = writeln!(out, "{}{required}: {control}{default}", field.name);
        if let Some(help) = field.help.as_deref() {
            let _ = writeln!(out, "    {help}");
        }
    }
    out
}

/// Tab-separated evaluation table with a header row.
pub fn metrics_table(headers: &[String], rows: &[MetricRow]) -> String {
    let mut out = String::from("Plugin\tDataset");
    for header in headers {
        out.push('\t');
        out.push_str(header);
    }
    out.push('\n');
    for row in rows {
        let _ = write!(out, "{}\t{}", row.evaluates, row.evaluates_on);
        for cell in &row.cells {
            out.push('\t');
            out.push_str(cell);
        }
        out.push('\n');
    }
    out
}
