use ratatui::layout::Rect;
use senpy_types::Route;

/// A single item in the vertical navigation bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    /// Icon to display for the item (e.g., "[Anl]").
    pub icon: String,
    /// Human-friendly description of the item (e.g., "Analyse").
    pub label: String,
    /// Route associated with this item
    pub route: Route,
}

impl NavItem {
    pub fn new(icon: impl Into<String>, label: impl Into<String>, route: Route) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
            route,
        }
    }
}

/// State for the vertical navigation bar.
#[derive(Debug, Default, Clone)]
pub struct VerticalNavBarState {
    /// Items displayed in the navigation bar.
    pub items: Vec<NavItem>,
    /// Index of the item whose view is shown.
    pub selected_index: usize,
    /// Index of the item under the keyboard cursor while the bar has focus.
    pub cursor_index: usize,
    /// Last rendered area of the nav bar; used for mouse hit testing.
    pub last_area: Rect,
    /// Last computed per-item row areas for hit testing.
    pub per_item_areas: Vec<Rect>,
}

impl VerticalNavBarState {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// The three views of the console.
    pub fn defaults_for_views() -> Self {
        Self::new(vec![
            NavItem::new("[Anl]", "Analyse", Route::Analyse),
            NavItem::new("[Plg]", "Plugins", Route::Plugins),
            NavItem::new("[Evl]", "Evaluate", Route::Evaluate),
        ])
    }

    /// Mark the item for `route` as selected and move the cursor onto it.
    pub fn set_route(&mut self, route: Route) -> Route {
        if let Some(index) = self.items.iter().position(|item| item.route == route) {
            self.selected_index = index;
            self.cursor_index = index;
        }
        route
    }

    /// Move the cursor, wrapping at both ends.
    pub fn cycle_cursor(&mut self, forward: bool) {
        let length = self.items.len();
        if length == 0 {
            return;
        }
        self.cursor_index = if forward {
            (self.cursor_index + 1) % length
        } else {
            (self.cursor_index + length - 1) % length
        };
    }

    pub fn item_under_cursor(&self) -> Option<&NavItem> {
        self.items.get(self.cursor_index)
    }
}
