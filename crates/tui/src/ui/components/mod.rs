pub mod alert;
pub mod analyse;
pub mod common;
pub mod component;
pub mod evaluate;
pub mod help;
pub mod logs;
pub mod nav_bar;
pub mod plugins;
pub mod results;

pub use alert::AlertComponent;
pub use analyse::AnalyseComponent;
pub use component::*;
pub use evaluate::EvaluateComponent;
pub use help::HelpComponent;
pub use logs::LogsComponent;
pub use nav_bar::VerticalNavBarComponent;
pub use plugins::PluginsComponent;
