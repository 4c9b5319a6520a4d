mod alert_component;

pub use alert_component::AlertComponent;
