pub mod config;
pub mod http;
pub mod preferences;
pub mod text_processing;

pub use config::{API_BASE_ENV, DEFAULT_API_BASE, resolve_api_base};
pub use preferences::{PreferencesError, UserPreferences, expand_tilde};
pub use text_processing::{split_urls, truncate_to_width, url_spans};
