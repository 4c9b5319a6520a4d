//! Building blocks shared by several views.

pub mod json_syntax;
pub mod raw_text;
pub mod text_input;

pub use json_syntax::highlight_pretty_json_lines;
pub use raw_text::highlight_url_lines;
pub use text_input::{TextInputState, render_text_input};
