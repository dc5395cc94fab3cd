pub mod json;
pub mod text;

pub use json::{JsonConfig, JsonFormatter, convert_to_json, outcome_to_json};
pub use text::{TextConfig, TextFormatter, convert_to_text};
