use crate::Result;
use crate::extract::DocumentResult;
use crate::fetch::FetchOutcome;

/// Configuration for JSON output
#[derive(Debug, Clone)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };
    Ok(json)
}

/// Convert an extraction result to JSON
pub fn convert_to_json(result: &DocumentResult, config: &JsonConfig) -> Result<String> {
    to_json(result, config.pretty)
}

/// Convert a fetch outcome to JSON (for URL and batch input)
pub fn outcome_to_json(outcome: &FetchOutcome, pretty: bool) -> Result<String> {
    to_json(outcome, pretty)
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, result: &DocumentResult) -> Result<String> {
        convert_to_json(result, &self.config)
    }

    pub fn outcome(&self, outcome: &FetchOutcome) -> Result<String> {
        outcome_to_json(outcome, self.config.pretty)
    }
}
