pub mod accumulator;
#[cfg(feature = "fetch")]
pub mod batch;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod links;
pub mod normalize;
pub mod parse;
pub mod path;
pub mod value;

pub use accumulator::{GroupedEntry, Namespace, RootAccumulator, accumulate};
#[cfg(feature = "fetch")]
pub use batch::{BatchItem, BatchOptions, BatchRequest, BatchSummary, JsonLinesSink, ResultSink};
#[cfg(feature = "fetch")]
pub use batch::{fetch_batch, fetch_batch_into};
pub use error::{OgmetaError, Result};
pub use extract::{DEFAULT_HEADER_ALLOWLIST, DEFAULT_MAX_DEPTH, DEFAULT_OG_TYPES};
pub use extract::{DocumentResult, ExtractConfig, ExtractConfigBuilder, Extractor, MetaProperties};
pub use extract::{extract, extract_with_config};
pub use fetch::{ACCEPT_HTML, USER_AGENT_PRODUCT};
pub use fetch::{FetchConfig, FetchOutcome, FetchResult};
pub use fetch::{fetch_file, fetch_stdin};
#[cfg(feature = "fetch")]
pub use fetch::{fetch_url, fetch_with_client};
pub use formatters::{JsonConfig, JsonFormatter, TextConfig, TextFormatter};
pub use formatters::{convert_to_json, convert_to_text, outcome_to_json};
pub use links::{LinkDescriptor, LinkRelations, collect_links};
pub use normalize::normalize_og;
pub use parse::{Document, Element};
pub use path::PropertyPath;
pub use value::{PropertyValue, convert, resolve_url};
