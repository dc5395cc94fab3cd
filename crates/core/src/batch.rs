//! Concurrent batch fetching.
//!
//! A [`BatchRequest`] names a set of URLs, each with an opaque `meta` value.
//! [`fetch_batch`] fetches them concurrently and collects one
//! [`FetchOutcome`] per URL. [`fetch_batch_into`] hands each outcome to a
//! [`ResultSink`] as soon as it completes instead.
//!
//! A failing item only affects its own outcome.
//!
//! # Example
//!
//! ```rust,no_run
//! use ogmeta_core::{BatchRequest, FetchConfig, fetch_batch};
//!
//! # async fn example() -> ogmeta_core::Result<()> {
//! let request: BatchRequest = serde_json::from_str(
//!     r#"{"batch": [{"url": "https://example.com/", "meta": {"id": 1}}]}"#,
//! )?;
//! for outcome in fetch_batch(request, &FetchConfig::default()).await? {
//!     println!("{}: {:?}", outcome.result.url, outcome.err);
//! }
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::io::Write;
use std::pin::pin;
use std::sync::Mutex;

use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;

use crate::fetch::{FetchConfig, FetchOutcome, build_client, fetch_with_client};
use crate::{OgmetaError, Result};

/// A set of pages to fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub batch: Option<Vec<BatchItem>>,
    #[serde(default)]
    pub options: BatchOptions,
}

/// One page of a batch. Items without a URL are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchItem {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Per-batch overrides of the fetch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    /// User-Agent prefix for every request in the batch.
    pub user_agent: Option<String>,
    /// Maximum number of requests in flight (default: all at once).
    pub concurrency: Option<usize>,
}

/// Counts reported by [`fetch_batch_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items that were fetched.
    pub fetched: usize,
    /// Items whose outcome carries an error.
    pub failed: usize,
    /// Outcomes the sink did not accept.
    pub undelivered: usize,
}

/// Destination for batch outcomes, such as a message queue.
pub trait ResultSink {
    fn deliver(&self, outcome: &FetchOutcome) -> impl Future<Output = Result<()>> + Send;
}

/// Writes each outcome as one line of JSON.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    async fn deliver(&self, outcome: &FetchOutcome) -> Result<()> {
        let line = serde_json::to_string(outcome)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| OgmetaError::SinkError("writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

/// Fetches every item of `request` and collects the outcomes in completion order.
///
/// # Errors
///
/// Returns [`OgmetaError::InvalidBatch`] when the request has no `batch`
/// array, or the client error when no HTTP client can be built.
pub async fn fetch_batch(request: BatchRequest, config: &FetchConfig) -> Result<Vec<FetchOutcome>> {
    let batch = PreparedBatch::new(request, config)?;
    let client = build_client(&batch.config)?;

    Ok(batch.outcomes(&client).collect().await)
}

/// Fetches every item of `request`, delivering each outcome to `sink` as it
/// completes.
///
/// Delivery failures are logged and counted; they never stop the batch.
pub async fn fetch_batch_into<S: ResultSink>(
    request: BatchRequest, config: &FetchConfig, sink: &S,
) -> Result<BatchSummary> {
    let batch = PreparedBatch::new(request, config)?;
    let client = build_client(&batch.config)?;

    let mut summary = BatchSummary::default();
    let mut outcomes = pin!(batch.outcomes(&client));

    while let Some(outcome) = outcomes.next().await {
        summary.fetched += 1;
        if !outcome.is_ok() {
            summary.failed += 1;
        }
        if let Err(e) = sink.deliver(&outcome).await {
            tracing::warn!(url = %outcome.result.url, error = %e, "failed to deliver batch result");
            summary.undelivered += 1;
        }
    }

    Ok(summary)
}

/// A validated batch with its options applied.
struct PreparedBatch {
    items: Vec<(String, serde_json::Value)>,
    config: FetchConfig,
    concurrency: usize,
}

impl PreparedBatch {
    fn new(request: BatchRequest, config: &FetchConfig) -> Result<Self> {
        let Some(batch) = request.batch else {
            return Err(OgmetaError::InvalidBatch("Unknown input data".to_string()));
        };

        let mut config = config.clone();
        if let Some(user_agent) = request.options.user_agent {
            config.user_agent = Some(user_agent);
        }

        let items: Vec<_> = batch
            .into_iter()
            .filter_map(|item| Some((item.url?, item.meta.unwrap_or_else(|| serde_json::json!({})))))
            .collect();

        let concurrency = request.options.concurrency.unwrap_or(items.len()).max(1);
        tracing::debug!(items = items.len(), concurrency, "starting batch");

        Ok(Self { items, config, concurrency })
    }

    fn outcomes<'a>(&'a self, client: &'a Client) -> impl Stream<Item = FetchOutcome> + 'a {
        let config = &self.config;
        stream::iter(self.items.iter().cloned())
            .map(move |(url, meta)| async move { fetch_with_client(client, &url, meta, config).await })
            .buffer_unordered(self.concurrency)
    }
}
