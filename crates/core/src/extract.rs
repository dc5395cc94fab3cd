//! Document-level metadata extraction.
//!
//! This module provides the primary API. [`extract`] parses an HTML page and
//! returns a [`DocumentResult`] holding the page's Open Graph data, its
//! type-specific Open Graph data, Facebook/Twitter/generator meta tags, and
//! its link relations.
//!
//! # Example
//!
//! ```rust
//! use ogmeta_core::{GroupedEntry, extract};
//!
//! let html = r#"
//!     <html><head>
//!         <meta property="og:title" content="The Rock">
//!         <meta property="og:type" content="video.movie">
//!         <meta property="og:image" content="/rock.jpg">
//!         <meta property="video:director" content="Michael Bay">
//!     </head></html>
//! "#;
//!
//! let result = extract("http://example.com/", html, None).unwrap();
//! assert_eq!(result.og["image"], vec![GroupedEntry::with_value("http://example.com/rock.jpg")]);
//! assert_eq!(result.og_type.as_deref(), Some("video"));
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Result;
use crate::accumulator::{Namespace, RootAccumulator};
use crate::links::{LinkRelations, collect_links};
use crate::normalize::normalize_og;
use crate::parse::Document;
use crate::value::resolve_url;

/// Open Graph object type families that carry their own namespace.
pub const DEFAULT_OG_TYPES: &[&str] = &["video", "music", "article", "book", "profile"];

/// Response headers passed through to [`DocumentResult::headers`].
pub const DEFAULT_HEADER_ALLOWLIST: &[&str] =
    &["x-frame-options", "content-security-policy", "content-type", "last-modified", "link"];

/// Nesting depth past which a document is rejected.
pub const DEFAULT_MAX_DEPTH: usize = 4096;

/// Meta property name to its raw `content` values, in document order.
pub type MetaProperties = IndexMap<String, Vec<Option<String>>>;

/// Configuration for metadata extraction.
///
/// # Example
///
/// ```rust
/// use ogmeta_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .max_depth(512)
///     .og_types(["video", "article"])
///     .build();
/// assert_eq!(config.max_depth, 512);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum element nesting depth (default: 4096).
    pub max_depth: usize,

    /// `og:type` families that trigger a type-specific pass.
    pub og_types: Vec<String>,

    /// Lower-case response header names kept in the result.
    pub header_allowlist: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            og_types: DEFAULT_OG_TYPES.iter().map(|t| t.to_string()).collect(),
            header_allowlist: DEFAULT_HEADER_ALLOWLIST.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets the maximum nesting depth.
    pub fn max_depth(mut self, value: usize) -> Self {
        self.config.max_depth = value;
        self
    }

    /// Replaces the type families that get a type-specific pass.
    pub fn og_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.og_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the passed-through response headers.
    pub fn header_allowlist<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.header_allowlist = headers.into_iter().map(|h| h.into().to_ascii_lowercase()).collect();
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    /// URL that relative references were resolved against.
    pub base_url: String,

    /// Normalized `og:` properties.
    pub og: Namespace,

    /// Declared object type family, when it is one with its own namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,

    /// Properties from the type family's namespace (e.g. `article:tag`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub og_type_data: Option<Namespace>,

    /// Raw `fb:`, `twitter:` and `generator` meta values.
    pub meta_properties: MetaProperties,

    /// Link relations.
    pub links: LinkRelations,

    /// Passed-through response headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
}

/// Reusable extraction entry point.
///
/// # Example
///
/// ```rust
/// use ogmeta_core::{ExtractConfig, Extractor};
///
/// let extractor = Extractor::with_config(ExtractConfig::builder().og_types(["article"]).build());
/// let result = extractor
///     .extract("http://example.com/", r#"<meta property="og:type" content="video.movie">"#, None)
///     .unwrap();
/// assert!(result.og_type.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts metadata from `html`, fetched from `url`.
    pub fn extract(&self, url: &str, html: &str, headers: Option<&HashMap<String, String>>) -> Result<DocumentResult> {
        extract_with_config(url, html, headers, &self.config)
    }
}

/// Extracts metadata with the default configuration.
pub fn extract(url: &str, html: &str, headers: Option<&HashMap<String, String>>) -> Result<DocumentResult> {
    extract_with_config(url, html, headers, &ExtractConfig::default())
}

/// Extracts metadata from `html`, fetched from `url`.
///
/// Any failure while querying the document (most notably a tree nested past
/// [`ExtractConfig::max_depth`]) is logged and returned as an error; no
/// partial result is produced.
pub fn extract_with_config(
    url: &str, html: &str, headers: Option<&HashMap<String, String>>, config: &ExtractConfig,
) -> Result<DocumentResult> {
    let doc = Document::parse(html);

    let mut result = extract_document(&doc, url, config).inspect_err(|e| {
        tracing::error!(url, error = %e, "Error parsing HTML");
    })?;

    result.headers = headers.and_then(|headers| pass_through_headers(headers, &config.header_allowlist));

    Ok(result)
}

fn extract_document(doc: &Document, url: &str, config: &ExtractConfig) -> Result<DocumentResult> {
    doc.check_depth(config.max_depth)?;

    let base_url = resolve_base_url(doc, url)?;

    let mut og = accumulate_namespace(doc, "og", &base_url)?;
    normalize_og(&mut og);
    tracing::debug!(url, roots = og.len(), "collected Open Graph properties");

    let og_type = declared_type_family(&og).filter(|family| config.og_types.iter().any(|t| t == family));
    let og_type_data = match &og_type {
        Some(family) => Some(accumulate_namespace(doc, family, &base_url)?),
        None => None,
    };

    let meta_properties = collect_meta_properties(doc)?;
    let links = collect_links(doc, &base_url)?;

    Ok(DocumentResult { base_url, og, og_type, og_type_data, meta_properties, links, headers: None })
}

/// The first `<base href>` resolved against the request URL, or the request
/// URL itself.
fn resolve_base_url(doc: &Document, url: &str) -> Result<String> {
    let base_href = doc.select_first("base[href]")?.and_then(|base| base.non_empty_attr("href"));

    Ok(match base_href {
        Some(href) => resolve_url(url, href).unwrap_or_else(|| url.to_string()),
        None => url.to_string(),
    })
}

/// Runs one accumulator pass over the `<meta property="{namespace}:...">` tags.
fn accumulate_namespace(doc: &Document, namespace: &str, base_url: &str) -> Result<Namespace> {
    let mut accumulator = RootAccumulator::new(base_url);

    for meta in doc.select(&format!(r#"meta[property^="{}:"]"#, namespace))? {
        if let Some(property) = meta.attr("property") {
            accumulator.push(property, meta.attr("content"));
        }
    }

    Ok(accumulator.finish())
}

/// The family part of the first `og:type` value (`video` for `video.movie`).
fn declared_type_family(og: &Namespace) -> Option<String> {
    let value = og.get("type")?.first()?.value.as_ref()?.as_str()?;
    value.split('.').next().map(String::from)
}

/// `fb:` properties first, then `twitter:` and `generator` names, each in
/// document order.
fn collect_meta_properties(doc: &Document) -> Result<MetaProperties> {
    let mut properties = MetaProperties::new();

    for meta in doc.select(r#"meta[property^="fb:"]"#)? {
        if let Some(property) = meta.attr("property") {
            record_meta(&mut properties, property, meta.attr("content"));
        }
    }

    for meta in doc.select(r#"meta[name^="twitter:"], meta[name="generator"]"#)? {
        if let Some(name) = meta.attr("name") {
            record_meta(&mut properties, name, meta.attr("content"));
        }
    }

    Ok(properties)
}

fn record_meta(properties: &mut MetaProperties, key: &str, content: Option<&str>) {
    properties.entry(key.to_string()).or_default().push(content.map(String::from));
}

fn pass_through_headers(headers: &HashMap<String, String>, allowlist: &[String]) -> Option<IndexMap<String, String>> {
    let kept: IndexMap<String, String> = allowlist
        .iter()
        .filter_map(|wanted| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .map(|(_, value)| (wanted.clone(), value.clone()))
        })
        .collect();

    if kept.is_empty() { None } else { Some(kept) }
}
