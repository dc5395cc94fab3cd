//! Link relation collection.
//!
//! Every `<link rel="..." href="...">` contributes one descriptor to each of
//! its relation tokens: `rel="home alternate"` lands in both the `home` and
//! the `alternate` bucket, sharing a single [`LinkDescriptor`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::Result;
use crate::parse::Document;
use crate::value::resolve_url;

/// Relation token to the links carrying it, in document order.
pub type LinkRelations = IndexMap<String, Vec<Arc<LinkDescriptor>>>;

/// A resolved `<link>` target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDescriptor {
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl LinkDescriptor {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into(), hreflang: None, title: None, media_type: None }
    }
}

/// Collects the links of `doc` by relation.
///
/// Links without an `href`, or whose `href` does not resolve against
/// `base_url`, are skipped. Relation tokens are lower-cased and a token
/// repeated within one `rel` is recorded once per occurrence.
pub fn collect_links(doc: &Document, base_url: &str) -> Result<LinkRelations> {
    let mut relations = LinkRelations::new();

    for link in doc.select("link[rel]")? {
        let Some(href) = link.non_empty_attr("href").and_then(|href| resolve_url(base_url, href)) else {
            tracing::trace!(link = %link.outer_html(), "skipping link without a resolvable href");
            continue;
        };

        let descriptor = Arc::new(LinkDescriptor {
            href,
            hreflang: link.non_empty_attr("hreflang").map(String::from),
            title: link.non_empty_attr("title").map(String::from),
            media_type: link.non_empty_attr("type").map(String::from),
        });

        for token in link.attr("rel").unwrap_or_default().split_whitespace() {
            relations.entry(token.to_lowercase()).or_default().push(Arc::clone(&descriptor));
        }
    }

    Ok(relations)
}
