//! HTML parsing and tag queries.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! extraction passes: CSS selection in document order, attribute lookup, and
//! a nesting-depth check that runs before any traversal.
//!
//! # Example
//!
//! ```rust
//! use ogmeta_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <head>
//!             <meta property="og:title" content="The Rock">
//!             <meta property="og:type" content="video.movie">
//!         </head>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! let tags = doc.select(r#"meta[property^="og:"]"#).unwrap();
//! assert_eq!(tags.len(), 2);
//! assert_eq!(tags[0].attr("content"), Some("The Rock"));
//! ```

use scraper::{Html, Selector};

use crate::{OgmetaError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an html5ever tree and answers the selector queries the
/// extractor issues. Parsing itself never fails: html5ever recovers from any
/// malformed markup.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`OgmetaError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ogmeta_core::parse::Document;
    ///
    /// let html = r#"<link rel="canonical" href="/a"><link rel="home" href="/">"#;
    /// let doc = Document::parse(html);
    /// let links = doc.select("link[rel]").unwrap();
    /// assert_eq!(links.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| OgmetaError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| OgmetaError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Fails with [`OgmetaError::TraversalFailure`] when the element tree is
    /// nested deeper than `limit`.
    ///
    /// The root document node is level 0 and `<html>` is level 1. The walk
    /// uses an explicit stack and stops at the first element past the limit,
    /// so it is safe on arbitrarily deep input.
    pub fn check_depth(&self, limit: usize) -> Result<()> {
        let depth = self.deepest_until(limit);
        if depth > limit { Err(OgmetaError::TraversalFailure { depth, limit }) } else { Ok(()) }
    }

    fn deepest_until(&self, limit: usize) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.html.tree.root(), 0usize)];

        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if deepest > limit {
                break;
            }
            stack.extend(
                node.children()
                    .filter(|child| child.value().is_element())
                    .map(|child| (child, depth + 1)),
            );
        }

        deepest
    }
}

/// A wrapper around scraper's ElementRef exposing what the extraction passes need.
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present. A present but empty
    /// attribute yields `Some("")`.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the value of an attribute, treating an empty value as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&'a str> {
        self.attr(name).filter(|value| !value.is_empty())
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <title>Test Page</title>
            <base href="/root/">
            <meta property="og:title" content="First">
            <meta property="og:image" content="">
            <meta name="twitter:card" content="summary">
        </head>
        <body>
            <div><p>Paragraph</p></div>
        </body>
        </html>
    "#;

    #[test]
    fn test_select_in_document_order() {
        let doc = Document::parse(SAMPLE_HTML);
        let metas = doc.select("meta").unwrap();

        assert_eq!(metas.len(), 3);
        assert_eq!(metas[0].attr("property"), Some("og:title"));
        assert_eq!(metas[2].attr("name"), Some("twitter:card"));
    }

    #[test]
    fn test_select_first() {
        let doc = Document::parse(SAMPLE_HTML);
        let base = doc.select_first("base[href]").unwrap().unwrap();
        assert_eq!(base.attr("href"), Some("/root/"));
        assert!(doc.select_first("article").unwrap().is_none());
    }

    #[test]
    fn test_empty_attribute_is_present() {
        let doc = Document::parse(SAMPLE_HTML);
        let image = doc.select_first(r#"meta[property="og:image"]"#).unwrap().unwrap();
        assert_eq!(image.attr("content"), Some(""));
        assert_eq!(image.non_empty_attr("content"), None);
        assert_eq!(image.attr("missing"), None);
    }

    #[test]
    fn test_invalid_selector() {
        let doc = Document::parse(SAMPLE_HTML);
        let result = doc.select("[[invalid");

        assert!(matches!(result, Err(OgmetaError::HtmlParseError(_))));
    }

    #[test]
    fn test_depth() {
        let doc = Document::parse(SAMPLE_HTML);
        // html > body > div > p
        assert!(doc.check_depth(4).is_ok());
        assert!(matches!(
            doc.check_depth(3),
            Err(OgmetaError::TraversalFailure { depth: 4, limit: 3 })
        ));
    }

    #[test]
    fn test_depth_deeply_nested() {
        let html = format!("{}{}", "<div>".repeat(300), "</div>".repeat(300));
        let doc = Document::parse(&html);
        assert!(doc.check_depth(302).is_ok());
        assert!(matches!(
            doc.check_depth(100),
            Err(OgmetaError::TraversalFailure { depth: 101, limit: 100 })
        ));
    }
}
