//! Root tag accumulation.
//!
//! Open Graph markup has no explicit grouping: an image and its dimensions
//! are three sibling tags,
//!
//! ```html
//! <meta property="og:image" content="rock.jpg">
//! <meta property="og:image:width" content="300">
//! <meta property="og:image:height" content="300">
//! ```
//!
//! and the only thing tying them together is that they are adjacent and
//! share the `image` root. [`RootAccumulator`] folds such a stream, in
//! document order, into one [`GroupedEntry`] per root occurrence.
//!
//! A root-level tag (`og:image`) always opens a new entry, so repeated roots
//! produce several entries. A leaf tag (`og:image:width`) attaches to the
//! entry that is currently open, or opens a new one when the previous tag
//! belonged to a different root.

use indexmap::IndexMap;
use serde::Serialize;

use crate::path::PropertyPath;
use crate::value::{PropertyValue, convert};

/// Root name to grouped entries, in order of first occurrence.
pub type Namespace = IndexMap<String, Vec<GroupedEntry>>;

/// One occurrence of a root property together with its leaf properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, PropertyValue>>,
}

impl GroupedEntry {
    pub fn with_value(value: impl Into<PropertyValue>) -> Self {
        Self { value: Some(value.into()), properties: None }
    }

    /// Adds a leaf property, creating the property map on first use.
    pub fn property(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_property(name, value.into());
        self
    }

    /// True when the entry carries neither a value nor any property.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.properties.as_ref().is_none_or(|properties| properties.is_empty())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.as_ref()?.get(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) {
        self.properties.get_or_insert_with(IndexMap::new).insert(name.to_string(), value);
    }
}

/// Folds an ordered stream of `(property, content)` tag events into a
/// [`Namespace`].
///
/// The accumulator lives for exactly one namespace pass. The cursor (the
/// last root seen and the entry receiving leaves) is private to it, so two
/// passes over the same document never influence each other.
///
/// # Example
///
/// ```rust
/// use ogmeta_core::{GroupedEntry, RootAccumulator};
///
/// let mut acc = RootAccumulator::new("http://example.com/");
/// acc.push("og:image", Some("a.jpg"));
/// acc.push("og:image:width", Some("300"));
/// acc.push("og:image", Some("b.jpg"));
///
/// let ns = acc.finish();
/// let images = &ns["image"];
/// assert_eq!(images[0], GroupedEntry::with_value("http://example.com/a.jpg").property("width", 300_i64));
/// assert_eq!(images[1], GroupedEntry::with_value("http://example.com/b.jpg"));
/// ```
#[derive(Debug)]
pub struct RootAccumulator<'b> {
    base_url: &'b str,
    roots: Namespace,
    current_root: Option<String>,
    current_entry: Option<usize>,
}

impl<'b> RootAccumulator<'b> {
    /// Creates an accumulator with no active entry. URL-valued properties are
    /// resolved against `base_url`.
    pub fn new(base_url: &'b str) -> Self {
        Self { base_url, roots: Namespace::new(), current_root: None, current_entry: None }
    }

    /// Processes one tag event.
    ///
    /// Malformed paths (no root, empty root, empty leaf) are discarded
    /// without touching the cursor.
    pub fn push(&mut self, property: &str, content: Option<&str>) {
        let path = PropertyPath::parse(property);
        let Some(root) = path.root().filter(|_| path.is_valid()) else {
            tracing::trace!(property, "discarding malformed property path");
            return;
        };

        let value = convert(&path, content, self.base_url);
        let leaf = path.leaf();

        if leaf.is_none() || self.current_root.as_deref() != Some(root) {
            self.open_entry(root);
        }

        match leaf {
            Some(leaf) => {
                if value.is_empty() {
                    return;
                }
                if let Some(entry) = self.active_entry(root) {
                    entry.set_property(leaf, value);
                }
            }
            None if value.is_empty() => {
                // Content-less root tag: withdraw the entry it just opened.
                if let Some(entries) = self.roots.get_mut(root) {
                    entries.pop();
                }
                self.current_root = None;
                self.current_entry = None;
            }
            None => {
                if let Some(entry) = self.active_entry(root) {
                    entry.value = Some(value);
                }
            }
        }
    }

    /// Ends the pass, dropping entries that never received a value or a
    /// property and roots left without entries.
    pub fn finish(mut self) -> Namespace {
        for entries in self.roots.values_mut() {
            entries.retain(|entry| !entry.is_empty());
        }
        self.roots.retain(|_, entries| !entries.is_empty());
        self.roots
    }

    fn open_entry(&mut self, root: &str) {
        let entries = self.roots.entry(root.to_string()).or_default();
        entries.push(GroupedEntry::default());
        self.current_entry = Some(entries.len() - 1);
        self.current_root = Some(root.to_string());
    }

    fn active_entry(&mut self, root: &str) -> Option<&mut GroupedEntry> {
        let index = self.current_entry?;
        self.roots.get_mut(root)?.get_mut(index)
    }
}

/// Runs a complete accumulator pass over `events`.
pub fn accumulate<'e>(base_url: &str, events: impl IntoIterator<Item = (&'e str, Option<&'e str>)>) -> Namespace {
    let mut accumulator = RootAccumulator::new(base_url);
    for (property, content) in events {
        accumulator.push(property, content);
    }
    accumulator.finish()
}
