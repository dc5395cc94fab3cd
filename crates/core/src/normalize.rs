//! Open Graph media normalization.
//!
//! `og:image`, `og:video` and `og:audio` may carry their URL either as the
//! root value or as a `url` / `secure_url` leaf. After normalization every
//! media entry has its URL in `value`, and entries without one are dropped.

use crate::accumulator::{GroupedEntry, Namespace};

/// Roots whose entries are media references.
const MEDIA_ROOTS: &[&str] = &["image", "video", "audio"];

/// Normalizes an accumulated `og` namespace in place.
///
/// Running it twice is the same as running it once.
pub fn normalize_og(og: &mut Namespace) {
    for root in MEDIA_ROOTS {
        if let Some(entries) = og.get_mut(*root) {
            entries.iter_mut().for_each(promote_url);
            entries.retain(|entry| entry.value.as_ref().is_some_and(|value| !value.is_empty()));
        }
    }

    og.retain(|_, entries| !entries.is_empty());
}

/// Moves a `url` leaf, or failing that a `secure_url` leaf when the entry
/// has no value yet, into the entry value.
fn promote_url(entry: &mut GroupedEntry) {
    let Some(properties) = entry.properties.as_mut() else {
        return;
    };

    if let Some(url) = properties.shift_remove("url") {
        entry.value = Some(url);
    } else if entry.value.is_none()
        && let Some(secure_url) = properties.shift_remove("secure_url")
    {
        entry.value = Some(secure_url);
    }

    if properties.is_empty() {
        entry.properties = None;
    }
}
