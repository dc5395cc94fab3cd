use std::fmt::Write;

use crate::Result;
use crate::accumulator::{GroupedEntry, Namespace};
use crate::extract::DocumentResult;

const INDENT: &str = "  ";

/// Configuration for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Include a header with the base URL and object type
    pub include_header: bool,

    /// Include `fb:`, `twitter:` and `generator` values
    pub include_meta: bool,

    /// Include link relations
    pub include_links: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { include_header: true, include_meta: true, include_links: true }
    }
}

/// Plain text formatter for a human-readable summary of extracted metadata
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, result: &DocumentResult) -> Result<String> {
        convert_to_text(result, &self.config)
    }
}

/// Convert an extraction result to plain text with specified configuration
pub fn convert_to_text(result: &DocumentResult, config: &TextConfig) -> Result<String> {
    let mut sections = Vec::new();

    if config.include_header {
        sections.push(generate_header(result));
    }

    sections.push(namespace_section("og", &result.og));

    if let (Some(family), Some(data)) = (&result.og_type, &result.og_type_data) {
        sections.push(namespace_section(family, data));
    }

    if config.include_meta && !result.meta_properties.is_empty() {
        let mut section = String::from("meta\n");
        for (name, values) in &result.meta_properties {
            for value in values {
                let _ = writeln!(section, "{INDENT}{}: {}", name, value.as_deref().unwrap_or("(none)"));
            }
        }
        sections.push(section);
    }

    if config.include_links && !result.links.is_empty() {
        let mut section = String::from("links\n");
        for (rel, links) in &result.links {
            for link in links {
                let _ = write!(section, "{INDENT}{}: {}", rel, link.href);
                if let Some(title) = &link.title {
                    let _ = write!(section, " \"{}\"", title);
                }
                section.push('\n');
            }
        }
        sections.push(section);
    }

    Ok(sections.iter().map(|s| s.trim_end()).collect::<Vec<_>>().join("\n\n"))
}

/// Generate a header from the base URL and declared type
fn generate_header(result: &DocumentResult) -> String {
    let mut header = String::new();

    let title = result.og.get("title").and_then(|entries| entries.first()).and_then(|entry| entry.value.as_ref());
    if let Some(title) = title {
        let title = title.to_string();
        header.push_str(&title);
        header.push('\n');
        header.push_str(&"=".repeat(title.chars().count()));
        header.push('\n');
    }

    let mut meta_parts = vec![format!("URL: {}", result.base_url)];
    if let Some(og_type) = &result.og_type {
        meta_parts.push(format!("Type: {}", og_type));
    }
    header.push_str(&meta_parts.join(" | "));

    header
}

/// One line per entry, with its properties indented below it
fn namespace_section(name: &str, namespace: &Namespace) -> String {
    let mut section = format!("{}\n", name);

    if namespace.is_empty() {
        let _ = writeln!(section, "{INDENT}(none)");
    }

    for (root, entries) in namespace {
        for entry in entries {
            write_entry(&mut section, root, entry);
        }
    }

    section
}

fn write_entry(out: &mut String, root: &str, entry: &GroupedEntry) {
    match &entry.value {
        Some(value) => {
            let _ = writeln!(out, "{INDENT}{}: {}", root, value);
        }
        None => {
            let _ = writeln!(out, "{INDENT}{}:", root);
        }
    }

    for (name, value) in entry.properties.iter().flatten() {
        let _ = writeln!(out, "{INDENT}{INDENT}{}: {}", name, value);
    }
}
