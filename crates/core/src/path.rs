//! Property path parsing.
//!
//! Open Graph style properties encode their structure in the attribute name:
//! `og:image:width` is the `width` leaf of the `image` root in the `og`
//! namespace. [`PropertyPath`] splits such a name into its tokens without
//! judging them; the accumulator decides which paths it accepts.

/// A colon-delimited property name split into namespace, root and leaf tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> PropertyPath<'a> {
    /// Splits a property name on every `:`.
    ///
    /// ```rust
    /// use ogmeta_core::PropertyPath;
    ///
    /// let path = PropertyPath::parse("og:image:width");
    /// assert_eq!(path.namespace(), "og");
    /// assert_eq!(path.root(), Some("image"));
    /// assert_eq!(path.leaf(), Some("width"));
    /// ```
    pub fn parse(property: &'a str) -> Self {
        Self { tokens: property.split(':').collect() }
    }

    pub fn namespace(&self) -> &'a str {
        self.tokens[0]
    }

    pub fn root(&self) -> Option<&'a str> {
        self.tokens.get(1).copied()
    }

    pub fn leaf(&self) -> Option<&'a str> {
        self.tokens.get(2).copied()
    }

    /// The name that decides how a value is converted: the leaf when there
    /// is one, the root otherwise.
    pub fn field(&self) -> Option<&'a str> {
        self.leaf().or_else(|| self.root())
    }

    /// A path is usable when it names a non-empty root and, if it has a
    /// leaf, the leaf is non-empty too.
    ///
    /// `og`, `og:` and `og:image:` are all rejected.
    pub fn is_valid(&self) -> bool {
        matches!(self.root(), Some(root) if !root.is_empty()) && self.leaf() != Some("")
    }
}
