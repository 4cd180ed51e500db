//! Options controlling how raw XML bytes are turned into a [`crate::xml::Document`].

/// Parse behavior options for [`crate::xml::Document::parse`].
///
/// Both flags default to `true`; turning either off breaks byte-for-byte
/// round-tripping of Xcode-exported files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes (indentation, newlines between elements).
    pub preserve_whitespace: bool,
    /// Keep character and entity references (`&#10;`, `&amp;`) in their written form
    /// instead of normalizing them.
    pub preserve_character_references: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: true,
            preserve_character_references: true,
        }
    }
}

impl ParseOptions {
    /// Creates default parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables/disables whitespace preservation.
    pub fn with_preserve_whitespace(mut self, preserve_whitespace: bool) -> Self {
        self.preserve_whitespace = preserve_whitespace;
        self
    }

    /// Enables/disables character reference preservation.
    pub fn with_preserve_character_references(mut self, preserve: bool) -> Self {
        self.preserve_character_references = preserve;
        self
    }
}
