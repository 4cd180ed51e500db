//! The `<trans-unit>` model: one translatable string.

use serde::Serialize;

use crate::{
    error::{Error, ValidationError},
    placeholder,
    xml::{Document, NodeId},
};

/// Stand-in for literal line feeds inside `id` attributes.
///
/// The XML layer hands attribute values out with `&#10;` already turned into a
/// real line feed, and would write that line feed back verbatim. Ids carry this
/// sentinel instead; the serializer turns it back into `&#10;`.
pub const ID_NEWLINE_ESCAPE: &str = "__XLIFFEDIT_LF__";

/// Replaces every line feed in a raw id with [`ID_NEWLINE_ESCAPE`].
pub fn escape_id(raw: &str) -> String {
    raw.replace('\n', ID_NEWLINE_ESCAPE)
}

/// Inverse of [`escape_id`].
pub fn unescape_id(id: &str) -> String {
    id.replace(ID_NEWLINE_ESCAPE, "\n")
}

/// Cached values of one `<trans-unit>` element.
///
/// The backing [`Document`] stays the record of truth; edits go through
/// [`crate::XliffFile::set_target`], which refreshes this cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransUnit {
    id: String,
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip)]
    node: NodeId,
}

impl TransUnit {
    /// Reads a `<trans-unit>` element, sanitizing its `id` in place.
    pub(crate) fn from_element(document: &mut Document, node: NodeId) -> Result<Self, Error> {
        let raw_id = document.attribute(node, "id")?.ok_or_else(|| {
            Error::format_error(document.path(node), "trans-unit is missing attribute `id`")
        })?;
        let id = escape_id(&raw_id);
        if id != raw_id {
            document.set_attribute(node, "id", &id);
        }

        let source = child_text(document, node, "source")?.ok_or_else(|| {
            Error::format_error(document.path(node), "trans-unit is missing element `source`")
        })?;

        Ok(Self {
            id,
            source,
            target: child_text(document, node, "target")?,
            note: child_text(document, node, "note")?,
            node,
        })
    }

    /// The sanitized id, see [`ID_NEWLINE_ESCAPE`].
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// The backing `<trans-unit>` element.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// A unit counts as translated once it has a non-empty target.
    pub fn is_translated(&self) -> bool {
        self.target.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Checks `candidate` against the format specifiers of this unit's source.
    pub fn validate(&self, candidate: &str) -> Result<(), ValidationError> {
        placeholder::validate(&self.source, candidate)
    }

    /// Swaps in a new cached target, returning the old one.
    pub(crate) fn replace_target(&mut self, target: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.target, target)
    }
}

fn child_text(document: &Document, node: NodeId, name: &str) -> Result<Option<String>, Error> {
    document
        .child_elements_named(node, name)
        .first()
        .map(|&child| document.text(child))
        .transpose()
}
