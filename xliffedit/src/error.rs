//! All error types for the xliffedit crate.
//!
//! [`Error`] is returned from every fallible operation on documents (parsing,
//! editing, serialization). [`ValidationError`] is a plain value returned by the
//! format-specifier check and never aborts a document load.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Recovery hint attached to every [`FormatError`] by default.
pub const DEFAULT_RECOVERY: &str =
    "Re-export the XLIFF file from the originating tool and open it again.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Format(FormatError),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid unit reference: {0}")]
    InvalidReference(String),
}

impl Error {
    /// Creates a format error for the element at `path`, using the default recovery hint.
    pub fn format_error(path: impl Into<String>, description: impl Into<String>) -> Self {
        Error::Format(FormatError::new(path, description))
    }

    /// Wraps a failure of the XML layer into a format error covering the whole document.
    pub(crate) fn unreadable(cause: impl Display) -> Self {
        Error::format_error("/", format!("could not parse the document: {}", cause))
    }
}

impl From<FormatError> for Error {
    fn from(value: FormatError) -> Self {
        Error::Format(value)
    }
}

/// A structural problem found while loading an XLIFF document.
///
/// Fatal to the load: no partial model is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// XPath-like location of the offending element, e.g. `/xliff/file[1]/body/trans-unit[3]`.
    pub path: String,
    pub description: String,
    /// Suggested action for the user.
    pub recovery: String,
}

impl FormatError {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
            recovery: DEFAULT_RECOVERY.to_string(),
        }
    }

    pub fn with_recovery(mut self, recovery: impl Into<String>) -> Self {
        self.recovery = recovery.into();
        self
    }
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid XLIFF at {}: {}", self.path, self.description)
    }
}

impl std::error::Error for FormatError {}

/// Format specifiers present in a source string but missing from its translation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing format specifiers: {}", missing.join(", "))]
pub struct ValidationError {
    /// Missing specifiers in source order, without duplicates.
    pub missing: Vec<String>,
}
