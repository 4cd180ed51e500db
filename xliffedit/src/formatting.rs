//! Output conventions of Xcode-exported XLIFF files.
//!
//! Serialization is the adapter's raw output plus a few textual fixups; the
//! tree itself is never re-serialized a second time.

use crate::{error::Error, trans_unit::ID_NEWLINE_ESCAPE, xml::Document};

/// Entity form used for line feeds in attribute values.
pub const LINE_FEED_REFERENCE: &str = "&#10;";

const LINE_BREAKS: [char; 2] = ['\r', '\n'];

/// Serializes `document` and applies [`finalize_output`].
///
/// The declaration is written as the document holds it; [`crate::XliffFile`]
/// turns `standalone` off when it loads a document.
pub fn serialize_document(document: &Document) -> Result<Vec<u8>, Error> {
    let raw = document.serialize()?;
    Ok(finalize_output(&String::from_utf8_lossy(&raw)).into_bytes())
}

/// Applies the textual fixups, in order:
/// the id sentinel becomes `&#10;`, exactly one line break follows the XML
/// declaration, and the output ends with exactly one line break.
///
/// Line breaks are written in the style of the first one in `raw` (`\r\n` or `\n`).
pub fn finalize_output(raw: &str) -> String {
    let text = raw.replace(ID_NEWLINE_ESCAPE, LINE_FEED_REFERENCE);
    let eol = line_ending(&text);
    let text = separate_declaration(&text, eol);
    format!("{}{}", text.trim_end_matches(LINE_BREAKS), eol)
}

fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(index) if text[..index].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn separate_declaration(text: &str, eol: &str) -> String {
    if !text.starts_with("<?xml") {
        return text.to_string();
    }
    let Some(end) = text.find("?>") else {
        return text.to_string();
    };

    let (declaration, body) = text.split_at(end + 2);
    format!("{}{}{}", declaration, eol, body.trim_start_matches(LINE_BREAKS))
}
