#![forbid(unsafe_code)]
//! XLIFF data model for translation editors.
//!
//! Loads Xcode-style XLIFF 1.2 documents (`xliff/file/body/trans-unit`) into
//! file groups of translation units, filters them, edits targets, checks
//! printf-style format specifiers and writes the document back with the
//! formatting conventions of the originating tool intact.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xliffedit::{Filter, XliffFile, traits::Parser};
//!
//! let mut xliff = XliffFile::read_from("de.xliff")?;
//! xliff.set_filter(Some(&Filter::new("", true)));
//! println!("{} untranslated units", xliff.total_count());
//!
//! if let Some(unit) = xliff.find_unit("en.lproj/Localizable.strings", "greeting") {
//!     let previous = xliff.set_target(unit, Some("Hallo %@"))?;
//!     // Keep `previous` around to undo the edit later.
//!     let _ = previous;
//! }
//! xliff.write_to("de.xliff")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layers
//!
//! - [`xml::Document`]: arena-backed XML tree, the record of truth
//! - [`XliffFile`]: file groups and units projected from the tree
//! - [`Filter`]: the visible-subset predicate
//! - [`placeholder`]: format specifier checks
//! - [`formatting`]: output conventions applied on serialization
//! - [`traits::Parser`]: reading from and writing to files, readers and writers

pub mod error;
pub mod filter;
pub mod formatting;
pub mod parse_options;
pub mod placeholder;
pub mod traits;
pub mod trans_unit;
pub mod xliff;
pub mod xml;

// Re-export most used types for easy consumption
pub use crate::{
    error::{Error, FormatError, ValidationError},
    filter::Filter,
    parse_options::ParseOptions,
    trans_unit::{ID_NEWLINE_ESCAPE, TransUnit},
    xliff::{File, Summary, UnitRef, XliffFile},
};
