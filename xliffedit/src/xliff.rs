//! The XLIFF document model: file groups of translation units over a shared
//! [`Document`].
//!
//! [`XliffFile`] owns both the XML tree and the parsed groups. Units are
//! read-only caches; every edit is routed through [`XliffFile::set_target`],
//! which writes the tree first and then refreshes the cache, so the serialized
//! output always reflects the latest edits.

use std::{
    collections::HashSet,
    io::{BufRead, Write},
};

use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::{
    error::{Error, ValidationError},
    filter::Filter,
    formatting,
    parse_options::ParseOptions,
    traits::Parser,
    trans_unit::TransUnit,
    xml::{Document, NodeId},
};

/// One `<file>` container.
#[derive(Debug, Clone)]
pub struct File {
    /// The `original` attribute, usually a path inside the exported project.
    pub name: String,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    all_items: Vec<TransUnit>,
    /// Indices into `all_items`, ascending.
    visible: Vec<usize>,
}

impl File {
    fn from_element(document: &mut Document, node: NodeId) -> Result<Self, Error> {
        let name = document.attribute(node, "original")?.ok_or_else(|| {
            Error::format_error(document.path(node), "file is missing attribute `original`")
        })?;
        let source_language = document.attribute(node, "source-language")?;
        let target_language = document.attribute(node, "target-language")?;

        let mut all_items = Vec::new();
        let mut seen = HashSet::new();
        for unit_node in document.select_descendants(node, "body/trans-unit") {
            let unit = TransUnit::from_element(document, unit_node)?;
            if !seen.insert(unit.id().to_string()) {
                return Err(Error::format_error(
                    document.path(unit_node),
                    format!("duplicate trans-unit id `{}`", unit.id()),
                ));
            }
            all_items.push(unit);
        }

        Ok(Self {
            name,
            source_language,
            target_language,
            visible: (0..all_items.len()).collect(),
            all_items,
        })
    }

    /// Every unit of this group, in document order.
    pub fn all_items(&self) -> &[TransUnit] {
        &self.all_items
    }

    /// The units passing the current filter, in document order.
    pub fn items(&self) -> impl Iterator<Item = &TransUnit> + '_ {
        self.visible.iter().map(|&index| &self.all_items[index])
    }

    /// The `position`-th visible unit.
    pub fn item(&self, position: usize) -> Option<&TransUnit> {
        self.visible
            .get(position)
            .map(|&index| &self.all_items[index])
    }

    /// Positions in [`File::all_items`] of the visible units.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Number of visible units.
    pub fn count(&self) -> usize {
        self.visible.len()
    }

    pub fn translated_count(&self) -> usize {
        self.all_items.iter().filter(|u| u.is_translated()).count()
    }

    pub fn untranslated_count(&self) -> usize {
        self.all_items.len() - self.translated_count()
    }

    pub fn parse_target_language(&self) -> Option<LanguageIdentifier> {
        self.target_language.as_deref()?.parse().ok()
    }

    /// Check if this group translates into `lang`, comparing primary language subtags.
    pub fn has_target_language(&self, lang: &str) -> bool {
        match (
            self.parse_target_language(),
            lang.parse::<LanguageIdentifier>(),
        ) {
            (Some(target), Ok(wanted)) => target.language == wanted.language,
            _ => false,
        }
    }

    fn apply_filter(&mut self, filter: Option<&Filter>) {
        self.visible = match filter {
            Some(filter) => filter.apply(&self.all_items),
            None => (0..self.all_items.len()).collect(),
        };
    }
}

/// Address of a unit: group index and position in that group's [`File::all_items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitRef {
    pub file: usize,
    pub index: usize,
}

impl UnitRef {
    pub fn new(file: usize, index: usize) -> Self {
        Self { file, index }
    }
}

/// Aggregate counts over a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files: usize,
    pub total: usize,
    pub visible: usize,
    pub translated: usize,
    pub untranslated: usize,
}

/// A parsed XLIFF document.
#[derive(Debug, Clone)]
pub struct XliffFile {
    document: Document,
    files: Vec<File>,
}

impl XliffFile {
    /// Builds the model from an already parsed document, applying `filter` if given.
    ///
    /// The whole document is checked up front. The first missing `original`,
    /// `id` or `source` (or a duplicate id within a group) aborts the load.
    pub fn parse(mut document: Document, filter: Option<&Filter>) -> Result<Self, Error> {
        document.set_standalone(false);

        let mut files = Vec::new();
        if let Some(root) = document.root_element() {
            for node in document.child_elements_named(root, "file") {
                files.push(File::from_element(&mut document, node)?);
            }
        }

        let mut xliff = Self { document, files };
        xliff.set_filter(filter);
        Ok(xliff)
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Number of visible units across all groups.
    pub fn total_count(&self) -> usize {
        self.files.iter().map(File::count).sum()
    }

    pub fn summary(&self) -> Summary {
        let total: usize = self.files.iter().map(|f| f.all_items.len()).sum();
        let translated: usize = self.files.iter().map(File::translated_count).sum();
        Summary {
            files: self.files.len(),
            total,
            visible: self.total_count(),
            translated,
            untranslated: total - translated,
        }
    }

    /// Recomputes every group's visible units from scratch. `None` shows everything.
    pub fn set_filter(&mut self, filter: Option<&Filter>) {
        for file in &mut self.files {
            file.apply_filter(filter);
        }
    }

    pub fn unit(&self, unit: UnitRef) -> Option<&TransUnit> {
        self.files.get(unit.file)?.all_items.get(unit.index)
    }

    /// Looks a unit up by group name and (sanitized) id.
    pub fn find_unit(&self, file_name: &str, id: &str) -> Option<UnitRef> {
        self.files
            .iter()
            .enumerate()
            .filter(|(_, file)| file.name == file_name)
            .find_map(|(file_index, file)| {
                file.all_items
                    .iter()
                    .position(|u| u.id() == id)
                    .map(|index| UnitRef::new(file_index, index))
            })
    }

    /// Visible units of every group, in order.
    pub fn visible_units(&self) -> impl Iterator<Item = (UnitRef, &TransUnit)> + '_ {
        self.files.iter().enumerate().flat_map(|(file_index, file)| {
            file.visible.iter().map(move |&index| {
                (UnitRef::new(file_index, index), &file.all_items[index])
            })
        })
    }

    /// Sets or removes (`None`) the target of a unit and returns the previous value.
    ///
    /// Setting the current value again leaves the document untouched. Passing
    /// the returned value back restores the prior state, which is all a host
    /// needs to record undo/redo. Visible subsets are not recomputed; call
    /// [`XliffFile::set_filter`] for that.
    pub fn set_target(
        &mut self,
        unit: UnitRef,
        value: Option<&str>,
    ) -> Result<Option<String>, Error> {
        let cached = self
            .files
            .get_mut(unit.file)
            .and_then(|file| file.all_items.get_mut(unit.index))
            .ok_or_else(|| {
                Error::InvalidReference(format!("file {}, unit {}", unit.file, unit.index))
            })?;

        if cached.target() == value {
            return Ok(value.map(str::to_string));
        }

        self.document
            .apply_edit(cached.node(), "target", value, "source");
        Ok(cached.replace_target(value.map(str::to_string)))
    }

    /// Every visible unit whose current target misses format specifiers of its source.
    /// Units without a target are skipped.
    pub fn validate_all(&self) -> Vec<(UnitRef, ValidationError)> {
        self.visible_units()
            .filter_map(|(unit_ref, unit)| {
                let target = unit.target()?;
                unit.validate(target).err().map(|err| (unit_ref, err))
            })
            .collect()
    }

    /// Serializes the document following the output conventions in [`formatting`].
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        formatting::serialize_document(&self.document)
    }
}

/// Any XML-level failure while loading raw input is reported as a format error.
fn unreadable_unless_format(error: Error) -> Error {
    match error {
        Error::Format(inner) => Error::Format(inner),
        other => Error::unreadable(other),
    }
}

impl Parser for XliffFile {
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let document = Document::parse(bytes, &ParseOptions::default())
            .map_err(unreadable_unless_format)?;
        Self::parse(document, None).map_err(unreadable_unless_format)
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        writer.write_all(&self.serialize()?)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <xliff xmlns="urn:oasis:names:tc:xliff:document:1.2" version="1.2">
          <file original="Base.lproj/Main.storyboard" source-language="en" datatype="plaintext" target-language="de">
            <body>
              <trans-unit id="abc-01.title">
                <source>Window</source>
                <target>Fenster</target>
                <note>Class = "NSWindow"; title = "Window";</note>
              </trans-unit>
              <trans-unit id="abc-02.title">
                <source>Delete %d items?</source>
                <note>Confirmation</note>
              </trans-unit>
            </body>
          </file>
          <file original="en.lproj/Localizable.strings" source-language="en" datatype="plaintext" target-language="de">
            <body>
              <trans-unit id="greeting">
                <source>Hello %@</source>
                <target>Hallo</target>
              </trans-unit>
            </body>
          </file>
        </xliff>
    "#};

    fn sample() -> XliffFile {
        XliffFile::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_groups_and_units() {
        let xliff = sample();
        assert_eq!(xliff.files().len(), 2);
        assert_eq!(xliff.total_count(), 3);

        let first = &xliff.files()[0];
        assert_eq!(first.name, "Base.lproj/Main.storyboard");
        assert_eq!(first.source_language.as_deref(), Some("en"));
        assert_eq!(first.target_language.as_deref(), Some("de"));
        assert_eq!(first.item(0).unwrap().source(), "Window");
        assert_eq!(
            first.item(0).unwrap().note(),
            Some(r#"Class = "NSWindow"; title = "Window";"#)
        );
        assert!(first.has_target_language("de-DE"));
        assert!(!first.has_target_language("fr"));
    }

    #[test]
    fn test_unmodified_serialization_is_identical() {
        let xliff = sample();
        assert_eq!(String::from_utf8(xliff.serialize().unwrap()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_missing_original() {
        let err = XliffFile::from_str("<xliff><file><body/></file></xliff>").unwrap_err();
        match err {
            Error::Format(inner) => {
                assert_eq!(inner.path, "/xliff/file");
                assert!(inner.description.contains("original"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_id_within_group_is_rejected() {
        let xml = r#"<xliff><file original="a"><body>
            <trans-unit id="x"><source>1</source></trans-unit>
            <trans-unit id="x"><source>2</source></trans-unit>
        </body></file></xliff>"#;
        let err = XliffFile::from_str(xml).unwrap_err();
        assert!(err.to_string().contains("duplicate trans-unit id `x`"));
        assert!(err.to_string().contains("trans-unit[2]"));
    }

    #[test]
    fn test_same_id_in_two_groups_is_fine() {
        let xml = r#"<xliff>
            <file original="a"><body><trans-unit id="x"><source>1</source></trans-unit></body></file>
            <file original="b"><body><trans-unit id="x"><source>2</source></trans-unit></body></file>
        </xliff>"#;
        let xliff = XliffFile::from_str(xml).unwrap();
        assert_eq!(xliff.total_count(), 2);
        assert_eq!(xliff.find_unit("b", "x"), Some(UnitRef::new(1, 0)));
    }

    #[test]
    fn test_malformed_xml_becomes_format_error() {
        let err = XliffFile::from_str("<xliff><file></xliff>").unwrap_err();
        match err {
            Error::Format(inner) => assert!(inner.description.contains("could not parse")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_becomes_format_error() {
        let mut bytes = SAMPLE.as_bytes().to_vec();
        let at = SAMPLE.find("Window</source>").unwrap() + "Window".len();
        bytes.insert(at, 0xFF);
        match XliffFile::from_bytes(&bytes).unwrap_err() {
            Error::Format(inner) => {
                assert_eq!(inner.path, "/");
                assert!(inner.description.contains("could not parse"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_entity_becomes_format_error() {
        for xml in [
            r#"<xliff><file original="a"><body><trans-unit id="x"><source>a &nbsp; b</source></trans-unit></body></file></xliff>"#,
            r#"<xliff><file original="a&nbsp;"><body/></file></xliff>"#,
        ] {
            match XliffFile::from_str(xml).unwrap_err() {
                Error::Format(inner) => assert!(inner.description.contains("could not parse")),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_document_has_no_files() {
        let xliff = XliffFile::from_str(r#"<?xml version="1.0"?><xliff version="1.2"/>"#).unwrap();
        assert!(xliff.files().is_empty());
        assert_eq!(xliff.total_count(), 0);
    }

    #[test]
    fn test_filter_and_reset() {
        let mut xliff = sample();
        xliff.set_filter(Some(&Filter::new("", true)));
        assert_eq!(xliff.total_count(), 1);
        assert_eq!(xliff.files()[0].visible_indices(), &[1]);
        assert_eq!(xliff.files()[1].count(), 0);

        xliff.set_filter(Some(&Filter::new("HALLO", false)));
        assert_eq!(xliff.total_count(), 1);
        assert_eq!(xliff.files()[1].item(0).unwrap().id(), "greeting");

        xliff.set_filter(None);
        assert_eq!(xliff.total_count(), 3);
    }

    #[test]
    fn test_parse_with_filter() {
        let document =
            Document::parse(SAMPLE.as_bytes(), &ParseOptions::default()).unwrap();
        let xliff = XliffFile::parse(document, Some(&Filter::new("window", false))).unwrap();
        assert_eq!(xliff.total_count(), 1);
    }

    #[test]
    fn test_set_target_returns_previous_and_reverts() {
        let mut xliff = sample();
        let unit = xliff.find_unit("Base.lproj/Main.storyboard", "abc-02.title").unwrap();

        let previous = xliff.set_target(unit, Some("%d Objekte löschen?")).unwrap();
        assert_eq!(previous, None);
        assert_eq!(xliff.unit(unit).unwrap().target(), Some("%d Objekte löschen?"));
        let edited = String::from_utf8(xliff.serialize().unwrap()).unwrap();
        assert!(edited.contains(
            "<source>Delete %d items?</source>\n        <target>%d Objekte löschen?</target>\n        <note>Confirmation</note>"
        ));

        let undone = xliff.set_target(unit, previous.as_deref()).unwrap();
        assert_eq!(undone.as_deref(), Some("%d Objekte löschen?"));
        assert_eq!(String::from_utf8(xliff.serialize().unwrap()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_set_target_same_value_is_noop() {
        let mut xliff = sample();
        let unit = UnitRef::new(0, 0);
        let before = xliff.serialize().unwrap();
        assert_eq!(xliff.set_target(unit, Some("Fenster")).unwrap().as_deref(), Some("Fenster"));
        let absent = UnitRef::new(0, 1);
        assert_eq!(xliff.set_target(absent, None).unwrap(), None);
        assert_eq!(xliff.serialize().unwrap(), before);
    }

    #[test]
    fn test_set_target_none_removes_element() {
        let mut xliff = sample();
        let unit = UnitRef::new(1, 0);
        assert_eq!(xliff.set_target(unit, None).unwrap().as_deref(), Some("Hallo"));
        let out = String::from_utf8(xliff.serialize().unwrap()).unwrap();
        assert!(!out.contains("<target>Hallo</target>"));
        assert!(!out.contains("<target/>"));
        assert!(!out.contains("<target></target>"));
        assert_eq!(xliff.unit(unit).unwrap().target(), None);
    }

    #[test]
    fn test_set_target_invalid_reference() {
        let mut xliff = sample();
        let err = xliff.set_target(UnitRef::new(5, 0), Some("x")).unwrap_err();
        assert!(matches!(err, Error::InvalidReference(_)));
    }

    #[test]
    fn test_edit_survives_refilter() {
        let mut xliff = sample();
        xliff.set_filter(Some(&Filter::new("", true)));
        let unit = UnitRef::new(0, 1);
        xliff.set_target(unit, Some("Löschen %d?")).unwrap();
        // Still visible until the host refilters.
        assert_eq!(xliff.total_count(), 1);
        xliff.set_filter(Some(&Filter::new("", true)));
        assert_eq!(xliff.total_count(), 0);
        xliff.set_filter(None);
        assert_eq!(xliff.unit(unit).unwrap().target(), Some("Löschen %d?"));
    }

    #[test]
    fn test_validate_all_and_summary() {
        let xliff = sample();
        let findings = xliff.validate_all();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].0, UnitRef::new(1, 0));
        assert_eq!(findings[0].1.missing, vec!["%@"]);

        let summary = xliff.summary();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.visible, 3);
        assert_eq!(summary.translated, 2);
        assert_eq!(summary.untranslated, 1);
    }

    #[test]
    fn test_write_to_and_read_from() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("de.xliff");
        let mut xliff = sample();
        xliff.set_target(UnitRef::new(1, 0), Some("Hallo %@")).unwrap();
        xliff.write_to(&path).unwrap();

        let reloaded = XliffFile::read_from(&path).unwrap();
        assert_eq!(reloaded.unit(UnitRef::new(1, 0)).unwrap().target(), Some("Hallo %@"));
        assert!(reloaded.validate_all().is_empty());
    }
}
