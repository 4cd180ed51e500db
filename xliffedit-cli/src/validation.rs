use std::path::Path;

use serde::Serialize;
use serde_json::json;
use xliffedit::{
    XliffFile, formatting::LINE_FEED_REFERENCE, traits::Parser, trans_unit::unescape_id,
};

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if let Some(parent) = path_obj.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    Ok(())
}

/// Loads an XLIFF file after checking the path.
pub fn load_xliff(path: &str) -> Result<XliffFile, String> {
    validate_file_path(path)?;
    XliffFile::read_from(path).map_err(|e| format!("Failed to read {}: {}", path, e))
}

/// Unit id as written in the file, with line breaks shown as `&#10;`.
pub fn display_id(id: &str) -> String {
    unescape_id(id).replace('\n', LINE_FEED_REFERENCE)
}

#[derive(Serialize)]
struct Finding<'a> {
    file: &'a str,
    id: String,
    missing: &'a [String],
}

/// Reports every unit whose target lacks format specifiers of its source.
/// Fails when anything is found.
pub fn run_validate_command(input: &str, json_output: bool) -> Result<(), String> {
    let xliff = load_xliff(input)?;
    let findings = xliff.validate_all();

    if json_output {
        let items: Vec<Finding> = findings
            .iter()
            .map(|(unit_ref, err)| Finding {
                file: &xliff.files()[unit_ref.file].name,
                id: xliff
                    .unit(*unit_ref)
                    .map(|u| display_id(u.id()))
                    .unwrap_or_default(),
                missing: &err.missing,
            })
            .collect();
        let body = json!({
            "checked": xliff.total_count(),
            "issues": items,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?
        );
    } else if findings.is_empty() {
        println!("✅ All {} units keep their format specifiers", xliff.total_count());
    } else {
        for (unit_ref, err) in &findings {
            let id = xliff
                .unit(*unit_ref)
                .map(|u| display_id(u.id()))
                .unwrap_or_default();
            println!(
                "❌ {} [{}]: {}",
                xliff.files()[unit_ref.file].name,
                id,
                err
            );
        }
    }

    if findings.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} unit(s) with missing format specifiers",
            findings.len()
        ))
    }
}
