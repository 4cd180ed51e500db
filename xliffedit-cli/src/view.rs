use unicode_width::UnicodeWidthChar;
use xliffedit::Filter;

use crate::validation::{display_id, load_xliff};

const TRUNCATE_WIDTH: usize = 50;

pub struct ViewOptions {
    pub search: Option<String>,
    pub only_untranslated: bool,
    pub lang: Option<String>,
    pub full: bool,
}

/// Print the units of an XLIFF file grouped by file, after filtering.
pub fn print_view(input: &str, options: &ViewOptions) -> Result<(), String> {
    let mut xliff = load_xliff(input)?;

    let filter = Filter::new(
        options.search.clone().unwrap_or_default(),
        options.only_untranslated,
    );
    xliff.set_filter((!filter.is_empty()).then_some(&filter));

    let files: Vec<_> = match &options.lang {
        Some(lang) => xliff
            .files()
            .iter()
            .filter(|f| f.has_target_language(lang))
            .collect(),
        None => xliff.files().iter().collect(),
    };

    if files.is_empty() {
        return Err(match &options.lang {
            Some(lang) => format!("No file groups found for language: {}", lang),
            None => "No file groups found".to_string(),
        });
    }

    let shown: usize = files.iter().map(|f| f.count()).sum();
    println!("✅ Showing {} unit(s) in {} file group(s)", shown, files.len());

    for (i, file) in files.iter().enumerate() {
        println!("\n=== File {}: {} ===", i + 1, file.name);
        println!(
            "Languages: {} → {}",
            file.source_language.as_deref().unwrap_or("?"),
            file.target_language.as_deref().unwrap_or("?")
        );
        println!("Units: {} of {}", file.count(), file.all_items().len());

        for unit in file.items() {
            println!("\n  {}", display_id(unit.id()));
            println!("    Source: {}", shorten(unit.source(), options.full));
            match unit.target() {
                Some(target) => println!("    Target: {}", shorten(target, options.full)),
                None => println!("    Target: (none)"),
            }
            if let Some(note) = unit.note() {
                println!("    Note: {}", shorten(note, options.full));
            }
        }
    }

    Ok(())
}

fn shorten(value: &str, full: bool) -> String {
    if full {
        value.to_string()
    } else {
        truncate_to_width(value, TRUNCATE_WIDTH)
    }
}

/// Cuts `value` to at most `width` terminal columns, marking the cut with `...`.
fn truncate_to_width(value: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            out.push_str("...");
            return out;
        }
        used += ch_width;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_value_untouched() {
        assert_eq!(truncate_to_width("Hallo", 50), "Hallo");
    }

    #[test]
    fn test_truncate_counts_columns_not_bytes() {
        assert_eq!(truncate_to_width("Überschrift", 4), "Über...");
        assert_eq!(truncate_to_width("設定を開く", 4), "設定...");
    }

    #[test]
    fn test_shorten_full() {
        let long = "x".repeat(80);
        assert_eq!(shorten(&long, true), long);
        assert_eq!(shorten(&long, false).len(), TRUNCATE_WIDTH + 3);
    }
}
