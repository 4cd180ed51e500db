use serde_json::json;
use xliffedit::File;

use crate::validation::load_xliff;

fn completion_percent(file: &File) -> f64 {
    let total = file.all_items().len();
    if total == 0 {
        100.0
    } else {
        (file.translated_count() as f64) * 100.0 / (total as f64)
    }
}

pub fn print_stats(input: &str, json_output: bool) -> Result<(), String> {
    let xliff = load_xliff(input)?;
    let summary = xliff.summary();

    if json_output {
        let per_file: Vec<_> = xliff
            .files()
            .iter()
            .map(|file| {
                json!({
                    "name": file.name,
                    "source_language": file.source_language,
                    "target_language": file.target_language,
                    "total": file.all_items().len(),
                    "translated": file.translated_count(),
                    "untranslated": file.untranslated_count(),
                    "completion_percent": (completion_percent(file) * 100.0).round() / 100.0,
                })
            })
            .collect();
        let body = json!({
            "summary": summary,
            "files": per_file,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?
        );
        return Ok(());
    }

    println!("=== Stats ===");
    println!("File groups: {}", summary.files);
    println!("Units: {}", summary.total);
    println!("Translated: {}", summary.translated);
    println!("Untranslated: {}", summary.untranslated);

    for file in xliff.files() {
        println!("\nFile: {}", file.name);
        println!(
            "  Languages: {} → {}",
            file.source_language.as_deref().unwrap_or("?"),
            file.target_language.as_deref().unwrap_or("?")
        );
        println!("  Total: {}", file.all_items().len());
        println!("  Translated: {}", file.translated_count());
        println!("  Untranslated: {}", file.untranslated_count());
        println!("  Completion: {:.2}%", completion_percent(file));
    }

    Ok(())
}
