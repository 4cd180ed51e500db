use xliffedit::{traits::Parser, trans_unit::escape_id};

use crate::validation::{load_xliff, validate_output_path};

/// Turns a user-supplied key into the in-memory id form.
fn key_to_id(key: &str) -> String {
    escape_id(&key.replace("&#10;", "\n"))
}

pub fn run_set_command(
    input: String,
    file: String,
    key: String,
    value: Option<String>,
    output: Option<String>,
    force: bool,
) -> Result<(), String> {
    if let Some(o) = &output {
        validate_output_path(o)?;
    }
    let mut xliff = load_xliff(&input)?;

    let unit = xliff
        .find_unit(&file, &key_to_id(&key))
        .ok_or_else(|| format!("Unit '{}' not found in file '{}'", key, file))?;

    if let (Some(candidate), Some(current)) = (value.as_deref(), xliff.unit(unit)) {
        if let Err(e) = current.validate(candidate) {
            if !force {
                return Err(format!("{} (use --force to save anyway)", e));
            }
            println!("⚠️  {}", e);
        }
    }

    let previous = xliff
        .set_target(unit, value.as_deref())
        .map_err(|e| format!("{}", e))?;

    if previous == value {
        println!("ℹ️  Target of '{}' unchanged", key);
        // In-place edits have nothing to save; `-o` still gets its copy.
        if output.is_none() {
            return Ok(());
        }
    } else {
        match &value {
            Some(_) => println!("✅ Updated '{}'", key),
            None => println!("✅ Removed target of '{}'", key),
        }
    }

    let out = output.as_deref().unwrap_or(&input);
    xliff
        .write_to(out)
        .map_err(|e| format!("Error writing output: {}", e))?;
    if output.is_some() {
        println!("📄 Wrote changes to {}", out);
    } else {
        println!("📄 Updated {} in place", input);
    }

    Ok(())
}
