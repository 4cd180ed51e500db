//! printf-style format specifier extraction and source/target consistency checks.
//!
//! A specifier is `%`, an optional positional index (`1$`), flags, width,
//! precision, a length modifier and a conversion character, e.g. `%d`,
//! `%1$@`, `%-8.2lf`. `%%` is a literal percent sign.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

lazy_static! {
    // `%%` comes first so a literal percent is consumed before it can start a specifier.
    static ref SPECIFIER_REGEX: Regex = Regex::new(
        r"%%|%(?:[1-9][0-9]*\$)?[-+#0]*(?:[0-9]+|\*)?(?:\.(?:[0-9]+|\*))?(?:hh|h|ll|l|q|L|z|t|j)?[diouxXfFeEgGaAcCsSpn@]"
    )
    .unwrap();
}

/// Returns every format specifier in `input`, in occurrence order.
pub fn extract_specifiers(input: &str) -> Vec<&str> {
    SPECIFIER_REGEX
        .find_iter(input)
        .map(|m| m.as_str())
        .filter(|s| *s != "%%")
        .collect()
}

/// Checks that every specifier of `source` appears literally in `target`.
pub fn validate(source: &str, target: &str) -> Result<(), ValidationError> {
    let mut missing: Vec<String> = Vec::new();
    for specifier in extract_specifiers(source) {
        if !target.contains(specifier) && !missing.iter().any(|m| m == specifier) {
            missing.push(specifier.to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_ios_and_positional() {
        let specifiers = extract_specifiers("Hello %1$@, you have %2$d items and %@ extra");
        assert_eq!(specifiers, vec!["%1$@", "%2$d", "%@"]);
    }

    #[test]
    fn test_extract_flags_width_precision_length() {
        let specifiers = extract_specifiers("%-8.2lf|%05d|%lld|%zu|%.*s|%hhx");
        assert_eq!(specifiers, vec!["%-8.2lf", "%05d", "%lld", "%zu", "%.*s", "%hhx"]);
    }

    #[test]
    fn test_ignore_escaped_percent() {
        assert_eq!(extract_specifiers("Discount: 50%% and value %d"), vec!["%d"]);
        assert!(extract_specifiers("100%% sure").is_empty());
    }

    #[test]
    fn test_plain_percent_sign_is_not_a_specifier() {
        assert!(extract_specifiers("100% sure").is_empty());
        assert!(extract_specifiers("50 %").is_empty());
    }

    #[test]
    fn test_validate_reports_missing() {
        let err = validate("Hello %@, you have %d items", "Hello %@").unwrap_err();
        assert_eq!(err.missing, vec!["%d"]);
    }

    #[test]
    fn test_validate_accepts_complete_target() {
        assert!(validate("Hello %@, you have %d items", "Hello %@, you have %d").is_ok());
        assert!(validate("No specifiers", "").is_ok());
    }

    #[test]
    fn test_validate_lists_each_specifier_once() {
        let err = validate("%d of %d, %1$@", "nothing").unwrap_err();
        assert_eq!(err.missing, vec!["%d", "%1$@"]);
    }

    #[test]
    fn test_validate_reordered_target() {
        assert!(validate("%1$@ likes %2$@", "%2$@ wird von %1$@ gemocht").is_ok());
    }
}
