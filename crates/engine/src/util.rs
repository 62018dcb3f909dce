//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Maximum length (in chars) of any user supplied name.
const MAX_NAME_CHARS: usize = 64;

/// Trims a display name and rejects empty or oversized values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(EngineError::InvalidName(format!(
            "{label} name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Builds the comparison key of a name: accents stripped, lowercase,
/// punctuation and repeated whitespace collapsed to single spaces.
///
/// `"  Café-Bar "` and `"cafe bar"` share the key `"cafe bar"`.
pub(crate) fn name_key(display: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in display.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let key = out.trim_end();
    if key.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "'{display}' does not contain any letter or digit"
        )));
    }
    Ok(key.to_string())
}

/// Returns `None` for missing or blank text, the trimmed text otherwise.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Applies a text patch: `None` keeps the current value, `Some("")` clears it.
pub(crate) fn apply_optional_text_patch(
    current: Option<String>,
    patch: Option<&str>,
) -> Option<String> {
    match patch {
        None => current,
        Some(value) => normalize_optional_text(Some(value)),
    }
}
