//! URL slug derivation.
//!
//! Titles are Norwegian, so the transliteration handles æ/ø/å before
//! stripping everything outside `[a-z0-9-]`.

use crate::error::CoreError;

/// Derive a URL-safe slug from a human-readable title.
///
/// Lowercases, transliterates `æ→ae`, `ø→o`, `å→a`, collapses whitespace
/// runs to a single hyphen, and drops every remaining character outside
/// `[a-z0-9-]`.
///
/// # Examples
///
/// ```
/// use portal_core::slug::slugify;
///
/// assert_eq!(slugify("Fjordbyen Fase 2"), "fjordbyen-fase-2");
/// assert_eq!(slugify("Åsveien Ærfugl"), "asveien-aerfugl");
/// ```
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut prev_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !prev_hyphen && !out.is_empty() {
                out.push('-');
                prev_hyphen = true;
            }
            continue;
        }

        match c {
            'æ' => {
                out.push_str("ae");
                prev_hyphen = false;
            }
            'ø' => {
                out.push('o');
                prev_hyphen = false;
            }
            'å' => {
                out.push('a');
                prev_hyphen = false;
            }
            'a'..='z' | '0'..='9' => {
                out.push(c);
                prev_hyphen = false;
            }
            '-' => {
                out.push('-');
                prev_hyphen = true;
            }
            // Everything else is stripped.
            _ => {}
        }
    }

    // A trailing hyphen can only come from trailing whitespace.
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Validate a slug on the committed write path.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug must contain only lowercase alphanumeric characters and hyphens".into(),
        ));
    }
    Ok(())
}
