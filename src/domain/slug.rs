//! Utilities for generating deterministic, URL-safe slugs from titles.
//!
//! Slug generation stays pure: callers pass a uniqueness predicate, for
//! example one that checks the currently loaded collection.

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let candidate = slugify(input);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// The `is_unique` closure must return `true` when the provided slug is free.
/// Collisions are retried with a monotonic suffix (`-2`, `-3`, …).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        let slug = derive_slug("GPT-5: What Changed?").expect("slug");
        assert_eq!(slug, "gpt-5-what-changed");
    }

    #[test]
    fn generate_unique_slug_appends_counter() {
        let existing = ["scaling-ai".to_string(), "scaling-ai-2".to_string()];
        let slug = generate_unique_slug("Scaling AI", |candidate| {
            !existing.iter().any(|slug| slug == candidate)
        })
        .expect("unique slug");

        assert_eq!(slug, "scaling-ai-3");
    }

    #[test]
    fn generate_unique_slug_keeps_free_base() {
        let slug = generate_unique_slug("Cloud Basics", |_| true).expect("slug");
        assert_eq!(slug, "cloud-basics");
    }

    #[test]
    fn derive_slug_rejects_blank_input() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
        assert!(matches!(
            derive_slug("!!!"),
            Err(SlugError::Unrepresentable { .. })
        ));
    }

    #[test]
    fn generate_unique_slug_gives_up_eventually() {
        let err = generate_unique_slug("Busy", |_| false).expect_err("exhausted");
        assert_eq!(
            err,
            SlugError::Exhausted {
                base: "busy".to_string()
            }
        );
    }
}
