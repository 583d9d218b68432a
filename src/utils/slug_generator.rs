//! Random slug generation.
//!
//! Slugs act as access tokens until they expire, so candidates are drawn from
//! the thread-local CSPRNG rather than a seeded generator.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Number of symbols slugs are drawn from: `A-Z`, `a-z`, `0-9`.
pub const ALPHABET_SIZE: usize = 62;

/// Produces slug candidates of a requested length.
///
/// Candidates are not unique by themselves; the allocation service checks them
/// against the mapping store.
#[cfg_attr(test, mockall::automock)]
pub trait SlugGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// Uniform alphanumeric generator backed by `rand::rng()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSlugGenerator;

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self, length: usize) -> String {
        generate_slug(length)
    }
}

/// Generates exactly `length` characters drawn uniformly from the
/// 62-symbol alphanumeric alphabet.
///
/// # Examples
///
/// ```ignore
/// let slug = generate_slug(10);
/// assert_eq!(slug.len(), 10);
/// assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_slug(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
