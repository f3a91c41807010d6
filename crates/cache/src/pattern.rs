//! Glob matching for key enumeration.

use globset::{Glob, GlobMatcher};

use crate::Result;

/// Compiles a key pattern such as `farm:Plot:*`.
///
/// Supports `*`, `?` and `[...]` classes.
pub fn compile(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)?.compile_matcher())
}

/// Builds a pattern that only matches keys under `namespace`.
///
/// The namespace is matched literally; glob syntax applies to `pattern` alone.
pub fn scoped(namespace: &str, pattern: &str) -> String {
    format!("{}:{}", globset::escape(namespace), pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        let matcher = compile("farm:Plot:*").unwrap();
        assert!(matcher.is_match("farm:Plot:123"));
        assert!(!matcher.is_match("farm:Crop:123"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let matcher = compile("k?").unwrap();
        assert!(matcher.is_match("k1"));
        assert!(!matcher.is_match("k12"));
    }

    #[test]
    fn scoped_namespace_is_literal() {
        let matcher = compile(&scoped("farm[1]:Plot", "*")).unwrap();
        assert!(matcher.is_match("farm[1]:Plot:123"));
        assert!(!matcher.is_match("farm1:Plot:123"));

        let matcher = compile(&scoped("*:Plot", "*")).unwrap();
        assert!(matcher.is_match("*:Plot:123"));
        assert!(!matcher.is_match("farm:Plot:123"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(compile("farm:[").is_err());
    }
}
