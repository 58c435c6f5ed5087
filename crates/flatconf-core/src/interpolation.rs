//! Environment placeholder interpolation
//!
//! String values may embed placeholders that are substituted once, at load
//! time:
//! - `${VAR}` - the value of environment variable `VAR`
//! - `${VAR|default}` - `VAR`, or `default` when `VAR` is unset or empty
//!
//! A placeholder ends at the first `}`; placeholders do not nest. When a
//! variable is unset and there is no default, the placeholder is replaced by
//! its inner expression (`${VAR}` becomes `VAR`). Substituted text is never
//! scanned again.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Separates the variable name from its default
pub const DEFAULT_DELIMITER: char = '|';

const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]+)\}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid placeholder regex"))
}

/// Check if a string contains at least one placeholder
pub fn contains_placeholder(input: &str) -> bool {
    placeholder_regex().is_match(input)
}

/// Interpolate `input` against the process environment
pub fn interpolate(input: &str) -> String {
    interpolate_with(input, |name| std::env::var(name).ok())
}

/// Interpolate `input`, looking variables up with `lookup`.
///
/// The result is trimmed of surrounding whitespace.
pub fn interpolate_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if !contains_placeholder(input) {
        return input.trim().to_string();
    }

    let replaced = placeholder_regex().replace_all(input, |caps: &Captures<'_>| {
        resolve_expression(&caps[1], &lookup)
    });
    replaced.trim().to_string()
}

/// Resolve the inside of one placeholder (`VAR` or `VAR|default`)
fn resolve_expression<F>(expression: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if expression.trim().is_empty() {
        return expression.to_string();
    }

    let (name, fallback) = match expression.split_once(DEFAULT_DELIMITER) {
        Some((name, fallback)) => (name, Some(fallback)),
        None => (expression, None),
    };
    let name = name.trim();

    if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
        return value;
    }

    match fallback {
        Some(fallback) => fallback.trim().to_string(),
        None => {
            log::warn!(
                "Environment variable '{}' is not set and has no default; using '{}' literally",
                name,
                expression
            );
            expression.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_no_placeholder() {
        assert_eq!(interpolate_with("plain value", env(&[])), "plain value");
        assert_eq!(interpolate_with("  padded  ", env(&[])), "padded");
        assert_eq!(interpolate_with("just $dollar {braces}", env(&[])), "just $dollar {braces}");
    }

    #[test]
    fn test_env_value() {
        assert_eq!(interpolate_with("${FOO}", env(&[("FOO", "bar")])), "bar");
    }

    #[test]
    fn test_default_when_unset() {
        assert_eq!(interpolate_with("${FOO|baz}", env(&[])), "baz");
    }

    #[test]
    fn test_default_when_empty() {
        assert_eq!(interpolate_with("${FOO|baz}", env(&[("FOO", "")])), "baz");
    }

    #[test]
    fn test_bare_expression_when_unset_without_default() {
        assert_eq!(interpolate_with("${FOO}", env(&[])), "FOO");
        assert_eq!(interpolate_with("${ FOO }", env(&[])), "FOO");
        assert_eq!(interpolate_with("x-${ FOO }-y", env(&[])), "x- FOO -y");
    }

    #[test]
    fn test_name_and_default_are_trimmed() {
        let lookup = env(&[("HOST", "db.internal")]);
        assert_eq!(interpolate_with("${ HOST | localhost }", &lookup), "db.internal");
        assert_eq!(interpolate_with("${ PORT | 5432 }", &lookup), "5432");
    }

    #[test]
    fn test_env_value_not_trimmed_inside_text() {
        let lookup = env(&[("PAD", "  x  ")]);
        assert_eq!(interpolate_with("[${PAD}]", &lookup), "[  x  ]");
    }

    #[test]
    fn test_multiple_placeholders() {
        let lookup = env(&[("SCHEME", "https"), ("HOST", "example.com")]);
        assert_eq!(
            interpolate_with("${SCHEME}://${HOST}:${PORT|9003}/${SCHEME}", &lookup),
            "https://example.com:9003/https"
        );
    }

    #[test]
    fn test_only_first_delimiter_splits() {
        assert_eq!(interpolate_with("${SEP|a|b}", env(&[])), "a|b");
    }

    #[test]
    fn test_first_closing_brace_terminates() {
        assert_eq!(interpolate_with("${A|{x}}", env(&[])), "{x}");
        assert_eq!(interpolate_with("${A|x}}", env(&[])), "x}");
    }

    #[test]
    fn test_substitution_is_not_rescanned() {
        let lookup = env(&[("OUTER", "${INNER}"), ("INNER", "nope")]);
        assert_eq!(interpolate_with("${OUTER}", &lookup), "${INNER}");
    }

    #[test]
    fn test_empty_braces_untouched() {
        assert_eq!(interpolate_with("${}", env(&[])), "${}");
        assert_eq!(interpolate_with("a ${ } b", env(&[])), "a   b");
    }

    #[test]
    fn test_result_is_trimmed() {
        let lookup = env(&[("TIME", " 2025-05-13T01:38:00Z ")]);
        assert_eq!(interpolate_with("${TIME}", &lookup), "2025-05-13T01:38:00Z");
    }

    #[test]
    fn test_process_environment() {
        std::env::set_var("FLATCONF_INTERP_TEST_FOO", "bar");
        std::env::remove_var("FLATCONF_INTERP_TEST_MISSING");

        assert_eq!(interpolate("${FLATCONF_INTERP_TEST_FOO}"), "bar");
        assert_eq!(interpolate("${FLATCONF_INTERP_TEST_MISSING|baz}"), "baz");
        assert_eq!(
            interpolate("${FLATCONF_INTERP_TEST_MISSING}"),
            "FLATCONF_INTERP_TEST_MISSING"
        );

        std::env::remove_var("FLATCONF_INTERP_TEST_FOO");
    }

    #[test]
    fn test_contains_placeholder() {
        assert!(contains_placeholder("${A}"));
        assert!(contains_placeholder("prefix ${A|b} suffix"));
        assert!(!contains_placeholder("${}"));
        assert!(!contains_placeholder("$A"));
    }
}
