//! Contract template rendering.
//!
//! Templates contain `{{PLACEHOLDER}}` tokens (uppercase letters, digits,
//! underscore). Rendering is plain-text substitution: no escaping, no
//! recursion, no I/O. Completeness is the caller's concern — `render`
//! leaves unknown tokens in place, and `missing_placeholders` reports what
//! a caller still has to collect before treating a render as final.

use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: regex::Regex =
        regex::Regex::new(r"\{\{([A-Z0-9_]+)\}\}").unwrap();
}

/// Extracts the distinct placeholder names of a template in order of first
/// appearance.
///
/// Malformed token syntax (unbalanced braces, lowercase names) simply does
/// not match; a template without tokens yields an empty vec.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut placeholders = Vec::new();

    for captures in PLACEHOLDER_REGEX.captures_iter(template) {
        let name = &captures[1];
        if seen.insert(name.to_string()) {
            placeholders.push(name.to_string());
        }
    }

    placeholders
}

/// Substitutes placeholder values into a template.
///
/// Every occurrence of a known placeholder is replaced with its raw value;
/// unknown placeholders stay in the output literally. The substitution is a
/// single pass, so values containing `{{...}}` text are never re-scanned.
pub fn render(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |captures: &regex::Captures<'_>| {
            match values.get(&captures[1]) {
                Some(value) => value.clone(),
                None => captures[0].to_string(),
            }
        })
        .into_owned()
}

/// Placeholders of `template` that have no usable value in `values`.
///
/// A value that is empty or whitespace-only counts as missing. Order
/// follows first appearance in the template.
pub fn missing_placeholders(template: &str, values: &HashMap<String, String>) -> Vec<String> {
    extract_placeholders(template)
        .into_iter()
        .filter(|name| {
            values
                .get(name)
                .map(|value| value.trim().is_empty())
                .unwrap_or(true)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_returns_first_occurrence_order() {
        assert_eq!(extract_placeholders("{{B}} {{A}} {{B}}"), vec!["B", "A"]);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let template = "{{CLIENT_NAME}} signs on {{DATE}}, again {{CLIENT_NAME}}.";
        let first = extract_placeholders(template);
        let second = extract_placeholders(template);
        assert_eq!(first, second);
        assert_eq!(first, vec!["CLIENT_NAME", "DATE"]);
    }

    #[test]
    fn test_extract_without_tokens_is_empty() {
        assert_eq!(extract_placeholders("no tokens here"), Vec::<String>::new());
        assert_eq!(extract_placeholders(""), Vec::<String>::new());
    }

    #[test]
    fn test_extract_ignores_malformed_tokens() {
        // Lowercase names, unbalanced and single braces do not match.
        assert_eq!(
            extract_placeholders("{{lower}} {UP} {{UNCLOSED {{OK}}"),
            vec!["OK"]
        );
    }

    #[test]
    fn test_render_substitutes_values() {
        let result = render(
            "Hello {{NAME}}, today is {{DATE}}.",
            &values(&[("NAME", "Anna"), ("DATE", "08.01.2026")]),
        );
        assert_eq!(result, "Hello Anna, today is 08.01.2026.");
    }

    #[test]
    fn test_render_leaves_unknown_tokens_in_place() {
        let result = render("{{X}} and {{Y}}", &values(&[("X", "1")]));
        assert_eq!(result, "1 and {{Y}}");
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let result = render(
            "{{NAME}}, {{NAME}} and {{NAME}}",
            &values(&[("NAME", "Anna")]),
        );
        assert_eq!(result, "Anna, Anna and Anna");
    }

    #[test]
    fn test_render_does_not_rescan_substituted_values() {
        // A value that looks like a token must come through verbatim.
        let result = render(
            "{{OUTER}}",
            &values(&[("OUTER", "{{INNER}}"), ("INNER", "nope")]),
        );
        assert_eq!(result, "{{INNER}}");
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = "{{A}} {{B}} {{A}}";
        let vals = values(&[("A", "1"), ("B", "2")]);
        assert_eq!(render(template, &vals), render(template, &vals));
    }

    #[test]
    fn test_render_with_superset_of_values_is_complete() {
        let template = "Fee: {{FEE}} {{CURRENCY}}, client {{CLIENT}}";
        let vals = values(&[
            ("FEE", "2990"),
            ("CURRENCY", "CHF"),
            ("CLIENT", "Muster AG"),
            ("UNUSED", "whatever"),
        ]);
        let result = render(template, &vals);
        assert!(!PLACEHOLDER_REGEX.is_match(&result));
    }

    #[test]
    fn test_missing_placeholders_reports_unfilled_and_blank() {
        let template = "{{A}} {{B}} {{C}}";
        let vals = values(&[("A", "set"), ("B", "   ")]);
        assert_eq!(missing_placeholders(template, &vals), vec!["B", "C"]);
    }

    #[test]
    fn test_missing_placeholders_empty_when_complete() {
        let template = "{{A}} {{B}}";
        let vals = values(&[("A", "1"), ("B", "2")]);
        assert_eq!(
            missing_placeholders(template, &vals),
            Vec::<String>::new()
        );
    }
}
