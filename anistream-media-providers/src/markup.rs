//! Attribute extraction from embed page markup
//!
//! Upstream embed pages change without notice, so every provider goes through
//! [`first_attribute_value`] instead of matching markup inline.

use std::sync::LazyLock;

use regex::Regex;

// Compile-time constant pattern; Regex::new cannot fail on it.
static RE_DATA_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-id=["'](\d+)["']"#).expect("invalid data-id regex")
});

/// Return the first captured attribute value matched by `pattern`.
///
/// The pattern's first capture group is the value.
#[must_use]
pub fn first_attribute_value<'a>(html: &'a str, pattern: &Regex) -> Option<&'a str> {
    pattern
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First numeric `data-id` attribute in the document.
#[must_use]
pub fn data_id(html: &str) -> Option<&str> {
    first_attribute_value(html, &RE_DATA_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_id_double_quoted() {
        let html = r#"<div id="megaplay-player" data-id="123456" data-realid="9"></div>"#;
        assert_eq!(data_id(html), Some("123456"));
    }

    #[test]
    fn test_data_id_single_quoted() {
        let html = "<div data-id='42'></div>";
        assert_eq!(data_id(html), Some("42"));
    }

    #[test]
    fn test_data_id_first_match_wins() {
        let html = r#"<a data-id="1"></a><a data-id="2"></a>"#;
        assert_eq!(data_id(html), Some("1"));
    }

    #[test]
    fn test_data_id_rejects_non_numeric() {
        assert_eq!(data_id(r#"<div data-id="abc"></div>"#), None);
        assert_eq!(data_id("<html><body>nothing here</body></html>"), None);
    }
}
