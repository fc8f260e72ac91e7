//! Formatting options.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How whitespace between inline nodes is treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum HtmlWhitespaceSensitivity {
    /// Follow the default CSS `display` value of each element.
    #[default]
    Css,
    /// Every node is inline; whitespace is always significant.
    Strict,
    /// Every node is a block; whitespace is never significant.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct FormatOptions {
    pub print_width: usize,
    pub tab_width: usize,
    /// Prefer single quotes in HTML attribute values.
    pub single_quote: bool,
    /// Prefer single quotes in Liquid string literals.
    pub liquid_single_quote: bool,
    /// Prefer single quotes inside embedded script and style bodies.
    pub embedded_single_quote: bool,
    /// Keep `<link>` tags on one line whatever their length.
    pub single_line_link_tags: bool,
    /// Indent the body of `{% schema %}` and re-serialize it.
    pub indent_schema: bool,
    pub html_whitespace_sensitivity: HtmlWhitespaceSensitivity,
    pub single_attribute_per_line: bool,
    /// Put the `>` of a multi-line opening tag at the end of the last attribute.
    pub bracket_same_line: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: 120,
            tab_width: 2,
            single_quote: false,
            liquid_single_quote: true,
            embedded_single_quote: true,
            single_line_link_tags: false,
            indent_schema: false,
            html_whitespace_sensitivity: HtmlWhitespaceSensitivity::Css,
            single_attribute_per_line: false,
            bracket_same_line: false,
        }
    }
}

impl FormatOptions {
    /// Reads options from a JSON object with camelCase keys. Missing keys keep
    /// their default value.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FormatOptions::default();
        assert_eq!(options.print_width, 120);
        assert_eq!(options.tab_width, 2);
        assert!(!options.single_quote);
        assert!(options.liquid_single_quote);
        assert_eq!(
            options.html_whitespace_sensitivity,
            HtmlWhitespaceSensitivity::Css
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let options = FormatOptions::from_json(
            r#"{"printWidth": 80, "singleQuote": true, "htmlWhitespaceSensitivity": "ignore"}"#,
        )
        .unwrap();
        assert_eq!(options.print_width, 80);
        assert!(options.single_quote);
        assert_eq!(options.tab_width, 2);
        assert_eq!(
            options.html_whitespace_sensitivity,
            HtmlWhitespaceSensitivity::Ignore
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(FormatOptions::from_json(r#"{"printWidth": "wide"}"#).is_err());
    }
}
