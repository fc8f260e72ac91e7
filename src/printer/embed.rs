//! Formatting of bodies written in another language.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::ast::RawMarkupKind;
use crate::config::FormatOptions;

/// Formats the body of a `<script>`, `<style>` or raw Liquid tag.
///
/// Returning `None` declines the body, which is then re-indented line by
/// line. Bodies holding Liquid are never offered.
pub trait EmbeddedFormatter {
    fn format(&self, body: &str, kind: RawMarkupKind, options: &FormatOptions) -> Option<String>;
}

/// Declines every body.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl EmbeddedFormatter for PassThrough {
    fn format(&self, _body: &str, _kind: RawMarkupKind, _options: &FormatOptions) -> Option<String> {
        None
    }
}

/// Re-serializes a JSON body with `tab_width` spaces of indentation. `None`
/// when the body is not valid JSON.
pub(super) fn format_json(body: &str, tab_width: usize) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let indent = b" ".repeat(tab_width);
    let mut output = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut output, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(output).ok()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_pass_through_declines() {
        let options = FormatOptions::default();
        assert_eq!(PassThrough.format("a { }", RawMarkupKind::Css, &options), None);
    }

    #[test]
    fn test_format_json() {
        assert_eq!(
            format_json(r#"{"name":"Header","settings":[1,2]}"#, 2).as_deref(),
            Some("{\n  \"name\": \"Header\",\n  \"settings\": [\n    1,\n    2\n  ]\n}")
        );
        assert_eq!(
            format_json(r#"{ "a": {} }"#, 4).as_deref(),
            Some("{\n    \"a\": {}\n}")
        );
    }

    #[test]
    fn test_format_json_nested_indent() {
        assert_eq!(
            format_json(r#"{"a":{"b":[true]}}"#, 3).as_deref(),
            Some("{\n   \"a\": {\n      \"b\": [\n         true\n      ]\n   }\n}")
        );
    }

    #[test]
    fn test_format_json_keeps_key_order() {
        assert_eq!(
            format_json(r#"{"z":1,"a":2}"#, 2).as_deref(),
            Some("{\n  \"z\": 1,\n  \"a\": 2\n}")
        );
    }

    #[test]
    fn test_invalid_json_is_declined() {
        assert_eq!(format_json("{ \"a\": ", 2), None);
    }
}
