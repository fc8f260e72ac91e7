use liquidfmt::{format, FormatOptions};

fn format_err(source: &str) -> liquidfmt::Error {
    format(source, &FormatOptions::default()).unwrap_err()
}

#[test]
fn test_mismatched_close_tag() {
    let err = format_err("{% if a %}{% endunless %}");
    assert!(err.is_structural());
    assert_eq!(
        err.location().unwrap().message,
        "Attempting to close LiquidTag 'unless' before LiquidTag 'if' was closed"
    );
}

#[test]
fn test_close_before_open() {
    let err = format_err("<p>a</p>\n</div>");
    assert!(err.is_structural());
    let location = err.location().unwrap();
    assert_eq!(
        location.message,
        "Attempting to close HtmlElement 'div' before it was opened"
    );
    assert_eq!(location.line, 2);
    assert_eq!(location.column, 1);
}

#[test]
fn test_unclosed_block_at_end_of_input() {
    let err = format_err("{% if a %}\n  hello\n");
    assert!(err.is_structural());
    assert_eq!(
        err.location().unwrap().message,
        "Attempting to end parsing before LiquidTag 'if' was closed"
    );
}

#[test]
fn test_grammar_error_is_located() {
    let err = format_err("<div>\n  <p class=\"a></p>\n</div>");
    assert!(err.is_grammar());
    assert!(!err.is_structural());
    let location = err.location().unwrap();
    assert_eq!(location.line, 2);
    assert!(err.to_string().starts_with("Unexpected"));
}

#[test]
fn test_error_display_points_at_the_source() {
    let err = format_err("</div>");
    assert_eq!(
        err.to_string(),
        "Attempting to close HtmlElement 'div' before it was opened (1:1)\n    1 | </div>\n      | ^"
    );
}

#[test]
fn test_bad_options() {
    let err = FormatOptions::from_json(r#"{"tabWidth": -1}"#).unwrap_err();
    assert!(err.location().is_none());
    assert!(err.to_string().starts_with("Invalid options"));
}
