use liquidfmt::ast::{parse_ast, Ast, NodeId, RawMarkupKind};
use liquidfmt::{format, format_with, EmbeddedFormatter, FormatOptions, HtmlWhitespaceSensitivity};
use pretty_assertions::assert_eq;

struct UppercaseCss;

impl EmbeddedFormatter for UppercaseCss {
    fn format(&self, body: &str, kind: RawMarkupKind, _options: &FormatOptions) -> Option<String> {
        (kind == RawMarkupKind::Css).then(|| body.trim().to_uppercase())
    }
}

#[test]
fn test_single_quote_attributes() {
    let options = FormatOptions {
        single_quote: true,
        ..FormatOptions::default()
    };
    assert_eq!(format("<a href=\"x\"></a>", &options).unwrap(), "<a href='x'></a>\n");
    assert_eq!(
        format("<a href=\"it's\"></a>", &options).unwrap(),
        "<a href=\"it's\"></a>\n"
    );
}

#[test]
fn test_quotes_cannot_be_doubled_inside_a_value() {
    let options = FormatOptions {
        single_quote: true,
        ..FormatOptions::default()
    };
    let err = format("<a href='it''s'></a>", &options).unwrap_err();
    assert!(err.is_grammar());
}

#[test]
fn test_liquid_double_quotes() {
    let options = FormatOptions {
        liquid_single_quote: false,
        ..FormatOptions::default()
    };
    assert_eq!(format("{{ 'a' }}", &options).unwrap(), "{{ \"a\" }}\n");
}

#[test]
fn test_embedded_formatter_receives_style_bodies() {
    let source = "<style>\na{color:red}\n</style>";
    let output = format_with(source, &FormatOptions::default(), &UppercaseCss).unwrap();
    assert_eq!(output, "<style>\n  A{COLOR:RED}\n</style>\n");
}

#[test]
fn test_options_from_json_drive_formatting() {
    let options = FormatOptions::from_json(r#"{"tabWidth": 4}"#).unwrap();
    assert_eq!(
        format("{%for i in (1..3)%}{{i}}{%endfor%}", &options).unwrap(),
        "{% for i in (1..3) %}\n    {{ i }}\n{% endfor %}\n"
    );
}

/// Non-text node types in document order, with their names.
fn shape(source: &str) -> Vec<String> {
    fn walk(ast: &Ast, id: NodeId, out: &mut Vec<String>) {
        for &child in ast[id].children() {
            let node = &ast[child];
            if node.is_text() {
                continue;
            }
            out.push(format!("{}:{}", node.type_name(), node.name().unwrap_or_default()));
            walk(ast, child, out);
        }
    }

    let ast = parse_ast(source).unwrap();
    let mut out = Vec::new();
    walk(&ast, ast.root(), &mut out);
    out
}

const SAMPLES: &[&str] = &[
    "<div><p>Hello world</p></div>",
    "{%for i in (1..3)%}{{i}}{%endfor%}",
    "{% if a %}A{% elsif b %}B{% else %}C{% endif %}",
    "<ul>\n<li>{{ item | upcase }}</li>\n<li>b</li>\n</ul>",
    "<input type=\"text\"><br>",
];

#[test]
fn test_formatting_is_idempotent() {
    let options = FormatOptions::default();
    for source in SAMPLES {
        let once = format(source, &options).unwrap();
        let twice = format(&once, &options).unwrap();
        assert_eq!(once, twice, "{source}");
    }
}

#[test]
fn test_formatting_keeps_the_tree() {
    let options = FormatOptions::default();
    for source in SAMPLES {
        let output = format(source, &options).unwrap();
        assert_eq!(shape(source), shape(&output), "{source}");
    }
}

#[test]
fn test_void_elements_never_close() {
    let output = format("<input type=\"text\"><br>", &FormatOptions::default()).unwrap();
    assert!(!output.contains("</input>"));
    assert!(!output.contains("</br>"));
}

#[test]
fn test_branches_follow_markers() {
    let ast = parse_ast("{% if a %}A{% elsif b %}B{% else %}C{% endif %}").unwrap();
    let tag = ast[ast.root()].children()[0];
    let names: Vec<_> = ast[tag]
        .children()
        .iter()
        .map(|&branch| ast[branch].name())
        .collect();
    assert_eq!(names, [None, Some("elsif".to_string()), Some("else".to_string())]);
}

#[test]
fn test_author_trim_markers_are_kept() {
    let output = format("{%- if a -%}x{%- endif -%}", &FormatOptions::default()).unwrap();
    assert!(output.contains("{%- if a -%}"), "{output}");
    assert!(output.contains("{%- endif -%}"), "{output}");
}

#[test]
fn test_author_trim_markers_survive_line_breaks() {
    let options = FormatOptions {
        print_width: 20,
        ..FormatOptions::default()
    };
    let output = format("{%- if condition -%}hello{%- endif -%}", &options).unwrap();
    assert!(output.trim_end().contains('\n'), "{output}");
    assert!(output.contains("{%- if condition -%}"), "{output}");
    assert!(output.contains("{%- endif -%}"), "{output}");
}

#[test]
fn test_single_attribute_per_line() {
    let options = FormatOptions {
        single_attribute_per_line: true,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("<div class=\"a\" id=\"b\"></div>", &options).unwrap(),
        "<div\n  class=\"a\"\n  id=\"b\"\n></div>\n"
    );
    assert_eq!(
        format("<div class=\"a\"></div>", &options).unwrap(),
        "<div class=\"a\"></div>\n"
    );
}

#[test]
fn test_bracket_same_line() {
    let options = FormatOptions {
        single_attribute_per_line: true,
        bracket_same_line: true,
        ..FormatOptions::default()
    };
    assert_eq!(
        format("<div class=\"a\" id=\"b\"></div>", &options).unwrap(),
        "<div\n  class=\"a\"\n  id=\"b\"></div>\n"
    );
}

#[test]
fn test_single_line_link_tags() {
    let source = "<link rel=\"stylesheet\" href=\"https://cdn.example.com/assets/theme.css\">";
    let mut options = FormatOptions {
        print_width: 40,
        ..FormatOptions::default()
    };
    assert_eq!(
        format(source, &options).unwrap(),
        "<link\n  rel=\"stylesheet\"\n  href=\"https://cdn.example.com/assets/theme.css\"\n>\n"
    );

    options.single_line_link_tags = true;
    assert_eq!(format(source, &options).unwrap(), format!("{source}\n"));
}

#[test]
fn test_html_whitespace_sensitivity() {
    let mut options = FormatOptions::default();
    let spans = "<span>a</span><span>b</span>";
    let padded = "<div> <p>a</p> </div>";
    assert_eq!(format(spans, &options).unwrap(), "<span>a</span><span>b</span>\n");
    assert_eq!(format(padded, &options).unwrap(), "<div><p>a</p></div>\n");

    options.html_whitespace_sensitivity = HtmlWhitespaceSensitivity::Ignore;
    assert_eq!(format(spans, &options).unwrap(), "<span>a</span>\n<span>b</span>\n");

    options.html_whitespace_sensitivity = HtmlWhitespaceSensitivity::Strict;
    assert_eq!(format(padded, &options).unwrap(), "<div> <p>a</p> </div>\n");
}

#[test]
fn test_schema_indentation() {
    let source = "{% schema %}\n{\"a\":1,\"b\":[1,2]}\n{% endschema %}";
    let mut options = FormatOptions::default();
    assert_eq!(
        format(source, &options).unwrap(),
        "{% schema %}\n{\"a\":1,\"b\":[1,2]}\n{% endschema %}\n"
    );

    options.indent_schema = true;
    assert_eq!(
        format(source, &options).unwrap(),
        "{% schema %}\n  {\n    \"a\": 1,\n    \"b\": [\n      1,\n      2\n    ]\n  }\n{% endschema %}\n"
    );
}
