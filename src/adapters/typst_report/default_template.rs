//! Built-in Typst report template with `{{PLACEHOLDER}}` markers.

const DEFAULT_TEMPLATE: &str = r#"#set page(paper: "a4", margin: 2cm)
#set text(size: 10pt)

= {{TITLE}}

== Session

{{SESSION_SUMMARY}}

== Results

{{SUMMARY_TABLE}}

== Equity Curve

{{EQUITY_CURVE_SVG}}

== Trade Log

{{TRADE_LOG}}
"#;

/// Placeholders recognised by [`super::resolve`].
pub const PLACEHOLDERS: [&str; 5] = [
    "{{TITLE}}",
    "{{SESSION_SUMMARY}}",
    "{{SUMMARY_TABLE}}",
    "{{EQUITY_CURVE_SVG}}",
    "{{TRADE_LOG}}",
];

pub fn template() -> &'static str {
    DEFAULT_TEMPLATE
}
