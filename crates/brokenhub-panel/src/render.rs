//! HTML for the configuration page.

use std::fmt::Write as _;
use std::path::Path;

use crate::daemon_view::DaemonView;
use crate::record::{display_value, Field, Record};

/// Render the form pre-filled from `record`.
pub fn config_page(record: &Record, config_path: &Path) -> String {
    let view = DaemonView::from_record(record);

    let mut inputs = String::new();
    for field in Field::ALL {
        let value = record.get(field.name()).map(display_value).unwrap_or_default();
        let _ = writeln!(
            inputs,
            r#"  <p><label for="{name}">{label}</label><br>
  <input type="text" id="{name}" name="{name}" value="{value}"></p>"#,
            name = field.name(),
            label = escape(field.label()),
            value = escape(&value),
        );
    }

    let mut warnings = String::new();
    for (field, problem) in view.problems() {
        let _ = writeln!(
            warnings,
            "  <li><code>{field}</code>: {}</li>",
            escape(&problem)
        );
    }
    let warnings = if warnings.is_empty() {
        String::new()
    } else {
        format!("<h2>Daemon warnings</h2>\n<ul>\n{warnings}</ul>\n")
    };

    let mut others = String::new();
    for (key, value) in record
        .iter()
        .filter(|(key, _)| Field::from_name(key).is_none())
    {
        let _ = writeln!(
            others,
            "  <li><code>{}</code> = <code>{}</code></li>",
            escape(key),
            escape(&value.to_string())
        );
    }
    let others = if others.is_empty() {
        String::new()
    } else {
        format!("<h2>Other settings (read-only)</h2>\n<ul>\n{others}</ul>\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>brokenhub</title></head>
<body>
<h1>brokenhub impairment settings</h1>
<p>Config file: <code>{path}</code></p>
<form method="post" action="/set">
{inputs}  <p><input type="submit" value="Apply"></p>
</form>
{warnings}{others}</body></html>
"#,
        path = escape(&config_path.display().to_string()),
    )
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
