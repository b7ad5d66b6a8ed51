//! ERB-style placeholder substitution for default views.
//!
//! Supports:
//! - `<%= key %>` - HTML-escaped page property
//! - `<%- key %>` - Raw/unescaped page property
//! - `<%= yield %>` - Layout content insertion point
//!
//! Anything else between tags is left in place untouched.

use serde_json::Value;

/// Render `source`, looking placeholders up through `lookup`.
///
/// `content` is what `yield` expands to; outside layouts it expands to nothing.
pub fn render_template(source: &str, lookup: &dyn Fn(&str) -> Value, content: Option<&str>) -> String {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("<%") {
        output.push_str(&rest[..start]);
        let tag = &rest[start..];

        let Some(end) = tag.find("%>") else {
            output.push_str(tag);
            return output;
        };

        let escaped = match tag.as_bytes().get(2) {
            Some(b'=') => Some(true),
            Some(b'-') => Some(false),
            _ => None,
        };

        match escaped {
            Some(escape) if end >= 3 => {
                let key = tag[3..end].trim();
                if key == "yield" {
                    output.push_str(content.unwrap_or(""));
                } else {
                    let text = value_to_text(&lookup(key));
                    if escape {
                        output.push_str(&html_escape(&text));
                    } else {
                        output.push_str(&text);
                    }
                }
            }
            _ => output.push_str(&tag[..end + 2]),
        }

        rest = &tag[end + 2..];
    }

    output.push_str(rest);
    output
}

/// Text form of a property value.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
