/// Only quotes are escaped: other escape sequences are kept verbatim when
/// labels are decoded, so they are already in their rendered form. An unpaired
/// `\` right before a quote or at the end of the value gets a second one,
/// otherwise it would pair with a quote; it reads back doubled.
fn escape_str(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    let mut backslashes = 0;

    for c in s.chars() {
        if c == '"' {
            if backslashes % 2 == 1 {
                escaped.push('\\');
            }
            escaped.push_str("\\\"");
        } else {
            escaped.push(c);
        }

        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
    }

    if backslashes % 2 == 1 {
        escaped.push('\\');
    }

    escaped
}

pub fn render_label_values(labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return String::new();
    }

    let mut build = String::new();

    build.push('{');
    let rendered: Vec<String> = labels
        .iter()
        .map(|(name, value)| format!("{}=\"{}\"", name, escape_str(value)))
        .collect();
    build.push_str(&rendered.join(","));
    build.push('}');

    build
}
