/// Removes `//` line comments from JSON-with-comments text.
///
/// Every line is scanned on its own: a backslash escapes the next character,
/// an unescaped `"` opens or closes a string, and an unescaped `//` outside a
/// string starts a comment that runs to the end of the line (including a `//`
/// that ends the line). Lines left blank after stripping are dropped.
pub fn strip_comments(content: &str) -> String {
    content
        .split('\n')
        .map(strip_line)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_line(line: &str) -> &str {
    match comment_start(line) {
        Some(pos) => line[..pos].trim_end_matches([' ', '\t']),
        None => line,
    }
}

/// Byte offset of the first `//` outside a string literal, if any.
pub(crate) fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return Some(i),
            _ => {}
        }
    }

    None
}
