/// Parse a plain-text pattern list, one wildcard pattern per line.
///
/// Blank lines and lines starting with `!` or `#` are skipped; surrounding
/// whitespace is trimmed. Order is preserved and duplicates are kept (the
/// optimizer removes them).
pub fn parse_pattern_list(text: &str) -> Vec<String> {
    let mut patterns = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        patterns.push(line.to_string());
    }

    patterns
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('!') || line.starts_with('#')
}
