/// Collapse non-breaking spaces and whitespace runs into single spaces and trim.
pub fn normalize(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() || ch == '\u{00A0}' {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    // a trailing run leaves one space behind
    if buf.ends_with(' ') { buf.pop(); }
    buf
}

/// `normalize` for optional input; `None` yields an empty string.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}
