//! Angle-bracket key notation.
//!
//! Every key that enters the engine is expected in canonical form: printable
//! keys verbatim, named keys as lower-cased bracket names (`<esc>`, `<c-r>`).
//! Configuration authors write whatever Vim accepts (`<Esc>`, `<C-R>`,
//! `<ctrl+r>`), so remap tables are normalized here once at load time.
//! Unknown names survive as lower-cased literals and simply never match.

/// Canonicalize a single key name.
pub fn normalize_key(key: &str) -> String {
    let Some(inner) = bracket_inner(key) else {
        return key.to_string();
    };
    let lower = inner.to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "escape" => "esc".to_string(),
        "return" | "enter" => "cr".to_string(),
        "backspace" => "bs".to_string(),
        "delete" => "del".to_string(),
        "space" => return " ".to_string(),
        "lt" => return "<".to_string(),
        other => {
            if let Some(rest) = strip_ctrl_prefix(other) {
                format!("c-{rest}")
            } else {
                other.to_string()
            }
        }
    };
    format!("<{canonical}>")
}

fn strip_ctrl_prefix(name: &str) -> Option<&str> {
    for prefix in ["ctrl+", "ctrl-", "c+", "c-"] {
        if let Some(rest) = name.strip_prefix(prefix)
            && !rest.is_empty()
        {
            return Some(rest);
        }
    }
    None
}

fn bracket_inner(key: &str) -> Option<&str> {
    let inner = key.strip_prefix('<')?.strip_suffix('>')?;
    if inner.is_empty() || inner.contains(['<', '>']) || inner.contains(char::is_whitespace) {
        return None;
    }
    Some(inner)
}

/// Split a notation string (`"<leader>w"`, `"jj"`, `"<C-w>h"`) into
/// normalized key names.
pub fn parse_key_notation(input: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut rest = input;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(end) = rest[1..].find('>')
        {
            let candidate = &rest[..end + 2];
            if bracket_inner(candidate).is_some() {
                keys.push(normalize_key(candidate));
                rest = &rest[end + 2..];
                continue;
            }
        }
        keys.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }
    keys
}

/// Replace `<leader>` entries with the configured leader key.
pub fn substitute_leader(keys: &[String], leader: &str) -> Vec<String> {
    keys.iter()
        .map(|k| {
            if k.eq_ignore_ascii_case("<leader>") {
                leader.to_string()
            } else {
                k.clone()
            }
        })
        .collect()
}
