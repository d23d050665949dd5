//! Recovers a JSON object from free-form model output.

/// Literal escape sequences models emit for German text, mapped to the
/// intended character. `«` is a frequent mis-encoding of `ß`.
const ESCAPE_FIXES: [(&str, char); 9] = [
    ("\\u00df", 'ß'),
    ("\\u00e4", 'ä'),
    ("\\u00f6", 'ö'),
    ("\\u00fc", 'ü'),
    ("\\u00c4", 'Ä'),
    ("\\u00d6", 'Ö'),
    ("\\u00dc", 'Ü'),
    ("\\u00ab", 'ß'),
    ("\\u00bb", '»'),
];

/// Strips markdown fences and surrounding prose, then repairs escapes.
pub fn clean_json_response(raw: &str) -> String {
    let content = raw.trim();
    let body = fenced_json_block(content).unwrap_or_else(|| {
        let unfenced = content.strip_prefix("```json").unwrap_or(content).trim();
        let unfenced = unfenced.strip_suffix("```").unwrap_or(unfenced).trim();
        balanced_object(unfenced).unwrap_or(unfenced)
    });
    repair_escapes(body).trim().to_string()
}

/// Content of the first complete fenced ```json block.
fn fenced_json_block(content: &str) -> Option<&str> {
    let start = content.find("```json")? + "```json".len();
    let rest = &content[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// First `{ ... }` span with balanced braces, ignoring braces inside strings.
fn balanced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in content[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&content[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn repair_escapes(content: &str) -> String {
    if !content.contains("\\u00") && !content.contains("\\U00") {
        return content.to_string();
    }
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let fix = candidate.get(..6).and_then(|head| {
            ESCAPE_FIXES
                .iter()
                .find(|(escape, _)| escape.eq_ignore_ascii_case(head))
                .map(|(_, c)| *c)
        });
        if let Some(c) = fix {
            out.push(c);
            rest = &candidate[6..];
        } else {
            out.push('\\');
            rest = &candidate[1..];
        }
    }
    out.push_str(rest);
    out
}
