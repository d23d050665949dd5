use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Key prefixes issued by the LLM vendors this crate talks to.
const KEY_PREFIXES: [&str; 4] = ["sk-", "gsk_", "sk_live_", "Bearer "];

/// Markers whose following token is a credential.
const CREDENTIAL_MARKERS: [&str; 10] = [
    "api_key=",
    "access_token=",
    "refresh_token=",
    "refreshtoken=",
    "token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"refresh_token\":\"",
    "\"refreshtoken\":\"",
    "\"token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

/// Replaces the token following every occurrence of `marker`. Returns
/// whether anything changed.
fn redact_after(text: &mut String, marker: &str, keep_marker: bool) -> bool {
    let mut changed = false;
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(marker) {
        let start = cursor + offset;
        let value_start = start + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .map(char::len_utf8)
            .sum();
        if value_len == 0 {
            cursor = value_start;
            continue;
        }
        let replace_from = if keep_marker { value_start } else { start };
        text.replace_range(replace_from..value_start + value_len, REDACTED);
        changed = true;
        cursor = replace_from + REDACTED.len();
    }
    changed
}

/// Redacts API keys and tokens from provider or token-endpoint error text.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let suspicious = KEY_PREFIXES
        .iter()
        .chain(CREDENTIAL_MARKERS.iter())
        .any(|pattern| input.contains(pattern));
    if !suspicious {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for prefix in KEY_PREFIXES {
        redact_after(&mut scrubbed, prefix, false);
    }
    for marker in CREDENTIAL_MARKERS {
        redact_after(&mut scrubbed, marker, true);
    }
    Cow::Owned(scrubbed)
}

/// Scrubs secrets and truncates to a log-friendly length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }
    let truncated: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    format!("{truncated}...")
}
