//! Key normalization helpers.
//!
//! Generated search tables keep their keys file-name safe by replacing
//! punctuation with `_XX`, where `XX` is the lowercase hex code of the byte
//! (`abs_28float_29` is `abs(float)`, `atomic_5fint` is `atomic_int`).

/// Decode `_XX` escapes that stand for ASCII punctuation or space.
///
/// Any other `_XX` sequence is left untouched, so unescaped input such as
/// `atomic_int_fast8_t` (`_fa` would be byte 0xFA) passes through unchanged.
pub fn unescape_key(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = String::with_capacity(key.len());
    let mut i = 0;
    let mut literal_start = 0;

    while i < bytes.len() {
        if bytes[i] == b'_' && i + 2 < bytes.len() {
            if let Some(ch) = decode_pair(bytes[i + 1], bytes[i + 2]) {
                out.push_str(&key[literal_start..i]);
                out.push(ch);
                i += 3;
                literal_start = i;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&key[literal_start..]);
    out
}

fn decode_pair(hi: u8, lo: u8) -> Option<char> {
    let value = (hex_value(hi)? << 4) | hex_value(lo)?;
    let ch = value as char;
    if ch == ' ' || ch.is_ascii_punctuation() {
        Some(ch)
    } else {
        None
    }
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Lowercase a string one character at a time.
///
/// Unlike `str::to_lowercase` this never applies context-dependent rules, so
/// `fold_case(a).starts_with(&fold_case(b))` holds whenever `a` starts with `b`.
pub fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
