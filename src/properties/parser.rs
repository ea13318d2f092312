//! Parser for the `.properties` text format
//!
//! Supports `#`/`!` comments, `=`, `:` or whitespace separators, backslash
//! line continuation and the usual escapes including `\uXXXX`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{WatchError, WatchResult};

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0c}')
}

/// Parse property file content into a key/value table
///
/// Later definitions of a key win. `file` is only used for error reporting.
pub fn parse_properties(content: &str, file: &Path) -> WatchResult<BTreeMap<String, String>> {
    let mut props = BTreeMap::new();
    let mut lines = content.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let line = raw.trim_start_matches(is_blank);
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let line_no = index + 1;
        let mut logical = line.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        props.insert(unescape(key, file, line_no)?, unescape(value, file, line_no)?);
    }

    Ok(props)
}

/// A line continues when it ends with an odd number of backslashes
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix(['=', ':'])
        .map(|r| r.trim_start_matches(is_blank))
        .unwrap_or(rest);

    (&line[..key_end], rest)
}

fn unescape(raw: &str, file: &Path, line: usize) -> WatchResult<String> {
    let malformed = || WatchError::MalformedEscape {
        file: file.to_path_buf(),
        line,
    };

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0c}'),
            Some('u') => {
                let unit = read_hex4(&mut chars).ok_or_else(malformed)?;
                if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate: must be followed by `\uDC00`..`\uDFFF`.
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(malformed());
                    }
                    let low = read_hex4(&mut chars).ok_or_else(malformed)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(malformed());
                    }
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(code).ok_or_else(malformed)?);
                } else {
                    out.push(char::from_u32(unit).ok_or_else(malformed)?);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_hex4(chars: &mut impl Iterator<Item = char>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
