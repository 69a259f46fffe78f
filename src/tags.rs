// src/tags.rs
use std::iter::Peekable;
use std::str::CharIndices;

use crate::errors::TagError;
use crate::models::RawTags;

/// Turn any upstream tag shape into one trimmed sequence.
///
/// Lists are trimmed per element, `[...]` strings are read as a list literal of
/// quoted strings, anything else is split on commas. Empty pieces are dropped.
/// Duplicates are kept; per-record dedup happens during cleaning.
pub fn parse_tags(raw: &RawTags) -> Result<Vec<String>, TagError> {
    match raw {
        RawTags::List(items) => Ok(trimmed(items.iter().map(String::as_str))),
        RawTags::Text(s) => {
            let s = s.trim_start();
            if s.starts_with('[') {
                parse_list_literal(s)
            } else {
                Ok(trimmed(s.split(',')))
            }
        }
    }
}

fn trimmed<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<String> {
    pieces
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `['a', "b", 'c\'d']` into its string items.
fn parse_list_literal(s: &str) -> Result<Vec<String>, TagError> {
    let err = |offset: usize, reason: &'static str| TagError { offset, reason };

    let mut chars = s.char_indices().peekable();
    match chars.next() {
        Some((_, '[')) => {}
        _ => return Err(err(0, "expected '['")),
    }

    let mut items = Vec::new();
    let mut expect_item = true;
    let end;

    loop {
        while matches!(chars.peek(), Some((_, c)) if c.is_whitespace()) {
            chars.next();
        }
        let Some((pos, c)) = chars.next() else {
            return Err(err(s.len(), "missing closing ']'"));
        };

        match c {
            ']' => {
                end = pos + 1;
                break;
            }
            '\'' | '"' if expect_item => {
                let quote = c;
                let mut item = String::new();
                loop {
                    match chars.next() {
                        Some((at, '\\')) => unescape(&mut chars, at, s.len(), &mut item)?,
                        Some((_, ch)) if ch == quote => break,
                        Some((_, ch)) => item.push(ch),
                        None => return Err(err(s.len(), "unterminated string")),
                    }
                }
                let item = item.trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
                expect_item = false;
            }
            ',' if !expect_item => expect_item = true,
            _ if expect_item => return Err(err(pos, "expected a quoted string")),
            _ => return Err(err(pos, "expected ',' or ']'")),
        }
    }

    if !s[end..].trim().is_empty() {
        return Err(err(end, "trailing characters after ']'"));
    }
    Ok(items)
}

/// Decode one backslash escape (the backslash at `at` is already consumed).
///
/// Follows Python string-literal rules: unknown escapes keep their backslash,
/// `\xNN`, `\uNNNN`, `\UNNNNNNNN` and up to three octal digits name a code point.
fn unescape(
    chars: &mut Peekable<CharIndices<'_>>,
    at: usize,
    len: usize,
    item: &mut String,
) -> Result<(), TagError> {
    let Some((_, c)) = chars.next() else {
        return Err(TagError { offset: len, reason: "unterminated string" });
    };
    let width = match c {
        'x' => 2,
        'u' => 4,
        'U' => 8,
        '0'..='7' => {
            let mut code = c.to_digit(8).unwrap_or(0);
            for _ in 0..2 {
                match chars.peek().and_then(|&(_, d)| d.to_digit(8)) {
                    Some(d) => {
                        code = code * 8 + d;
                        chars.next();
                    }
                    None => break,
                }
            }
            return push_code_point(item, code, at);
        }
        _ => {
            match c {
                'n' => item.push('\n'),
                't' => item.push('\t'),
                'r' => item.push('\r'),
                'a' => item.push('\u{07}'),
                'b' => item.push('\u{08}'),
                'f' => item.push('\u{0c}'),
                'v' => item.push('\u{0b}'),
                '\\' | '\'' | '"' => item.push(c),
                '\n' => {} // line continuation
                other => {
                    item.push('\\');
                    item.push(other);
                }
            }
            return Ok(());
        }
    };

    let mut code = 0u32;
    for _ in 0..width {
        match chars.next().and_then(|(_, d)| d.to_digit(16)) {
            Some(d) => code = code * 16 + d,
            None => return Err(TagError { offset: at, reason: "truncated hex escape" }),
        }
    }
    push_code_point(item, code, at)
}

fn push_code_point(item: &mut String, code: u32, at: usize) -> Result<(), TagError> {
    let ch = char::from_u32(code)
        .ok_or(TagError { offset: at, reason: "escape is not a valid code point" })?;
    item.push(ch);
    Ok(())
}
