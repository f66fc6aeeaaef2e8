//! Identifier rules and name derivation

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]\w*$").expect("valid identifier regex"));

/// Whether `name` can be used as a Dart class or field name
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Fail with [`Error::InvalidIdentifier`] unless `name` is an identifier
pub fn check_identifier(name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(Error::invalid_identifier(name))
    }
}

/// `user_info` → `UserInfo`, `items` → `Items`
///
/// Underscores, dashes and spaces separate words; everything else is kept.
pub fn upper_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = true;
    for c in key.chars() {
        if matches!(c, '_' | '-' | ' ') {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Dart field name for a JSON key: `user_name` → `userName`
///
/// An underscore followed by a word character is dropped and the character
/// upper-cased; a trailing underscore is kept.
pub fn field_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    chars.next();
                    out.extend(next.to_uppercase());
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Source file stem for a class name: `UserListItem` → `user_list_item`
///
/// Runs of capitals stay together: `HTTPServer` → `http_server`.
pub fn file_stem(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
