//! Route path syntax.
//!
//! Route paths accept two placeholder spellings, `{name}` and the legacy
//! `:name`; [`normalize_pattern`] rewrites the former into the latter, which
//! is the form routes store. A `*name` placeholder captures the rest of the
//! path. Anything that is not a well-formed placeholder (an unmatched `{`,
//! a lone `:`) is kept as literal text.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::hash::BuildHasher;

use regex::Regex;

use pylons_rs_core::{PylonsError, PylonsResult};

/// A compiled route path: the matching regex plus its placeholder names in order.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    names: Vec<String>,
}

impl CompiledPattern {
    /// Returns the compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the placeholder names in order of appearance.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One piece of a parsed route path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    /// `:name`, matching a single path segment.
    Dynamic(&'a str),
    /// `*name`, matching the remainder of the path.
    Star(&'a str),
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the length of the identifier at the start of `s` (0 if none).
fn ident_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if is_ident_start(c) => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(s.len(), |(i, _)| i)
}

/// Rewrites `{name}` placeholders into `:name`.
///
/// ```
/// use pylons_rs_http::urls::pattern::normalize_pattern;
///
/// assert_eq!(
///     normalize_pattern("/abc/{def}/:ghi/jkl/{mno}{/:p"),
///     "/abc/:def/:ghi/jkl/:mno{/:p"
/// );
/// ```
pub fn normalize_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut remaining = pattern;

    while let Some(start) = remaining.find('{') {
        out.push_str(&remaining[..start]);
        let after = &remaining[start + 1..];
        let len = ident_len(after);
        if len > 0 && after[len..].starts_with('}') {
            out.push(':');
            out.push_str(&after[..len]);
            remaining = &after[len + 1..];
        } else {
            out.push('{');
            remaining = after;
        }
    }

    out.push_str(remaining);
    out
}

/// Splits a normalized route path into literal and placeholder segments.
fn parse_segments(path: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut idx = 0;

    while idx < path.len() {
        let c = path[idx..].chars().next().unwrap_or_default();
        if c == ':' || c == '*' {
            let len = ident_len(&path[idx + 1..]);
            if len > 0 {
                if literal_start < idx {
                    segments.push(Segment::Literal(&path[literal_start..idx]));
                }
                let name = &path[idx + 1..idx + 1 + len];
                segments.push(if c == ':' {
                    Segment::Dynamic(name)
                } else {
                    Segment::Star(name)
                });
                idx += 1 + len;
                literal_start = idx;
                continue;
            }
        }
        idx += c.len_utf8();
    }

    if literal_start < path.len() {
        segments.push(Segment::Literal(&path[literal_start..]));
    }
    segments
}

/// Returns the placeholder names of a route path, in order.
pub fn placeholder_names(pattern: &str) -> Vec<String> {
    parse_segments(&normalize_pattern(pattern))
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Dynamic(name) | Segment::Star(name) => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Returns `true` if the pattern has a placeholder called `name`, in either spelling.
///
/// ```
/// use pylons_rs_http::urls::pattern::has_placeholder;
///
/// assert!(has_placeholder("/{action}", "action"));
/// assert!(has_placeholder("/:action/:id", "action"));
/// assert!(!has_placeholder("/:actions", "action"));
/// ```
pub fn has_placeholder(pattern: &str, name: &str) -> bool {
    placeholder_names(pattern).iter().any(|n| n == name)
}

/// Compiles a route path into an anchored regex.
///
/// Leading slashes are not significant: both the route path and the request
/// path are matched without them.
///
/// # Errors
///
/// Returns a configuration error if the resulting regex is invalid (for
/// example when a placeholder name is used twice).
pub fn compile_pattern(pattern: &str) -> PylonsResult<CompiledPattern> {
    let normalized = normalize_pattern(pattern);
    let mut regex_str = String::from("^");
    let mut names = Vec::new();

    for segment in parse_segments(normalized.trim_start_matches('/')) {
        match segment {
            Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
            Segment::Dynamic(name) => {
                write!(regex_str, "(?P<{name}>[^/]+)").ok();
                names.push(name.to_string());
            }
            Segment::Star(name) => {
                write!(regex_str, "(?P<{name}>.*)").ok();
                names.push(name.to_string());
            }
        }
    }
    regex_str.push('$');

    let regex = Regex::new(&regex_str).map_err(|e| {
        PylonsError::ConfigurationError(format!("Invalid route pattern '{pattern}': {e}"))
    })?;
    Ok(CompiledPattern { regex, names })
}

/// Substitutes values into a route path, producing a URL with a leading `/`.
///
/// # Errors
///
/// Returns a configuration error if a placeholder has no value.
pub fn substitute<S: BuildHasher>(
    pattern: &str,
    kwargs: &HashMap<&str, &str, S>,
) -> PylonsResult<String> {
    let normalized = normalize_pattern(pattern);
    let mut url = String::from("/");

    for segment in parse_segments(normalized.trim_start_matches('/')) {
        match segment {
            Segment::Literal(text) => url.push_str(text),
            Segment::Dynamic(name) | Segment::Star(name) => {
                let value = kwargs.get(name).ok_or_else(|| {
                    PylonsError::ConfigurationError(format!(
                        "Missing value for '{name}' when generating '{pattern}'"
                    ))
                })?;
                url.push_str(value);
            }
        }
    }
    Ok(url)
}
