//! Recovery of structured values from raw oracle text.
//!
//! Candidates are tried in priority order, and the first one that parses
//! (and, for [`normalize_as`], conforms to the expected shape) wins:
//!
//! 1. **Strict**: the whole text, trimmed.
//! 2. **Span**: the first brace-delimited object span inside the text.
//! 3. **Repaired**: the span (or, without one, the whole text) after
//!    single-quote and trailing-comma repairs.
//!
//! Nothing here panics or returns an error on malformed input; `None` means
//! "the oracle produced unusable output" and the caller picks its own default.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::shape::ExpectedShape;

/// `'key':` → `"key":`
static SINGLE_QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^'\n]*)'(\s*):").unwrap());

/// `: 'value'` → `: "value"`
static SINGLE_QUOTED_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(\s*)'([^'\n]*)'").unwrap());

/// `['a', 'b']` items → `["a", "b"]`
static SINGLE_QUOTED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\[,]\s*)'([^'\n]*)'(\s*[,\]])").unwrap());

/// `,}` / `, ]` → `}` / `]`
static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Which recovery step produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Strict,
    Span,
    Repaired,
}

/// Recover any structured value from `raw`.
pub fn normalize(raw: &str) -> Option<Value> {
    recover(raw, |_| true).map(|(v, _)| v)
}

/// Recover a structured value from `raw` that conforms to `shape`.
///
/// A candidate that parses but does not conform is skipped, so prose that
/// happens to be valid JSON (a bare number, a quoted string) does not hide
/// an object further into the text.
pub fn normalize_as(raw: &str, shape: &ExpectedShape) -> Option<Value> {
    let recovered = recover(raw, |v| shape.conforms(v));
    match &recovered {
        Some((_, how)) => debug!(shape = shape.name(), recovery = ?how, "oracle output recovered"),
        None => warn!(
            shape = shape.name(),
            violations = ?rejection(raw, shape),
            preview = %preview(raw),
            "oracle output unusable after repair"
        ),
    }
    recovered.map(|(v, _)| v)
}

/// Why `raw` yields nothing for `shape`: the shape violations of whatever
/// value plain recovery finds, or a single note when no value parses.
pub fn rejection(raw: &str, shape: &ExpectedShape) -> Vec<String> {
    match normalize(raw) {
        Some(value) => shape.violations(&value),
        None => vec!["no JSON value could be recovered".to_string()],
    }
}

/// Like [`normalize`], but also reports which step succeeded.
pub fn recover(raw: &str, accept: impl Fn(&Value) -> bool) -> Option<(Value, Recovery)> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let parse = |candidate: &str| -> Option<Value> {
        serde_json::from_str::<Value>(candidate).ok().filter(|v| accept(v))
    };

    // ── Step 1: strict parse of the whole text ────────────────────────────
    if let Some(v) = parse(text) {
        return Some((v, Recovery::Strict));
    }

    // ── Step 2: first object-like span ────────────────────────────────────
    let span = object_span(text);
    if let Some(v) = span.and_then(parse) {
        return Some((v, Recovery::Span));
    }

    // ── Step 3: textual repairs, then retry ───────────────────────────────
    let base = span.unwrap_or(text);
    let repaired = repair(base);
    if let Some(v) = parse(&repaired) {
        return Some((v, Recovery::Repaired));
    }
    if span.is_some() {
        // The span may have been cut short by a brace inside a quoted value;
        // the repaired whole text gets one more chance.
        let repaired_whole = repair(text);
        if let Some(v) = object_span(&repaired_whole).and_then(parse) {
            return Some((v, Recovery::Repaired));
        }
    }

    // ── Step 4: give up ───────────────────────────────────────────────────
    None
}

/// Apply the fixed repair set: single-quoted keys, values, and array items
/// become double-quoted; trailing commas before `}` or `]` are removed.
pub fn repair(text: &str) -> String {
    let s = SINGLE_QUOTED_KEY.replace_all(text, "\"$1\"$2:");
    let s = SINGLE_QUOTED_VALUE.replace_all(&s, ":$1\"$2\"");
    // Applied twice because adjacent items share the separating comma.
    let s = SINGLE_QUOTED_ITEM.replace_all(&s, "$1\"$2\"$3");
    let s = SINGLE_QUOTED_ITEM.replace_all(&s, "$1\"$2\"$3");
    TRAILING_COMMA.replace_all(&s, "$1").into_owned()
}

/// The first `{ ... }` span, balanced with respect to braces outside string
/// literals. If the braces never balance (truncated output), the span runs
/// from the first `{` to the last `}`.
pub fn object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' => quote = Some('"'),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn preview(raw: &str) -> String {
    raw.chars().take(100).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
