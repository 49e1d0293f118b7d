//! Escaping of values embedded into generated statements.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static PICTOGRAPHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F700}-\x{1F77F}",
        r"\x{1F780}-\x{1F7FF}",
        r"\x{1F800}-\x{1F8FF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{1FA00}-\x{1FA6F}",
        r"\x{1FA70}-\x{1FAFF}",
        r"\x{2600}-\x{26FF}",
        r"\x{2700}-\x{27BF}",
        r"\x{20D0}-\x{20FF}",
        "]+"
    ))
    .expect("pictograph pattern is valid")
});

/// Removes emoji and other pictographic code points.
#[must_use]
pub fn strip_pictographs(s: &str) -> Cow<'_, str> {
    PICTOGRAPHS.replace_all(s, "")
}

/// Escapes text for a MySQL single-quoted literal: pictographs are
/// stripped, and backslashes and both quote characters get a backslash.
#[must_use]
pub fn escape_mysql(s: &str) -> String {
    let stripped = strip_pictographs(s);
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        if matches!(c, '\\' | '\'' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes text for a SQLite single-quoted literal: pictographs are
/// stripped and single quotes are doubled.
#[must_use]
pub fn escape_sqlite(s: &str) -> String {
    strip_pictographs(s).replace('\'', "''")
}
