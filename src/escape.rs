//! Reserved-word escaping for dotted-name segments.
//!
//! The bindings expose `Gtk.Widget.print` as `Gtk.Widget.print_` and so on;
//! every segment that collides with a keyword gets a trailing underscore.

use std::borrow::Cow;

/// Keywords of the binding language, plus the names that were keywords in
/// older releases and are still escaped for compatibility.
const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "exec", "finally", "for", "from",
    "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "print",
    "raise", "return", "try", "while", "with", "yield",
];

pub fn is_reserved(segment: &str) -> bool {
    RESERVED_WORDS.contains(&segment)
}

/// Escape a single name segment.
pub fn escape_identifier(segment: &str) -> Cow<'_, str> {
    if is_reserved(segment) {
        Cow::Owned(format!("{segment}_"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Escape each `.`-separated segment of a dotted name.
pub fn escape_dotted(name: &str) -> String {
    name.split('.')
        .map(escape_identifier)
        .collect::<Vec<_>>()
        .join(".")
}
