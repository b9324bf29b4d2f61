use std::borrow::Cow;

/// Two-character sequence standing in for a literal newline inside markup.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// Replaces literal newlines with `\n` so the value fits on one markup line.
pub fn escape(s: &str) -> Cow<'_, str> {
    if s.contains('\n') {
        Cow::Owned(s.replace('\n', ESCAPED_NEWLINE))
    } else {
        Cow::Borrowed(s)
    }
}

/// Inverse of [`escape`]: turns every `\n` sequence back into a newline.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if s.contains(ESCAPED_NEWLINE) {
        Cow::Owned(s.replace(ESCAPED_NEWLINE, "\n"))
    } else {
        Cow::Borrowed(s)
    }
}
