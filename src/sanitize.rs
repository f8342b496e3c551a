//! Full-width punctuation cleanup for bundler output.
//!
//! Sources written with a CJK input method tend to pick up full-width
//! punctuation in places where JavaScript needs ASCII. The bundle is
//! normalized with a fixed table; this is not a general Unicode mapping.

use std::borrow::Cow;

/// Full-width (or typographic) character → ASCII replacement.
pub const PUNCTUATION: [(char, char); 12] = [
    ('，', ','),
    ('；', ';'),
    ('（', '('),
    ('）', ')'),
    ('【', '['),
    ('】', ']'),
    ('：', ':'),
    ('。', '.'),
    ('“', '"'),
    ('”', '"'),
    ('‘', '\''),
    ('’', '\''),
];

#[inline]
fn ascii_for(c: char) -> Option<char> {
    PUNCTUATION
        .iter()
        .find_map(|&(from, to)| (from == c).then_some(to))
}

/// Replace every character of [`PUNCTUATION`] with its ASCII counterpart.
///
/// Returns the number of replaced characters alongside the text. Borrows
/// the input when nothing needs replacing.
pub fn sanitize(code: &str) -> (Cow<'_, str>, usize) {
    if !code.chars().any(|c| ascii_for(c).is_some()) {
        return (Cow::Borrowed(code), 0);
    }

    let mut replaced = 0;
    let cleaned = code
        .chars()
        .map(|c| match ascii_for(c) {
            Some(ascii) => {
                replaced += 1;
                ascii
            }
            None => c,
        })
        .collect();

    (Cow::Owned(cleaned), replaced)
}
