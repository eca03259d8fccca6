pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'/')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Bytes of a multi-byte UTF-8 character count as identifier bytes, so
/// `$état` and `n.réset` stay single names.
pub(super) fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii()
}

pub(super) fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii()
}

/// Previous byte that is not whitespace, if any.
pub(super) fn previous_significant(bytes: &[u8], idx: usize) -> Option<u8> {
    bytes[..idx]
        .iter()
        .rev()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}

/// Next byte that is not whitespace, if any.
pub(super) fn next_significant(bytes: &[u8], idx: usize) -> Option<u8> {
    bytes[idx..]
        .iter()
        .copied()
        .find(|b| !b.is_ascii_whitespace())
}

/// Whether the word spanning `start..end` is used as a name rather than a
/// clause: a property key (`n.set`), a label or relationship type, including
/// label expressions (`:Movie|Set`, `:!Set`), or a map key (`{set: 1}`).
pub(super) fn is_name_position(bytes: &[u8], start: usize, end: usize) -> bool {
    matches!(
        previous_significant(bytes, start),
        Some(b'.' | b':' | b'|' | b'&' | b'!')
    ) || next_significant(bytes, end) == Some(b':')
}
