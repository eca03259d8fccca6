use super::parsers::{is_identifier_byte, is_identifier_start};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

impl State {
    pub(super) fn describe(self) -> &'static str {
        match self {
            State::Normal | State::LineComment => "",
            State::SingleQuoted => "single-quoted string",
            State::DoubleQuoted => "double-quoted string",
            State::Backticked => "backtick-quoted identifier",
            State::BlockComment => "block comment",
        }
    }
}

/// Scan a run of identifier bytes starting at `start`.
pub(super) fn scan_word(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    while idx < bytes.len() && is_identifier_byte(bytes[idx]) {
        idx += 1;
    }
    if idx == start {
        None
    } else {
        std::str::from_utf8(&bytes[start..idx])
            .ok()
            .map(|word| (idx, word))
    }
}

/// Scan a backtick-quoted name whose opening backtick is at `start`.
///
/// Returns the index just past the closing backtick and the unescaped name.
pub(super) fn scan_backticked(bytes: &[u8], start: usize) -> Option<(usize, String)> {
    let mut idx = start + 1;
    let mut name = Vec::new();
    while idx < bytes.len() {
        if bytes[idx] == b'`' {
            if bytes.get(idx + 1) == Some(&b'`') {
                name.push(b'`');
                idx += 2;
                continue;
            }
            return String::from_utf8(name).ok().map(|name| (idx + 1, name));
        }
        name.push(bytes[idx]);
        idx += 1;
    }
    None
}

/// Scan the dotted procedure name following `CALL`, e.g. `db.labels`.
///
/// Returns `None` when `CALL` opens a subquery (`CALL {` or `CALL (x) {`).
pub(super) fn scan_procedure_name(bytes: &[u8], start: usize) -> Option<(usize, String)> {
    let mut idx = start;
    while bytes.get(idx).is_some_and(u8::is_ascii_whitespace) {
        idx += 1;
    }
    let mut segments = Vec::new();
    loop {
        let (end, segment) = match bytes.get(idx) {
            Some(b'`') => scan_backticked(bytes, idx)?,
            Some(&b) if is_identifier_start(b) => {
                let (end, word) = scan_word(bytes, idx)?;
                (end, word.to_string())
            }
            _ => break,
        };
        segments.push(segment);
        idx = end;
        if bytes.get(idx) != Some(&b'.') {
            break;
        }
        idx += 1;
    }
    if segments.is_empty() {
        None
    } else {
        Some((idx, segments.join(".")))
    }
}

/// Items of a `RETURN` projection, collected while the scan moves past it.
#[derive(Debug, Default)]
pub(super) struct Projection {
    items: Vec<String>,
    item_start: usize,
    alias: Option<String>,
    pub(super) expecting_alias: bool,
    wildcard: bool,
}

impl Projection {
    pub(super) fn starting_at(start: usize) -> Self {
        Self {
            item_start: start,
            ..Self::default()
        }
    }

    /// Whether nothing but whitespace has been seen since the projection began.
    pub(super) fn is_blank_before(&self, text: &str, idx: usize) -> bool {
        self.items.is_empty() && text[self.item_start..idx].trim().is_empty()
    }

    /// `RETURN DISTINCT`: the first item starts after the modifier.
    pub(super) fn restart_at(&mut self, start: usize) {
        self.item_start = start;
    }

    pub(super) fn set_alias(&mut self, alias: String) {
        self.alias = Some(alias);
        self.expecting_alias = false;
    }

    /// Close the item that ends at `end` and start the next one after it.
    pub(super) fn close_item(&mut self, text: &str, end: usize) {
        let expression = text[self.item_start..end].trim();
        match self.alias.take() {
            Some(alias) => self.items.push(alias),
            None if expression == "*" => self.wildcard = true,
            None if !expression.is_empty() => self.items.push(expression.to_string()),
            None => {}
        }
        self.expecting_alias = false;
        self.item_start = end + 1;
    }

    /// Column names in projection order; `None` for `RETURN *`.
    pub(super) fn finish(mut self, text: &str, end: usize) -> Option<Vec<String>> {
        self.close_item(text, end);
        if self.wildcard || self.items.is_empty() {
            None
        } else {
            Some(self.items)
        }
    }
}
