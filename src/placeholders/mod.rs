mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_identifier_byte, is_identifier_start,
    is_line_comment_start, is_name_position,
};
use scanner::{Projection, State, scan_backticked, scan_procedure_name, scan_word};

use crate::error::GraphMiddlewareError;

/// Clauses that modify the graph; a read transaction refuses them.
///
/// `FOREACH` only ever wraps updating clauses.
pub const WRITE_CLAUSES: [&str; 8] = [
    "CREATE", "MERGE", "DELETE", "DETACH", "SET", "REMOVE", "DROP", "FOREACH",
];

/// Keywords that end the projection of a final `RETURN`.
const PROJECTION_END: [&str; 5] = ["ORDER", "SKIP", "OFFSET", "LIMIT", "UNION"];

/// What a lightweight pass over Cypher text found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryScan {
    /// Referenced parameter names, without the `$`, in first-use order.
    pub parameters: Vec<String>,
    /// Write clause keywords, upper-cased, in first-use order.
    pub write_clauses: Vec<String>,
    /// Procedures invoked with `CALL name(...)`, in first-use order.
    pub procedures: Vec<String>,
    /// Column names of the final top-level `RETURN`, in projection order.
    /// `None` when there is no such `RETURN` or it projects `*`.
    pub columns: Option<Vec<String>>,
}

/// Find `$param` references, write clauses, procedure calls and the returned
/// columns in Cypher text.
///
/// Warning: this is a lexical pass, not a parser. It skips string literals,
/// backtick-quoted identifiers and comments via a small state machine, and it
/// treats keywords used as property keys (`n.set`), labels (`:Set`,
/// `:Movie|Set`) or map keys (`{set: 1}`) as plain names. A returned column is
/// named by its alias, or else by the expression text as written.
///
/// # Errors
/// Returns `QueryError` for an unterminated string, identifier or block comment,
/// or for a `$` that is not followed by a parameter name.
pub fn scan_query(text: &str) -> Result<QueryScan, GraphMiddlewareError> {
    let mut scan = QueryScan::default();
    let mut state = State::Normal;
    let mut depth = 0usize;
    let mut projection: Option<Projection> = None;
    let bytes = text.as_bytes();
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => {
                    if depth == 0
                        && let Some(current) = projection.as_mut()
                        && current.expecting_alias
                    {
                        let (end, alias) = scan_backticked(bytes, idx)
                            .ok_or_else(|| malformed(State::Backticked.describe()))?;
                        current.set_alias(alias);
                        idx = end;
                        continue;
                    }
                    state = State::Backticked;
                }
                _ if is_line_comment_start(bytes, idx) => {
                    state = State::LineComment;
                    idx += 1;
                }
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    if let Some(current) = projection.as_mut() {
                        current.close_item(text, idx);
                    }
                }
                b';' if depth == 0 => {
                    if let Some(finished) = projection.take() {
                        scan.columns = finished.finish(text, idx);
                    }
                }
                b'$' => {
                    let (end, name) = if bytes.get(idx + 1) == Some(&b'`') {
                        scan_backticked(bytes, idx + 1)
                            .ok_or_else(|| malformed(State::Backticked.describe()))?
                    } else {
                        scan_word(bytes, idx + 1)
                            .map(|(end, word)| (end, word.to_string()))
                            .ok_or_else(|| dangling_parameter(idx))?
                    };
                    push_unique(&mut scan.parameters, name);
                    idx = end;
                    continue;
                }
                _ if is_identifier_start(b)
                    && (idx == 0 || !is_identifier_byte(bytes[idx - 1])) =>
                {
                    if let Some((end, word)) = scan_word(bytes, idx) {
                        if depth == 0
                            && let Some(current) = projection.as_mut()
                            && current.expecting_alias
                        {
                            current.set_alias(word.to_string());
                            idx = end;
                            continue;
                        }
                        if is_name_position(bytes, idx, end) {
                            idx = end;
                            continue;
                        }

                        let keyword = word.to_ascii_uppercase();
                        if WRITE_CLAUSES.contains(&keyword.as_str()) {
                            push_unique(&mut scan.write_clauses, keyword);
                        } else if keyword == "CALL" {
                            if let Some((next, procedure)) = scan_procedure_name(bytes, end) {
                                push_unique(&mut scan.procedures, procedure);
                                idx = next;
                                continue;
                            }
                        } else if depth == 0 {
                            match keyword.as_str() {
                                "RETURN" => projection = Some(Projection::starting_at(end)),
                                "DISTINCT" => {
                                    if let Some(current) = projection.as_mut()
                                        && current.is_blank_before(text, idx)
                                    {
                                        current.restart_at(end);
                                    }
                                }
                                "AS" => {
                                    if let Some(current) = projection.as_mut() {
                                        current.expecting_alias = true;
                                    }
                                }
                                _ if PROJECTION_END.contains(&keyword.as_str()) => {
                                    if let Some(finished) = projection.take() {
                                        scan.columns = finished.finish(text, idx);
                                    }
                                }
                                _ => {}
                            }
                        }
                        idx = end;
                        continue;
                    }
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if state == State::SingleQuoted { b'\'' } else { b'"' };
                if b == b'\\' {
                    idx += 1; // skip escaped character
                } else if b == quote {
                    state = State::Normal;
                }
            }
            State::Backticked => {
                if b == b'`' {
                    if bytes.get(idx + 1) == Some(&b'`') {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }

    match state {
        State::Normal | State::LineComment => {
            if let Some(finished) = projection.take() {
                scan.columns = finished.finish(text, text.len());
            }
            Ok(scan)
        }
        unterminated => Err(malformed(unterminated.describe())),
    }
}

fn malformed(what: &str) -> GraphMiddlewareError {
    GraphMiddlewareError::QueryError(format!("malformed query: unterminated {what}"))
}

fn dangling_parameter(idx: usize) -> GraphMiddlewareError {
    GraphMiddlewareError::QueryError(format!(
        "malformed query: `$` without a parameter name at byte {idx}"
    ))
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
