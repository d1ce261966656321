//! In-band routing prefix of text frames.
//!
//! A text frame may start with `<delimiter><path><delimiter>`, in which case
//! `<path>` addresses a logical endpoint on the connection and only what
//! follows the second delimiter is the body. The path may be empty or contain
//! anything except the delimiter itself, so only a second literal delimiter
//! ends it.

/// Splits `payload` into `(path, body)` if it carries a complete routing prefix.
///
/// Returns `None` when the payload does not start with `delimiter`, or when no
/// closing delimiter follows; the payload is then a plain body.
pub(crate) fn split_route<'a>(payload: &'a str, delimiter: &str) -> Option<(&'a str, &'a str)> {
    if delimiter.is_empty() {
        return None;
    }

    let rest = payload.strip_prefix(delimiter)?;
    let end = rest.find(delimiter)?;
    Some((&rest[..end], &rest[end + delimiter.len()..]))
}
