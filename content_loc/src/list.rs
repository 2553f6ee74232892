//! Fixed list joiners for English and the custom (Portuguese) locale.
//!
//! These do not go through a culture's function registry: callers pick the
//! variant they need by name.

/// Joins with a serial comma: `a`, `a and b`, `a, b, and c`.
#[must_use]
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    join_serial(items, "and")
}

/// Joins alternatives: `a`, `a or b`, `a or b or c`.
///
/// Unlike [`format_list`], three or more items are joined with the bare
/// conjunction and no commas.
#[must_use]
pub fn format_list_to_or<S: AsRef<str>>(items: &[S]) -> String {
    join_alternatives(items, "or")
}

/// [`format_list`] with `e` in place of `and`.
#[must_use]
pub fn format_list_custom<S: AsRef<str>>(items: &[S]) -> String {
    join_serial(items, "e")
}

/// [`format_list_to_or`] with `ou` in place of `or`.
#[must_use]
pub fn format_list_to_or_custom<S: AsRef<str>>(items: &[S]) -> String {
    join_alternatives(items, "ou")
}

fn join_serial<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_owned(),
        [first, second] => format!("{} {conjunction} {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, {conjunction} {}", head.join(", "), last.as_ref())
        }
    }
}

fn join_alternatives<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    let words: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    words.join(&format!(" {conjunction} "))
}
