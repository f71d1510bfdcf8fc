//! Quoted SQL identifiers.
//!
//! Column names cannot be bound as parameters, so they are written into the
//! statement text. They are always rendered double-quoted (preserving case and
//! keeping reserved words such as `"user"` usable), with any embedded `"`
//! escaped as `""`.

use crate::error::{Error, Result};

/// Render `name` as a double-quoted identifier.
///
/// # Example
/// ```
/// use buddyread::ident::quoted;
///
/// assert_eq!(quoted("first_name").unwrap(), r#""first_name""#);
/// ```
pub fn quoted(name: &str) -> Result<String> {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name)?;
    Ok(out)
}

pub(crate) fn write_quoted(out: &mut String, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("Empty quoted identifier"));
    }
    if name.contains('\0') {
        return Err(Error::invalid_argument(
            "Identifier cannot contain NUL character",
        ));
    }

    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
    Ok(())
}
