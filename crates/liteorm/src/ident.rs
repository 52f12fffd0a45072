//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a table or column name, optionally dotted (`main.users`).
//! [`Ident::parse`] accepts parts that are bare (`[A-Za-z_][A-Za-z0-9_$]*`) or already quoted
//! (`"Mixed Case"`, with `""` as the escaped quote). Rendering always quotes every
//! part, so reserved words (`order`, `group`) and mixed case survive unchanged.
//!
//! # Example
//! ```
//! use liteorm::Ident;
//!
//! let t = Ident::parse("main.users")?;
//! assert_eq!(t.to_sql(), r#""main"."users""#);
//! # Ok::<(), liteorm::OrmError>(())
//! ```

use crate::error::{OrmError, OrmResult};

/// A SQL identifier (column, table, or schema-qualified name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `main.users`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `main."UserTable"`
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::render("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(OrmError::render("Identifier cannot contain NUL character"));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(OrmError::render(format!(
                                "Trailing '.' in identifier {s:?}"
                            )));
                        }
                    }
                    Some(c) => {
                        return Err(OrmError::render(format!(
                            "Expected '.' between identifier parts, got '{c}' in {s:?}"
                        )));
                    }
                    None => break,
                }
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => {
                            return Err(OrmError::render(format!(
                                "Unclosed quoted identifier {s:?}"
                            )));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(OrmError::render("Empty quoted identifier"));
                }
                parts.push(name);
                continue;
            }

            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                let valid = if name.is_empty() {
                    c == '_' || c.is_ascii_alphabetic()
                } else {
                    c == '_' || c == '$' || c.is_ascii_alphanumeric()
                };
                if !valid {
                    return Err(OrmError::render(format!(
                        "Invalid character '{c}' in identifier {s:?}"
                    )));
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(OrmError::render(format!(
                    "Empty identifier segment in {s:?}"
                )));
            }
            parts.push(name);
        }

        Ok(Self { parts })
    }

    /// The unquoted name of the last part (the column or table itself).
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render the identifier as SQL, quoting every part.
    pub fn to_sql(&self) -> String {
        let cap = self.parts.iter().map(|p| p.len() + 3).sum();
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('"');
            for ch in part.chars() {
                if ch == '"' {
                    out.push_str("\"\"");
                } else {
                    out.push(ch);
                }
            }
            out.push('"');
        }
    }
}

/// Quote a column or table name.
///
/// `*` is passed through unquoted so it can stand for "all columns". Names containing
/// `.` or starting with `"` go through [`Ident::parse`]; anything else is one part,
/// taken verbatim, so engine column names like `Full Name` or `user-id` round-trip.
pub(crate) fn quote(name: &str) -> OrmResult<String> {
    if name == "*" {
        return Ok("*".to_string());
    }
    if name.contains('.') || name.starts_with('"') {
        return Ident::parse(name).map(|ident| ident.to_sql());
    }
    if name.is_empty() {
        return Err(OrmError::render("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(OrmError::render("Identifier cannot contain NUL character"));
    }
    let ident = Ident {
        parts: vec![name.to_string()],
    };
    Ok(ident.to_sql())
}

/// Quote a list of names and join them with `", "`.
pub(crate) fn quote_list<S: AsRef<str>>(names: &[S]) -> OrmResult<String> {
    let quoted = names
        .iter()
        .map(|n| quote(n.as_ref()))
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(quoted.join(", "))
}
