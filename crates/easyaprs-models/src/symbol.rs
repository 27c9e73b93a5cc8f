//! APRS symbol selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// An APRS symbol: a table selector (`/` primary, `\` alternate, or an
/// overlay character) followed by a symbol code.
///
/// # Examples
///
/// ```
/// use easyaprs_models::Symbol;
///
/// let sym = Symbol::parse("/", "r").unwrap();
/// assert_eq!(sym.to_string(), "/r");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    /// Symbol table selector character.
    pub table: char,
    /// Symbol code character.
    pub code: char,
}

impl Symbol {
    /// Create a symbol from two already-validated characters.
    pub fn new(table: char, code: char) -> Self {
        Self { table, code }
    }

    /// Build a symbol from configuration strings, each of which must be
    /// exactly one printable ASCII character.
    pub fn parse(table: &str, code: &str) -> Result<Self, ModelError> {
        Ok(Self {
            table: Self::single_char(table)?,
            code: Self::single_char(code)?,
        })
    }

    fn single_char(s: &str) -> Result<char, ModelError> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_graphic() => Ok(c),
            (Some(_), None) => Err(ModelError::InvalidSymbol {
                value: s.to_string(),
                reason: "must be a printable ASCII character".to_string(),
            }),
            _ => Err(ModelError::InvalidSymbol {
                value: s.to_string(),
                reason: "must be exactly one character".to_string(),
            }),
        }
    }
}

impl Default for Symbol {
    /// `/r`, the primary-table repeater symbol.
    fn default() -> Self {
        Self::new('/', 'r')
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table, self.code)
    }
}
