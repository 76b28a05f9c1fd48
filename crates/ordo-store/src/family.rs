//! Sibling families stored by this crate
//!
//! Both families hang off `quotes` and run the identical engine; the family
//! only picks the table.

use std::fmt;
use std::str::FromStr;

use ordo_core::errors::OrdoError;

pub const PARENT_TABLE: &str = "quotes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    QuoteLines,
    QuoteSections,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::QuoteLines, Family::QuoteSections];

    /// Table holding this family's rows; always a compile-time constant
    pub fn table(&self) -> &'static str {
        match self {
            Family::QuoteLines => "quote_lines",
            Family::QuoteSections => "quote_sections",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Family::QuoteLines => "lines",
            Family::QuoteSections => "sections",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = OrdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|f| f.name() == s || f.table() == s)
            .ok_or_else(|| OrdoError::Config {
                message: format!("unknown family '{}' (expected lines or sections)", s),
            })
    }
}
