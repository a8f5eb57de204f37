//! Composite criterion identifiers: `"<FunctionID>#<CriterionID>[ suffix]"`.

use std::fmt;

use crate::domain::error::{DomainError, DomainResult};

const SEPARATOR: char = '#';

/// Parsed criterion name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionName {
    pub function_id: String,
    pub criterion_id: u32,
    /// Text after the first space following the ordinal, if any
    pub suffix: Option<String>,
}

impl CriterionName {
    pub fn parse(name: &str) -> DomainResult<Self> {
        let (function_id, rest) = name
            .split_once(SEPARATOR)
            .ok_or_else(|| DomainError::MalformedIdentifier(name.to_string()))?;
        let (ordinal, suffix) = match rest.split_once(' ') {
            Some((ordinal, suffix)) => (ordinal, Some(suffix.to_string())),
            None => (rest, None),
        };
        // u32::from_str alone would accept a leading '+'
        let criterion_id = Some(ordinal)
            .filter(|o| !o.is_empty() && o.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|o| o.parse::<u32>().ok())
            .ok_or_else(|| DomainError::MalformedOrdinal {
                name: name.to_string(),
                ordinal: ordinal.to_string(),
            })?;
        Ok(Self {
            function_id: function_id.to_string(),
            criterion_id,
            suffix,
        })
    }

    /// Function part of `name`, without parsing the ordinal.
    pub fn function_id_of(name: &str) -> DomainResult<&str> {
        name.split_once(SEPARATOR)
            .map(|(function_id, _)| function_id)
            .ok_or_else(|| DomainError::MalformedIdentifier(name.to_string()))
    }

    /// Rewrite `name` with a new ordinal: `"<FunctionID>#<NN>"`.
    ///
    /// The suffix is not carried over.
    pub fn with_ordinal(name: &str, criterion_id: u32) -> DomainResult<String> {
        let function_id = Self::function_id_of(name)?;
        Ok(format!("{function_id}{SEPARATOR}{criterion_id:02}"))
    }
}

impl fmt::Display for CriterionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:02}", self.function_id, SEPARATOR, self.criterion_id)?;
        if let Some(suffix) = &self.suffix {
            write!(f, " {suffix}")?;
        }
        Ok(())
    }
}
