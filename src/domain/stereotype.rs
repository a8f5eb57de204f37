//! Functional model stereotypes and element classification.

use std::fmt;

use itertools::Itertools;

pub const ST_FM: &str = "HL7-FM";
pub const ST_FM_PROFILE_DEFINITION: &str = "HL7-FM-ProfileDefinition";
pub const ST_FM_PROFILE: &str = "HL7-FM-Profile";
pub const ST_COMPILER_INSTRUCTION: &str = "CI";
pub const ST_SECTION: &str = "Section";
pub const ST_HEADER: &str = "Header";
pub const ST_FUNCTION: &str = "Function";
pub const ST_CRITERION: &str = "Criteria";
pub const ST_CONSEQUENCE_LINK: &str = "ConsequenceLink";
pub const ST_SEE_ALSO: &str = "SeeAlso";

/// The three plain catalog entry variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Section,
    /// Header or Function
    Function,
    Criterion,
}

impl EntryKind {
    pub fn from_stereotype(stereotype: &str) -> Option<Self> {
        match stereotype {
            ST_SECTION => Some(EntryKind::Section),
            ST_HEADER | ST_FUNCTION => Some(EntryKind::Function),
            ST_CRITERION => Some(EntryKind::Criterion),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Section => write!(f, "Section"),
            EntryKind::Function => write!(f, "Function"),
            EntryKind::Criterion => write!(f, "Criterion"),
        }
    }
}

/// Outcome of classifying a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Plain(EntryKind),
    /// Compiler instruction overriding a base element of the given kind
    Override(EntryKind),
}

impl Classification {
    pub fn kind(&self) -> EntryKind {
        match self {
            Classification::Plain(kind) | Classification::Override(kind) => *kind,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, Classification::Override(_))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Plain(kind) => write!(f, "{kind}"),
            Classification::Override(kind) => write!(f, "{kind} (CI)"),
        }
    }
}

pub fn is_compiler_instruction(stereotype: &str) -> bool {
    stereotype == ST_COMPILER_INSTRUCTION
}

/// Classify an element from its stereotype and, for compiler instructions,
/// the stereotype of its generalization base.
///
/// Returns `None` for elements that are not catalog entries, including
/// compiler instructions whose base is not a Section, Header, Function or
/// Criterion.
pub fn classify(stereotype: &str, base_stereotype: Option<&str>) -> Option<Classification> {
    if is_compiler_instruction(stereotype) {
        base_stereotype
            .and_then(EntryKind::from_stereotype)
            .map(Classification::Override)
    } else {
        EntryKind::from_stereotype(stereotype).map(Classification::Plain)
    }
}

/// Join element names into a display path.
///
/// `upward` yields `(name, stereotype)` pairs from the element towards the
/// model root. Walking stops at the functional-model root element, which is
/// not part of the path.
pub fn join_element_path<'a>(upward: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut names: Vec<&str> = upward
        .into_iter()
        .take_while(|(_, stereotype)| *stereotype != ST_FM)
        .map(|(name, _)| name)
        .collect();
    names.reverse();
    names.into_iter().join(" / ")
}
