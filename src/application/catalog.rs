//! Catalog entries: typed views of functional-model elements.
//!
//! An entry holds only element ids and its display path; every read goes to
//! the store and every write is persisted immediately. Compiler-instruction
//! overrides read the instruction element first and fall back to the base
//! element; writes equal to the base value clear the instruction-side field.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::domain::identifier::CriterionName;
use crate::domain::notes::{
    unpack_with_cap, NoteLayout, DEFAULT_TAG_CAP, TAG_ACTORS, TAG_DESCRIPTION, TAG_EXAMPLE,
    TAG_OVERVIEW, TAG_STATEMENT,
};
use crate::domain::overlay::{collapse, effective, effective_text};
use crate::domain::stereotype::{classify, is_compiler_instruction, Classification, EntryKind};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::traits::ModelStore;

pub const TV_ROW: &str = "Row";
pub const TV_CONDITIONAL: &str = "Conditional";
pub const TV_DEPENDENT: &str = "Dependent";
pub const TV_OPTIONALITY: &str = "Optionality";

const FLAG_YES: &str = "Y";
const FLAG_NO: &str = "N";

fn flag_str(value: bool) -> &'static str {
    if value {
        FLAG_YES
    } else {
        FLAG_NO
    }
}

fn parse_row(id: &str, raw: &str) -> DomainResult<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DomainError::InvalidTaggedValue {
            id: id.to_string(),
            tag: TV_ROW.to_string(),
            value: raw.to_string(),
        })
}

fn read_note(store: &dyn ModelStore, id: &str, tag: &str, tag_cap: usize) -> DomainResult<String> {
    let notes = &store.object(id)?.notes;
    Ok(unpack_with_cap(notes, tag_cap).get(tag).to_string())
}

fn write_and_persist(
    store: &mut dyn ModelStore,
    id: &str,
    write: impl FnOnce(&mut dyn ModelStore) -> DomainResult<()>,
) -> DomainResult<()> {
    write(&mut *store)?;
    store.persist(id)
}

/// Elements whose semantic text lives in packed notes, identified by alias.
pub trait NoteBacked {
    const LAYOUT: NoteLayout;

    fn element_id(&self) -> &str;

    fn tag_cap(&self) -> usize;

    fn name(&self, store: &dyn ModelStore) -> DomainResult<String> {
        Ok(store.object(self.element_id())?.name.clone())
    }

    fn set_name(&self, store: &mut dyn ModelStore, name: &str) -> DomainResult<()> {
        let id = self.element_id();
        write_and_persist(store, id, |s| s.set_name(id, name))
    }

    /// Section or function id, stored as the element alias.
    fn identifier(&self, store: &dyn ModelStore) -> DomainResult<String> {
        Ok(store.object(self.element_id())?.alias.clone())
    }

    fn set_identifier(&self, store: &mut dyn ModelStore, identifier: &str) -> DomainResult<()> {
        let id = self.element_id();
        write_and_persist(store, id, |s| s.set_alias(id, identifier))
    }

    fn note(&self, store: &dyn ModelStore, tag: &str) -> DomainResult<String> {
        read_note(store, self.element_id(), tag, Self::LAYOUT.effective_cap(self.tag_cap()))
    }

    /// Rewrite the whole packed note with `tag` replaced.
    fn set_note(&self, store: &mut dyn ModelStore, tag: &str, value: &str) -> DomainResult<()> {
        let id = self.element_id();
        let cap = Self::LAYOUT.effective_cap(self.tag_cap());
        let mut fields = unpack_with_cap(&store.object(id)?.notes, cap);
        fields.set(tag, value);
        let notes = Self::LAYOUT.pack_all(&fields);
        write_and_persist(store, id, |s| s.set_notes(id, &notes))
    }
}

/// Section: `$OV$overview$EX$example$AC$actors`, section id in the alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub path: String,
    tag_cap: usize,
}

impl Section {
    pub fn new(id: impl Into<String>, path: impl Into<String>, tag_cap: usize) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            tag_cap,
        }
    }

    pub fn overview(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_OVERVIEW)
    }

    pub fn set_overview(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_OVERVIEW, value)
    }

    pub fn example(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_EXAMPLE)
    }

    pub fn set_example(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_EXAMPLE, value)
    }

    pub fn actors(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_ACTORS)
    }

    pub fn set_actors(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_ACTORS, value)
    }
}

impl NoteBacked for Section {
    const LAYOUT: NoteLayout = NoteLayout::SECTION;

    fn element_id(&self) -> &str {
        &self.id
    }

    fn tag_cap(&self) -> usize {
        self.tag_cap
    }
}

/// Header or Function: `$ST$statement$DE$description$EX$example`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub id: String,
    pub path: String,
    tag_cap: usize,
}

impl Function {
    pub fn new(id: impl Into<String>, path: impl Into<String>, tag_cap: usize) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            tag_cap,
        }
    }

    pub fn statement(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_STATEMENT)
    }

    pub fn set_statement(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_STATEMENT, value)
    }

    pub fn description(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_DESCRIPTION)
    }

    pub fn set_description(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_DESCRIPTION, value)
    }

    pub fn example(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_EXAMPLE)
    }

    pub fn set_example(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_EXAMPLE, value)
    }
}

impl NoteBacked for Function {
    const LAYOUT: NoteLayout = NoteLayout::FUNCTION;

    fn element_id(&self) -> &str {
        &self.id
    }

    fn tag_cap(&self) -> usize {
        self.tag_cap
    }
}

/// Conformance criterion named `"<FunctionID>#<CriterionID>[ suffix]"`.
///
/// The criterion text is the raw note; the remaining fields are tagged values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    pub id: String,
    pub path: String,
}

impl Criterion {
    pub fn new(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn name(&self, store: &dyn ModelStore) -> DomainResult<String> {
        Ok(store.object(&self.id)?.name.clone())
    }

    pub fn set_name(&self, store: &mut dyn ModelStore, name: &str) -> DomainResult<()> {
        write_and_persist(store, &self.id, |s| s.set_name(&self.id, name))
    }

    pub fn function_id(&self, store: &dyn ModelStore) -> DomainResult<String> {
        criterion_function_id(store, &self.id)
    }

    pub fn criterion_id(&self, store: &dyn ModelStore) -> DomainResult<u32> {
        criterion_ordinal(store, &self.id)
    }

    pub fn set_criterion_id(&self, store: &mut dyn ModelStore, criterion_id: u32) -> DomainResult<()> {
        rewrite_ordinal(store, &self.id, criterion_id)
    }

    pub fn text(&self, store: &dyn ModelStore) -> DomainResult<String> {
        Ok(store.object(&self.id)?.notes.clone())
    }

    pub fn set_text(&self, store: &mut dyn ModelStore, text: &str) -> DomainResult<()> {
        write_and_persist(store, &self.id, |s| s.set_notes(&self.id, text))
    }

    pub fn row(&self, store: &dyn ModelStore) -> DomainResult<u32> {
        parse_row(&self.id, &store.tagged_value_or(&self.id, TV_ROW, "0")?)
    }

    pub fn set_row(&self, store: &mut dyn ModelStore, row: u32) -> DomainResult<()> {
        let value = row.to_string();
        write_and_persist(store, &self.id, |s| s.set_tagged_value(&self.id, TV_ROW, &value))
    }

    pub fn conditional(&self, store: &dyn ModelStore) -> DomainResult<bool> {
        Ok(store.tagged_value_or(&self.id, TV_CONDITIONAL, FLAG_NO)? == FLAG_YES)
    }

    pub fn set_conditional(&self, store: &mut dyn ModelStore, value: bool) -> DomainResult<()> {
        write_and_persist(store, &self.id, |s| {
            s.set_tagged_value(&self.id, TV_CONDITIONAL, flag_str(value))
        })
    }

    pub fn dependent(&self, store: &dyn ModelStore) -> DomainResult<bool> {
        Ok(store.tagged_value_or(&self.id, TV_DEPENDENT, FLAG_NO)? == FLAG_YES)
    }

    pub fn set_dependent(&self, store: &mut dyn ModelStore, value: bool) -> DomainResult<()> {
        write_and_persist(store, &self.id, |s| {
            s.set_tagged_value(&self.id, TV_DEPENDENT, flag_str(value))
        })
    }

    pub fn optionality(&self, store: &dyn ModelStore) -> DomainResult<String> {
        store.tagged_value_or(&self.id, TV_OPTIONALITY, "")
    }

    pub fn set_optionality(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        write_and_persist(store, &self.id, |s| s.set_tagged_value(&self.id, TV_OPTIONALITY, value))
    }
}

fn criterion_function_id(store: &dyn ModelStore, id: &str) -> DomainResult<String> {
    let name = &store.object(id)?.name;
    CriterionName::function_id_of(name).map(str::to_string)
}

fn criterion_ordinal(store: &dyn ModelStore, id: &str) -> DomainResult<u32> {
    Ok(CriterionName::parse(&store.object(id)?.name)?.criterion_id)
}

fn rewrite_ordinal(store: &mut dyn ModelStore, id: &str, criterion_id: u32) -> DomainResult<()> {
    let name = CriterionName::with_ordinal(&store.object(id)?.name, criterion_id)?;
    write_and_persist(store, id, |s| s.set_name(id, &name))
}

/// A base entry overridden by a compiler-instruction element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override<E> {
    pub base: E,
    pub instruction_id: String,
}

impl<E> Override<E> {
    pub fn new(base: E, instruction_id: impl Into<String>) -> Self {
        Self {
            base,
            instruction_id: instruction_id.into(),
        }
    }

    /// Names are never inherited: this is the instruction element's name.
    pub fn name(&self, store: &dyn ModelStore) -> DomainResult<String> {
        Ok(store.object(&self.instruction_id)?.name.clone())
    }

    pub fn set_name(&self, store: &mut dyn ModelStore, name: &str) -> DomainResult<()> {
        let id = self.instruction_id.as_str();
        write_and_persist(store, id, |s| s.set_name(id, name))
    }

    fn write_instruction_tag(
        &self,
        store: &mut dyn ModelStore,
        tag: &str,
        value: Option<String>,
    ) -> DomainResult<()> {
        let id = self.instruction_id.as_str();
        write_and_persist(store, id, |s| match value {
            Some(value) => s.set_tagged_value(id, tag, &value),
            None => {
                debug!("{id}: {tag} equals base, cleared");
                s.remove_tagged_value(id, tag)
            }
        })
    }
}

impl<E: NoteBacked> Override<E> {
    /// Instruction alias, falling back to the base alias when empty.
    pub fn identifier(&self, store: &dyn ModelStore) -> DomainResult<String> {
        let instruction = store.object(&self.instruction_id)?.alias.clone();
        let base = self.base.identifier(store)?;
        Ok(effective_text(&instruction, &base).to_string())
    }

    /// Always written to the instruction alias.
    pub fn set_identifier(&self, store: &mut dyn ModelStore, identifier: &str) -> DomainResult<()> {
        let id = self.instruction_id.as_str();
        write_and_persist(store, id, |s| s.set_alias(id, identifier))
    }

    fn note(&self, store: &dyn ModelStore, tag: &str) -> DomainResult<String> {
        let cap = E::LAYOUT.effective_cap(self.base.tag_cap());
        let instruction = read_note(store, &self.instruction_id, tag, cap)?;
        let base = self.base.note(store, tag)?;
        Ok(effective_text(&instruction, &base).to_string())
    }

    fn set_note(&self, store: &mut dyn ModelStore, tag: &str, value: &str) -> DomainResult<()> {
        let id = self.instruction_id.as_str();
        let base = self.base.note(store, tag)?;
        let cap = E::LAYOUT.effective_cap(self.base.tag_cap());
        let mut fields = unpack_with_cap(&store.object(id)?.notes, cap);
        match collapse(value.to_string(), &base) {
            Some(value) => fields.set(tag, value),
            None => {
                debug!("{id}: ${tag}$ equals base, cleared");
                fields.remove(tag);
            }
        }
        let notes = E::LAYOUT.pack_present(&fields);
        write_and_persist(store, id, |s| s.set_notes(id, &notes))
    }
}

impl Override<Section> {
    pub fn overview(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_OVERVIEW)
    }

    pub fn set_overview(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_OVERVIEW, value)
    }

    pub fn example(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_EXAMPLE)
    }

    pub fn set_example(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_EXAMPLE, value)
    }

    pub fn actors(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_ACTORS)
    }

    pub fn set_actors(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_ACTORS, value)
    }
}

impl Override<Function> {
    pub fn statement(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_STATEMENT)
    }

    pub fn set_statement(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_STATEMENT, value)
    }

    pub fn description(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_DESCRIPTION)
    }

    pub fn set_description(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_DESCRIPTION, value)
    }

    pub fn example(&self, store: &dyn ModelStore) -> DomainResult<String> {
        self.note(store, TAG_EXAMPLE)
    }

    pub fn set_example(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        self.set_note(store, TAG_EXAMPLE, value)
    }
}

impl Override<Criterion> {
    /// Function part of the instruction element's name.
    pub fn function_id(&self, store: &dyn ModelStore) -> DomainResult<String> {
        criterion_function_id(store, &self.instruction_id)
    }

    pub fn criterion_id(&self, store: &dyn ModelStore) -> DomainResult<u32> {
        criterion_ordinal(store, &self.instruction_id)
    }

    /// Renames the instruction element; the base keeps its name.
    pub fn set_criterion_id(&self, store: &mut dyn ModelStore, criterion_id: u32) -> DomainResult<()> {
        rewrite_ordinal(store, &self.instruction_id, criterion_id)
    }

    pub fn text(&self, store: &dyn ModelStore) -> DomainResult<String> {
        let instruction = store.object(&self.instruction_id)?.notes.clone();
        let base = self.base.text(store)?;
        Ok(effective_text(&instruction, &base).to_string())
    }

    pub fn set_text(&self, store: &mut dyn ModelStore, text: &str) -> DomainResult<()> {
        let base = self.base.text(store)?;
        let notes = collapse(text.to_string(), &base).unwrap_or_default();
        let id = self.instruction_id.as_str();
        write_and_persist(store, id, |s| s.set_notes(id, &notes))
    }

    pub fn row(&self, store: &dyn ModelStore) -> DomainResult<u32> {
        let instruction = store
            .tagged_value(&self.instruction_id, TV_ROW)?
            .map(|raw| parse_row(&self.instruction_id, &raw))
            .transpose()?;
        Ok(effective(instruction, self.base.row(store)?))
    }

    pub fn set_row(&self, store: &mut dyn ModelStore, row: u32) -> DomainResult<()> {
        let base = self.base.row(store)?;
        let value = collapse(row, &base).map(|r| r.to_string());
        self.write_instruction_tag(store, TV_ROW, value)
    }

    pub fn conditional(&self, store: &dyn ModelStore) -> DomainResult<bool> {
        let instruction = store
            .tagged_value(&self.instruction_id, TV_CONDITIONAL)?
            .map(|raw| raw == FLAG_YES);
        Ok(effective(instruction, self.base.conditional(store)?))
    }

    pub fn set_conditional(&self, store: &mut dyn ModelStore, value: bool) -> DomainResult<()> {
        let base = self.base.conditional(store)?;
        let value = collapse(value, &base).map(|v| flag_str(v).to_string());
        self.write_instruction_tag(store, TV_CONDITIONAL, value)
    }

    pub fn dependent(&self, store: &dyn ModelStore) -> DomainResult<bool> {
        let instruction = store
            .tagged_value(&self.instruction_id, TV_DEPENDENT)?
            .map(|raw| raw == FLAG_YES);
        Ok(effective(instruction, self.base.dependent(store)?))
    }

    pub fn set_dependent(&self, store: &mut dyn ModelStore, value: bool) -> DomainResult<()> {
        let base = self.base.dependent(store)?;
        let value = collapse(value, &base).map(|v| flag_str(v).to_string());
        self.write_instruction_tag(store, TV_DEPENDENT, value)
    }

    pub fn optionality(&self, store: &dyn ModelStore) -> DomainResult<String> {
        let instruction = store.tagged_value(&self.instruction_id, TV_OPTIONALITY)?;
        Ok(effective(instruction, self.base.optionality(store)?))
    }

    pub fn set_optionality(&self, store: &mut dyn ModelStore, value: &str) -> DomainResult<()> {
        let base = self.base.optionality(store)?;
        let value = collapse(value.to_string(), &base);
        self.write_instruction_tag(store, TV_OPTIONALITY, value)
    }
}

/// Field addressable through [`CatalogEntry::get`] and [`CatalogEntry::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Identifier,
    Overview,
    Example,
    Actors,
    Statement,
    Description,
    Text,
    Row,
    Conditional,
    Dependent,
    Optionality,
    CriterionId,
}

impl Field {
    pub const SECTION: &'static [Field] = &[
        Field::Name,
        Field::Identifier,
        Field::Overview,
        Field::Example,
        Field::Actors,
    ];

    pub const FUNCTION: &'static [Field] = &[
        Field::Name,
        Field::Identifier,
        Field::Statement,
        Field::Description,
        Field::Example,
    ];

    pub const CRITERION: &'static [Field] = &[
        Field::Name,
        Field::Identifier,
        Field::CriterionId,
        Field::Text,
        Field::Row,
        Field::Conditional,
        Field::Dependent,
        Field::Optionality,
    ];

    const ALL: &'static [Field] = &[
        Field::Name,
        Field::Identifier,
        Field::Overview,
        Field::Example,
        Field::Actors,
        Field::Statement,
        Field::Description,
        Field::Text,
        Field::Row,
        Field::Conditional,
        Field::Dependent,
        Field::Optionality,
        Field::CriterionId,
    ];

    pub fn for_kind(kind: EntryKind) -> &'static [Field] {
        match kind {
            EntryKind::Section => Self::SECTION,
            EntryKind::Function => Self::FUNCTION,
            EntryKind::Criterion => Self::CRITERION,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Identifier => "identifier",
            Field::Overview => "overview",
            Field::Example => "example",
            Field::Actors => "actors",
            Field::Statement => "statement",
            Field::Description => "description",
            Field::Text => "text",
            Field::Row => "row",
            Field::Conditional => "conditional",
            Field::Dependent => "dependent",
            Field::Optionality => "optionality",
            Field::CriterionId => "criterion-id",
        }
    }

    /// Parse user input into the value type this field holds.
    pub fn parse_value(&self, raw: &str) -> DomainResult<FieldValue> {
        let mismatch = |expected: &str| DomainError::FieldTypeMismatch {
            field: self.as_str().to_string(),
            expected: expected.to_string(),
            value: raw.to_string(),
        };
        match self {
            Field::Row | Field::CriterionId => raw
                .trim()
                .parse::<u32>()
                .map(FieldValue::Number)
                .map_err(|_| mismatch("a number")),
            Field::Conditional | Field::Dependent => match raw.trim() {
                "Y" | "y" | "yes" | "true" => Ok(FieldValue::Flag(true)),
                "N" | "n" | "no" | "false" => Ok(FieldValue::Flag(false)),
                _ => Err(mismatch("Y or N")),
            },
            _ => Ok(FieldValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::UnsupportedField {
                kind: "catalog entry".to_string(),
                field: s.to_string(),
            })
    }
}

/// Value of a catalog field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Number(u32),
    Flag(bool),
}

impl FieldValue {
    fn into_text(self, field: Field) -> DomainResult<String> {
        match self {
            FieldValue::Text(text) => Ok(text),
            other => Err(other.mismatch(field, "text")),
        }
    }

    fn into_number(self, field: Field) -> DomainResult<u32> {
        match self {
            FieldValue::Number(n) => Ok(n),
            other => Err(other.mismatch(field, "a number")),
        }
    }

    fn into_flag(self, field: Field) -> DomainResult<bool> {
        match self {
            FieldValue::Flag(b) => Ok(b),
            other => Err(other.mismatch(field, "Y or N")),
        }
    }

    fn mismatch(&self, field: Field, expected: &str) -> DomainError {
        DomainError::FieldTypeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            value: self.to_string(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Flag(b) => f.write_str(flag_str(*b)),
        }
    }
}

/// A classified functional-model element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Section(Section),
    Function(Function),
    Criterion(Criterion),
    SectionOverride(Override<Section>),
    FunctionOverride(Override<Function>),
    CriterionOverride(Override<Criterion>),
}

impl CatalogEntry {
    /// Classify with the default note tag cap.
    pub fn classify(store: &dyn ModelStore, id: &str) -> DomainResult<Option<Self>> {
        Self::classify_with_cap(store, id, DEFAULT_TAG_CAP)
    }

    /// Build the entry for `id`, or `None` if the element is not a catalog entry.
    ///
    /// A compiler instruction needs exactly one generalization edge to its base.
    #[instrument(level = "debug", skip(store))]
    pub fn classify_with_cap(
        store: &dyn ModelStore,
        id: &str,
        tag_cap: usize,
    ) -> DomainResult<Option<Self>> {
        let object = store.object(id)?;
        let base_id = if is_compiler_instruction(&object.stereotype) {
            Some(store.resolve_generalization_base(id)?)
        } else {
            None
        };
        let base_stereotype = match base_id.as_deref() {
            Some(base) => Some(store.object(base)?.stereotype.clone()),
            None => None,
        };
        let Some(classification) = classify(&object.stereotype, base_stereotype.as_deref()) else {
            return Ok(None);
        };

        let element_id = base_id.as_deref().unwrap_or(id);
        let path = store.element_path(element_id)?;
        let entry = match classification {
            Classification::Plain(EntryKind::Section) => {
                CatalogEntry::Section(Section::new(element_id, path, tag_cap))
            }
            Classification::Plain(EntryKind::Function) => {
                CatalogEntry::Function(Function::new(element_id, path, tag_cap))
            }
            Classification::Plain(EntryKind::Criterion) => {
                CatalogEntry::Criterion(Criterion::new(element_id, path))
            }
            Classification::Override(EntryKind::Section) => CatalogEntry::SectionOverride(
                Override::new(Section::new(element_id, path, tag_cap), id),
            ),
            Classification::Override(EntryKind::Function) => CatalogEntry::FunctionOverride(
                Override::new(Function::new(element_id, path, tag_cap), id),
            ),
            Classification::Override(EntryKind::Criterion) => {
                CatalogEntry::CriterionOverride(Override::new(Criterion::new(element_id, path), id))
            }
        };
        Ok(Some(entry))
    }

    /// Like [`CatalogEntry::classify`], but a non-catalog element is an error.
    pub fn require(store: &dyn ModelStore, id: &str) -> DomainResult<Self> {
        Self::require_with_cap(store, id, DEFAULT_TAG_CAP)
    }

    pub fn require_with_cap(store: &dyn ModelStore, id: &str, tag_cap: usize) -> DomainResult<Self> {
        Self::classify_with_cap(store, id, tag_cap)?.ok_or_else(|| {
            DomainError::UnsupportedStereotype {
                id: id.to_string(),
                stereotype: store
                    .object(id)
                    .map(|o| o.stereotype.clone())
                    .unwrap_or_default(),
            }
        })
    }

    pub fn classification(&self) -> Classification {
        match self {
            CatalogEntry::Section(_) => Classification::Plain(EntryKind::Section),
            CatalogEntry::Function(_) => Classification::Plain(EntryKind::Function),
            CatalogEntry::Criterion(_) => Classification::Plain(EntryKind::Criterion),
            CatalogEntry::SectionOverride(_) => Classification::Override(EntryKind::Section),
            CatalogEntry::FunctionOverride(_) => Classification::Override(EntryKind::Function),
            CatalogEntry::CriterionOverride(_) => Classification::Override(EntryKind::Criterion),
        }
    }

    /// Element this entry was classified from (the instruction for overrides).
    pub fn id(&self) -> &str {
        match self {
            CatalogEntry::Section(e) => &e.id,
            CatalogEntry::Function(e) => &e.id,
            CatalogEntry::Criterion(e) => &e.id,
            CatalogEntry::SectionOverride(o) => &o.instruction_id,
            CatalogEntry::FunctionOverride(o) => &o.instruction_id,
            CatalogEntry::CriterionOverride(o) => &o.instruction_id,
        }
    }

    /// Element holding the base values.
    pub fn base_id(&self) -> &str {
        match self {
            CatalogEntry::Section(e) | CatalogEntry::SectionOverride(Override { base: e, .. }) => &e.id,
            CatalogEntry::Function(e) | CatalogEntry::FunctionOverride(Override { base: e, .. }) => {
                &e.id
            }
            CatalogEntry::Criterion(e)
            | CatalogEntry::CriterionOverride(Override { base: e, .. }) => &e.id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            CatalogEntry::Section(e) | CatalogEntry::SectionOverride(Override { base: e, .. }) => {
                &e.path
            }
            CatalogEntry::Function(e) | CatalogEntry::FunctionOverride(Override { base: e, .. }) => {
                &e.path
            }
            CatalogEntry::Criterion(e)
            | CatalogEntry::CriterionOverride(Override { base: e, .. }) => &e.path,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        Field::for_kind(self.classification().kind())
    }

    fn unsupported(&self, field: Field) -> DomainError {
        DomainError::UnsupportedField {
            kind: self.classification().to_string(),
            field: field.to_string(),
        }
    }

    pub fn get(&self, store: &dyn ModelStore, field: Field) -> DomainResult<FieldValue> {
        use FieldValue::{Flag, Number, Text};

        let value = match (self, field) {
            (CatalogEntry::Section(e), Field::Name) => Text(e.name(store)?),
            (CatalogEntry::Section(e), Field::Identifier) => Text(e.identifier(store)?),
            (CatalogEntry::Section(e), Field::Overview) => Text(e.overview(store)?),
            (CatalogEntry::Section(e), Field::Example) => Text(e.example(store)?),
            (CatalogEntry::Section(e), Field::Actors) => Text(e.actors(store)?),

            (CatalogEntry::Function(e), Field::Name) => Text(e.name(store)?),
            (CatalogEntry::Function(e), Field::Identifier) => Text(e.identifier(store)?),
            (CatalogEntry::Function(e), Field::Statement) => Text(e.statement(store)?),
            (CatalogEntry::Function(e), Field::Description) => Text(e.description(store)?),
            (CatalogEntry::Function(e), Field::Example) => Text(e.example(store)?),

            (CatalogEntry::Criterion(e), Field::Name | Field::Identifier) => Text(e.name(store)?),
            (CatalogEntry::Criterion(e), Field::CriterionId) => Number(e.criterion_id(store)?),
            (CatalogEntry::Criterion(e), Field::Text) => Text(e.text(store)?),
            (CatalogEntry::Criterion(e), Field::Row) => Number(e.row(store)?),
            (CatalogEntry::Criterion(e), Field::Conditional) => Flag(e.conditional(store)?),
            (CatalogEntry::Criterion(e), Field::Dependent) => Flag(e.dependent(store)?),
            (CatalogEntry::Criterion(e), Field::Optionality) => Text(e.optionality(store)?),

            (CatalogEntry::SectionOverride(o), Field::Name) => Text(o.name(store)?),
            (CatalogEntry::SectionOverride(o), Field::Identifier) => Text(o.identifier(store)?),
            (CatalogEntry::SectionOverride(o), Field::Overview) => Text(o.overview(store)?),
            (CatalogEntry::SectionOverride(o), Field::Example) => Text(o.example(store)?),
            (CatalogEntry::SectionOverride(o), Field::Actors) => Text(o.actors(store)?),

            (CatalogEntry::FunctionOverride(o), Field::Name) => Text(o.name(store)?),
            (CatalogEntry::FunctionOverride(o), Field::Identifier) => Text(o.identifier(store)?),
            (CatalogEntry::FunctionOverride(o), Field::Statement) => Text(o.statement(store)?),
            (CatalogEntry::FunctionOverride(o), Field::Description) => Text(o.description(store)?),
            (CatalogEntry::FunctionOverride(o), Field::Example) => Text(o.example(store)?),

            (CatalogEntry::CriterionOverride(o), Field::Name | Field::Identifier) => {
                Text(o.name(store)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::CriterionId) => {
                Number(o.criterion_id(store)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Text) => Text(o.text(store)?),
            (CatalogEntry::CriterionOverride(o), Field::Row) => Number(o.row(store)?),
            (CatalogEntry::CriterionOverride(o), Field::Conditional) => Flag(o.conditional(store)?),
            (CatalogEntry::CriterionOverride(o), Field::Dependent) => Flag(o.dependent(store)?),
            (CatalogEntry::CriterionOverride(o), Field::Optionality) => {
                Text(o.optionality(store)?)
            }

            (_, field) => return Err(self.unsupported(field)),
        };
        Ok(value)
    }

    /// Write one field and persist the element it lands on.
    ///
    /// A criterion identifier must parse as `"<FunctionID>#<CriterionID>"`.
    #[instrument(level = "debug", skip(self, store), fields(id = self.id()))]
    pub fn set(&self, store: &mut dyn ModelStore, field: Field, value: FieldValue) -> DomainResult<()> {
        if !self.fields().contains(&field) {
            return Err(self.unsupported(field));
        }
        match (self, field) {
            (CatalogEntry::Section(e), Field::Name) => e.set_name(store, &value.into_text(field)?),
            (CatalogEntry::Section(e), Field::Identifier) => {
                e.set_identifier(store, &value.into_text(field)?)
            }
            (CatalogEntry::Section(e), Field::Overview) => {
                e.set_overview(store, &value.into_text(field)?)
            }
            (CatalogEntry::Section(e), Field::Example) => e.set_example(store, &value.into_text(field)?),
            (CatalogEntry::Section(e), Field::Actors) => e.set_actors(store, &value.into_text(field)?),

            (CatalogEntry::Function(e), Field::Name) => e.set_name(store, &value.into_text(field)?),
            (CatalogEntry::Function(e), Field::Identifier) => {
                e.set_identifier(store, &value.into_text(field)?)
            }
            (CatalogEntry::Function(e), Field::Statement) => {
                e.set_statement(store, &value.into_text(field)?)
            }
            (CatalogEntry::Function(e), Field::Description) => {
                e.set_description(store, &value.into_text(field)?)
            }
            (CatalogEntry::Function(e), Field::Example) => {
                e.set_example(store, &value.into_text(field)?)
            }

            (CatalogEntry::Criterion(e), Field::Name) => e.set_name(store, &value.into_text(field)?),
            (CatalogEntry::Criterion(e), Field::Identifier) => {
                let name = value.into_text(field)?;
                CriterionName::parse(&name)?;
                e.set_name(store, &name)
            }
            (CatalogEntry::Criterion(e), Field::CriterionId) => {
                e.set_criterion_id(store, value.into_number(field)?)
            }
            (CatalogEntry::Criterion(e), Field::Text) => e.set_text(store, &value.into_text(field)?),
            (CatalogEntry::Criterion(e), Field::Row) => e.set_row(store, value.into_number(field)?),
            (CatalogEntry::Criterion(e), Field::Conditional) => {
                e.set_conditional(store, value.into_flag(field)?)
            }
            (CatalogEntry::Criterion(e), Field::Dependent) => {
                e.set_dependent(store, value.into_flag(field)?)
            }
            (CatalogEntry::Criterion(e), Field::Optionality) => {
                e.set_optionality(store, &value.into_text(field)?)
            }

            (CatalogEntry::SectionOverride(o), Field::Name) => {
                o.set_name(store, &value.into_text(field)?)
            }
            (CatalogEntry::SectionOverride(o), Field::Identifier) => {
                o.set_identifier(store, &value.into_text(field)?)
            }
            (CatalogEntry::SectionOverride(o), Field::Overview) => {
                o.set_overview(store, &value.into_text(field)?)
            }
            (CatalogEntry::SectionOverride(o), Field::Example) => {
                o.set_example(store, &value.into_text(field)?)
            }
            (CatalogEntry::SectionOverride(o), Field::Actors) => {
                o.set_actors(store, &value.into_text(field)?)
            }

            (CatalogEntry::FunctionOverride(o), Field::Name) => {
                o.set_name(store, &value.into_text(field)?)
            }
            (CatalogEntry::FunctionOverride(o), Field::Identifier) => {
                o.set_identifier(store, &value.into_text(field)?)
            }
            (CatalogEntry::FunctionOverride(o), Field::Statement) => {
                o.set_statement(store, &value.into_text(field)?)
            }
            (CatalogEntry::FunctionOverride(o), Field::Description) => {
                o.set_description(store, &value.into_text(field)?)
            }
            (CatalogEntry::FunctionOverride(o), Field::Example) => {
                o.set_example(store, &value.into_text(field)?)
            }

            (CatalogEntry::CriterionOverride(o), Field::Name) => {
                o.set_name(store, &value.into_text(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Identifier) => {
                let name = value.into_text(field)?;
                CriterionName::parse(&name)?;
                o.set_name(store, &name)
            }
            (CatalogEntry::CriterionOverride(o), Field::CriterionId) => {
                o.set_criterion_id(store, value.into_number(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Text) => {
                o.set_text(store, &value.into_text(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Row) => {
                o.set_row(store, value.into_number(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Conditional) => {
                o.set_conditional(store, value.into_flag(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Dependent) => {
                o.set_dependent(store, value.into_flag(field)?)
            }
            (CatalogEntry::CriterionOverride(o), Field::Optionality) => {
                o.set_optionality(store, &value.into_text(field)?)
            }

            (_, field) => Err(self.unsupported(field)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", Field::Name)]
    #[case("criterion-id", Field::CriterionId)]
    #[case("optionality", Field::Optionality)]
    fn test_field_from_str(#[case] input: &str, #[case] expected: Field) {
        assert_eq!(input.parse::<Field>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_field_name_when_parsing_then_unsupported_field() {
        assert!(matches!(
            "colour".parse::<Field>(),
            Err(DomainError::UnsupportedField { .. })
        ));
    }

    #[rstest]
    #[case(Field::Row, "5", FieldValue::Number(5))]
    #[case(Field::Conditional, "Y", FieldValue::Flag(true))]
    #[case(Field::Dependent, "false", FieldValue::Flag(false))]
    #[case(Field::Text, "The system SHALL", FieldValue::Text("The system SHALL".into()))]
    fn test_parse_value(#[case] field: Field, #[case] raw: &str, #[case] expected: FieldValue) {
        assert_eq!(field.parse_value(raw).unwrap(), expected);
    }

    #[test]
    fn given_non_numeric_row_when_parsing_value_then_type_mismatch() {
        assert!(matches!(
            Field::Row.parse_value("five"),
            Err(DomainError::FieldTypeMismatch { .. })
        ));
    }

    #[test]
    fn given_flag_when_displaying_then_store_encoding() {
        assert_eq!(FieldValue::Flag(true).to_string(), "Y");
        assert_eq!(FieldValue::Flag(false).to_string(), "N");
    }
}
