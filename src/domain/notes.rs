//! Packed note fields: several named text fields stored in one note string.
//!
//! Format: `$KEY$value$KEY$value...` where `KEY` is two uppercase letters.
//! Values cannot contain the `$XX$` pattern; there is no escaping.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// Maximum number of tags honored by [`unpack`].
pub const DEFAULT_TAG_CAP: usize = 5;

/// Tag count of the widest [`NoteLayout`]; a lower cap merges trailing tags.
pub const MIN_TAG_CAP: usize = 3;

pub const TAG_OVERVIEW: &str = "OV";
pub const TAG_EXAMPLE: &str = "EX";
pub const TAG_ACTORS: &str = "AC";
pub const TAG_STATEMENT: &str = "ST";
pub const TAG_DESCRIPTION: &str = "DE";

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"\$([A-Z]{2})\$").expect("valid tag pattern"))
}

/// True if `value` contains something the codec would read as a tag.
pub fn contains_tag(value: &str) -> bool {
    tag_regex().is_match(value)
}

/// Tag to value mapping decoded from a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    fields: BTreeMap<String, String>,
}

impl NoteFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `tag`, empty if absent.
    pub fn get(&self, tag: &str) -> &str {
        self.fields.get(tag).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.fields.contains_key(tag)
    }

    pub fn set(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(tag.into(), value.into());
    }

    pub fn remove(&mut self, tag: &str) -> Option<String> {
        self.fields.remove(tag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NoteFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = NoteFields::new();
        for (k, v) in iter {
            fields.set(k, v);
        }
        fields
    }
}

/// Concatenate `$KEY$VALUE` for each field, in the given order.
pub fn pack<K: AsRef<str>, V: AsRef<str>>(fields: &[(K, V)]) -> String {
    let mut packed = String::new();
    for (key, value) in fields {
        let (key, value) = (key.as_ref(), value.as_ref());
        if contains_tag(value) {
            warn!("value for ${key}$ contains a tag pattern and will not unpack intact");
        }
        packed.push('$');
        packed.push_str(key);
        packed.push('$');
        packed.push_str(value);
    }
    packed
}

/// Unpack with the default tag cap.
pub fn unpack(text: &str) -> NoteFields {
    unpack_with_cap(text, DEFAULT_TAG_CAP)
}

/// Split `text` on `$XX$` tags, honoring at most `cap` tags.
///
/// Text before the first tag is ignored. Tags beyond the cap stay part of
/// the last captured value.
pub fn unpack_with_cap(text: &str, cap: usize) -> NoteFields {
    let tags: Vec<(String, usize, usize)> = tag_regex()
        .captures_iter(text)
        .take(cap)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?;
            Some((key.as_str().to_string(), whole.start(), whole.end()))
        })
        .collect();

    let mut fields = NoteFields::new();
    for (i, (key, _, value_start)) in tags.iter().enumerate() {
        let value_end = tags
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        fields.set(key.clone(), &text[*value_start..value_end]);
    }
    fields
}

/// Fixed tag order for one entry variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLayout {
    tags: &'static [&'static str],
}

impl NoteLayout {
    pub const SECTION: NoteLayout = NoteLayout {
        tags: &[TAG_OVERVIEW, TAG_EXAMPLE, TAG_ACTORS],
    };

    pub const FUNCTION: NoteLayout = NoteLayout {
        tags: &[TAG_STATEMENT, TAG_DESCRIPTION, TAG_EXAMPLE],
    };

    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }

    /// `cap` raised so every tag of this layout is captured separately.
    pub fn effective_cap(&self, cap: usize) -> usize {
        cap.max(self.tags.len())
    }

    /// Pack every tag of the layout, absent ones as empty values.
    pub fn pack_all(&self, fields: &NoteFields) -> String {
        let ordered: Vec<(&str, &str)> = self.tags.iter().map(|t| (*t, fields.get(t))).collect();
        pack(&ordered)
    }

    /// Pack only tags with a non-empty value; an empty result means "inherit everything".
    pub fn pack_present(&self, fields: &NoteFields) -> String {
        let ordered: Vec<(&str, &str)> = self
            .tags
            .iter()
            .map(|t| (*t, fields.get(t)))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        pack(&ordered)
    }
}
