use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Value of one word-form attribute of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormValue {
    /// Not stored; may be derived from the lemma by the list's form rule.
    Unset,
    /// Explicitly not applicable, e.g. the plural of "information".
    Absent,
    /// A concrete word.
    Word(String),
}

impl FormValue {
    /// Parse one field of a word-list line: empty is `Unset`, `-` is `Absent`.
    pub fn from_field(field: &str) -> Self {
        match field.trim() {
            "" => Self::Unset,
            "-" => Self::Absent,
            word => Self::Word(word.to_string()),
        }
    }

    /// Render as a word-list field (inverse of [`FormValue::from_field`]).
    pub fn to_field(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Absent => "-",
            Self::Word(word) => word,
        }
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Self::Word(word) => Some(word),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

/// One word of a word list: the lemma plus its stored or derived forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub lemma: String,
    pub forms: BTreeMap<String, FormValue>,
    pub tags: BTreeSet<String>,
}

impl Entry {
    pub fn new(lemma: &str) -> Self {
        Self {
            lemma: lemma.to_string(),
            ..Self::default()
        }
    }

    /// Builder-style setter for a concrete form.
    pub fn with_form(mut self, attr: &str, word: &str) -> Self {
        self.forms
            .insert(attr.to_string(), FormValue::Word(word.to_string()));
        self
    }

    /// Builder-style setter marking a form as not applicable.
    pub fn without_form(mut self, attr: &str) -> Self {
        self.forms.insert(attr.to_string(), FormValue::Absent);
        self
    }

    /// Builder-style setter for tags (lower-cased).
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags
            .extend(tags.iter().map(|t| t.trim().to_lowercase()));
        self
    }

    /// Look up an attribute. `lemma` is always a concrete word; attributes
    /// that were never mentioned are `Unset`.
    pub fn form(&self, attr: &str) -> FormValue {
        if attr == "lemma" {
            return FormValue::Word(self.lemma.clone());
        }
        self.forms.get(attr).cloned().unwrap_or(FormValue::Unset)
    }

    pub fn set_form(&mut self, attr: &str, value: FormValue) {
        self.forms.insert(attr.to_string(), value);
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}
