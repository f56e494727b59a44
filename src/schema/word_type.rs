use crate::core::word_form::english_form;
use crate::schema::entry::Entry;

/// Derives a word form (`plural`, `comp`, ...) from a lemma and its stored forms.
pub type FormRule = fn(form: &str, lemma: &str, entry: &Entry) -> Option<String>;

/// Declarative description of one word category.
///
/// All categories share one [`WordList`](crate::core::word_list::WordList)
/// implementation; they differ only in this schema.
#[derive(Clone, Copy)]
pub struct WordListSchema {
    /// Category key used in macros, e.g. `noun`.
    pub word_type: &'static str,
    /// Column order of the word-list file. `lemma` first, `tags` last if present.
    pub columns: &'static [&'static str],
    /// Attributes that [`WordListSchema::rule`] can derive when left empty.
    pub computable: &'static [&'static str],
    /// Macro modifiers that do not select a word form, e.g. `an`.
    pub extra_modifiers: &'static [&'static str],
    pub rule: FormRule,
}

impl WordListSchema {
    /// Modifiers selecting an attribute: every column except `tags`.
    pub fn form_modifiers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().copied().filter(|c| *c != "tags")
    }

    pub fn is_form_modifier(&self, modifier: &str) -> bool {
        self.form_modifiers().any(|m| m == modifier)
    }

    pub fn is_extra_modifier(&self, modifier: &str) -> bool {
        self.extra_modifiers.contains(&modifier)
    }

    pub fn is_computable(&self, attr: &str) -> bool {
        self.computable.contains(&attr)
    }

    pub fn has_tags(&self) -> bool {
        self.columns.contains(&"tags")
    }

    /// Run the schema's form rule.
    pub fn compute(&self, form: &str, entry: &Entry) -> Option<String> {
        (self.rule)(form, &entry.lemma, entry)
    }
}

impl std::fmt::Debug for WordListSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordListSchema")
            .field("word_type", &self.word_type)
            .field("columns", &self.columns)
            .field("computable", &self.computable)
            .field("extra_modifiers", &self.extra_modifiers)
            .finish_non_exhaustive()
    }
}

fn no_rule(_form: &str, _lemma: &str, _entry: &Entry) -> Option<String> {
    None
}

pub const ADJECTIVE: WordListSchema = WordListSchema {
    word_type: "adj",
    columns: &["lemma", "comp", "super", "antonym", "tags"],
    computable: &["comp", "super"],
    extra_modifiers: &["an"],
    rule: english_form,
};

pub const ADVERB: WordListSchema = WordListSchema {
    word_type: "adv",
    columns: &["lemma", "comp", "super", "antonym", "tags"],
    computable: &["comp", "super"],
    extra_modifiers: &["an"],
    rule: english_form,
};

pub const NOUN: WordListSchema = WordListSchema {
    word_type: "noun",
    columns: &["lemma", "plural", "tags"],
    computable: &["plural"],
    extra_modifiers: &["an"],
    rule: english_form,
};

pub const VERB: WordListSchema = WordListSchema {
    word_type: "verb",
    columns: &["lemma", "past", "pp", "s", "ing", "tags"],
    computable: &["pp", "s", "ing"],
    extra_modifiers: &["an"],
    rule: english_form,
};

/// First names, tagged `m` / `f`. Only used inside the name list.
pub const FIRST_NAME: WordListSchema = WordListSchema {
    word_type: "firstname",
    columns: &["lemma", "tags"],
    computable: &[],
    extra_modifiers: &[],
    rule: no_rule,
};

/// Last names. Only used inside the name list.
pub const LAST_NAME: WordListSchema = WordListSchema {
    word_type: "lastname",
    columns: &["lemma"],
    computable: &[],
    extra_modifiers: &[],
    rule: no_rule,
};

/// The virtual `name` category composed from first and last names.
pub const NAME: WordListSchema = WordListSchema {
    word_type: "name",
    columns: &[],
    computable: &[],
    extra_modifiers: &["first", "last", "middle", "mr"],
    rule: no_rule,
};
