/// Word lists: lemma-keyed entries with tag index, random lookup, and the
/// plain-text load/save format.
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::macros::Macro;
use crate::schema::entry::{Entry, FormValue};
use crate::schema::word_type::WordListSchema;

#[derive(Debug, Error)]
pub enum WordListError {
    #[error("{word_type} list has no entries for tag '{tag}' (expected one of: {expected})")]
    UnknownTag {
        word_type: String,
        tag: String,
        expected: String,
    },
    #[error("could not apply {macro_text} on '{lemma}': form '{form}' is not available")]
    UnsupportedForm {
        macro_text: String,
        lemma: String,
        form: String,
    },
    #[error("{0} list is empty")]
    Empty(String),
    #[error("{word_type} list, line {line}: {message}")]
    Format {
        word_type: String,
        line: usize,
        message: String,
    },
    #[error("{word_type} list cannot apply a macro to a {found} entry")]
    EntryMismatch { word_type: String, found: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A collection of words of one category, described by a [`WordListSchema`].
#[derive(Debug, Clone)]
pub struct WordList {
    schema: WordListSchema,
    source: Option<PathBuf>,
    entries: FxHashMap<String, Entry>,
    tag_index: FxHashMap<String, BTreeSet<String>>,
    /// Sorted lemmas; cleared whenever entries change and rebuilt on demand.
    keys: Vec<String>,
    /// `#` lines of the loaded file, written back first by `save_as`.
    comments: Vec<String>,
}

impl WordList {
    /// An empty list without backing file. Fill it with [`WordList::add_entry`]
    /// or [`WordList::parse_str`].
    pub fn new(schema: WordListSchema) -> Self {
        Self {
            schema,
            source: None,
            entries: FxHashMap::default(),
            tag_index: FxHashMap::default(),
            keys: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// An empty list that is loaded from `path` on first use.
    pub fn with_source(schema: WordListSchema, path: impl Into<PathBuf>) -> Self {
        let mut list = Self::new(schema);
        list.source = Some(path.into());
        list
    }

    pub fn schema(&self) -> &WordListSchema {
        &self.schema
    }

    pub fn word_type(&self) -> &'static str {
        self.schema.word_type
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, lemma: &str) -> Option<&Entry> {
        self.entries.get(lemma)
    }

    /// Known tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tag_index.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Lemmas carrying `tag`, sorted.
    pub fn tagged(&self, tag: &str) -> Vec<&str> {
        self.tag_index
            .get(tag)
            .map(|lemmas| lemmas.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All lemmas, sorted.
    pub fn lemmas(&mut self) -> &[String] {
        self.update_keys();
        &self.keys
    }

    /// Add or replace an entry, deriving every computable form that is unset.
    pub fn add_entry(&mut self, mut entry: Entry) {
        for attr in self.schema.computable {
            if entry.form(attr).is_unset() {
                if let Some(word) = self.schema.compute(attr, &entry) {
                    entry.set_form(attr, FormValue::Word(word));
                }
            }
        }

        if let Some(previous) = self.entries.remove(&entry.lemma) {
            for tag in &previous.tags {
                if let Some(lemmas) = self.tag_index.get_mut(tag) {
                    lemmas.remove(&previous.lemma);
                    if lemmas.is_empty() {
                        self.tag_index.remove(tag);
                    }
                }
            }
        }
        for tag in &entry.tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(entry.lemma.clone());
        }
        self.entries.insert(entry.lemma.clone(), entry);
        self.keys.clear();
    }

    /// Load the backing file given at construction.
    pub fn load(&mut self) -> Result<(), WordListError> {
        match self.source.clone() {
            Some(path) => self.load_from(&path),
            None => Err(WordListError::Empty(self.word_type().to_string())),
        }
    }

    /// Load and add entries from a word-list file. Can be called repeatedly to
    /// merge supplemental lists.
    pub fn load_from(&mut self, path: &Path) -> Result<(), WordListError> {
        let contents = std::fs::read_to_string(path)?;
        self.parse_str(&contents)?;
        tracing::debug!(
            word_type = self.word_type(),
            entries = self.len(),
            path = %path.display(),
            "loaded word list"
        );
        Ok(())
    }

    /// Parse word-list text and add its entries.
    ///
    /// One entry per line with the schema's column order, comma separated.
    /// Empty fields are derivable, `-` means not applicable, tags are `|`
    /// separated. `#` lines are kept as comments, blank lines skipped.
    pub fn parse_str(&mut self, input: &str) -> Result<(), WordListError> {
        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                self.comments.push(line.to_string());
                continue;
            }
            let entry = self.parse_line(line, idx + 1)?;
            self.add_entry(entry);
        }
        self.update_keys();
        Ok(())
    }

    fn parse_line(&self, line: &str, line_no: usize) -> Result<Entry, WordListError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != self.schema.columns.len() {
            return Err(self.format_error(
                line_no,
                format!(
                    "expected {} fields ({}), found {}",
                    self.schema.columns.len(),
                    self.schema.columns.join(","),
                    fields.len()
                ),
            ));
        }

        let mut entry = Entry::default();
        for (column, field) in self.schema.columns.iter().zip(fields) {
            let field = field.trim();
            match *column {
                "lemma" => {
                    if field.is_empty() || field == "-" {
                        return Err(self.format_error(line_no, "missing lemma".to_string()));
                    }
                    entry.lemma = field.to_string();
                }
                "tags" => {
                    entry.tags = field
                        .split('|')
                        .map(|t| t.trim().to_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect();
                }
                attr => entry.set_form(attr, FormValue::from_field(field)),
            }
        }
        Ok(entry)
    }

    fn format_error(&self, line: usize, message: String) -> WordListError {
        WordListError::Format {
            word_type: self.word_type().to_string(),
            line,
            message,
        }
    }

    /// Load lazily from the backing file the first time the list is needed.
    pub fn ensure_loaded(&mut self) -> Result<(), WordListError> {
        if self.entries.is_empty() {
            self.load()?;
            if self.entries.is_empty() {
                return Err(WordListError::Empty(self.word_type().to_string()));
            }
        }
        Ok(())
    }

    fn update_keys(&mut self) {
        if self.keys.len() != self.entries.len() {
            self.keys = self.entries.keys().cloned().collect();
            self.keys.sort_unstable();
        }
    }

    /// Lemmas matching any of `tags`, or all lemmas if `tags` is empty.
    pub fn filter_keys(&mut self, tags: &BTreeSet<String>) -> Result<Vec<String>, WordListError> {
        if tags.is_empty() {
            self.update_keys();
            return Ok(self.keys.clone());
        }
        let mut matching = BTreeSet::new();
        for tag in tags {
            match self.tag_index.get(tag) {
                Some(lemmas) => matching.extend(lemmas.iter().cloned()),
                None => {
                    return Err(WordListError::UnknownTag {
                        word_type: self.word_type().to_string(),
                        tag: tag.clone(),
                        expected: self.tags().join(", "),
                    })
                }
            }
        }
        Ok(matching.into_iter().collect())
    }

    /// Draw a random entry honoring the macro's tag filter.
    pub fn random_entry<R: Rng + ?Sized>(
        &mut self,
        macro_: &Macro,
        rng: &mut R,
    ) -> Result<Entry, WordListError> {
        self.ensure_loaded()?;
        let keys = self.filter_keys(&macro_.tags)?;
        let lemma = keys
            .choose(rng)
            .ok_or_else(|| WordListError::Empty(self.word_type().to_string()))?;
        self.entries
            .get(lemma)
            .cloned()
            .ok_or_else(|| WordListError::Empty(self.word_type().to_string()))
    }

    /// Render `entry` according to the macro's word form and modifiers.
    pub fn apply_macro(&self, macro_: &Macro, entry: &Entry) -> Result<String, WordListError> {
        let mut word = match entry.form(macro_.form()) {
            FormValue::Word(word) => word,
            FormValue::Absent | FormValue::Unset => {
                return Err(WordListError::UnsupportedForm {
                    macro_text: macro_.to_string(),
                    lemma: entry.lemma.clone(),
                    form: macro_.form().to_string(),
                })
            }
        };

        if macro_.has_modifier("an") {
            word = with_article(&word);
        }
        Ok(word)
    }

    /// Serialize to the word-list format, leaving derivable values empty.
    pub fn to_source_string(&self) -> String {
        let mut out = String::new();
        for comment in &self.comments {
            out.push_str(comment);
            out.push('\n');
        }

        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| {
            a.lemma
                .to_lowercase()
                .cmp(&b.lemma.to_lowercase())
                .then_with(|| a.lemma.cmp(&b.lemma))
        });

        for entry in entries {
            let fields: Vec<String> = self
                .schema
                .columns
                .iter()
                .map(|column| match *column {
                    "lemma" => entry.lemma.clone(),
                    "tags" => {
                        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
                        tags.join("|")
                    }
                    attr => self.squashed(entry, attr).to_field().to_string(),
                })
                .collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }

    /// The value to persist: `Unset` if the rule reproduces the stored word.
    fn squashed(&self, entry: &Entry, attr: &str) -> FormValue {
        let value = entry.form(attr);
        if self.schema.is_computable(attr) {
            if let FormValue::Word(ref word) = value {
                if self.schema.compute(attr, entry).as_deref() == Some(word.as_str()) {
                    return FormValue::Unset;
                }
            }
        }
        value
    }

    /// Write the list to `path` in the word-list format.
    pub fn save_as(&self, path: &Path) -> Result<(), WordListError> {
        std::fs::write(path, self.to_source_string())?;
        Ok(())
    }
}

impl fmt::Display for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(len={}, tags: {})",
            self.word_type(),
            self.len(),
            self.tags().join(", ")
        )
    }
}

/// Prefix `a ` or `an `. Only a/e/i/o count as vowels here.
pub fn with_article(word: &str) -> String {
    let vowel = word
        .chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o'));
    if vowel {
        format!("an {}", word)
    } else {
        format!("a {}", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::word_type::{NOUN, VERB};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NOUNS: &str = "\
# test nouns
cat,,animal|pet
mouse,mice,animal
information,-,
baby,,
box,,
";

    fn noun_list() -> WordList {
        let mut list = WordList::new(NOUN);
        list.parse_str(NOUNS).unwrap();
        list
    }

    fn noun_macro(modifiers: &str) -> Macro {
        Macro::parse("noun", Some(modifiers), &NOUN).unwrap()
    }

    #[test]
    fn parse_derives_computable_forms() {
        let list = noun_list();
        assert_eq!(list.len(), 5);
        assert_eq!(list.get("cat").unwrap().form("plural").as_word(), Some("cats"));
        assert_eq!(list.get("baby").unwrap().form("plural").as_word(), Some("babies"));
        assert_eq!(list.get("mouse").unwrap().form("plural").as_word(), Some("mice"));
        assert_eq!(list.get("information").unwrap().form("plural"), FormValue::Absent);
    }

    #[test]
    fn tag_index_built() {
        let list = noun_list();
        assert_eq!(list.tags(), vec!["animal", "pet"]);
        assert_eq!(list.tagged("animal"), vec!["cat", "mouse"]);
        assert!(list.tagged("food").is_empty());
    }

    #[test]
    fn column_count_mismatch_is_format_error() {
        let mut list = WordList::new(NOUN);
        let err = list.parse_str("cat,cats\n").unwrap_err();
        assert!(matches!(err, WordListError::Format { line: 1, .. }));
        let err = list.parse_str("\n,cats,\n").unwrap_err();
        assert!(matches!(err, WordListError::Format { line: 2, .. }));
    }

    #[test]
    fn random_entry_respects_tags() {
        let mut list = noun_list();
        let mut rng = StdRng::seed_from_u64(7);
        let m = noun_macro("#pet");
        for _ in 0..20 {
            assert_eq!(list.random_entry(&m, &mut rng).unwrap().lemma, "cat");
        }
        let m = noun_macro("#animal");
        for _ in 0..20 {
            let lemma = list.random_entry(&m, &mut rng).unwrap().lemma;
            assert!(lemma == "cat" || lemma == "mouse");
        }
    }

    #[test]
    fn unknown_tag_is_error() {
        let mut list = noun_list();
        let mut rng = StdRng::seed_from_u64(7);
        let err = list.random_entry(&noun_macro("#unknown_tag"), &mut rng).unwrap_err();
        match err {
            WordListError::UnknownTag { tag, expected, .. } => {
                assert_eq!(tag, "unknown_tag");
                assert_eq!(expected, "animal, pet");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_list_without_source() {
        let mut list = WordList::new(NOUN);
        let mut rng = StdRng::seed_from_u64(7);
        let err = list.random_entry(&noun_macro("an"), &mut rng).unwrap_err();
        assert!(matches!(err, WordListError::Empty(_)));
    }

    #[test]
    fn apply_forms_and_article() {
        let list = noun_list();
        let mouse = list.get("mouse").unwrap();
        assert_eq!(list.apply_macro(&noun_macro("plural"), mouse).unwrap(), "mice");
        assert_eq!(list.apply_macro(&noun_macro("an"), mouse).unwrap(), "a mouse");
        let info = list.get("information").unwrap();
        assert_eq!(list.apply_macro(&noun_macro("an"), info).unwrap(), "an information");
        let err = list.apply_macro(&noun_macro("plural"), info).unwrap_err();
        assert!(matches!(err, WordListError::UnsupportedForm { .. }));
    }

    #[test]
    fn article_rule_checks_four_vowels() {
        assert_eq!(with_article("apple"), "an apple");
        assert_eq!(with_article("Owl"), "an Owl");
        assert_eq!(with_article("unicorn"), "a unicorn");
        assert_eq!(with_article("cat"), "a cat");
    }

    #[test]
    fn save_squashes_derivable_forms() {
        let list = noun_list();
        let text = list.to_source_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "# test nouns",
                "baby,,",
                "box,,",
                "cat,,animal|pet",
                "information,-,",
                "mouse,mice,animal",
            ]
        );
        // Saving does not touch the stored entries
        assert_eq!(list.get("cat").unwrap().form("plural").as_word(), Some("cats"));
    }

    #[test]
    fn explicit_derivable_value_is_squashed() {
        let mut list = WordList::new(NOUN);
        list.parse_str("dog,dogs,\n").unwrap();
        assert_eq!(list.to_source_string(), "dog,,\n");
    }

    #[test]
    fn verb_participle_from_past() {
        let mut list = WordList::new(VERB);
        list.parse_str("go,went,gone,,,\nwalk,walked,,,,\nbe,-,,,,\n").unwrap();
        let walk = list.get("walk").unwrap();
        assert_eq!(walk.form("pp").as_word(), Some("walked"));
        assert_eq!(walk.form("s").as_word(), Some("walks"));
        assert_eq!(walk.form("ing").as_word(), Some("walking"));
        assert_eq!(list.get("go").unwrap().form("pp").as_word(), Some("gone"));

        let be = list.get("be").unwrap();
        let pp = Macro::parse("verb", Some("pp"), &VERB).unwrap();
        assert!(matches!(
            list.apply_macro(&pp, be),
            Err(WordListError::UnsupportedForm { .. })
        ));
    }

    #[test]
    fn replacing_entry_reindexes_tags() {
        let mut list = noun_list();
        list.add_entry(Entry::new("cat").with_tags(&["food"]));
        assert_eq!(list.tagged("pet"), Vec::<&str>::new());
        assert_eq!(list.tagged("food"), vec!["cat"]);
        assert_eq!(list.tagged("animal"), vec!["mouse"]);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn round_trip_through_file() {
        let list = noun_list();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nouns.txt");
        list.save_as(&path).unwrap();

        let mut reloaded = WordList::with_source(NOUN, &path);
        reloaded.ensure_loaded().unwrap();
        assert_eq!(reloaded.len(), list.len());
        for lemma in ["cat", "mouse", "information", "baby", "box"] {
            assert_eq!(reloaded.get(lemma), list.get(lemma), "entry {}", lemma);
        }
    }

    #[test]
    fn display_summary() {
        let list = noun_list();
        assert_eq!(list.to_string(), "noun(len=5, tags: animal, pet)");
    }
}
