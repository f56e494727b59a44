/// The template resolver: macro tokens → random words.
///
/// Owns the word categories, the lorem generator, and the one RNG they share.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::context::{Capture, ResolutionContext};
use crate::core::generators::{random_choice, random_number, GeneratorError};
use crate::core::lexicon::Lexicon;
use crate::core::lorem::{
    CountRange, Entropy, LoremDialect, LoremError, LoremGenerator, LoremOptions,
};
use crate::core::macros::{Macro, MacroError};
use crate::core::name_list::NameList;
use crate::core::word_list::{WordList, WordListError};
use crate::schema::config::{ConfigError, FabulistConfig, DEFAULT_MIN_FAILURE_BUDGET};
use crate::schema::word_type::{ADJECTIVE, ADVERB, NOUN, VERB};

#[derive(Debug, Error)]
pub enum FabulistError {
    #[error("macro error: {0}")]
    Parse(#[from] MacroError),
    #[error("word list error: {0}")]
    WordList(#[from] WordListError),
    #[error("lorem error: {0}")]
    Lorem(#[from] LoremError),
    #[error("format error: {0}")]
    Format(#[from] GeneratorError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown word type '{word_type}' (expected {})", .expected.join(", "))]
    UnknownCategory { word_type: String, expected: Vec<String> },
    #[error("undefined variable reference '@{0}'")]
    UndefinedReference(u32),
    #[error("variable '{0}' is already assigned")]
    DuplicateCapture(u32),
    #[error("gave up after {max_failures} consecutive failed attempts ({produced} of {} produced)",
        .requested.map_or_else(|| "unbounded".to_string(), |n| n.to_string()))]
    GenerationExhausted {
        produced: usize,
        requested: Option<usize>,
        max_failures: usize,
    },
}

impl FabulistError {
    /// Errors that only affect the drawn words, so a new attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::WordList(WordListError::UnsupportedForm { .. }))
    }
}

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"\$\(\s*(@?\w+)\s*(:[^)]*)?\s*\)").expect("macro token pattern is valid")
    })
}

/// One template or a set of alternatives picked uniformly per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Templates {
    Single(String),
    Choice(Vec<String>),
}

impl Templates {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Single(template) => vec![template],
            Self::Choice(templates) => templates,
        }
    }
}

impl From<&str> for Templates {
    fn from(template: &str) -> Self {
        Self::Single(template.to_string())
    }
}

impl From<String> for Templates {
    fn from(template: String) -> Self {
        Self::Single(template)
    }
}

impl From<Vec<String>> for Templates {
    fn from(templates: Vec<String>) -> Self {
        Self::Choice(templates)
    }
}

impl From<&[&str]> for Templates {
    fn from(templates: &[&str]) -> Self {
        Self::Choice(templates.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Templates {
    fn from(templates: [&str; N]) -> Self {
        Self::Choice(templates.iter().map(|s| s.to_string()).collect())
    }
}

/// Random text generator. Built via `Fabulist::builder()`.
pub struct Fabulist {
    lexicons: BTreeMap<String, Lexicon>,
    lorem: LoremGenerator,
    lorem_options: LoremOptions,
    rng: StdRng,
    min_failure_budget: usize,
}

/// Builder for constructing a `Fabulist`.
pub struct FabulistBuilder {
    data_dir: Option<PathBuf>,
    seed: Option<u64>,
    middle_name_probability: Option<f64>,
    min_failure_budget: usize,
    lorem_options: LoremOptions,
    /// Directly provided lists (for testing without files).
    word_lists: Vec<WordList>,
    name_list: Option<NameList>,
    dialects: Vec<LoremDialect>,
}

impl Fabulist {
    pub fn builder() -> FabulistBuilder {
        FabulistBuilder {
            data_dir: None,
            seed: None,
            middle_name_probability: None,
            min_failure_budget: DEFAULT_MIN_FAILURE_BUDGET,
            lorem_options: LoremOptions::default(),
            word_lists: Vec::new(),
            name_list: None,
            dialects: Vec::new(),
        }
    }

    /// A generator over the bundled data directory.
    pub fn new() -> Result<Self, FabulistError> {
        Self::from_config(FabulistConfig::default())
    }

    pub fn from_config(config: FabulistConfig) -> Result<Self, FabulistError> {
        Self::builder().config(config).build()
    }

    /// Load every word category and lorem dialect now instead of on first use.
    pub fn load(&mut self) -> Result<(), FabulistError> {
        for lexicon in self.lexicons.values_mut() {
            lexicon.ensure_loaded()?;
        }
        self.lorem.load_all()?;
        Ok(())
    }

    /// Registered word types, sorted.
    pub fn word_types(&self) -> Vec<&str> {
        self.lexicons.keys().map(String::as_str).collect()
    }

    pub fn word_list(&self, word_type: &str) -> Option<&Lexicon> {
        self.lexicons.get(&word_type.to_lowercase())
    }

    pub fn word_list_mut(&mut self, word_type: &str) -> Option<&mut Lexicon> {
        self.lexicons.get_mut(&word_type.to_lowercase())
    }

    pub fn lorem(&self) -> &LoremGenerator {
        &self.lorem
    }

    pub fn lorem_mut(&mut self) -> &mut LoremGenerator {
        &mut self.lorem
    }

    /// Options used when lorem calls are given none.
    pub fn lorem_options(&self) -> &LoremOptions {
        &self.lorem_options
    }

    fn unknown_category(&self, word_type: &str) -> FabulistError {
        let mut expected: Vec<String> = self.lexicons.keys().cloned().collect();
        expected.extend(["num".to_string(), "pick".to_string()]);
        FabulistError::UnknownCategory {
            word_type: word_type.to_string(),
            expected,
        }
    }

    /// Resolve one macro such as `noun` with modifiers `:plural:#animal`.
    ///
    /// `word_type` may be `num`, `pick`, a registered category, or a
    /// back-reference `@N` to a word captured earlier in `ctx`.
    pub fn get_word(
        &mut self,
        word_type: &str,
        modifiers: Option<&str>,
        ctx: &mut ResolutionContext,
    ) -> Result<String, FabulistError> {
        let word_type = word_type.trim();
        if let Some(index) = word_type.strip_prefix('@') {
            return self.resolve_reference(index, modifiers, ctx);
        }

        let key = word_type.to_lowercase();
        match key.as_str() {
            "num" => return Ok(random_number(modifiers, &mut self.rng)?),
            "pick" => return Ok(random_choice(modifiers, &mut self.rng)?),
            _ => {}
        }

        let lexicon = match self.lexicons.get_mut(&key) {
            Some(lexicon) => lexicon,
            None => return Err(self.unknown_category(word_type)),
        };
        let macro_ = Macro::parse(word_type, modifiers, lexicon.schema())?;
        if let Some(index) = macro_.var_name {
            if ctx.contains(index) {
                return Err(FabulistError::DuplicateCapture(index));
            }
        }

        let entry = lexicon.random_entry(&macro_, &mut self.rng)?;
        let word = lexicon.apply_macro(&macro_, &entry)?;
        tracing::trace!(token = %macro_, word = %word, "resolved macro");

        if let Some(index) = macro_.var_name {
            ctx.bind(index, Capture { entry, word_type: key });
        }
        Ok(if macro_.capitalize {
            capitalize_first(&word)
        } else {
            word
        })
    }

    fn resolve_reference(
        &self,
        index: &str,
        modifiers: Option<&str>,
        ctx: &ResolutionContext,
    ) -> Result<String, FabulistError> {
        let index: u32 = index
            .parse()
            .map_err(|_| MacroError::InvalidReference(format!("@{index}")))?;
        let capture = ctx.get(index).ok_or(FabulistError::UndefinedReference(index))?;
        let lexicon = self
            .lexicons
            .get(&capture.word_type)
            .ok_or_else(|| self.unknown_category(&capture.word_type))?;

        let macro_ = Macro::parse(&capture.word_type, modifiers, lexicon.schema())?;
        if macro_.var_name.is_some() {
            return Err(MacroError::AssignmentInReference.into());
        }
        let word = lexicon.apply_macro(&macro_, &capture.entry)?;
        tracing::trace!(reference = index, token = %macro_, word = %word, "resolved reference");
        Ok(word)
    }

    pub fn get_name(&mut self, modifiers: Option<&str>) -> Result<String, FabulistError> {
        self.get_word("name", modifiers, &mut ResolutionContext::new())
    }

    pub fn get_number(&mut self, modifiers: Option<&str>) -> Result<String, FabulistError> {
        Ok(random_number(modifiers, &mut self.rng)?)
    }

    pub fn get_choice(&mut self, modifiers: &str) -> Result<String, FabulistError> {
        Ok(random_choice(Some(modifiers), &mut self.rng)?)
    }

    /// Replace every macro token in `template`, each occurrence drawn independently.
    pub fn resolve_template(&mut self, template: &str) -> Result<String, FabulistError> {
        let mut ctx = ResolutionContext::new();
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in token_regex().captures_iter(template) {
            let Some(token) = caps.get(0) else { continue };
            let word_type = caps.get(1).map_or("", |m| m.as_str());
            let modifiers = caps.get(2).map(|m| m.as_str());
            out.push_str(&template[last..token.start()]);
            out.push_str(&self.get_word(word_type, modifiers, &mut ctx)?);
            last = token.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Lazily generate resolved templates.
    ///
    /// `count = None` never ends on its own. With `dedupe`, repeated results
    /// are skipped and do not count toward `count`.
    pub fn generate_quotes(
        &mut self,
        templates: impl Into<Templates>,
        count: Option<usize>,
        dedupe: bool,
    ) -> Quotes<'_> {
        let seen = if dedupe { Seen::Owned(FxHashSet::default()) } else { Seen::Off };
        self.quotes(templates.into(), count, seen)
    }

    /// Like [`generate_quotes`](Self::generate_quotes) with dedupe, but
    /// against a caller-owned set that outlives the iterator.
    ///
    /// Results already in `seen` are skipped, and every accepted result is
    /// added to it, so several calls can share one set.
    pub fn generate_quotes_with<'a>(
        &'a mut self,
        templates: impl Into<Templates>,
        count: Option<usize>,
        seen: &'a mut FxHashSet<String>,
    ) -> Quotes<'a> {
        self.quotes(templates.into(), count, Seen::Shared(seen))
    }

    fn quotes<'a>(
        &'a mut self,
        templates: Templates,
        count: Option<usize>,
        seen: Seen<'a>,
    ) -> Quotes<'a> {
        let max_failures = match count {
            Some(n) => self.min_failure_budget.max(n.saturating_mul(10)),
            None => self.min_failure_budget,
        };
        Quotes {
            fabulist: self,
            templates: templates.into_vec(),
            requested: count,
            produced: 0,
            seen,
            failures: 0,
            max_failures,
            done: false,
        }
    }

    /// One resolved template.
    pub fn get_quote(&mut self, templates: impl Into<Templates>) -> Result<String, FabulistError> {
        self.generate_quotes(templates, Some(1), false)
            .next()
            .unwrap_or_else(|| {
                Err(FabulistError::GenerationExhausted {
                    produced: 0,
                    requested: Some(1),
                    max_failures: 0,
                })
            })
    }

    fn options<'o>(&'o self, options: Option<&'o LoremOptions>) -> &'o LoremOptions {
        options.unwrap_or(&self.lorem_options)
    }

    /// Options for the word and sentence conveniences: entropy 3 without
    /// `keep_first`, other settings from the configured defaults.
    fn synthetic_options(&self, options: Option<&LoremOptions>) -> LoremOptions {
        match options {
            Some(options) => options.clone(),
            None => self
                .lorem_options
                .clone()
                .entropy(Entropy::Synthetic)
                .keep_first(false),
        }
    }

    /// `count` words. Without `options`, entropy 3 is used.
    pub fn get_lorem_words(
        &mut self,
        count: usize,
        options: Option<&LoremOptions>,
    ) -> Result<Vec<String>, FabulistError> {
        let options = self.synthetic_options(options);
        Ok(self.lorem.words(&mut self.rng, Some(count), &options)?.collect())
    }

    /// One sentence. Without `options`, entropy 3 is used.
    pub fn get_lorem_sentence(
        &mut self,
        options: Option<&LoremOptions>,
    ) -> Result<String, FabulistError> {
        let options = self.synthetic_options(options);
        let sentence = self.lorem.sentences(&mut self.rng, Some(1), &options)?.next();
        Ok(sentence.unwrap_or_default())
    }

    /// One paragraph. Without `options`, the configured defaults apply.
    pub fn get_lorem_paragraph(
        &mut self,
        options: Option<&LoremOptions>,
    ) -> Result<String, FabulistError> {
        let options = self.options(options).clone();
        let paragraph = self.lorem.paragraphs(&mut self.rng, Some(1), &options)?.next();
        Ok(paragraph.unwrap_or_default())
    }

    /// Paragraphs separated by newlines.
    pub fn get_lorem_text(
        &mut self,
        paragraphs: impl Into<CountRange>,
        options: Option<&LoremOptions>,
    ) -> Result<String, FabulistError> {
        let options = self.options(options).clone();
        let count = paragraphs.into().sample(&mut self.rng);
        let text: Vec<String> = self
            .lorem
            .paragraphs(&mut self.rng, Some(count), &options)?
            .collect();
        Ok(text.join("\n"))
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Iterator returned by [`Fabulist::generate_quotes`].
pub struct Quotes<'a> {
    fabulist: &'a mut Fabulist,
    templates: Vec<String>,
    requested: Option<usize>,
    produced: usize,
    seen: Seen<'a>,
    failures: usize,
    max_failures: usize,
    done: bool,
}

/// Dedupe state of one [`Quotes`] run.
enum Seen<'a> {
    Off,
    Owned(FxHashSet<String>),
    Shared(&'a mut FxHashSet<String>),
}

impl Seen<'_> {
    /// False when `text` was already produced.
    fn insert(&mut self, text: &str) -> bool {
        let set = match self {
            Seen::Off => return true,
            Seen::Owned(set) => set,
            Seen::Shared(set) => &mut **set,
        };
        if set.contains(text) {
            return false;
        }
        set.insert(text.to_string())
    }
}

impl Quotes<'_> {
    fn exhausted(&self) -> FabulistError {
        FabulistError::GenerationExhausted {
            produced: self.produced,
            requested: self.requested,
            max_failures: self.max_failures,
        }
    }
}

impl Iterator for Quotes<'_> {
    type Item = Result<String, FabulistError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.requested.is_some_and(|n| self.produced >= n) {
            return None;
        }
        loop {
            self.failures += 1;
            if self.failures > self.max_failures {
                self.done = true;
                return Some(Err(self.exhausted()));
            }

            let Some(template) = self.templates.choose(&mut self.fabulist.rng).cloned() else {
                self.done = true;
                return None;
            };
            match self.fabulist.resolve_template(&template) {
                Ok(text) => {
                    if !self.seen.insert(&text) {
                        continue;
                    }
                    self.failures = 0;
                    self.produced += 1;
                    return Some(Ok(text));
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        error = %err,
                        failures = self.failures,
                        "discarding generation attempt"
                    );
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl FusedIterator for Quotes<'_> {}

impl FabulistBuilder {
    /// Apply every setting of `config`.
    pub fn config(mut self, config: FabulistConfig) -> Self {
        self.data_dir = config.data_dir;
        self.seed = config.seed;
        self.middle_name_probability = Some(config.middle_name_probability);
        self.min_failure_budget = config.min_failure_budget;
        self.lorem_options = config.lorem;
        self
    }

    /// Load settings from a RON config file.
    pub fn config_file(self, path: &Path) -> Result<Self, FabulistError> {
        Ok(self.config(FabulistConfig::load_from_ron(path)?))
    }

    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn middle_name_probability(mut self, probability: f64) -> Self {
        self.middle_name_probability = Some(probability);
        self
    }

    pub fn min_failure_budget(mut self, budget: usize) -> Self {
        self.min_failure_budget = budget;
        self
    }

    pub fn lorem_options(mut self, options: LoremOptions) -> Self {
        self.lorem_options = options;
        self
    }

    /// Register an in-memory list, replacing any list of the same word type.
    pub fn with_word_list(mut self, list: WordList) -> Self {
        self.word_lists.push(list);
        self
    }

    pub fn with_name_list(mut self, names: NameList) -> Self {
        self.name_list = Some(names);
        self
    }

    pub fn with_dialect(mut self, dialect: LoremDialect) -> Self {
        self.dialects.push(dialect);
        self
    }

    pub fn build(self) -> Result<Fabulist, FabulistError> {
        let mut lexicons = BTreeMap::new();
        let mut lorem = LoremGenerator::new();

        if let Some(ref dir) = self.data_dir {
            if !dir.is_dir() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("data directory not found: {}", dir.display()),
                )
                .into());
            }
            for schema in [ADJECTIVE, ADVERB, NOUN, VERB] {
                let path = dir.join(format!("{}_list.txt", schema.word_type));
                if path.exists() {
                    lexicons.insert(
                        schema.word_type.to_string(),
                        Lexicon::from(WordList::with_source(schema, path)),
                    );
                }
            }
            let first = dir.join("firstname_list.txt");
            let last = dir.join("lastname_list.txt");
            if first.exists() && last.exists() {
                let names = NameList::with_sources(first, last);
                lexicons.insert("name".to_string(), Lexicon::from(names));
            }
            lorem = LoremGenerator::from_dir(dir)?;
            tracing::debug!(
                data_dir = %dir.display(),
                word_types = lexicons.len(),
                dialects = lorem.dialect_names().len(),
                "registered data files"
            );
        }

        for list in self.word_lists {
            lexicons.insert(list.word_type().to_string(), Lexicon::from(list));
        }
        if let Some(names) = self.name_list {
            lexicons.insert("name".to_string(), Lexicon::from(names));
        }
        if let Some(probability) = self.middle_name_probability {
            if let Some(Lexicon::Names(names)) = lexicons.remove("name") {
                let names = names.with_middle_name_probability(probability);
                lexicons.insert("name".to_string(), Lexicon::from(names));
            }
        }
        for dialect in self.dialects {
            lorem.add_dialect(dialect);
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Fabulist {
            lexicons,
            lorem,
            lorem_options: self.lorem_options,
            rng,
            min_failure_budget: self.min_failure_budget,
        })
    }
}
