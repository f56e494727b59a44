/// Lorem ipsum generation: corpora ("dialects") and the entropy strategies
/// for words, sentences, and paragraphs.
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoremError {
    #[error("unknown dialect '{name}' (expected {})", .available.join(", "))]
    UnknownDialect { name: String, available: Vec<String> },
    #[error("no lorem dialects available")]
    NoDialects,
    #[error("{0}")]
    UnsupportedOption(String),
    #[error("invalid entropy level {0} (expected 0..=3)")]
    InvalidEntropy(u8),
    #[error("dialect '{0}' has no sentences")]
    EmptyCorpus(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How literally the corpus is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entropy {
    /// 0: the corpus in original order, wrapping around.
    Literal,
    /// 1: a random paragraph in order, then the next random paragraph.
    ParagraphLiteral,
    /// 2: independent random sentences.
    SentenceLiteral,
    /// 3: random words mixed into synthetic sentences.
    Synthetic,
}

impl Entropy {
    pub fn level(&self) -> u8 {
        match self {
            Self::Literal => 0,
            Self::ParagraphLiteral => 1,
            Self::SentenceLiteral => 2,
            Self::Synthetic => 3,
        }
    }
}

impl TryFrom<u8> for Entropy {
    type Error = LoremError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Literal),
            1 => Ok(Self::ParagraphLiteral),
            2 => Ok(Self::SentenceLiteral),
            3 => Ok(Self::Synthetic),
            other => Err(LoremError::InvalidEntropy(other)),
        }
    }
}

/// Inclusive `min..=max` count, sampled once per sentence or paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl From<usize> for CountRange {
    fn from(count: usize) -> Self {
        Self::new(count, count)
    }
}

impl From<(usize, usize)> for CountRange {
    fn from((min, max): (usize, usize)) -> Self {
        Self::new(min, max)
    }
}

/// Options shared by all lorem calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoremOptions {
    /// Dialect name; `None` picks a random dialect for each call.
    pub dialect: Option<String>,
    pub entropy: Entropy,
    /// Start with the corpus's first sentence.
    pub keep_first: bool,
    /// Words per synthetic sentence (entropy 3 only).
    pub words_per_sentence: CountRange,
    pub sentences_per_paragraph: CountRange,
}

impl Default for LoremOptions {
    fn default() -> Self {
        Self {
            dialect: Some("ipsum".to_string()),
            entropy: Entropy::SentenceLiteral,
            keep_first: false,
            words_per_sentence: CountRange::new(3, 15),
            sentences_per_paragraph: CountRange::new(2, 6),
        }
    }
}

impl LoremOptions {
    pub fn dialect(mut self, dialect: Option<&str>) -> Self {
        self.dialect = dialect.map(str::to_string);
        self
    }

    pub fn entropy(mut self, entropy: Entropy) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn keep_first(mut self, keep_first: bool) -> Self {
        self.keep_first = keep_first;
        self
    }

    pub fn words_per_sentence(mut self, count: impl Into<CountRange>) -> Self {
        self.words_per_sentence = count.into();
        self
    }

    pub fn sentences_per_paragraph(mut self, count: impl Into<CountRange>) -> Self {
        self.sentences_per_paragraph = count.into();
        self
    }
}

/// One lorem corpus.
#[derive(Debug, Clone)]
pub struct LoremDialect {
    name: String,
    source: Option<PathBuf>,
    paragraphs: Vec<Vec<String>>,
    sentences: Vec<String>,
    words: Vec<String>,
}

impl LoremDialect {
    /// A dialect loaded lazily from `path`.
    pub fn with_source(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            source: Some(path.into()),
            paragraphs: Vec::new(),
            sentences: Vec::new(),
            words: Vec::new(),
        }
    }

    /// Build a dialect from corpus text.
    ///
    /// One sentence per line, `#` comments and blank lines skipped, a line
    /// starting with `---` ends a paragraph.
    pub fn parse(name: &str, input: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut sentences = Vec::new();
        let mut seen = BTreeSet::new();
        let mut words = BTreeSet::new();
        let mut para = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with("---") {
                if !para.is_empty() {
                    paragraphs.push(std::mem::take(&mut para));
                }
                continue;
            }
            para.push(line.to_string());
            if seen.insert(line.to_string()) {
                sentences.push(line.to_string());
                for word in line.split(' ') {
                    let word = word
                        .trim_matches(|c: char| c.is_whitespace() || ",.!?;:-\"'".contains(c))
                        .to_lowercase();
                    if !word.is_empty() {
                        words.insert(word);
                    }
                }
            }
        }
        if !para.is_empty() {
            paragraphs.push(para);
        }

        Self {
            name: name.to_string(),
            source: None,
            paragraphs,
            sentences,
            words: words.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        !self.sentences.is_empty()
    }

    pub fn load(&mut self) -> Result<(), LoremError> {
        let Some(path) = self.source.clone() else {
            return Err(LoremError::EmptyCorpus(self.name.clone()));
        };
        let contents = std::fs::read_to_string(&path)?;
        let parsed = Self::parse(&self.name, &contents);
        self.paragraphs = parsed.paragraphs;
        self.sentences = parsed.sentences;
        self.words = parsed.words;
        tracing::debug!(
            dialect = %self.name,
            paragraphs = self.paragraphs.len(),
            sentences = self.sentences.len(),
            words = self.words.len(),
            path = %path.display(),
            "loaded lorem dialect"
        );
        Ok(())
    }

    pub fn ensure_loaded(&mut self) -> Result<(), LoremError> {
        if !self.is_loaded() {
            self.load()?;
        }
        if self.sentences.is_empty() || self.words.is_empty() {
            return Err(LoremError::EmptyCorpus(self.name.clone()));
        }
        Ok(())
    }

    pub fn paragraphs(&self) -> &[Vec<String>] {
        &self.paragraphs
    }

    /// Distinct sentences in first-seen order.
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    /// Sorted vocabulary.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn first_sentence(&self) -> Option<&str> {
        self.sentences.first().map(String::as_str)
    }
}

/// Words of a sentence as emitted by the literal strategies.
pub fn sentence_words(sentence: &str) -> impl Iterator<Item = String> + '_ {
    sentence
        .split(' ')
        .map(|w| w.trim().trim_end_matches(['.', '!', '?', ':']))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Set of dialects plus the generation entry points.
#[derive(Debug, Clone, Default)]
pub struct LoremGenerator {
    dialects: BTreeMap<String, LoremDialect>,
}

impl LoremGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every `lorem_<name>.txt` file in `dir` as dialect `<name>`.
    pub fn from_dir(dir: &Path) -> Result<Self, LoremError> {
        let mut generator = Self::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }
            let dialect = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| stem.strip_prefix("lorem_"))
                .map(str::to_string);
            if let Some(name) = dialect {
                generator.add_dialect(LoremDialect::with_source(&name, path));
            }
        }
        Ok(generator)
    }

    pub fn add_dialect(&mut self, dialect: LoremDialect) {
        self.dialects.insert(dialect.name.clone(), dialect);
    }

    /// Dialect names, sorted.
    pub fn dialect_names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }

    pub fn load_all(&mut self) -> Result<(), LoremError> {
        for dialect in self.dialects.values_mut() {
            dialect.ensure_loaded()?;
        }
        Ok(())
    }

    /// Resolve (and load) a dialect; `None` picks one at random.
    pub fn dialect<R: Rng + ?Sized>(
        &mut self,
        name: Option<&str>,
        rng: &mut R,
    ) -> Result<&LoremDialect, LoremError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self
                .dialects
                .keys()
                .choose(rng)
                .cloned()
                .ok_or(LoremError::NoDialects)?,
        };
        let available: Vec<String> = self.dialects.keys().cloned().collect();
        let dialect = self
            .dialects
            .get_mut(&name)
            .ok_or(LoremError::UnknownDialect { name, available })?;
        dialect.ensure_loaded()?;
        Ok(dialect)
    }

    /// Words; `count = None` never ends.
    ///
    /// Entropy 3 draws vocabulary words with replacement and does not support
    /// `keep_first`. Lower levels split the literal sentence stream into words.
    pub fn words<'a, R: Rng + ?Sized>(
        &'a mut self,
        rng: &'a mut R,
        count: Option<usize>,
        options: &LoremOptions,
    ) -> Result<LoremWords<'a, R>, LoremError> {
        if options.entropy == Entropy::Synthetic && options.keep_first {
            return Err(LoremError::UnsupportedOption(
                "keep_first is not supported for entropy 3 words".to_string(),
            ));
        }
        let dialect = self.dialect(options.dialect.as_deref(), &mut *rng)?;
        Ok(LoremWords {
            stream: SentenceStream::new(dialect, rng, options),
            buffer: VecDeque::new(),
            remaining: count,
        })
    }

    /// Sentences; `count = None` never ends.
    pub fn sentences<'a, R: Rng + ?Sized>(
        &'a mut self,
        rng: &'a mut R,
        count: Option<usize>,
        options: &LoremOptions,
    ) -> Result<LoremSentences<'a, R>, LoremError> {
        let dialect = self.dialect(options.dialect.as_deref(), &mut *rng)?;
        Ok(LoremSentences {
            stream: SentenceStream::new(dialect, rng, options),
            remaining: count,
        })
    }

    /// Paragraphs of `sentences_per_paragraph` sentences; `count = None` never ends.
    ///
    /// All paragraphs draw from one sentence stream, and only the first
    /// paragraph honors `keep_first`.
    pub fn paragraphs<'a, R: Rng + ?Sized>(
        &'a mut self,
        rng: &'a mut R,
        count: Option<usize>,
        options: &LoremOptions,
    ) -> Result<LoremParagraphs<'a, R>, LoremError> {
        let dialect = self.dialect(options.dialect.as_deref(), &mut *rng)?;
        Ok(LoremParagraphs {
            stream: SentenceStream::new(dialect, rng, options),
            sentences_per_paragraph: options.sentences_per_paragraph,
            remaining: count,
        })
    }
}

/// Endless sentence source implementing the four entropy strategies.
///
/// The paragraph pool of entropy 1 lives here, so independent streams over
/// the same dialect never interfere.
struct SentenceStream<'a, R: ?Sized> {
    dialect: &'a LoremDialect,
    rng: &'a mut R,
    entropy: Entropy,
    words_per_sentence: CountRange,
    keep_first: bool,
    pending: Option<String>,
    /// Entropy 1: index of the current paragraph.
    paragraph: usize,
    index: usize,
    remaining_in_pool: usize,
}

impl<'a, R: Rng + ?Sized> SentenceStream<'a, R> {
    fn new(dialect: &'a LoremDialect, rng: &'a mut R, options: &LoremOptions) -> Self {
        Self {
            dialect,
            rng,
            entropy: options.entropy,
            words_per_sentence: options.words_per_sentence,
            keep_first: options.keep_first,
            pending: None,
            paragraph: 0,
            index: 0,
            remaining_in_pool: 0,
        }
    }

    fn literal(&mut self) -> String {
        let dialect = self.dialect;
        let sentences = &dialect.sentences;
        match self.entropy {
            Entropy::Literal => {
                let sentence = sentences[self.index % sentences.len()].clone();
                self.index += 1;
                sentence
            }
            Entropy::ParagraphLiteral => {
                let paragraphs = &dialect.paragraphs;
                if self.remaining_in_pool == 0 {
                    self.paragraph = self.rng.gen_range(0..paragraphs.len());
                    self.remaining_in_pool = paragraphs[self.paragraph].len();
                    self.index = 0;
                }
                let pool = &paragraphs[self.paragraph];
                let sentence = pool[self.index % pool.len()].clone();
                self.index += 1;
                self.remaining_in_pool -= 1;
                sentence
            }
            _ => sentences.choose(&mut *self.rng).cloned().unwrap_or_default(),
        }
    }

    fn synthetic(&mut self) -> String {
        let words = &self.dialect.words;
        let n = self.words_per_sentence.sample(&mut *self.rng).min(words.len());
        let picked: Vec<&str> = words
            .choose_multiple(&mut *self.rng, n)
            .map(String::as_str)
            .collect();
        format!("{}.", capitalize_first(&picked.join(" ")))
    }

    fn next_word(&mut self) -> Option<String> {
        self.dialect.words.choose(&mut *self.rng).cloned()
    }

    fn next_sentence(&mut self) -> String {
        if let Some(sentence) = self.pending.take() {
            return sentence;
        }
        let sentence = match self.entropy {
            Entropy::Synthetic => self.synthetic(),
            // Paragraph mode needs paragraphs; a corpus of only `---` lines has none.
            Entropy::ParagraphLiteral if self.dialect.paragraphs.is_empty() => {
                self.entropy = Entropy::Literal;
                self.literal()
            }
            _ => self.literal(),
        };
        if self.keep_first {
            self.keep_first = false;
            let first = self.dialect.sentences[0].as_str();
            if sentence != first {
                self.pending = Some(sentence);
                return first.to_string();
            }
        }
        sentence
    }
}

fn take_one(remaining: &mut Option<usize>) -> bool {
    match remaining {
        Some(0) => false,
        Some(n) => {
            *n -= 1;
            true
        }
        None => true,
    }
}

/// Iterator returned by [`LoremGenerator::words`].
pub struct LoremWords<'a, R: ?Sized> {
    stream: SentenceStream<'a, R>,
    buffer: VecDeque<String>,
    remaining: Option<usize>,
}

impl<'a, R: Rng + ?Sized> Iterator for LoremWords<'a, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !take_one(&mut self.remaining) {
            return None;
        }
        if self.stream.entropy == Entropy::Synthetic {
            return self.stream.next_word();
        }
        while self.buffer.is_empty() {
            let sentence = self.stream.next_sentence();
            self.buffer.extend(sentence_words(&sentence));
        }
        self.buffer.pop_front()
    }
}

/// Iterator returned by [`LoremGenerator::sentences`].
pub struct LoremSentences<'a, R: ?Sized> {
    stream: SentenceStream<'a, R>,
    remaining: Option<usize>,
}

impl<'a, R: Rng + ?Sized> Iterator for LoremSentences<'a, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !take_one(&mut self.remaining) {
            return None;
        }
        Some(self.stream.next_sentence())
    }
}

/// Iterator returned by [`LoremGenerator::paragraphs`].
pub struct LoremParagraphs<'a, R: ?Sized> {
    stream: SentenceStream<'a, R>,
    sentences_per_paragraph: CountRange,
    remaining: Option<usize>,
}

impl<'a, R: Rng + ?Sized> Iterator for LoremParagraphs<'a, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !take_one(&mut self.remaining) {
            return None;
        }
        let n = self.sentences_per_paragraph.sample(&mut *self.stream.rng).max(1);
        let sentences: Vec<String> = (0..n).map(|_| self.stream.next_sentence()).collect();
        Some(sentences.join(" "))
    }
}
