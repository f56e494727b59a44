/// Person names: a virtual word list combining first and last names.
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::PathBuf;

use crate::core::macros::Macro;
use crate::core::word_list::{WordList, WordListError};
use crate::schema::word_type::{FIRST_NAME, LAST_NAME, NAME};

const MIDDLE_INITIALS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Default probability that a generated name carries a middle initial.
pub const DEFAULT_MIDDLE_NAME_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Parse a macro tag (`m`, `male`, `f`, `female`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "m" | "male" => Some(Self::Male),
            "f" | "female" => Some(Self::Female),
            _ => None,
        }
    }

    /// Tag used in the first-name list.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Male => "Mr.",
            Self::Female => "Mrs.",
        }
    }
}

/// A synthesized name. Carries every part so back-references can render
/// it differently later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub gender: Gender,
    pub title: String,
    pub first: String,
    /// Middle initial like `J.`, if one was drawn.
    pub middle: Option<String>,
    pub last: String,
}

#[derive(Debug, Clone)]
pub struct NameList {
    first_names: WordList,
    last_names: WordList,
    middle_name_probability: f64,
}

impl NameList {
    /// Empty name list; fill via [`NameList::first_names_mut`] / [`NameList::last_names_mut`].
    pub fn new() -> Self {
        Self {
            first_names: WordList::new(FIRST_NAME),
            last_names: WordList::new(LAST_NAME),
            middle_name_probability: DEFAULT_MIDDLE_NAME_PROBABILITY,
        }
    }

    /// Name list loaded lazily from a first-name and a last-name file.
    pub fn with_sources(first: impl Into<PathBuf>, last: impl Into<PathBuf>) -> Self {
        Self {
            first_names: WordList::with_source(FIRST_NAME, first),
            last_names: WordList::with_source(LAST_NAME, last),
            middle_name_probability: DEFAULT_MIDDLE_NAME_PROBABILITY,
        }
    }

    /// Clamped to `0.0..=1.0`. NaN keeps the default.
    pub fn with_middle_name_probability(mut self, probability: f64) -> Self {
        self.middle_name_probability = if probability.is_nan() {
            DEFAULT_MIDDLE_NAME_PROBABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    pub fn middle_name_probability(&self) -> f64 {
        self.middle_name_probability
    }

    pub fn first_names(&self) -> &WordList {
        &self.first_names
    }

    pub fn first_names_mut(&mut self) -> &mut WordList {
        &mut self.first_names
    }

    pub fn last_names(&self) -> &WordList {
        &self.last_names
    }

    pub fn last_names_mut(&mut self) -> &mut WordList {
        &mut self.last_names
    }

    pub fn load(&mut self) -> Result<(), WordListError> {
        self.first_names.load()?;
        self.last_names.load()
    }

    pub fn ensure_loaded(&mut self) -> Result<(), WordListError> {
        self.first_names.ensure_loaded()?;
        self.last_names.ensure_loaded()
    }

    /// Gender requested by the macro's tags, or `None` for "either".
    fn requested_gender(macro_: &Macro) -> Result<Option<Gender>, WordListError> {
        let mut male = false;
        let mut female = false;
        for tag in &macro_.tags {
            match Gender::from_tag(tag) {
                Some(Gender::Male) => male = true,
                Some(Gender::Female) => female = true,
                None => {
                    return Err(WordListError::UnknownTag {
                        word_type: NAME.word_type.to_string(),
                        tag: tag.clone(),
                        expected: "m, f, male, female".to_string(),
                    })
                }
            }
        }
        Ok(match (male, female) {
            (true, false) => Some(Gender::Male),
            (false, true) => Some(Gender::Female),
            _ => None,
        })
    }

    /// Synthesize a random name.
    ///
    /// The gender is fixed before drawing the first name, since a first name
    /// alone can be ambiguous.
    pub fn random_entry<R: Rng + ?Sized>(
        &mut self,
        macro_: &Macro,
        rng: &mut R,
    ) -> Result<NameEntry, WordListError> {
        self.ensure_loaded()?;

        let gender = match Self::requested_gender(macro_)? {
            Some(gender) => gender,
            None if rng.gen_bool(0.5) => Gender::Male,
            None => Gender::Female,
        };

        let first = self
            .first_names
            .tagged(gender.tag())
            .choose(rng)
            .map(|s| s.to_string())
            .ok_or_else(|| WordListError::UnknownTag {
                word_type: FIRST_NAME.word_type.to_string(),
                tag: gender.tag().to_string(),
                expected: self.first_names.tags().join(", "),
            })?;
        let last = self
            .last_names
            .lemmas()
            .choose(rng)
            .cloned()
            .ok_or_else(|| WordListError::Empty(LAST_NAME.word_type.to_string()))?;

        let middle = if rng.gen_bool(self.middle_name_probability) {
            MIDDLE_INITIALS
                .choose(rng)
                .map(|c| format!("{}.", *c as char))
        } else {
            None
        };

        Ok(NameEntry {
            gender,
            title: gender.title().to_string(),
            first,
            middle,
            last,
        })
    }

    /// Render a name. Without `first` or `last`, both are included.
    pub fn apply_macro(&self, macro_: &Macro, entry: &NameEntry) -> String {
        let has_first = macro_.has_modifier("first");
        let has_last = macro_.has_modifier("last");
        let full_name = has_first == has_last;

        let mut parts: Vec<&str> = Vec::new();
        if macro_.has_modifier("mr") {
            parts.push(&entry.title);
        }
        if full_name || has_first {
            parts.push(&entry.first);
        }
        if macro_.has_modifier("middle") {
            if let Some(ref middle) = entry.middle {
                parts.push(middle);
            }
        }
        if full_name || has_last {
            parts.push(&entry.last);
        }
        parts.join(" ")
    }
}

impl Default for NameList {
    fn default() -> Self {
        Self::new()
    }
}
