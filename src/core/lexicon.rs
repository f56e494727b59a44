/// Lexicon: the closed set of word sources a macro can resolve against.
use rand::Rng;

use crate::core::macros::Macro;
use crate::core::name_list::{NameEntry, NameList};
use crate::core::word_list::{WordList, WordListError};
use crate::schema::entry::Entry;
use crate::schema::word_type::{WordListSchema, NAME};

/// A word category registered with the resolver.
#[derive(Debug, Clone)]
pub enum Lexicon {
    Words(WordList),
    Names(NameList),
}

/// An entry drawn from a [`Lexicon`], kept for back-references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawnEntry {
    Word(Entry),
    Name(NameEntry),
}

impl DrawnEntry {
    fn kind(&self) -> &'static str {
        match self {
            Self::Word(_) => "word",
            Self::Name(_) => "name",
        }
    }
}

impl Lexicon {
    pub fn schema(&self) -> &WordListSchema {
        match self {
            Self::Words(list) => list.schema(),
            Self::Names(_) => &NAME,
        }
    }

    pub fn word_type(&self) -> &'static str {
        self.schema().word_type
    }

    pub fn load(&mut self) -> Result<(), WordListError> {
        match self {
            Self::Words(list) => list.load(),
            Self::Names(names) => names.load(),
        }
    }

    pub fn ensure_loaded(&mut self) -> Result<(), WordListError> {
        match self {
            Self::Words(list) => list.ensure_loaded(),
            Self::Names(names) => names.ensure_loaded(),
        }
    }

    pub fn random_entry<R: Rng + ?Sized>(
        &mut self,
        macro_: &Macro,
        rng: &mut R,
    ) -> Result<DrawnEntry, WordListError> {
        match self {
            Self::Words(list) => list.random_entry(macro_, rng).map(DrawnEntry::Word),
            Self::Names(names) => names.random_entry(macro_, rng).map(DrawnEntry::Name),
        }
    }

    pub fn apply_macro(&self, macro_: &Macro, entry: &DrawnEntry) -> Result<String, WordListError> {
        match (self, entry) {
            (Self::Words(list), DrawnEntry::Word(entry)) => list.apply_macro(macro_, entry),
            (Self::Names(names), DrawnEntry::Name(entry)) => Ok(names.apply_macro(macro_, entry)),
            (lexicon, entry) => Err(WordListError::EntryMismatch {
                word_type: lexicon.word_type().to_string(),
                found: entry.kind().to_string(),
            }),
        }
    }

    pub fn as_word_list(&self) -> Option<&WordList> {
        match self {
            Self::Words(list) => Some(list),
            Self::Names(_) => None,
        }
    }

    pub fn as_word_list_mut(&mut self) -> Option<&mut WordList> {
        match self {
            Self::Words(list) => Some(list),
            Self::Names(_) => None,
        }
    }

    pub fn as_name_list_mut(&mut self) -> Option<&mut NameList> {
        match self {
            Self::Names(names) => Some(names),
            Self::Words(_) => None,
        }
    }
}

impl From<WordList> for Lexicon {
    fn from(list: WordList) -> Self {
        Self::Words(list)
    }
}

impl From<NameList> for Lexicon {
    fn from(names: NameList) -> Self {
        Self::Names(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::word_type::NOUN;

    #[test]
    fn mismatched_entry_is_error() {
        let lexicon = Lexicon::from(WordList::new(NOUN));
        let entry = DrawnEntry::Name(NameEntry {
            gender: crate::core::name_list::Gender::Male,
            title: "Mr.".to_string(),
            first: "John".to_string(),
            middle: None,
            last: "Smith".to_string(),
        });
        let m = Macro::parse("noun", None, &NOUN).unwrap();
        assert!(matches!(
            lexicon.apply_macro(&m, &entry),
            Err(WordListError::EntryMismatch { .. })
        ));
    }

    #[test]
    fn schema_dispatch() {
        assert_eq!(Lexicon::from(WordList::new(NOUN)).word_type(), "noun");
        assert_eq!(Lexicon::from(NameList::new()).word_type(), "name");
    }
}
