/// Macro parsing: one `$(TYPE:MODIFIERS)` token into a structured directive.
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::schema::word_type::WordListSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("unsupported modifier for {word_type}: '{modifier}'")]
    UnknownModifier { word_type: String, modifier: String },
    #[error("duplicate modifier '{0}'")]
    DuplicateModifier(String),
    #[error("duplicate tag '{0}'")]
    DuplicateTag(String),
    #[error("empty tag in tag list")]
    EmptyTag,
    #[error("only one `:#TAGLIST` entry is allowed in macro modifiers")]
    MultipleTagClauses,
    #[error("only one word-form modifier is allowed (one of '{0}')")]
    MultipleWordForms(String),
    #[error("only one `:=NUM` assignment is allowed in macro modifiers")]
    MultipleAssignments,
    #[error("invalid variable assignment '{0}': expected `=NUM`")]
    InvalidAssignment(String),
    #[error("variable assignments are not allowed in back-references")]
    AssignmentInReference,
    #[error("invalid variable reference '{0}': expected `@NUM`")]
    InvalidReference(String),
    #[error("empty modifier in {0:?}")]
    EmptyModifier(String),
}

/// A parsed template macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    /// Lower-cased word type (`adj`, `noun`, ...).
    pub word_type: String,
    /// Selected word form (`plural`, `pp`, ...); `None` means the lemma.
    pub word_form: Option<String>,
    /// Extra modifiers such as `an` or `mr`.
    pub modifiers: BTreeSet<String>,
    /// Tag filter from the `#tag|tag` clause.
    pub tags: BTreeSet<String>,
    /// Capture index from the `=N` clause.
    pub var_name: Option<u32>,
    /// The written type started with an uppercase letter.
    pub capitalize: bool,
}

impl Macro {
    /// Parse `word_type` and an optional modifier string like `plural:an:#animal:=1`.
    ///
    /// Modifiers are validated against `schema`.
    pub fn parse(
        word_type: &str,
        modifiers: Option<&str>,
        schema: &WordListSchema,
    ) -> Result<Macro, MacroError> {
        let mut parsed = Macro {
            word_type: word_type.to_lowercase(),
            word_form: None,
            modifiers: BTreeSet::new(),
            tags: BTreeSet::new(),
            var_name: None,
            capitalize: word_type.chars().next().is_some_and(char::is_uppercase),
        };

        let raw = match modifiers.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(parsed),
        };
        let body = raw.strip_prefix(':').unwrap_or(raw);

        let mut has_tags = false;
        for segment in body.split(':') {
            let segment = segment.trim().to_lowercase();

            if let Some(tag_list) = segment.strip_prefix('#') {
                if has_tags {
                    return Err(MacroError::MultipleTagClauses);
                }
                has_tags = true;
                for tag in tag_list.split('|') {
                    let tag = tag.trim();
                    if tag.is_empty() {
                        return Err(MacroError::EmptyTag);
                    }
                    if !parsed.tags.insert(tag.to_string()) {
                        return Err(MacroError::DuplicateTag(tag.to_string()));
                    }
                }
            } else if let Some(index) = segment.strip_prefix('=') {
                if parsed.var_name.is_some() {
                    return Err(MacroError::MultipleAssignments);
                }
                let index = index
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| MacroError::InvalidAssignment(segment.clone()))?;
                parsed.var_name = Some(index);
            } else if segment.is_empty() {
                return Err(MacroError::EmptyModifier(raw.to_string()));
            } else if parsed.modifiers.contains(&segment)
                || parsed.word_form.as_deref() == Some(segment.as_str())
            {
                return Err(MacroError::DuplicateModifier(segment));
            } else if schema.is_form_modifier(&segment) {
                if parsed.word_form.is_some() {
                    let forms: Vec<_> = schema.form_modifiers().collect();
                    return Err(MacroError::MultipleWordForms(forms.join("', '")));
                }
                parsed.word_form = Some(segment);
            } else if schema.is_extra_modifier(&segment) {
                parsed.modifiers.insert(segment);
            } else {
                return Err(MacroError::UnknownModifier {
                    word_type: parsed.word_type.clone(),
                    modifier: segment,
                });
            }
        }

        Ok(parsed)
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.contains(modifier)
    }

    /// Attribute selected by this macro (`lemma` unless a word form was given).
    pub fn form(&self) -> &str {
        self.word_form.as_deref().unwrap_or("lemma")
    }
}

impl fmt::Display for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![self.word_type.clone()];
        if let Some(ref form) = self.word_form {
            parts.push(form.clone());
        }
        parts.extend(self.modifiers.iter().cloned());
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            parts.push(format!("#{}", tags.join("|")));
        }
        if let Some(index) = self.var_name {
            parts.push(format!("={}", index));
        }
        write!(f, "$({})", parts.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::word_type::{NAME, NOUN, VERB};

    #[test]
    fn parse_bare_type() {
        let m = Macro::parse("noun", None, &NOUN).unwrap();
        assert_eq!(m.word_type, "noun");
        assert_eq!(m.word_form, None);
        assert_eq!(m.form(), "lemma");
        assert!(m.modifiers.is_empty());
        assert!(!m.capitalize);
    }

    #[test]
    fn parse_full_modifier_string() {
        let m = Macro::parse("Noun", Some(":plural:an:#Animal|food:=2"), &NOUN).unwrap();
        assert_eq!(m.word_type, "noun");
        assert_eq!(m.word_form.as_deref(), Some("plural"));
        assert!(m.has_modifier("an"));
        assert!(m.tags.contains("animal"));
        assert!(m.tags.contains("food"));
        assert_eq!(m.var_name, Some(2));
        assert!(m.capitalize);
    }

    #[test]
    fn parse_without_leading_colon() {
        let m = Macro::parse("verb", Some("ing"), &VERB).unwrap();
        assert_eq!(m.word_form.as_deref(), Some("ing"));
    }

    #[test]
    fn display_is_canonical() {
        let m = Macro::parse("noun", Some("an:plural:#animal"), &NOUN).unwrap();
        assert_eq!(m.to_string(), "$(noun:plural:an:#animal)");
        let m = Macro::parse("name", Some("mr:first:=1"), &NAME).unwrap();
        assert_eq!(m.to_string(), "$(name:first:mr:=1)");
    }

    #[test]
    fn unknown_modifier() {
        let err = Macro::parse("noun", Some("unknown_mod"), &NOUN).unwrap_err();
        assert!(matches!(err, MacroError::UnknownModifier { .. }));
        // Name modifiers are not valid for nouns
        assert!(Macro::parse("noun", Some("mr"), &NOUN).is_err());
    }

    #[test]
    fn duplicate_modifier() {
        assert_eq!(
            Macro::parse("noun", Some("an:an"), &NOUN).unwrap_err(),
            MacroError::DuplicateModifier("an".to_string())
        );
        assert_eq!(
            Macro::parse("noun", Some("plural:plural"), &NOUN).unwrap_err(),
            MacroError::DuplicateModifier("plural".to_string())
        );
    }

    #[test]
    fn duplicate_tag_clauses_and_tags() {
        assert_eq!(
            Macro::parse("noun", Some("an:#animal:#animal"), &NOUN).unwrap_err(),
            MacroError::MultipleTagClauses
        );
        assert_eq!(
            Macro::parse("noun", Some("#animal|animal"), &NOUN).unwrap_err(),
            MacroError::DuplicateTag("animal".to_string())
        );
        assert_eq!(
            Macro::parse("noun", Some("#animal||food"), &NOUN).unwrap_err(),
            MacroError::EmptyTag
        );
    }

    #[test]
    fn one_word_form_only() {
        let err = Macro::parse("verb", Some("ing:past"), &VERB).unwrap_err();
        assert!(matches!(err, MacroError::MultipleWordForms(_)));
    }

    #[test]
    fn assignment_rules() {
        assert_eq!(
            Macro::parse("noun", Some("=1:=2"), &NOUN).unwrap_err(),
            MacroError::MultipleAssignments
        );
        assert!(matches!(
            Macro::parse("noun", Some("=x"), &NOUN).unwrap_err(),
            MacroError::InvalidAssignment(_)
        ));
    }

    #[test]
    fn empty_segment() {
        assert!(matches!(
            Macro::parse("noun", Some("an::plural"), &NOUN).unwrap_err(),
            MacroError::EmptyModifier(_)
        ));
        assert!(matches!(
            Macro::parse("noun", Some("::"), &NOUN).unwrap_err(),
            MacroError::EmptyModifier(_)
        ));
    }

    #[test]
    fn blank_modifier_string_is_no_modifiers() {
        let m = Macro::parse("noun", Some("  "), &NOUN).unwrap();
        assert!(m.modifiers.is_empty());
        assert!(m.tags.is_empty());
    }
}
