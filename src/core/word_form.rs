/// Word-form heuristics: derive plural, comparative, gerund etc. from a lemma.
///
/// Simple English spelling rules only. Irregular forms are stored in the
/// word lists.
use crate::schema::entry::Entry;

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Compute `form` for `lemma`, or `None` if no rule applies.
///
/// `entry` gives access to stored forms that other rules build on
/// (the past participle falls back to the simple past).
pub fn english_form(form: &str, lemma: &str, entry: &Entry) -> Option<String> {
    if lemma.is_empty() {
        return None;
    }
    match form {
        "plural" | "s" => Some(add_s(lemma)),
        "comp" => Some(graded(lemma, "r", "er")),
        "super" => Some(graded(lemma, "st", "est")),
        "ing" => Some(gerund(lemma)),
        "pp" => entry.form("past").as_word().map(str::to_string),
        _ => None,
    }
}

/// `-s` / `-es` / `-ies` suffix shared by noun plurals and 3rd person verbs.
fn add_s(word: &str) -> String {
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("sh") || word.ends_with("ch") {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix('y') {
        let after_vowel = stem.chars().last().is_some_and(|c| VOWELS.contains(&c));
        if after_vowel {
            return format!("{}s", word);
        }
        return format!("{}ies", stem);
    }
    format!("{}s", word)
}

/// Comparative and superlative: `nice → nicer`, `happy → happier`, `tall → taller`.
fn graded(word: &str, after_e: &str, suffix: &str) -> String {
    if word.ends_with('e') {
        format!("{}{}", word, after_e)
    } else if let Some(stem) = word.strip_suffix('y') {
        format!("{}i{}", stem, suffix)
    } else {
        format!("{}{}", word, suffix)
    }
}

fn gerund(word: &str) -> String {
    let silent_e = word.len() > 2
        && word.ends_with('e')
        && !word.ends_with("ee")
        && !word.ends_with("ye")
        && !word.ends_with("oe");
    if silent_e {
        format!("{}ing", &word[..word.len() - 1])
    } else {
        format!("{}ing", word)
    }
}
