/// Lorem generation over the bundled and fixture corpora.
use fabulist::core::lorem::{sentence_words, LoremDialect, LoremError};
use fabulist::{CountRange, Entropy, LoremGenerator, LoremOptions, DEFAULT_DATA_DIR};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

const FIXTURE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/data");

fn fixture() -> LoremGenerator {
    LoremGenerator::from_dir(Path::new(FIXTURE_DIR)).unwrap()
}

fn options(entropy: Entropy) -> LoremOptions {
    LoremOptions::default().dialect(Some("fixture")).entropy(entropy)
}

#[test]
fn bundled_dialects() {
    let mut lorem = LoremGenerator::from_dir(Path::new(DEFAULT_DATA_DIR)).unwrap();
    assert_eq!(lorem.dialect_names(), vec!["ipsum", "sailor"]);
    lorem.load_all().unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let first = lorem
        .sentences(&mut rng, Some(1), &LoremOptions::default().entropy(Entropy::Literal))
        .unwrap()
        .next()
        .unwrap();
    assert_eq!(first, "Lorem ipsum dolor sit amet, consectetur adipiscing elit.");
}

#[test]
fn duplicate_sentences_listed_once() {
    let mut lorem = LoremGenerator::from_dir(Path::new(DEFAULT_DATA_DIR)).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let dialect = lorem.dialect(Some("ipsum"), &mut rng).unwrap();
    let repeated = dialect
        .sentences()
        .iter()
        .filter(|s| s.as_str() == "In hac habitasse platea dictumst.")
        .count();
    assert_eq!(repeated, 1);
}

#[test]
fn literal_sentences_start_with_first() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(3);
    let sentences: Vec<String> = lorem
        .sentences(&mut rng, Some(8), &options(Entropy::Literal))
        .unwrap()
        .collect();
    assert_eq!(sentences[0], "First sentence here.");
    assert_eq!(sentences[5], "Sixth sentence here.");
    assert_eq!(sentences[6], "First sentence here.");
}

#[test]
fn literal_words_follow_corpus() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(4);
    let words: Vec<String> = lorem
        .words(&mut rng, Some(7), &options(Entropy::Literal))
        .unwrap()
        .collect();
    assert_eq!(
        words,
        vec!["first", "sentence", "here", "second", "sentence", "here", "third"]
    );
}

#[test]
fn keep_first_for_every_sentence_level() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(5);
    for level in 0..=3u8 {
        let entropy = Entropy::try_from(level).unwrap();
        for _ in 0..10 {
            let sentences: Vec<String> = lorem
                .sentences(&mut rng, Some(4), &options(entropy).keep_first(true))
                .unwrap()
                .collect();
            assert_eq!(sentences.len(), 4, "level {level}");
            assert_eq!(sentences[0], "First sentence here.", "level {level}");
        }
    }
}

#[test]
fn keep_first_words_start_with_first_sentence() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(6);
    let words: Vec<String> = lorem
        .words(&mut rng, Some(3), &options(Entropy::SentenceLiteral).keep_first(true))
        .unwrap()
        .collect();
    assert_eq!(words, vec!["first", "sentence", "here"]);
}

#[test]
fn synthetic_words_come_from_vocabulary() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(7);
    let vocabulary: Vec<String> = lorem
        .dialect(Some("fixture"), &mut rng)
        .unwrap()
        .words()
        .to_vec();
    assert!(vocabulary.contains(&"fourth".to_string()));
    for word in lorem
        .words(&mut rng, Some(100), &options(Entropy::Synthetic))
        .unwrap()
    {
        assert!(vocabulary.contains(&word), "{word}");
    }
}

#[test]
fn paragraph_sentence_counts() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(8);
    let opts = options(Entropy::Synthetic)
        .sentences_per_paragraph((2, 4))
        .words_per_sentence(CountRange::new(2, 3));
    let paragraphs: Vec<String> = lorem.paragraphs(&mut rng, Some(30), &opts).unwrap().collect();
    assert_eq!(paragraphs.len(), 30);
    for paragraph in &paragraphs {
        let sentences = paragraph.matches('.').count();
        assert!((2..=4).contains(&sentences), "{paragraph}");
    }
}

#[test]
fn paragraph_literal_pools() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(9);
    let opts = options(Entropy::ParagraphLiteral).sentences_per_paragraph(1);
    for paragraph in lorem.paragraphs(&mut rng, Some(40), &opts).unwrap() {
        assert!(["here.", "here!", "here?"].iter().any(|end| paragraph.ends_with(end)));
    }
}

#[test]
fn independent_iterators_do_not_share_pools() {
    let mut lorem = fixture();
    let mut rng = StdRng::seed_from_u64(10);
    let first: Vec<String> = lorem
        .sentences(&mut rng, Some(2), &options(Entropy::Literal))
        .unwrap()
        .collect();
    let second: Vec<String> = lorem
        .sentences(&mut rng, Some(2), &options(Entropy::Literal))
        .unwrap()
        .collect();
    assert_eq!(first, second);
}

#[test]
fn added_dialect_is_selectable() {
    let mut lorem = fixture();
    lorem.add_dialect(LoremDialect::parse("mini", "Just one line.\n"));
    let mut rng = StdRng::seed_from_u64(11);
    let s: Vec<String> = lorem
        .sentences(&mut rng, Some(2), &options(Entropy::SentenceLiteral).dialect(Some("mini")))
        .unwrap()
        .collect();
    assert_eq!(s, vec!["Just one line.", "Just one line."]);
    assert!(matches!(
        lorem.words(&mut rng, Some(1), &options(Entropy::Literal).dialect(Some("pulp"))),
        Err(LoremError::UnknownDialect { .. })
    ));
}

#[test]
fn word_extraction_strips_terminal_punctuation() {
    let words: Vec<String> = sentence_words("Hoist the mainsail, ye landlubbers!").collect();
    assert_eq!(words, vec!["hoist", "the", "mainsail,", "ye", "landlubbers"]);
}
