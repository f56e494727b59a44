/// Word-list load/save behavior on the bundled and fixture lists.
use fabulist::core::macros::Macro;
use fabulist::core::name_list::NameList;
use fabulist::core::word_list::WordList;
use fabulist::schema::entry::FormValue;
use fabulist::schema::word_type::{
    WordListSchema, ADJECTIVE, ADVERB, FIRST_NAME, LAST_NAME, NOUN, VERB,
};
use fabulist::DEFAULT_DATA_DIR;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

fn bundled(schema: WordListSchema, file: &str) -> WordList {
    let mut list = WordList::with_source(schema, Path::new(DEFAULT_DATA_DIR).join(file));
    list.load().unwrap();
    list
}

#[test]
fn save_and_reload_reproduces_entries() {
    let dir = tempfile::tempdir().unwrap();
    let lists = [
        (ADJECTIVE, "adj_list.txt"),
        (ADVERB, "adv_list.txt"),
        (NOUN, "noun_list.txt"),
        (VERB, "verb_list.txt"),
        (FIRST_NAME, "firstname_list.txt"),
        (LAST_NAME, "lastname_list.txt"),
    ];
    for (schema, file) in lists {
        let mut original = bundled(schema, file);
        let path = dir.path().join(file);
        original.save_as(&path).unwrap();

        let mut reloaded = WordList::with_source(schema, path.clone());
        reloaded.load().unwrap();
        assert_eq!(reloaded.len(), original.len(), "{file}");
        for lemma in original.lemmas().to_vec() {
            assert_eq!(reloaded.get(&lemma), original.get(&lemma), "{file}: {lemma}");
        }
        assert_eq!(reloaded.to_source_string(), original.to_source_string(), "{file}");
    }
}

#[test]
fn saved_file_keeps_comments_and_squashes_derived_forms() {
    let dir = tempfile::tempdir().unwrap();
    let nouns = bundled(NOUN, "noun_list.txt");
    let path = dir.path().join("nouns.txt");
    nouns.save_as(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();

    assert!(text.starts_with("# Nouns"));
    assert!(text.lines().any(|l| l == "cat,,animal|pet"));
    assert!(text.lines().any(|l| l == "mouse,mice,animal|pet"));
    assert!(text.lines().any(|l| l == "bread,-,food"));
}

#[test]
fn bundled_irregular_forms() {
    let verbs = bundled(VERB, "verb_list.txt");
    let go = verbs.get("go").unwrap();
    assert_eq!(go.form("pp"), FormValue::Word("gone".to_string()));
    assert_eq!(go.form("ing"), FormValue::Word("going".to_string()));
    let walk = verbs.get("walk").unwrap();
    assert_eq!(walk.form("pp"), FormValue::Word("walked".to_string()));
    assert_eq!(walk.form("s"), FormValue::Word("walks".to_string()));
    let bake = verbs.get("bake").unwrap();
    assert_eq!(bake.form("ing"), FormValue::Word("baking".to_string()));

    let nouns = bundled(NOUN, "noun_list.txt");
    assert_eq!(nouns.get("bread").unwrap().form("plural"), FormValue::Absent);
    assert_eq!(nouns.get("city").unwrap().form("plural"), FormValue::Word("cities".to_string()));
}

#[test]
fn tag_filter_on_bundled_nouns() {
    let mut nouns = bundled(NOUN, "noun_list.txt");
    let mut rng = StdRng::seed_from_u64(1);
    let birds = Macro::parse("noun", Some("#bird"), &NOUN).unwrap();
    for _ in 0..30 {
        let entry = nouns.random_entry(&birds, &mut rng).unwrap();
        assert!(entry.has_tag("bird"), "{}", entry.lemma);
    }
}

#[test]
fn merged_supplemental_list() {
    let mut nouns = bundled(NOUN, "noun_list.txt");
    let before = nouns.len();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data/noun_list.txt");
    nouns.load_from(&fixture).unwrap();
    // Every fixture lemma already exists, so entries are replaced, not added
    assert_eq!(nouns.len(), before);
    assert!(nouns.tagged("pet").contains(&"cat"));
}

#[test]
fn bundled_names() {
    let data = Path::new(DEFAULT_DATA_DIR);
    let mut names =
        NameList::with_sources(data.join("firstname_list.txt"), data.join("lastname_list.txt"));
    names.load().unwrap();
    assert!(names.first_names().tagged("m").len() > 10);
    assert!(names.first_names().tagged("f").len() > 10);
    assert!(names.last_names().len() > 10);
}
