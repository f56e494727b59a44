pub mod context;
pub mod fabulist;
pub mod generators;
pub mod lexicon;
pub mod lorem;
pub mod macros;
pub mod name_list;
pub mod word_form;
pub mod word_list;
