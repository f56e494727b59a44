pub mod config;
pub mod entry;
pub mod word_type;
