//! Fabulist: random sentences, names, and lorem ipsum from word-list templates.
//!
//! Templates embed macros like `$(Noun:plural:#animal)`, `$(name:mr)` or
//! `$(num:1,100)`; each occurrence is replaced by a randomly drawn word from
//! plain-text word lists. Lorem ipsum text is produced from bundled corpora
//! at four levels of entropy.

pub mod core;
pub mod schema;

pub use crate::core::fabulist::{Fabulist, FabulistBuilder, FabulistError, Quotes, Templates};
pub use crate::core::lorem::{CountRange, Entropy, LoremGenerator, LoremOptions};
pub use crate::schema::config::FabulistConfig;

/// Word lists and lorem corpora shipped with the crate.
pub const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
