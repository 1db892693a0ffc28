#![deny(unsafe_code)]

pub mod error;
pub mod hash;
pub mod loader;

pub use crate::error::StandardsError;
pub use crate::loader::{
    DictionarySet, DictionarySource, LoadedDictionary, dictionary_path, load_dictionaries,
    load_dictionary,
};
