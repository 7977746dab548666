//! Vocabulary corpus tooling: head-word matching, CSV ingestion, and
//! per-video transcript indexing

pub mod csv;
pub mod indexer;
pub mod matcher;

pub use csv::{parse_vocabulary_csv, CsvError};
pub use indexer::VocabularyIndexer;
pub use matcher::{headword_in_text, HeadwordMatcher};
