/// Errors raised while loading grammars and morphology resources
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The grammar artifact is missing a field or its tables are inconsistent.
  /// Always fatal: a grammar is never partially loaded.
  #[error("grammar format error: {0}")]
  GrammarFormat(String),
  /// A feature name that isn't one of person, tense, number or other
  #[error("unknown feature name: {0}")]
  UnknownFeature(String),
  #[error("suffix table error: {0}")]
  SuffixFormat(String),
  /// The external morphological analyzer couldn't produce an analysis
  #[error("morphological analyzer error: {0}")]
  Analyzer(String),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
