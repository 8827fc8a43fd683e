//! Morphological analysis strategies.
//!
//! A [`Morphology`] turns a surface token into one or more candidate
//! [`Analysis`] values: a stem to look up in the grammar's lexicon, an
//! optional part of speech, and the features carried by the token's suffixes.
//! Strategies are picked when a [`crate::resolver::Tagger`] is built.

mod external;
mod stemmer;

pub use external::{classify_morphemes, AnalysisTable, ExternalAnalyzer, MorphemeAnalysis, MorphemeSource};
pub use stemmer::{edits1, Lexicon, Suffix, SuffixStemmer, SuffixTable};

use crate::error::Result;
use crate::features::FeatureMap;

/// One candidate reading of a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
  pub stem: String,
  /// Part of speech, when the analyzer reports one
  pub pos: Option<String>,
  pub features: FeatureMap,
}

impl Analysis {
  pub fn new(stem: impl Into<String>, pos: Option<String>, features: FeatureMap) -> Self {
    Self {
      stem: stem.into(),
      pos,
      features,
    }
  }
}

pub trait Morphology {
  /// Analyzes a single token. An empty list or an error both mean the token
  /// couldn't be analyzed.
  fn analyze(&self, token: &str) -> Result<Vec<Analysis>>;
}

impl<M: Morphology + ?Sized> Morphology for Box<M> {
  fn analyze(&self, token: &str) -> Result<Vec<Analysis>> {
    (**self).analyze(token)
  }
}

impl<M: Morphology + ?Sized> Morphology for &M {
  fn analyze(&self, token: &str) -> Result<Vec<Analysis>> {
    (**self).analyze(token)
  }
}
