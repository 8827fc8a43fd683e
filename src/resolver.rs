use tracing::{trace, warn};

use crate::features::{FeatureMap, Tag};
use crate::grammar::Grammar;
use crate::morphology::{Analysis, Morphology};

/// Category given to tokens whose stem isn't in the grammar's lexicon and
/// whose analyzer didn't report a part of speech
pub const UNKNOWN_CATEGORY: &str = "??";

/// Maps morphological analyses onto the grammar's terminal categories
#[derive(Debug, Clone, Copy)]
pub struct TerminalResolver<'g> {
  grammar: &'g Grammar,
}

impl<'g> TerminalResolver<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Self { grammar }
  }

  /// Tags for one analysis, or `None` if its stem isn't in the lexicon
  pub fn resolve(&self, analysis: &Analysis) -> Option<Vec<Tag>> {
    let tags = self.grammar.lookup_terminal(&analysis.stem, &analysis.features);
    if tags.is_empty() { None } else { Some(tags) }
  }

  /// The stand-in tag used when a stem can't be found
  pub fn placeholder(analysis: &Analysis) -> Tag {
    let category = analysis
      .pos
      .clone()
      .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
    Tag::new(category, analysis.features.clone())
  }
}

/// The tags for one token, and whether any of them came from the lexicon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
  pub tags: Vec<Tag>,
  /// Set when every tag is a placeholder
  pub unresolved: bool,
}

/// Tags tokens with a morphology strategy chosen at construction, resolving
/// every analysis against the grammar. Never returns an empty tag list.
pub struct Tagger<'g> {
  resolver: TerminalResolver<'g>,
  morphology: Box<dyn Morphology + 'g>,
}

impl<'g> Tagger<'g> {
  pub fn new(grammar: &'g Grammar, morphology: impl Morphology + 'g) -> Self {
    Self {
      resolver: TerminalResolver::new(grammar),
      morphology: Box::new(morphology),
    }
  }

  pub fn tag(&self, token: &str) -> Vec<Tag> {
    self.tag_token(token).tags
  }

  pub fn tag_token(&self, token: &str) -> TaggedToken {
    let analyses = match self.morphology.analyze(token) {
      Ok(analyses) => analyses,
      Err(e) => {
        warn!(token, error = %e, "morphological analysis failed");
        Vec::new()
      }
    };

    if analyses.is_empty() {
      warn!(token, "unresolved token");
      return TaggedToken {
        tags: vec![Tag::new(UNKNOWN_CATEGORY, FeatureMap::new())],
        unresolved: true,
      };
    }

    let mut tags: Vec<Tag> = Vec::new();
    let mut unresolved = true;
    for analysis in analyses.iter() {
      let found = match self.resolver.resolve(analysis) {
        Some(found) => {
          unresolved = false;
          found
        }
        None => vec![TerminalResolver::placeholder(analysis)],
      };
      for tag in found {
        if !tags.contains(&tag) {
          tags.push(tag);
        }
      }
    }

    if unresolved {
      warn!(token, "unresolved token");
    } else {
      trace!(token, tags = tags.len(), "tagged token");
    }

    TaggedToken { tags, unresolved }
  }

  pub fn tag_all(&self, tokens: &[&str]) -> Vec<TaggedToken> {
    tokens.iter().map(|t| self.tag_token(t)).collect()
  }
}

impl std::fmt::Debug for Tagger<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Tagger")
      .field("resolver", &self.resolver)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::{Error, Result};
  use crate::features::FeatureAxis;
  use crate::morphology::{AnalysisTable, ExternalAnalyzer, Lexicon, SuffixStemmer, SuffixTable};

  const GRAMMAR: &str = r#"{
    "variables": { "S": [["N", "V"]] },
    "constraints": { "S": [["person"]] },
    "terminals": {
      "N": { "Common": ["kitap"] },
      "V": { "Transitive": ["oku"] },
      "Adv": { "Past": ["dün"] }
    }
  }"#;

  struct Failing;

  impl Morphology for Failing {
    fn analyze(&self, _token: &str) -> Result<Vec<Analysis>> {
      Err(Error::Analyzer("analyzer is offline".to_string()))
    }
  }

  #[test]
  fn test_stemmer_tags() {
    let g = Grammar::from_json(GRAMMAR).unwrap();
    let stemmer = SuffixStemmer::new(
      Lexicon::parse("kitap oku dün"),
      SuffixTable::from_json(r#"{ "Past": ["-du"], "1st": ["-m"], "Plural": ["-lar"] }"#, true).unwrap(),
    );
    let tagger = Tagger::new(&g, stemmer);

    assert_eq!(
      tagger.tag("okudum"),
      vec![Tag::new(
        "V",
        FeatureMap::new()
          .with(FeatureAxis::Person, "1st")
          .with(FeatureAxis::Tense, "Past")
          .with(FeatureAxis::Other, "Transitive")
      )]
    );
    assert_eq!(
      tagger.tag("dün"),
      vec![Tag::new("Adv", FeatureMap::new().with(FeatureAxis::Tense, "Past"))]
    );
  }

  #[test]
  fn test_unknown_stem_gets_placeholder() {
    let g = Grammar::from_json(GRAMMAR).unwrap();
    let stemmer = SuffixStemmer::new(
      Lexicon::parse("kitap"),
      SuffixTable::from_json(r#"{ "Plural": ["-lar"] }"#, true).unwrap(),
    );
    let tagger = Tagger::new(&g, stemmer);

    let tagged = tagger.tag_token("masalar");
    assert!(tagged.unresolved);
    assert_eq!(
      tagged.tags,
      vec![Tag::new(
        UNKNOWN_CATEGORY,
        FeatureMap::new().with(FeatureAxis::Number, "Plural")
      )]
    );
  }

  #[test]
  fn test_analyzer_pos_used_for_placeholder() {
    let g = Grammar::from_json(GRAMMAR).unwrap();
    let table = AnalysisTable::from_json(
      r#"{
        "kitabı": [{ "lemma": "kitap", "pos": "Noun", "morphemes": ["Noun", "A3sg", "Acc"] }],
        "masa": [{ "lemma": "masa", "pos": "Noun", "morphemes": ["Noun", "A3sg"] }],
        "yüz": [
          { "lemma": "yüz", "pos": "Noun", "morphemes": ["Noun", "A3sg"] },
          { "lemma": "kitap", "pos": "Noun", "morphemes": ["Noun", "A3pl"] }
        ]
      }"#,
    )
    .unwrap();
    let tagger = Tagger::new(&g, ExternalAnalyzer::new(table));

    let tagged = tagger.tag_token("kitabı");
    assert!(!tagged.unresolved);
    assert_eq!(tagged.tags.len(), 1);
    assert_eq!(tagged.tags[0].category, "N");
    assert_eq!(tagged.tags[0].features.get(FeatureAxis::Person), Some("3rd"));

    let tagged = tagger.tag_token("masa");
    assert!(tagged.unresolved);
    assert_eq!(tagged.tags[0].category, "Noun");

    // a mix of resolved and placeholder readings keeps both
    let tagged = tagger.tag_token("yüz");
    assert!(!tagged.unresolved);
    let categories = tagged.tags.iter().map(|t| t.category.as_str()).collect::<Vec<_>>();
    assert_eq!(categories, vec!["Noun", "N"]);
  }

  #[test]
  fn test_analyzer_failure_is_unresolved() {
    let g = Grammar::from_json(GRAMMAR).unwrap();
    let tagger = Tagger::new(&g, Failing);

    let tagged = tagger.tag_token("kitap");
    assert!(tagged.unresolved);
    assert_eq!(tagged.tags, vec![Tag::new(UNKNOWN_CATEGORY, FeatureMap::new())]);
  }
}
