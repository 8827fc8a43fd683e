#[macro_use]
extern crate lazy_static;

#[macro_use]
pub mod utils;

pub mod cyk;
pub mod error;
pub mod extract;
pub mod features;
pub mod grammar;
pub mod morphology;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod syntree;

use tracing::debug;

use crate::cyk::{parse_chart, Chart};
use crate::extract::extract_parses;
use crate::morphology::Morphology;
use crate::resolver::Tagger;
use crate::syntree::SynTree;

pub use crate::error::{Error, Result};
pub use crate::features::{FeatureAxis, FeatureMap, Tag};
pub use crate::grammar::Grammar;
pub use crate::utils::Err;

impl Grammar {
  pub fn parse_chart(&self, tokens: &[&str], tags: &[Vec<Tag>]) -> Chart {
    parse_chart(self, tokens, tags)
  }

  /// Parses already-tagged tokens, returning every tree rooted at the start
  /// symbol. An empty list means the sentence is ungrammatical.
  pub fn parse_tagged(&self, tokens: &[&str], tags: &[Vec<Tag>]) -> Vec<SynTree<String, String>> {
    extract_parses(&self.parse_chart(tokens, tags), &self.start)
  }
}

/// Everything produced by parsing one sentence
#[derive(Debug, Clone)]
pub struct Parse {
  pub tokens: Vec<String>,
  pub tags: Vec<Vec<Tag>>,
  /// Positions of tokens that only got placeholder tags
  pub unresolved: Vec<usize>,
  pub chart: Chart,
  pub trees: Vec<SynTree<String, String>>,
}

impl Parse {
  pub fn is_grammatical(&self) -> bool {
    !self.trees.is_empty()
  }

  /// Trees with duplicates removed, in extraction order. Roots that differ
  /// only in their features expand to the same tree.
  pub fn distinct_trees(&self) -> Vec<&SynTree<String, String>> {
    let mut distinct: Vec<&SynTree<String, String>> = Vec::new();
    for tree in self.trees.iter() {
      if !distinct.contains(&tree) {
        distinct.push(tree);
      }
    }
    distinct
  }
}

/// Tags and parses sentences against one grammar
#[derive(Debug)]
pub struct Parser<'g> {
  grammar: &'g Grammar,
  tagger: Tagger<'g>,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar, morphology: impl Morphology + 'g) -> Self {
    Self {
      grammar,
      tagger: Tagger::new(grammar, morphology),
    }
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn tagger(&self) -> &Tagger<'g> {
    &self.tagger
  }

  /// Parses a pre-tokenized sentence
  pub fn parse(&self, tokens: &[&str]) -> Parse {
    let tagged = self.tagger.tag_all(tokens);

    let unresolved = tagged
      .iter()
      .enumerate()
      .filter(|(_, t)| t.unresolved)
      .map(|(i, _)| i)
      .collect::<Vec<_>>();
    let tags = tagged.into_iter().map(|t| t.tags).collect::<Vec<_>>();

    let chart = self.grammar.parse_chart(tokens, &tags);
    let trees = extract_parses(&chart, &self.grammar.start);

    debug!(
      tokens = tokens.len(),
      trees = trees.len(),
      unresolved = unresolved.len(),
      "parsed sentence"
    );

    Parse {
      tokens: tokens.iter().map(|t| t.to_string()).collect(),
      tags,
      unresolved,
      chart,
      trees,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::morphology::{AnalysisTable, ExternalAnalyzer, Lexicon, SuffixStemmer, SuffixTable};

  const TOY: &str = r#"{
    "variables": {
      "S": [["NP", "VP"]],
      "NP": [["Det", "N"]],
      "VP": [["V"]]
    },
    "constraints": { "S": [["person"]], "NP": [[]], "VP": [[]] },
    "implies": { "S": [1], "NP": [1], "VP": [0] },
    "terminals": {
      "Det": { "Indefinite": ["bir"] },
      "N": { "Common": ["kitap"] },
      "V": { "Transitive": ["oku"] }
    }
  }"#;

  fn toy_tags() -> Vec<Vec<Tag>> {
    vec![
      vec![Tag::new("Det", FeatureMap::new())],
      vec![Tag::new("N", FeatureMap::new())],
      vec![Tag::new(
        "V",
        FeatureMap::new()
          .with(FeatureAxis::Person, "1st")
          .with(FeatureAxis::Tense, "Past"),
      )],
    ]
  }

  fn demo_grammar() -> Grammar {
    Grammar::from_json(include_str!("../data/grammar.json")).unwrap()
  }

  fn demo_stemmer() -> SuffixStemmer {
    SuffixStemmer::new(
      Lexicon::parse(include_str!("../data/lexicon.txt")),
      SuffixTable::from_json(include_str!("../data/suffixes.json"), false).unwrap(),
    )
  }

  fn bracketed(parse: &Parse) -> Vec<String> {
    parse.trees.iter().map(|t| t.to_string()).collect()
  }

  #[test]
  fn test_toy_sentence() {
    let g: Grammar = TOY.parse().unwrap();
    let trees = g.parse_tagged(&["bir", "kitap", "okudum"], &toy_tags());
    assert_eq!(trees.len(), 1);
    assert_eq!(
      trees[0].to_string(),
      "(S (NP (Det bir) (N kitap)) (VP (V okudum)))"
    );
  }

  #[test]
  fn test_toy_missing_determiner() {
    let g: Grammar = TOY.parse().unwrap();
    let tags = toy_tags()[1..].to_vec();
    assert!(g.parse_tagged(&["kitap", "okudum"], &tags).is_empty());
  }

  #[test]
  fn test_toy_person_mismatch() {
    let g: Grammar = TOY.parse().unwrap();
    let mut tags = toy_tags();
    tags[1] = vec![Tag::new("N", FeatureMap::new().with(FeatureAxis::Person, "3rd"))];

    let chart = g.parse_chart(&["bir", "kitap", "okudum"], &tags);
    // both halves still parse on their own
    assert!(chart.nodes_at(0, 1).any(|n| n.label == "NP"));
    assert!(chart.nodes_at(2, 2).any(|n| n.label == "VP"));
    assert!(!chart.is_grammatical("S"));
  }

  #[test]
  fn test_toy_reparse_is_identical() {
    let g: Grammar = TOY.parse().unwrap();
    let tokens = ["bir", "kitap", "okudum"];
    assert_eq!(g.parse_tagged(&tokens, &toy_tags()), g.parse_tagged(&tokens, &toy_tags()));
  }

  #[test]
  fn test_toy_with_stemmer() {
    let g: Grammar = TOY.parse().unwrap();
    let stemmer = SuffixStemmer::new(
      Lexicon::parse("bir kitap oku"),
      SuffixTable::from_json(r#"{ "Past": ["-du"], "1st": ["-m"] }"#, true).unwrap(),
    );
    let parser = Parser::new(&g, stemmer);

    let parse = parser.parse(&["bir", "kitap", "okudum"]);
    assert!(parse.is_grammatical());
    assert!(parse.unresolved.is_empty());
    assert_eq!(
      bracketed(&parse),
      vec!["(S (NP (Det bir) (N kitap)) (VP (V okudum)))"]
    );
  }

  #[test]
  fn test_feature_only_differences_collapse() {
    let g: Grammar = TOY.parse().unwrap();
    let table = AnalysisTable::from_json(
      r#"{
        "bir": [{ "pos": "Det", "morphemes": ["Det"] }],
        "kitap": [{ "pos": "Noun", "morphemes": ["Noun"] }],
        "okudum": [
          { "lemma": "oku", "pos": "Verb", "morphemes": ["Verb", "Past", "A1sg"] },
          { "lemma": "oku", "pos": "Verb", "morphemes": ["Verb", "Aor", "A1sg"] }
        ]
      }"#,
    )
    .unwrap();
    let parser = Parser::new(&g, ExternalAnalyzer::new(table));

    let parse = parser.parse(&["bir", "kitap", "okudum"]);
    // one S per tense reading, both with the same shape
    assert_eq!(parse.trees.len(), 2);
    let distinct = parse.distinct_trees();
    assert_eq!(distinct.len(), 1);
    assert_eq!(
      distinct[0].to_string(),
      "(S (NP (Det bir) (N kitap)) (VP (V okudum)))"
    );
  }

  #[test]
  fn test_demo_sentences() {
    let g = demo_grammar();
    let parser = Parser::new(&g, demo_stemmer());

    let parse = parser.parse(&["ben", "bir", "kitap", "okudum"]);
    assert_eq!(
      bracketed(&parse),
      vec!["(S (Pron ben) (VP (NP (Det bir) (N kitap)) (V okudum)))"]
    );

    let parse = parser.parse(&["dün", "kitapları", "okudum"]);
    assert_eq!(
      bracketed(&parse),
      vec!["(S (Adv dün) (S (VP (NP (N kitapları)) (V okudum))))"]
    );

    let parse = parser.parse(&["biz", "okula", "geldik"]);
    assert_eq!(
      bracketed(&parse),
      vec!["(S (Pron biz) (VP (NP (N okula)) (V geldik)))"]
    );
  }

  #[test]
  fn test_demo_negative_sentences() {
    let g = demo_grammar();
    let parser = Parser::new(&g, demo_stemmer());

    // person disagreement between subject and verb
    assert!(!parser.parse(&["ben", "kitap", "okudun"]).is_grammatical());
    // tense disagreement between adverb and verb
    assert!(!parser.parse(&["yarın", "kitap", "okudum"]).is_grammatical());
    // unknown word
    let parse = parser.parse(&["ben", "zzzz", "okudum"]);
    assert_eq!(parse.unresolved, vec![1]);
    assert!(!parse.is_grammatical());
  }

  #[test]
  fn test_demo_with_analyzer() {
    let g = demo_grammar();
    let table = AnalysisTable::from_json(include_str!("../data/analyses.json")).unwrap();
    let parser = Parser::new(&g, ExternalAnalyzer::new(table));

    let parse = parser.parse(&["ben", "bir", "kitap", "okudum"]);
    assert_eq!(
      bracketed(&parse),
      vec!["(S (Pron ben) (VP (NP (Det bir) (N kitap)) (V okudum)))"]
    );

    assert!(!parser.parse(&["ben", "kitap", "okudun"]).is_grammatical());

    // tokens the analyzer doesn't know still get tagged
    let parse = parser.parse(&["ben", "masa"]);
    assert_eq!(parse.unresolved, vec![1]);
    assert_eq!(parse.tags[1].len(), 1);
  }

  #[test]
  fn test_single_and_empty_sentences() {
    let g = demo_grammar();
    let parser = Parser::new(&g, demo_stemmer());

    let parse = parser.parse(&["geldim"]);
    assert_eq!(parse.chart.cell_count(), 1);
    assert_eq!(bracketed(&parse), vec!["(S (VP (V geldim)))"]);

    let parse = parser.parse(&[]);
    assert!(!parse.is_grammatical());
    assert_eq!(parse.chart.cell_count(), 0);
  }

  #[test]
  fn test_shared_grammar_across_threads() {
    let g = demo_grammar();
    let g = &g;
    std::thread::scope(|scope| {
      let handles = (0..2)
        .map(move |_| {
          scope.spawn(move || {
            let parser = Parser::new(g, demo_stemmer());
            bracketed(&parser.parse(&["ben", "bir", "kitap", "okudum"]))
          })
        })
        .collect::<Vec<_>>();
      let results = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();
      assert_eq!(results[0], results[1]);
    });
  }
}
