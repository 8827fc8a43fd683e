use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::{Analysis, Morphology};
use crate::error::{Error, Result};
use crate::features::{FeatureAxis, FeatureMap};

/// Morphemes that mark a present-tense verb
const PRESENT_MORPHEMES: &[&str] = &["Pres", "Prog1", "Prog2", "Aor"];

/// Person/number markers, and the person and number each one stands for
const PERSON_MARKERS: &[(&str, &str, &str)] = &[
  ("1sg", "1st", "Singular"),
  ("2sg", "2nd", "Singular"),
  ("3sg", "3rd", "Singular"),
  ("1pl", "1stPL", "Plural"),
  ("2pl", "2ndPL", "Plural"),
  ("3pl", "3rdPL", "Plural"),
];

/// One analysis as reported by an external morphological analyzer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MorphemeAnalysis {
  /// Dictionary form, if the analyzer reports one. Falls back to the token.
  #[serde(default)]
  pub lemma: Option<String>,
  pub pos: String,
  pub morphemes: Vec<String>,
}

/// The call interface of an external morphological analyzer
pub trait MorphemeSource {
  fn analyses(&self, token: &str) -> Result<Vec<MorphemeAnalysis>>;
}

/// Precomputed analyzer output, keyed by token. Loaded from a JSON object of
/// `token -> [{ "lemma": ..., "pos": ..., "morphemes": [...] }, ...]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct AnalysisTable(HashMap<String, Vec<MorphemeAnalysis>>);

impl AnalysisTable {
  pub fn from_json(source: &str) -> Result<Self> {
    Ok(serde_json::from_str(source)?)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_json(&std::fs::read_to_string(path)?)
  }

  pub fn insert(&mut self, token: impl Into<String>, analyses: Vec<MorphemeAnalysis>) {
    self.0.insert(token.into(), analyses);
  }
}

impl MorphemeSource for AnalysisTable {
  fn analyses(&self, token: &str) -> Result<Vec<MorphemeAnalysis>> {
    self
      .0
      .get(token)
      .cloned()
      .ok_or_else(|| Error::Analyzer(format!("no analysis for {}", token)))
  }
}

/// Reads tense, person and number off a morpheme list. Past and future
/// markers take priority over present ones; among person markers the last
/// one wins. A list with no recognizable feature yields `[other: other]`.
pub fn classify_morphemes<S: AsRef<str>>(morphemes: &[S]) -> FeatureMap {
  let mut features = FeatureMap::new();

  let has = |needle: &str| morphemes.iter().any(|m| m.as_ref().contains(needle));
  if has("Past") {
    features.insert(FeatureAxis::Tense, "Past");
  } else if has("Fut") {
    features.insert(FeatureAxis::Tense, "Future");
  } else if morphemes
    .iter()
    .any(|m| PRESENT_MORPHEMES.contains(&m.as_ref()))
  {
    features.insert(FeatureAxis::Tense, "Present");
  }

  for morpheme in morphemes {
    for (marker, person, number) in PERSON_MARKERS {
      if morpheme.as_ref().contains(marker) {
        features.insert(FeatureAxis::Person, *person);
        features.insert(FeatureAxis::Number, *number);
      }
    }
  }

  features.or_other()
}

/// Adapts an external analyzer to [`Morphology`]: one analysis per candidate
/// the analyzer returns.
#[derive(Debug, Clone)]
pub struct ExternalAnalyzer<S> {
  source: S,
}

impl<S: MorphemeSource> ExternalAnalyzer<S> {
  pub fn new(source: S) -> Self {
    Self { source }
  }
}

impl<S: MorphemeSource> Morphology for ExternalAnalyzer<S> {
  fn analyze(&self, token: &str) -> Result<Vec<Analysis>> {
    let candidates = self.source.analyses(token)?;
    Ok(
      candidates
        .into_iter()
        .map(|candidate| {
          let features = classify_morphemes(&candidate.morphemes);
          let stem = candidate.lemma.unwrap_or_else(|| token.to_string());
          Analysis::new(stem, Some(candidate.pos), features)
        })
        .collect(),
    )
  }
}
