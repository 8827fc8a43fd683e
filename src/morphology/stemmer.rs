use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use tracing::trace;

use super::{Analysis, Morphology};
use crate::error::{Error, Result};
use crate::features::FeatureMap;

/// Suffix category that is only used when derivational stripping is enabled
pub const DERIVATIONAL: &str = "Derivational";

/// Letters tried when generating edit candidates
const ALPHABET: &str = "abcçdefgğhıijklmnoöpqrsştuüvwxyz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
  pub text: String,
  /// Grammatical category the suffix marks, e.g. "Past" or "1stPL"
  pub category: String,
}

/// Suffixes ordered from longest to shortest. Suffixes of equal length keep
/// the order they were declared in.
#[derive(Debug, Clone, Default)]
pub struct SuffixTable {
  suffixes: Vec<Suffix>,
}

impl SuffixTable {
  /// Builds a table from (suffix, category) pairs. Dashes in suffixes are
  /// morpheme boundary markers and are dropped.
  pub fn new<I>(entries: I) -> Result<Self>
  where
    I: IntoIterator<Item = (String, String)>,
  {
    let mut suffixes = Vec::new();
    for (text, category) in entries {
      let text = text.replace('-', "");
      if text.is_empty() {
        return Err(Error::SuffixFormat(format!("empty suffix in category {}", category)));
      }
      suffixes.push(Suffix { text, category });
    }

    // stable, so equal-length suffixes stay in declaration order
    suffixes.sort_by(|a, b| b.text.chars().count().cmp(&a.text.chars().count()));

    Ok(Self { suffixes })
  }

  /// Parses a JSON object of `category -> [suffix, ...]`. Derivational
  /// suffixes are skipped unless `use_derivational` is set.
  pub fn from_json(source: &str, use_derivational: bool) -> Result<Self> {
    let table: BTreeMap<String, Vec<String>> = serde_json::from_str(source)?;
    let entries = table
      .into_iter()
      .filter(|(category, _)| use_derivational || category != DERIVATIONAL)
      .flat_map(|(category, suffixes)| {
        suffixes
          .into_iter()
          .map(move |suffix| (suffix, category.clone()))
      })
      .collect::<Vec<_>>();
    Self::new(entries)
  }

  pub fn load(path: impl AsRef<Path>, use_derivational: bool) -> Result<Self> {
    Self::from_json(&std::fs::read_to_string(path)?, use_derivational)
  }

  pub fn len(&self) -> usize {
    self.suffixes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.suffixes.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Suffix> {
    self.suffixes.iter()
  }

  /// The longest suffix that ends `token` while leaving a non-empty stem
  pub fn longest_match(&self, token: &str) -> Option<&Suffix> {
    self
      .suffixes
      .iter()
      .find(|s| token.len() > s.text.len() && token.ends_with(&s.text))
  }
}

/// Known stems, plus optional word frequencies used to rank spelling
/// corrections
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
  words: HashSet<String>,
  frequencies: HashMap<String, usize>,
}

impl Lexicon {
  pub fn from_words<I, S>(words: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      words: words.into_iter().map(Into::into).collect(),
      frequencies: HashMap::new(),
    }
  }

  /// Parses a whitespace-separated word list
  pub fn parse(text: &str) -> Self {
    Self::from_words(text.split_whitespace())
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self::parse(&std::fs::read_to_string(path)?))
  }

  /// Counts word occurrences in a corpus text
  pub fn with_corpus(mut self, corpus: &str) -> Self {
    regex_static!(WORD, r"\w+");
    for m in WORD.find_iter(corpus) {
      *self.frequencies.entry(m.as_str().to_string()).or_insert(0) += 1;
    }
    self
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  pub fn contains(&self, word: &str) -> bool {
    self.words.contains(word)
  }

  pub fn frequency(&self, word: &str) -> usize {
    self.frequencies.get(word).copied().unwrap_or(0)
  }

  /// Finds a lexicon word one edit away from `word`. The most frequent
  /// candidate in the corpus wins, ties go to the alphabetically first.
  pub fn correct(&self, word: &str) -> Option<String> {
    if word.is_empty() {
      return None;
    }

    edits1(word)
      .into_iter()
      .filter(|candidate| candidate != word && self.contains(candidate))
      .max_by(|a, b| {
        self
          .frequency(a)
          .cmp(&self.frequency(b))
          .then_with(|| b.cmp(a))
      })
  }
}

/// Every string one deletion, adjacent transposition, replacement or
/// insertion away from `word`.
pub fn edits1(word: &str) -> HashSet<String> {
  let chars = word.chars().collect::<Vec<_>>();
  let mut edits = HashSet::new();

  for i in 0..=chars.len() {
    let (left, right) = chars.split_at(i);

    if !right.is_empty() {
      // deletion
      edits.insert(left.iter().chain(&right[1..]).collect());
      // replacement
      for c in ALPHABET.chars() {
        edits.insert(
          left
            .iter()
            .copied()
            .chain(std::iter::once(c))
            .chain(right[1..].iter().copied())
            .collect(),
        );
      }
    }

    if right.len() > 1 {
      // transposition
      edits.insert(
        left
          .iter()
          .chain(&[right[1], right[0]])
          .chain(&right[2..])
          .collect(),
      );
    }

    // insertion
    for c in ALPHABET.chars() {
      edits.insert(
        left
          .iter()
          .copied()
          .chain(std::iter::once(c))
          .chain(right.iter().copied())
          .collect(),
      );
    }
  }

  edits
}

/// Greedy suffix-stripping stemmer. Suffixes are stripped longest first,
/// one at a time, until the remaining stem is a known word (directly or
/// through a one-edit correction) or no suffix matches. The first matching
/// suffix is always taken; there is no backtracking.
#[derive(Debug, Clone)]
pub struct SuffixStemmer {
  lexicon: Lexicon,
  suffixes: SuffixTable,
}

impl SuffixStemmer {
  pub fn new(lexicon: Lexicon, suffixes: SuffixTable) -> Self {
    Self { lexicon, suffixes }
  }

  pub fn lexicon(&self) -> &Lexicon {
    &self.lexicon
  }

  pub fn suffixes(&self) -> &SuffixTable {
    &self.suffixes
  }

  /// Returns the stem and the categories of the stripped suffixes, outermost
  /// suffix first.
  pub fn stem(&self, token: &str) -> (String, Vec<String>) {
    let mut stem = token.to_string();
    let mut categories = Vec::new();

    loop {
      if self.lexicon.contains(&stem) {
        break;
      }

      if let Some(corrected) = self.lexicon.correct(&stem) {
        trace!(from = %stem, to = %corrected, "corrected stem");
        stem = corrected;
        break;
      }

      match self.suffixes.longest_match(&stem) {
        Some(suffix) => {
          trace!(stem = %stem, suffix = %suffix.text, category = %suffix.category, "stripped suffix");
          categories.push(suffix.category.clone());
          let cut = stem.len() - suffix.text.len();
          stem.truncate(cut);
        }
        None => break,
      }
    }

    (stem, categories)
  }

  pub fn stem_to_word(&self, token: &str) -> String {
    self.stem(token).0
  }

  pub fn stem_sentence(&self, sentence: &str) -> Vec<(String, Vec<String>)> {
    sentence.split_whitespace().map(|w| self.stem(w)).collect()
  }
}

impl Morphology for SuffixStemmer {
  fn analyze(&self, token: &str) -> Result<Vec<Analysis>> {
    let (stem, categories) = self.stem(token);
    let features = FeatureMap::from_categories(&categories);
    Ok(vec![Analysis::new(stem, None, features)])
  }
}
