use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The closed set of morphological axes a feature can live on
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureAxis {
  Person,
  Tense,
  Number,
  /// Catch-all for subcategories that don't classify into a known axis
  Other,
}

impl FeatureAxis {
  pub const ALL: [FeatureAxis; 4] = [Self::Person, Self::Tense, Self::Number, Self::Other];

  pub fn name(self) -> &'static str {
    match self {
      Self::Person => "person",
      Self::Tense => "tense",
      Self::Number => "number",
      Self::Other => "other",
    }
  }

  /// Classifies a lexicon subcategory label ("1stPL", "Past", "Common", ...)
  /// into the axis it describes.
  pub fn of_label(label: &str) -> Self {
    regex_static!(PERSON_LABEL, "1st|2nd|3rd|1stPL|2ndPL|3rdPL");
    regex_static!(TENSE_LABEL, "Past|Present|Future");
    regex_static!(NUMBER_LABEL, "Singular|Plural");

    if PERSON_LABEL.is_match(label) {
      Self::Person
    } else if TENSE_LABEL.is_match(label) {
      Self::Tense
    } else if NUMBER_LABEL.is_match(label) {
      Self::Number
    } else {
      Self::Other
    }
  }
}

impl fmt::Display for FeatureAxis {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for FeatureAxis {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|axis| axis.name() == s)
      .ok_or_else(|| Error::UnknownFeature(s.to_string()))
  }
}

/// A feature map keyed by [`FeatureAxis`], holding at most one value per axis.
/// Ordered, so two maps with the same contents compare and hash the same.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureMap(BTreeMap<FeatureAxis, String>);

impl FeatureMap {
  pub fn new() -> Self {
    Default::default()
  }

  /// Builder-style insert
  pub fn with(mut self, axis: FeatureAxis, value: impl Into<String>) -> Self {
    self.insert(axis, value);
    self
  }

  pub fn insert(&mut self, axis: FeatureAxis, value: impl Into<String>) -> Option<String> {
    self.0.insert(axis, value.into())
  }

  pub fn get(&self, axis: FeatureAxis) -> Option<&str> {
    self.0.get(&axis).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (FeatureAxis, &str)> {
    self.0.iter().map(|(axis, value)| (*axis, value.as_str()))
  }

  /// Copies every feature of `other` into self. Values in `other` win.
  pub fn overlay(&mut self, other: &FeatureMap) {
    for (axis, value) in other.iter() {
      self.insert(axis, value);
    }
  }

  /// Two maps agree on an axis unless both carry it with different values
  pub fn agrees_on(&self, other: &FeatureMap, axis: FeatureAxis) -> bool {
    match (self.get(axis), other.get(axis)) {
      (Some(a), Some(b)) => a == b,
      _ => true,
    }
  }

  pub fn agrees(&self, other: &FeatureMap, axes: &[FeatureAxis]) -> bool {
    axes.iter().all(|axis| self.agrees_on(other, *axis))
  }

  /// An analysis with no features still needs a map, so an empty one becomes
  /// `[other: other]`.
  pub fn or_other(self) -> Self {
    if self.is_empty() {
      self.with(FeatureAxis::Other, "other")
    } else {
      self
    }
  }

  /// Turns the grammatical categories collected while stripping suffixes
  /// ("Plural", "1stPL", "Past", ...) into a feature map. Each axis keeps the
  /// last category that matched it.
  pub fn from_categories<S: AsRef<str>>(categories: &[S]) -> Self {
    // longer person forms come first, so "1stPL" isn't read as "1st"
    regex_static!(PERSON, "1stPL|2ndPL|3rdPL|1st|2nd|3rd");
    regex_static!(TENSE, "Past|Present|Future");
    regex_static!(NUMBER, "Plural");

    let rules: [(FeatureAxis, &regex::Regex); 3] = [
      (FeatureAxis::Person, &*PERSON),
      (FeatureAxis::Tense, &*TENSE),
      (FeatureAxis::Number, &*NUMBER),
    ];

    let mut map = Self::new();
    for (axis, re) in rules.iter() {
      for category in categories {
        if let Some(m) = re.find(category.as_ref()) {
          map.insert(*axis, m.as_str());
        }
      }
    }
    map
  }
}

impl FromIterator<(FeatureAxis, String)> for FeatureMap {
  fn from_iter<I: IntoIterator<Item = (FeatureAxis, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl fmt::Display for FeatureMap {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_empty() {
      return write!(f, "[]");
    }
    write!(f, "[ ")?;
    for (idx, (axis, value)) in self.iter().enumerate() {
      if idx > 0 {
        write!(f, ", ")?;
      }
      write!(f, "{}: {}", axis, value)?;
    }
    write!(f, " ]")
  }
}

/// A candidate (category, features) reading of a token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
  pub category: String,
  pub features: FeatureMap,
}

impl Tag {
  pub fn new(category: impl Into<String>, features: FeatureMap) -> Self {
    Self {
      category: category.into(),
      features,
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.category, self.features)
  }
}
