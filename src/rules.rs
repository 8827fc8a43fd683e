use std::fmt;

use crate::features::{FeatureAxis, FeatureMap};

/// The right-hand side of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
  /// `X -> A`, where `X` inherits everything from `A`
  Unary(String),
  /// `X -> A B`
  Binary(String, String),
}

impl Production {
  pub fn len(&self) -> usize {
    match self {
      Self::Unary(_) => 1,
      Self::Binary(_, _) => 2,
    }
  }

  pub fn is_empty(&self) -> bool {
    false
  }

  pub fn is_unary(&self) -> bool {
    matches!(self, Self::Unary(_))
  }
}

impl fmt::Display for Production {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Unary(a) => write!(f, "{}", a),
      Self::Binary(a, b) => write!(f, "{} {}", a, b),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub symbol: String,
  /// Position of this production in its nonterminal's list
  pub index: usize,
  pub production: Production,
  /// Features that must agree between the two children
  pub constraints: Vec<FeatureAxis>,
  /// Which child (0 or 1) passes its features up to the parent
  pub head: usize,
}

impl Rule {
  pub fn len(&self) -> usize {
    self.production.len()
  }

  pub fn is_empty(&self) -> bool {
    self.production.is_empty()
  }

  pub fn symbol_str(&self) -> &str {
    &self.symbol
  }

  /// Checks this rule's agreement constraints between two children, and if
  /// they hold returns the features the parent inherits from the head child.
  /// The head's map is taken as-is, never merged with the other child's.
  pub fn project(&self, left: &FeatureMap, right: &FeatureMap) -> Option<FeatureMap> {
    if !left.agrees(right, &self.constraints) {
      return None;
    }

    if self.head == 0 {
      Some(left.clone())
    } else {
      Some(right.clone())
    }
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} -> {}", self.symbol, self.production)?;
    if !self.constraints.is_empty() {
      let names = self
        .constraints
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>();
      write!(f, " [{}]", names.join(", "))?;
    }
    write!(f, " @{}", self.head)
  }
}
