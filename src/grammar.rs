use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{FeatureAxis, FeatureMap, Tag};
use crate::rules::{Production, Rule};

pub const DEFAULT_START: &str = "S";

/// The grammar artifact as it appears on disk. Required tables are optional
/// here so that a missing one is reported as a grammar format error instead
/// of a bare deserialization error.
#[derive(Debug, Deserialize)]
struct GrammarFile {
  start: Option<String>,
  variables: Option<BTreeMap<String, Vec<Vec<String>>>>,
  terminals: Option<BTreeMap<String, BTreeMap<String, Vec<String>>>>,
  constraints: Option<BTreeMap<String, Vec<Option<Vec<String>>>>>,
  implies: Option<BTreeMap<String, Vec<i64>>>,
}

/// A read-only grammar: binary (and unary) productions with per-production
/// agreement constraints and head indices, plus a terminal lexicon.
#[derive(Debug)]
pub struct Grammar {
  pub start: String,
  rules: Vec<Rule>,
  /// nonterminal -> indices into `rules`, in declaration order
  by_symbol: BTreeMap<String, Vec<usize>>,
  /// left child -> right child -> indices into `rules`
  binary: HashMap<String, HashMap<String, Vec<usize>>>,
  /// child -> indices into `rules`
  unary: HashMap<String, Vec<usize>>,
  /// category -> subcategory -> word forms
  terminals: BTreeMap<String, BTreeMap<String, Vec<String>>>,
  /// word form -> (category, subcategory) pairs that list it
  lexicon: HashMap<String, Vec<(String, String)>>,
}

impl Grammar {
  /// Reads and validates a JSON grammar file
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "loading grammar");
    Self::from_json(&source)
  }

  /// Parses and validates a JSON grammar. Fails if `variables`, `terminals`
  /// or `constraints` are missing, or if the `constraints` or `implies` list
  /// of any nonterminal doesn't line up with its productions.
  pub fn from_json(source: &str) -> Result<Self> {
    let file: GrammarFile =
      serde_json::from_str(source).map_err(|e| Error::GrammarFormat(e.to_string()))?;

    let variables = file
      .variables
      .ok_or_else(|| format_err("missing `variables`"))?;
    let terminals = file
      .terminals
      .ok_or_else(|| format_err("missing `terminals`"))?;
    let constraints = file
      .constraints
      .ok_or_else(|| format_err("missing `constraints`"))?;

    if variables.is_empty() {
      return Err(format_err("empty ruleset"));
    }

    for name in constraints.keys() {
      if !variables.contains_key(name) {
        return Err(format_err(format!("constraints for undeclared nonterminal {}", name)));
      }
    }
    if let Some(implies) = &file.implies {
      for name in implies.keys() {
        if !variables.contains_key(name) {
          return Err(format_err(format!("implies for undeclared nonterminal {}", name)));
        }
      }
    }

    let mut rules = Vec::new();
    for (symbol, productions) in variables.iter() {
      let rule_constraints = constraints
        .get(symbol)
        .ok_or_else(|| format_err(format!("no constraints for nonterminal {}", symbol)))?;
      if rule_constraints.len() != productions.len() {
        return Err(format_err(format!(
          "{} has {} productions but {} constraint lists",
          symbol,
          productions.len(),
          rule_constraints.len()
        )));
      }

      let heads = match &file.implies {
        Some(implies) => {
          let heads = implies
            .get(symbol)
            .ok_or_else(|| format_err(format!("no implies for nonterminal {}", symbol)))?;
          if heads.len() != productions.len() {
            return Err(format_err(format!(
              "{} has {} productions but {} implies entries",
              symbol,
              productions.len(),
              heads.len()
            )));
          }
          heads.clone()
        }
        None => vec![0; productions.len()],
      };

      for (index, ((symbols, names), head)) in productions
        .iter()
        .zip(rule_constraints.iter())
        .zip(heads.into_iter())
        .enumerate()
      {
        rules.push(build_rule(symbol, index, symbols, names.as_deref(), head)?);
      }
    }

    let start = file.start.unwrap_or_else(|| DEFAULT_START.to_string());
    if !variables.contains_key(&start) && !terminals.contains_key(&start) {
      return Err(format_err(format!("start symbol {} is never defined", start)));
    }

    Ok(Self::new(start, rules, terminals))
  }

  fn new(
    start: String,
    rules: Vec<Rule>,
    terminals: BTreeMap<String, BTreeMap<String, Vec<String>>>,
  ) -> Self {
    let mut by_symbol: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut binary: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();
    let mut unary: HashMap<String, Vec<usize>> = HashMap::new();

    for (id, rule) in rules.iter().enumerate() {
      by_symbol.entry(rule.symbol.clone()).or_default().push(id);
      match &rule.production {
        Production::Binary(left, right) => binary
          .entry(left.clone())
          .or_default()
          .entry(right.clone())
          .or_default()
          .push(id),
        Production::Unary(child) => unary.entry(child.clone()).or_default().push(id),
      }
    }

    let mut lexicon: HashMap<String, Vec<(String, String)>> = HashMap::new();
    for (category, subcategories) in terminals.iter() {
      for (subcategory, words) in subcategories.iter() {
        for word in words {
          let entries = lexicon.entry(word.clone()).or_default();
          let entry = (category.clone(), subcategory.clone());
          if !entries.contains(&entry) {
            entries.push(entry);
          }
        }
      }
    }

    debug!(
      start = %start,
      rules = rules.len(),
      words = lexicon.len(),
      "grammar loaded"
    );

    Self {
      start,
      rules,
      by_symbol,
      binary,
      unary,
      terminals,
      lexicon,
    }
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  /// Productions of a nonterminal, in declaration order
  pub fn rules_for<'a>(&'a self, symbol: &str) -> impl Iterator<Item = &'a Rule> + 'a {
    self
      .by_symbol
      .get(symbol)
      .into_iter()
      .flatten()
      .map(move |id| &self.rules[*id])
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.by_symbol.keys().map(String::as_str)
  }

  pub fn categories(&self) -> impl Iterator<Item = &str> {
    self.terminals.keys().map(String::as_str)
  }

  /// Every binary rule whose production is exactly `left right`
  pub fn binary_rules<'a>(&'a self, left: &str, right: &str) -> impl Iterator<Item = &'a Rule> + 'a {
    self
      .binary
      .get(left)
      .and_then(|rights| rights.get(right))
      .into_iter()
      .flatten()
      .map(move |id| &self.rules[*id])
  }

  /// Every unary rule rewriting to `child`
  pub fn unary_rules<'a>(&'a self, child: &str) -> impl Iterator<Item = &'a Rule> + 'a {
    self
      .unary
      .get(child)
      .into_iter()
      .flatten()
      .map(move |id| &self.rules[*id])
  }

  /// Finds every nonterminal that the two adjacent constituents can combine
  /// into, along with the features the new constituent would carry. Rules
  /// whose agreement constraints fail are skipped.
  pub fn combine(
    &self,
    left: (&str, &FeatureMap),
    right: (&str, &FeatureMap),
  ) -> Vec<(&Rule, FeatureMap)> {
    self
      .binary_rules(left.0, right.0)
      .filter_map(|rule| rule.project(left.1, right.1).map(|fs| (rule, fs)))
      .collect()
  }

  /// Looks a stem up in the terminal lexicon. Each (category, subcategory)
  /// listing the stem yields one tag, whose features are the subcategory on
  /// its classified axis overlaid with `derived`.
  pub fn lookup_terminal(&self, stem: &str, derived: &FeatureMap) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for (category, subcategory) in self.lexicon.get(stem).into_iter().flatten() {
      let mut features = FeatureMap::new().with(FeatureAxis::of_label(subcategory), subcategory);
      features.overlay(derived);

      let tag = Tag::new(category.clone(), features);
      if !tags.contains(&tag) {
        tags.push(tag);
      }
    }
    tags
  }
}

fn format_err(msg: impl Into<String>) -> Error {
  Error::GrammarFormat(msg.into())
}

fn build_rule(
  symbol: &str,
  index: usize,
  symbols: &[String],
  names: Option<&[String]>,
  head: i64,
) -> Result<Rule> {
  let production = match symbols {
    [child] => Production::Unary(child.clone()),
    [left, right] => Production::Binary(left.clone(), right.clone()),
    _ => {
      return Err(format_err(format!(
        "{} production {} has {} symbols, expected 1 or 2",
        symbol,
        index,
        symbols.len()
      )));
    }
  };

  let head = match head {
    0 => 0,
    1 => 1,
    other => {
      return Err(format_err(format!(
        "{} production {} has head index {}, expected 0 or 1",
        symbol, index, other
      )));
    }
  };

  let constraints = names
    .unwrap_or_default()
    .iter()
    .map(|name| name.parse::<FeatureAxis>())
    .collect::<Result<Vec<_>>>()
    .map_err(|e| format_err(format!("{} production {}: {}", symbol, index, e)))?;

  if production.is_unary() && (head != 0 || !constraints.is_empty()) {
    return Err(format_err(format!(
      "unary production {} -> {} can't have constraints or a head other than 0",
      symbol, production
    )));
  }

  Ok(Rule {
    symbol: symbol.to_string(),
    index,
    production,
    constraints,
    head,
  })
}

impl FromStr for Grammar {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::from_json(s)
  }
}

impl fmt::Display for Grammar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "//** start: {}", self.start)?;
    write!(f, "//** nonterminals:")?;
    for nt in self.nonterminals() {
      write!(f, " {}", nt)?;
    }
    writeln!(f)?;

    write!(f, "//** categories:")?;
    for cat in self.categories() {
      write!(f, " {}", cat)?;
    }
    writeln!(f)?;

    for rule in self.rules.iter() {
      writeln!(f, "{}", rule)?;
    }

    Ok(())
  }
}
