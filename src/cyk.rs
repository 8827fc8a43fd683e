use std::collections::HashSet;
use std::fmt;

use tracing::{debug, trace};

use crate::features::{FeatureMap, Tag};
use crate::grammar::Grammar;

/// Index type for the chart's node arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdx(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
  /// A token, as seeded from one of its tags
  Terminal { text: String },
  /// Built by a rule. `right` is `None` for unary rules.
  Internal {
    left: NodeIdx,
    right: Option<NodeIdx>,
  },
}

/// A constituent in the chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartNode {
  pub label: String,
  pub features: FeatureMap,
  /// Inclusive (start, end) token span
  pub span: (usize, usize),
  pub kind: NodeKind,
}

impl ChartNode {
  pub fn terminal(tag: &Tag, text: &str, position: usize) -> Self {
    Self {
      label: tag.category.clone(),
      features: tag.features.clone(),
      span: (position, position),
      kind: NodeKind::Terminal {
        text: text.to_string(),
      },
    }
  }

  pub fn internal(
    label: String,
    features: FeatureMap,
    span: (usize, usize),
    left: NodeIdx,
    right: Option<NodeIdx>,
  ) -> Self {
    Self {
      label,
      features,
      span,
      kind: NodeKind::Internal { left, right },
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self.kind, NodeKind::Terminal { .. })
  }

  pub fn text(&self) -> Option<&str> {
    match &self.kind {
      NodeKind::Terminal { text } => Some(text),
      NodeKind::Internal { .. } => None,
    }
  }

  pub fn children(&self) -> Vec<NodeIdx> {
    match &self.kind {
      NodeKind::Terminal { .. } => Vec::new(),
      NodeKind::Internal { left, right } => std::iter::once(*left).chain(*right).collect(),
    }
  }
}

impl fmt::Display for ChartNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}{}", self.span.0, self.span.1, self.label, self.features)
  }
}

/// The upper-triangular CYK table. Every node lives in one arena and cells
/// hold handles into it; a cell never holds two nodes with the same label and
/// features.
#[derive(Debug, Clone)]
pub struct Chart {
  words: Vec<String>,
  nodes: Vec<ChartNode>,
  /// n(n+1)/2 cells, row-major over start then end
  cells: Vec<Vec<NodeIdx>>,
  memo: HashSet<(usize, usize, String, FeatureMap)>,
}

impl Chart {
  pub fn new(words: &[&str]) -> Self {
    let n = words.len();
    Self {
      words: words.iter().map(|w| w.to_string()).collect(),
      nodes: Vec::new(),
      cells: vec![Vec::new(); n * (n + 1) / 2],
      memo: HashSet::new(),
    }
  }

  /// Number of tokens
  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn words(&self) -> &[String] {
    &self.words
  }

  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  pub fn node_count(&self) -> usize {
    self.nodes.len()
  }

  fn cell_index(&self, start: usize, end: usize) -> usize {
    let n = self.len();
    assert!(start <= end && end < n, "span {}..{} outside chart of {}", start, end, n);
    start * n - start * start.saturating_sub(1) / 2 + (end - start)
  }

  /// Node handles in the cell for the inclusive span `start..=end`
  pub fn cell(&self, start: usize, end: usize) -> &[NodeIdx] {
    &self.cells[self.cell_index(start, end)]
  }

  pub fn node(&self, idx: NodeIdx) -> &ChartNode {
    &self.nodes[idx.0 as usize]
  }

  pub fn nodes_at(&self, start: usize, end: usize) -> impl Iterator<Item = &ChartNode> {
    self.cell(start, end).iter().map(move |idx| self.node(*idx))
  }

  /// Adds a node to the cell for its span, unless the cell already has a
  /// node with the same label and features. Returns the new handle.
  pub fn add(&mut self, node: ChartNode) -> Option<NodeIdx> {
    let (start, end) = node.span;
    let key = (start, end, node.label.clone(), node.features.clone());
    if self.memo.contains(&key) {
      return None;
    }

    let cell = self.cell_index(start, end);
    let idx = NodeIdx(self.nodes.len() as u32);
    self.memo.insert(key);
    self.nodes.push(node);
    self.cells[cell].push(idx);
    Some(idx)
  }

  /// Handles in the top cell labelled `symbol`, in insertion order
  pub fn roots(&self, symbol: &str) -> Vec<NodeIdx> {
    if self.is_empty() {
      return Vec::new();
    }
    self
      .cell(0, self.len() - 1)
      .iter()
      .copied()
      .filter(|idx| self.node(*idx).label == symbol)
      .collect()
  }

  pub fn is_grammatical(&self, start: &str) -> bool {
    !self.roots(start).is_empty()
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for start in 0..self.len() {
      for end in start..self.len() {
        for node in self.nodes_at(start, end) {
          writeln!(f, "  {}", node)?;
        }
      }
    }
    Ok(())
  }
}

/// Fills a chart bottom-up. `tags[i]` holds the candidate tags of
/// `tokens[i]`; a token with no tags leaves its diagonal cell empty, which can
/// only make the sentence fail to parse.
pub fn parse_chart(g: &Grammar, tokens: &[&str], tags: &[Vec<Tag>]) -> Chart {
  debug_assert_eq!(tokens.len(), tags.len(), "one tag list per token");

  let mut chart = Chart::new(tokens);
  let n = chart.len();

  for (i, token) in tokens.iter().enumerate() {
    for tag in tags.get(i).into_iter().flatten() {
      chart.add(ChartNode::terminal(tag, token, i));
    }
    close_unary(g, &mut chart, i, i);
  }

  for span in 2..=n {
    for start in 0..=(n - span) {
      let end = start + span - 1;
      for split in start..end {
        let lefts = chart.cell(start, split).to_vec();
        let rights = chart.cell(split + 1, end).to_vec();

        for &l in lefts.iter() {
          for &r in rights.iter() {
            let candidates = {
              let left = chart.node(l);
              let right = chart.node(r);
              g.combine(
                (&left.label, &left.features),
                (&right.label, &right.features),
              )
            };

            for (rule, features) in candidates {
              let node = ChartNode::internal(rule.symbol.clone(), features, (start, end), l, Some(r));
              if chart.add(node).is_some() {
                trace!(start, end, split, rule = %rule, "combined");
              }
            }
          }
        }
      }
      close_unary(g, &mut chart, start, end);
    }
  }

  debug!(
    tokens = n,
    nodes = chart.node_count(),
    grammatical = chart.is_grammatical(&g.start),
    "filled chart"
  );

  chart
}

/// Applies unary rules within one cell until nothing new is added. The
/// number of distinct (label, features) pairs a cell can hold is finite, so
/// this always stops.
fn close_unary(g: &Grammar, chart: &mut Chart, start: usize, end: usize) {
  // need to use while loop because the cell can grow during the loop
  let mut pos = 0;
  while pos < chart.cell(start, end).len() {
    let child = chart.cell(start, end)[pos];
    pos += 1;

    let (label, features) = {
      let node = chart.node(child);
      (node.label.clone(), node.features.clone())
    };

    for rule in g.unary_rules(&label) {
      let node = ChartNode::internal(rule.symbol.clone(), features.clone(), (start, end), child, None);
      if chart.add(node).is_some() {
        trace!(start, end, rule = %rule, "projected");
      }
    }
  }
}
