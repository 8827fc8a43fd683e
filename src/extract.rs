use crate::cyk::{Chart, NodeIdx, NodeKind};
use crate::syntree::{Constituent, SynTree, Word};

/// Every tree rooted at `start` that spans the whole sentence, in the order
/// the roots were added to the chart. Empty when the sentence doesn't parse.
pub fn extract_parses(chart: &Chart, start: &str) -> Vec<SynTree<String, String>> {
  chart
    .roots(start)
    .into_iter()
    .map(|root| build_tree(chart, root))
    .collect()
}

/// Expands one chart node into the tree it heads. Terminal nodes become a
/// constituent over a single word.
pub fn build_tree(chart: &Chart, idx: NodeIdx) -> SynTree<String, String> {
  let node = chart.node(idx);
  let span = (node.span.0, node.span.1 + 1);
  let cons = Constituent {
    value: node.label.clone(),
    span,
  };

  match &node.kind {
    NodeKind::Terminal { text } => SynTree::Branch(
      cons,
      vec![SynTree::Leaf(Word {
        value: text.clone(),
        span,
      })],
    ),
    NodeKind::Internal { left, right } => {
      let children = std::iter::once(*left)
        .chain(*right)
        .map(|child| build_tree(chart, child))
        .collect();
      SynTree::Branch(cons, children)
    }
  }
}
