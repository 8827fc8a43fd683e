use std::fmt;

use crate::cyk::Chart;

/// Helper struct for displaying a chart as a table. Rows are span starts,
/// columns are span ends, and each cell lists the labels found there.
#[derive(Clone)]
pub struct ChartTable<'a> {
  pub chart: &'a Chart,
}

impl Chart {
  pub fn table(&self) -> ChartTable<'_> {
    ChartTable { chart: self }
  }
}

impl ChartTable<'_> {
  /// Distinct labels of a cell, in insertion order
  pub fn labels(&self, start: usize, end: usize) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::new();
    for node in self.chart.nodes_at(start, end) {
      if !labels.contains(&node.label.as_str()) {
        labels.push(&node.label);
      }
    }
    labels
  }

  fn cell_text(&self, start: usize, end: usize) -> String {
    if start > end {
      String::new()
    } else {
      let labels = self.labels(start, end);
      if labels.is_empty() {
        "-".to_string()
      } else {
        labels.join(",")
      }
    }
  }
}

impl fmt::Display for ChartTable<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let n = self.chart.len();
    let words = self.chart.words();

    let rows = (0..n)
      .map(|start| (0..n).map(|end| self.cell_text(start, end)).collect::<Vec<_>>())
      .collect::<Vec<_>>();

    let header_width = words.iter().map(|w| w.chars().count()).max().unwrap_or(0);
    let widths = (0..n)
      .map(|end| {
        rows
          .iter()
          .map(|row| row[end].chars().count())
          .chain(std::iter::once(words[end].chars().count()))
          .max()
          .unwrap_or(0)
      })
      .collect::<Vec<_>>();

    write!(f, "{:w$}", "", w = header_width)?;
    for (end, word) in words.iter().enumerate() {
      write!(f, " | {:w$}", word, w = widths[end])?;
    }
    writeln!(f, " |")?;

    for (start, row) in rows.iter().enumerate() {
      write!(f, "{:w$}", words[start], w = header_width)?;
      for (end, cell) in row.iter().enumerate() {
        write!(f, " | {:w$}", cell, w = widths[end])?;
      }
      writeln!(f, " |")?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crate::cyk::parse_chart;
  use crate::features::{FeatureAxis, FeatureMap, Tag};
  use crate::grammar::Grammar;

  #[test]
  fn test_table_layout() {
    let g = Grammar::from_json(
      r#"{ "variables": { "S": [["N", "V"]] }, "constraints": { "S": [[]] }, "terminals": {} }"#,
    )
    .unwrap();
    let tags = vec![
      vec![
        Tag::new("N", FeatureMap::new()),
        Tag::new("N", FeatureMap::new().with(FeatureAxis::Number, "Plural")),
      ],
      vec![Tag::new("V", FeatureMap::new())],
    ];
    let chart = parse_chart(&g, &["ev", "yandı"], &tags);
    let table = chart.table();

    // two N readings, one label
    assert_eq!(table.labels(0, 0), vec!["N"]);
    assert_eq!(
      format!("{}", table),
      "      | ev | yandı |\nev    | N  | S     |\nyandı |    | V     |\n"
    );
  }
}
