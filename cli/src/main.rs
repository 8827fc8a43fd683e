use std::env;
use std::io;
use std::io::Write;
use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use kokparse::morphology::{AnalysisTable, ExternalAnalyzer, Lexicon, Morphology, SuffixStemmer, SuffixTable};
use kokparse::utils::{tokenize, turkish_lowercase};
use kokparse::{Err, Grammar, Parser};

const DEFAULT_LEXICON: &str = "data/lexicon.txt";
const DEFAULT_SUFFIXES: &str = "data/suffixes.json";
const DEFAULT_ANALYSES: &str = "data/analyses.json";

/// Sentences the bundled demo grammar accepts
const EXAMPLES: &[&str] = &[
  "Ben bir kitap okudum.",
  "Dün kitapları okudum.",
  "Biz okula geldik.",
  "Geldim.",
];

/// Sentences the bundled demo grammar rejects, for agreement failures
const NEGATIVE_EXAMPLES: &[&str] = &[
  "Ben kitap okudun.",
  "Yarın kitap okudum.",
  "Biz okula geldim.",
];

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} GRAMMAR [options]

Reads sentences from stdin, one per line, and prints every parse.

Options:
  -h, --help                 Print this message
  -c, --chart                Print the parse chart (defaults to not printing)
  -m, --morphology STRATEGY  `stemmer` (default) or `external`
  -l, --lexicon FILE         Stem list for the stemmer (default {})
  -s, --suffixes FILE        Suffix table for the stemmer (default {})
      --corpus FILE          Corpus used to rank spelling corrections
      --no-derivational      Don't strip derivational suffixes
  -a, --analyses FILE        Analysis table for the external strategy (default {})
  -e, --examples             Parse the built-in example sentences and exit

Set RUST_LOG (e.g. RUST_LOG=kokparse=debug) to see tagging and parse logs.",
    prog_name, DEFAULT_LEXICON, DEFAULT_SUFFIXES, DEFAULT_ANALYSES
  )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
  Stemmer,
  External,
}

struct Args {
  grammar: String,
  print_chart: bool,
  strategy: Strategy,
  lexicon: String,
  suffixes: String,
  corpus: Option<String>,
  use_derivational: bool,
  analyses: String,
  examples: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    if v.is_empty() {
      return Err(Self::make_error_message("bad argument vector", "kokparse"));
    }

    let args_len = v.len();
    let mut iter = v.into_iter();
    let prog_name = iter.next().unwrap_or_else(|| "kokparse".to_string());

    if args_len < 2 {
      return Err(Self::make_error_message("not enough arguments", prog_name));
    }

    let mut grammar: Option<String> = None;
    let mut print_chart = false; // default to *not* printing the chart
    let mut strategy = Strategy::Stemmer;
    let mut lexicon = DEFAULT_LEXICON.to_string();
    let mut suffixes = DEFAULT_SUFFIXES.to_string();
    let mut corpus = None;
    let mut use_derivational = true;
    let mut analyses = DEFAULT_ANALYSES.to_string();
    let mut examples = false;

    while let Some(o) = iter.next() {
      let mut value = |name: &str| {
        iter
          .next()
          .ok_or_else(|| Self::make_error_message(&format!("{} needs a value", name), &prog_name))
      };

      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-c" || o == "--chart" {
        print_chart = true;
      } else if o == "-m" || o == "--morphology" {
        strategy = match value(o.as_str())?.as_str() {
          "stemmer" => Strategy::Stemmer,
          "external" => Strategy::External,
          other => {
            return Err(Self::make_error_message(
              &format!("unknown morphology strategy {}", other),
              prog_name,
            ));
          }
        };
      } else if o == "-l" || o == "--lexicon" {
        lexicon = value(o.as_str())?;
      } else if o == "-s" || o == "--suffixes" {
        suffixes = value(o.as_str())?;
      } else if o == "--corpus" {
        corpus = Some(value(o.as_str())?);
      } else if o == "--no-derivational" {
        use_derivational = false;
      } else if o == "-a" || o == "--analyses" {
        analyses = value(o.as_str())?;
      } else if o == "-e" || o == "--examples" {
        examples = true;
      } else if grammar.is_none() && !o.starts_with('-') {
        grammar = Some(o);
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    if let Some(grammar) = grammar {
      Ok(Self {
        grammar,
        print_chart,
        strategy,
        lexicon,
        suffixes,
        corpus,
        use_derivational,
        analyses,
        examples,
      })
    } else {
      Err(Self::make_error_message("missing grammar file", prog_name))
    }
  }

  fn morphology(&self) -> Result<Box<dyn Morphology>, Err> {
    match self.strategy {
      Strategy::Stemmer => {
        let mut lexicon = Lexicon::load(&self.lexicon)?;
        if let Some(corpus) = &self.corpus {
          lexicon = lexicon.with_corpus(&std::fs::read_to_string(corpus)?);
        }
        let suffixes = SuffixTable::load(&self.suffixes, self.use_derivational)?;
        info!(
          stems = lexicon.len(),
          suffixes = suffixes.len(),
          "loaded stemmer"
        );
        Ok(Box::new(SuffixStemmer::new(lexicon, suffixes)))
      }
      Strategy::External => {
        let table = AnalysisTable::load(&self.analyses)?;
        info!(path = %self.analyses, "loaded analysis table");
        Ok(Box::new(ExternalAnalyzer::new(table)))
      }
    }
  }
}

fn parse(parser: &Parser<'_>, sentence: &str, print_chart: bool) {
  let sentence = turkish_lowercase(sentence);
  let tokens = tokenize(&sentence);

  let parse = parser.parse(&tokens);

  if print_chart {
    println!("chart:\n{}", parse.chart.table());
  }

  for &i in parse.unresolved.iter() {
    println!("unknown word: {}", parse.tokens[i]);
  }

  let trees = parse.distinct_trees();
  println!(
    "Parsed {} tree{}",
    trees.len(),
    if trees.len() == 1 { "" } else { "s" }
  );

  for t in trees {
    println!("{}", t);
    println!();
  }
}

fn run_examples(parser: &Parser<'_>, print_chart: bool) {
  println!("== sentences expected to parse ==");
  for sentence in EXAMPLES {
    println!("> {}", sentence);
    parse(parser, sentence, print_chart);
  }

  println!("== sentences expected to fail ==");
  for sentence in NEGATIVE_EXAMPLES {
    println!("> {}", sentence);
    parse(parser, sentence, print_chart);
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let g = Grammar::load(&opts.grammar)?;
  info!(path = %opts.grammar, rules = g.rules().len(), "loaded grammar");

  let parser = Parser::new(&g, opts.morphology()?);

  if opts.examples {
    run_examples(&parser, opts.print_chart);
    return Ok(());
  }

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    match io::stdin().read_line(&mut input) {
      Ok(_) => {
        if input.is_empty() {
          // ctrl+d
          return Ok(());
        }
        parse(&parser, input.trim(), opts.print_chart);
        input.clear();
      }
      Err(error) => return Err(error.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn demo_parser(g: &Grammar) -> Parser<'_> {
    let stemmer = SuffixStemmer::new(
      Lexicon::parse(include_str!("../../data/lexicon.txt")),
      SuffixTable::from_json(include_str!("../../data/suffixes.json"), true).unwrap(),
    );
    Parser::new(g, stemmer)
  }

  fn parses(parser: &Parser<'_>, sentence: &str) -> bool {
    let sentence = turkish_lowercase(sentence);
    parser.parse(&tokenize(&sentence)).is_grammatical()
  }

  #[test]
  fn test_examples_match_demo_grammar() {
    let g = Grammar::from_json(include_str!("../../data/grammar.json")).unwrap();
    let parser = demo_parser(&g);

    for sentence in EXAMPLES {
      assert!(parses(&parser, sentence), "should parse: {}", sentence);
    }
    for sentence in NEGATIVE_EXAMPLES {
      assert!(!parses(&parser, sentence), "should not parse: {}", sentence);
    }
  }

  #[test]
  fn test_examples_flag() {
    let args = ["kokparse", "data/grammar.json", "--examples", "-m", "external"]
      .iter()
      .map(|a| a.to_string())
      .collect();
    let opts = Args::parse(args).unwrap();
    assert!(opts.examples);
    assert_eq!(opts.strategy, Strategy::External);
    assert_eq!(opts.grammar, "data/grammar.json");

    let args = vec!["kokparse".to_string(), "-s".to_string()];
    assert!(Args::parse(args).is_err());
  }
}
