use std::error::Error;

/// Boxed static error type
pub type Err = Box<dyn Error + 'static>;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

/// Lowercases a string using Turkish casing rules, where `I` lowers to the
/// dotless `ı` and `İ` lowers to `i`.
///
/// ```
/// assert_eq!(kokparse::utils::turkish_lowercase("IRMAK İzmir"), "ırmak izmir");
/// ```
pub fn turkish_lowercase(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      'I' => out.push('ı'),
      'İ' => out.push('i'),
      c => out.extend(c.to_lowercase()),
    }
  }
  out
}

/// Splits a sentence on whitespace and strips leading/trailing punctuation
/// from every word, dropping words that were only punctuation.
pub fn tokenize(sentence: &str) -> Vec<&str> {
  sentence
    .split_whitespace()
    .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
    .filter(|w| !w.is_empty())
    .collect()
}
