use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  /// Half-open token span
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn is_branch(&self) -> bool {
    matches!(self, Self::Branch(_, _))
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  /// Words at the leaves, left to right
  pub fn leaves(&self) -> Vec<&U> {
    match self {
      Self::Leaf(w) => vec![&w.value],
      Self::Branch(_, children) => children.iter().flat_map(|c| c.leaves()).collect(),
    }
  }
}

/// `{}` renders a bracketed tree, `(S (NP (Det bir) (N kitap)) (VP (V okudum)))`.
/// `{:#}` renders one constituent per line, indented, with spans.
impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if f.alternate() {
      return match self {
        Self::Leaf(t) => write!(f, "{}", t),
        Self::Branch(t, ts) => {
          write!(f, "({}", t)?;
          for t in ts.iter() {
            let fmt = format!("{:#}", t);
            for line in fmt.lines() {
              write!(f, "\n  {}", line)?;
            }
          }
          write!(f, ")")
        }
      };
    }

    match self {
      Self::Leaf(t) => write!(f, "{}", t.value),
      Self::Branch(t, ts) => {
        write!(f, "({}", t.value)?;
        for t in ts.iter() {
          write!(f, " {}", t)?;
        }
        write!(f, ")")
      }
    }
  }
}
