use super::super::pretty::Pretty;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A preorder walk over a [`Term`] and all of its subterms.
///
/// [`Term`]: enum.Term.html
pub struct Preorder<'a> {
    pending: SmallVec<[&'a Term; 32]>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Term;
    fn next(&mut self) -> Option<&'a Term> {
        let term = self.pending.pop()?;
        self.pending.extend(term.children().iter().rev());
        Some(term)
    }
}

/// A literal value. Literals are never pattern variables.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub enum Literal {
    /// An integer, e.g. `42` or `-7`.
    Int(i64),
    /// A string, e.g. `"hello"`.
    Str(String),
    /// A quoted atom, e.g. `:x`. Distinct from the symbol `x`, and never a pattern variable.
    Atom(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Atom(name) => write!(f, ":{}", name),
        }
    }
}

/// A symbolic term: a symbol, a literal, or a call of a named head on zero or more `Term`s.
///
/// The same type serves for concrete terms and for the templates [`Rule`]s are built from.
///
/// [`Rule`]: enum.Rule.html
///
/// # Examples
///
/// ```
/// # use term_rules::{Term, parse_term};
/// let term = Term::call("mul", vec![Term::symbol("x"), Term::int(2)]);
///
/// assert_eq!(term, parse_term("mul(x, 2)").expect("parsed term"));
/// assert_eq!(term.display(), "mul(x, 2)");
/// assert_eq!(term.pretty(), "x * 2");
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub enum Term {
    /// A bare identifier (e.g. `x`, `pi`). In a pattern, a `Symbol` is a pattern variable.
    Symbol(String),
    /// A [`Literal`] value.
    ///
    /// [`Literal`]: enum.Literal.html
    Literal(Literal),
    /// A head applied to arguments (e.g. `f(x, y)`, `g()`). The head is never a pattern variable.
    Call { head: String, args: Vec<Term> },
}
impl Term {
    pub fn symbol<S: Into<String>>(name: S) -> Term {
        Term::Symbol(name.into())
    }
    pub fn int(n: i64) -> Term {
        Term::Literal(Literal::Int(n))
    }
    pub fn string<S: Into<String>>(s: S) -> Term {
        Term::Literal(Literal::Str(s.into()))
    }
    pub fn atom<S: Into<String>>(name: S) -> Term {
        Term::Literal(Literal::Atom(name.into()))
    }
    pub fn call<S: Into<String>>(head: S, args: Vec<Term>) -> Term {
        Term::Call {
            head: head.into(),
            args,
        }
    }
    /// Serialize a `Term` in canonical prefix form.
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::parse_term;
    /// let term = parse_term("a * (b + 2) - f(:c, \"d\")").expect("parsed term");
    ///
    /// assert_eq!(term.display(), "sub(mul(a, add(b, 2)), f(:c, \"d\"))");
    /// ```
    pub fn display(&self) -> String {
        match self {
            Term::Symbol(name) => name.clone(),
            Term::Literal(lit) => lit.to_string(),
            Term::Call { head, args } => {
                format!("{}({})", head, args.iter().map(Term::display).join(", "))
            }
        }
    }
    /// A human-readable serialization of the `Term`, printing arithmetic heads infix.
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::parse_term;
    /// let term = parse_term("sub(mul(a, add(b, 2)), sub(c, d))").expect("parsed term");
    ///
    /// assert_eq!(term.pretty(), "a * (b + 2) - (c - d)");
    /// ```
    pub fn pretty(&self) -> String {
        Pretty::pretty(self)
    }
    /// The head of a call, or `None` for symbols and literals.
    pub fn head(&self) -> Option<&str> {
        match self {
            Term::Call { head, .. } => Some(head),
            _ => None,
        }
    }
    /// The immediate subterms; empty for symbols and literals.
    pub fn children(&self) -> &[Term] {
        match self {
            Term::Call { args, .. } => args,
            _ => &[],
        }
    }
    pub fn as_call(&self) -> Option<(&str, &[Term])> {
        match self {
            Term::Call { head, args } => Some((head, args)),
            _ => None,
        }
    }
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Term::Symbol(name) => Some(name),
            _ => None,
        }
    }
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::Literal(Literal::Int(n)) => Some(*n),
            _ => None,
        }
    }
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }
    /// Rebuild the `Term` from the same head and new arguments.
    ///
    /// Symbols and literals have no arguments, so `args` is ignored and the leaf is returned as is.
    pub fn with_args(&self, args: Vec<Term>) -> Term {
        match self {
            Term::Call { head, .. } => Term::Call {
                head: head.clone(),
                args,
            },
            leaf => leaf.clone(),
        }
    }
    /// Rebuild the `Term` by mapping `f` over its arguments, stopping at the first error.
    pub fn try_map_args<E, F>(&self, f: F) -> Result<Term, E>
    where
        F: FnMut(&Term) -> Result<Term, E>,
    {
        match self {
            Term::Call { head, args } => Ok(Term::Call {
                head: head.clone(),
                args: args.iter().map(f).collect::<Result<_, _>>()?,
            }),
            leaf => Ok(leaf.clone()),
        }
    }
    /// Returns an iterator performing a preorder traversal of the `Term`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::parse_term;
    /// let term = parse_term("f(g(x), h(y, z))").expect("parsed term");
    ///
    /// let preorder: Vec<_> = term.preorder().map(|t| t.display()).collect();
    /// assert_eq!(preorder, vec!["f(g(x), h(y, z))", "g(x)", "x", "h(y, z)", "y", "z"]);
    /// ```
    pub fn preorder(&self) -> Preorder<'_> {
        let mut pending = SmallVec::new();
        pending.push(self);
        Preorder { pending }
    }
    /// The number of nodes in the `Term`.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Term::size).sum::<usize>()
    }
    /// The length of the longest path from the root to a leaf, counting nodes.
    pub fn height(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(Term::height)
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Term {
        Term::Literal(lit)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Term {
        Term::int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_and_height() {
        let leaf = Term::symbol("x");
        assert_eq!(leaf.size(), 1);
        assert_eq!(leaf.height(), 1);

        let term = Term::call(
            "f",
            vec![Term::call("g", vec![Term::int(1)]), Term::symbol("y")],
        );
        assert_eq!(term.size(), 4);
        assert_eq!(term.height(), 3);
    }

    #[test]
    fn with_args_keeps_head_and_leaves() {
        let term = Term::call("f", vec![Term::symbol("x")]);
        assert_eq!(
            term.with_args(vec![Term::int(1), Term::int(2)]),
            Term::call("f", vec![Term::int(1), Term::int(2)])
        );
        assert_eq!(
            Term::symbol("x").with_args(vec![Term::int(1)]),
            Term::symbol("x")
        );
    }

    #[test]
    fn try_map_args_stops_on_error() {
        let term = Term::call("f", vec![Term::int(1), Term::symbol("x"), Term::int(3)]);
        let doubled: Result<Term, String> = term.try_map_args(|arg| match arg.as_int() {
            Some(n) => Ok(Term::int(n * 2)),
            None => Err(arg.display()),
        });
        assert_eq!(doubled, Err("x".to_string()));

        let empty = Term::call("g", vec![]);
        assert_eq!(empty.try_map_args::<(), _>(|t| Ok(t.clone())), Ok(empty.clone()));
    }

    #[test]
    fn literal_display() {
        assert_eq!(Term::int(-4).display(), "-4");
        assert_eq!(Term::string("a \"b\"").display(), "\"a \\\"b\\\"\"");
        assert_eq!(Term::atom("pi").display(), ":pi");
        assert_eq!(Term::call("f", vec![]).display(), "f()");
    }

    #[test]
    fn terms_hash_structurally() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        seen.insert(Term::call("f", vec![Term::symbol("x")]));
        assert!(seen.contains(&Term::call("f", vec![Term::symbol("x")])));
        assert!(!seen.contains(&Term::call("f", vec![Term::symbol("y")])));
    }
}
