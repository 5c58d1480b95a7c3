use super::{Rule, RuleApplicationError, Term, UnknownOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{trace, warn};

/// A whole-term rewrite built by nesting combinators around ordered rule lists.
///
/// Every `Strategy` maps a term to a term: a rule that does not apply leaves its term alone, and
/// a [`RuleApplicationError`] from any rule aborts the whole strategy.
///
/// [`RuleApplicationError`]: struct.RuleApplicationError.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_rules, parse_term, Strategy};
/// let rules = parse_rules("add(x, 0) --> x; mul(x, 1) --> x").expect("parsed rules");
/// let simplify = Strategy::fixpoint(Strategy::postwalk(Strategy::chain(rules)));
///
/// let term = parse_term("mul(add(y, 0), 1) + 0").expect("parsed term");
/// assert_eq!(simplify.apply(&term).expect("rewritten"), parse_term("y").expect("parsed"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Try each rule in order; the first that applies gives the result. If none applies, the
    /// term is returned unchanged.
    Chain(Vec<Rule>),
    /// Like `Chain`, but once a rule applies the whole chain gets one more pass over the result.
    RestartedChain(Vec<Rule>),
    /// Apply the strategy at a node, then descend into the children of the result.
    Prewalk(Box<Strategy>),
    /// Descend into the children first, then apply the strategy to the rebuilt node.
    Postwalk(Box<Strategy>),
    /// Reapply the strategy until its output equals its input.
    ///
    /// Diverges if the strategy never settles, e.g. a lone commutativity rule.
    Fixpoint(Box<Strategy>),
    /// Like `Fixpoint`, but stops at the last new term once a term repeats.
    FixpointNoCycle(Box<Strategy>),
    /// Apply each strategy to the output of the previous one.
    Sequence(Vec<Strategy>),
}
impl Strategy {
    pub fn chain<I: IntoIterator<Item = Rule>>(rules: I) -> Strategy {
        Strategy::Chain(rules.into_iter().collect())
    }
    pub fn restarted_chain<I: IntoIterator<Item = Rule>>(rules: I) -> Strategy {
        Strategy::RestartedChain(rules.into_iter().collect())
    }
    pub fn prewalk(inner: Strategy) -> Strategy {
        Strategy::Prewalk(Box::new(inner))
    }
    pub fn postwalk(inner: Strategy) -> Strategy {
        Strategy::Postwalk(Box::new(inner))
    }
    pub fn fixpoint(inner: Strategy) -> Strategy {
        Strategy::Fixpoint(Box::new(inner))
    }
    pub fn fixpoint_no_cycle(inner: Strategy) -> Strategy {
        Strategy::FixpointNoCycle(Box::new(inner))
    }
    pub fn sequence<I: IntoIterator<Item = Strategy>>(strategies: I) -> Strategy {
        Strategy::Sequence(strategies.into_iter().collect())
    }
    /// Rewrite `term` with the `Strategy`.
    pub fn apply(&self, term: &Term) -> Result<Term, RuleApplicationError> {
        match self {
            Strategy::Chain(rules) => Ok(chain(rules, term)?.unwrap_or_else(|| term.clone())),
            Strategy::RestartedChain(rules) => match chain(rules, term)? {
                Some(rewritten) => Ok(chain(rules, &rewritten)?.unwrap_or(rewritten)),
                None => Ok(term.clone()),
            },
            Strategy::Prewalk(inner) => {
                let rewritten = inner.apply(term)?;
                rewritten.try_map_args(|arg| self.apply(arg))
            }
            Strategy::Postwalk(inner) => {
                let rebuilt = term.try_map_args(|arg| self.apply(arg))?;
                inner.apply(&rebuilt)
            }
            Strategy::Fixpoint(inner) => {
                let mut current = term.clone();
                loop {
                    let next = inner.apply(&current)?;
                    if next == current {
                        return Ok(next);
                    }
                    trace!(from = %current, to = %next, "fixpoint step");
                    current = next;
                }
            }
            Strategy::FixpointNoCycle(inner) => {
                let mut seen = HashSet::new();
                let mut current = term.clone();
                loop {
                    let next = inner.apply(&current)?;
                    if next == current {
                        return Ok(next);
                    }
                    seen.insert(current.clone());
                    if seen.contains(&next) {
                        warn!(at = %current, back_to = %next, "fixpoint cycle, stopping");
                        return Ok(current);
                    }
                    current = next;
                }
            }
            Strategy::Sequence(strategies) => strategies
                .iter()
                .try_fold(term.clone(), |current, strategy| strategy.apply(&current)),
        }
    }
}

/// The result of the first rule in `rules` to apply to `term`.
fn chain(rules: &[Rule], term: &Term) -> Result<Option<Term>, RuleApplicationError> {
    for rule in rules {
        if let Some(rewritten) = rule.apply(term)? {
            return Ok(Some(rewritten));
        }
    }
    Ok(None)
}

/// The traversal order of [`rewrite`].
///
/// [`rewrite`]: fn.rewrite.html
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Sweep top-down: `Fixpoint(Prewalk(Fixpoint(Chain(rules))))`.
    Inner,
    /// Sweep bottom-up: `Fixpoint(Postwalk(Fixpoint(Chain(rules))))`.
    Outer,
}
impl Order {
    /// The [`Strategy`] [`rewrite`] runs for this order. The rules are shared, not copied.
    ///
    /// [`Strategy`]: enum.Strategy.html
    /// [`rewrite`]: fn.rewrite.html
    pub fn strategy(self, rules: &[Rule]) -> Strategy {
        let local = Strategy::fixpoint(Strategy::chain(rules.iter().cloned()));
        let sweep = match self {
            Order::Inner => Strategy::prewalk(local),
            Order::Outer => Strategy::postwalk(local),
        };
        Strategy::fixpoint(sweep)
    }
}
impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Order::Inner => write!(f, "inner"),
            Order::Outer => write!(f, "outer"),
        }
    }
}
impl FromStr for Order {
    type Err = UnknownOrder;
    fn from_str(s: &str) -> Result<Order, UnknownOrder> {
        match s {
            "inner" => Ok(Order::Inner),
            "outer" => Ok(Order::Outer),
            _ => Err(UnknownOrder(s.to_string())),
        }
    }
}

/// Rewrite `term` with `rules` until nothing in the tree changes.
///
/// At each node the rules are applied as a [`Strategy::Chain`] until that node settles; the
/// tree is swept in the given [`Order`], and sweeps repeat until a whole sweep changes nothing.
/// Termination depends on the rules.
///
/// [`Strategy::Chain`]: enum.Strategy.html#variant.Chain
/// [`Order`]: enum.Order.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_rules, parse_term, rewrite, Order};
/// let rules = parse_rules("
///     # peano addition
///     add(s(x), y) --> s(add(x, y));
///     add(:z, y) --> y;
/// ").expect("parsed rules");
/// let term = parse_term("add(s(s(:z)), s(:z))").expect("parsed term");
///
/// let three = parse_term("s(s(s(:z)))").expect("parsed");
/// assert_eq!(rewrite(&term, &rules, Order::Inner).expect("rewritten"), three);
/// assert_eq!(rewrite(&term, &rules, Order::Outer).expect("rewritten"), three);
/// ```
pub fn rewrite(term: &Term, rules: &[Rule], order: Order) -> Result<Term, RuleApplicationError> {
    order.strategy(rules).apply(term)
}
