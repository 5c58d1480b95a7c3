use thiserror::Error;

use super::{Rule, Term};

/// The error type for [`Rule`] construction.
///
/// [`Rule`]: enum.Rule.html
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// A pattern variable occurs on one side of a rule but is never bound by the other.
    ///
    /// Returned by [`Rule::rewrite`] when the right-hand side mentions a variable the left-hand
    /// side does not bind, and by [`Rule::equality`] and [`Rule::unequal`] when the two sides do
    /// not mention exactly the same variables.
    ///
    /// [`Rule::rewrite`]: enum.Rule.html#method.rewrite
    /// [`Rule::equality`]: enum.Rule.html#method.equality
    /// [`Rule::unequal`]: enum.Rule.html#method.unequal
    #[error("unbound pattern variable `{name}`")]
    UnboundVariable { name: String },
}

/// The single error a rule application can raise.
///
/// Carries the offending rule and the exact term handed to [`Rule::apply`]. Raised when the
/// match engine faults, or when a bidirectional rule is asked to rewrite a single term.
///
/// [`Rule::apply`]: enum.Rule.html#method.apply
#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to apply rule `{rule}` to term `{term}`")]
pub struct RuleApplicationError {
    rule: Box<Rule>,
    term: Box<Term>,
}

impl RuleApplicationError {
    pub(crate) fn new(rule: &Rule, term: &Term) -> RuleApplicationError {
        RuleApplicationError {
            rule: Box::new(rule.clone()),
            term: Box::new(term.clone()),
        }
    }
    /// The rule whose application failed.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
    /// The term the rule was applied to.
    pub fn term(&self) -> &Term {
        &self.term
    }
}

/// A fault raised inside a [`MatchEngine`] while running a [`Program`].
///
/// Faults never escape [`Rule::apply`]; they are normalized into a [`RuleApplicationError`].
///
/// [`MatchEngine`]: matcher/trait.MatchEngine.html
/// [`Program`]: matcher/struct.Program.html
/// [`Rule::apply`]: enum.Rule.html#method.apply
/// [`RuleApplicationError`]: struct.RuleApplicationError.html
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFault {
    /// An instruction referred to a binding slot the environment does not have.
    #[error("binding slot {slot} out of range for an environment of {capacity} slots")]
    SlotOutOfRange { slot: usize, capacity: usize },
    /// The program expected another subterm but none was left to match.
    #[error("program ran past the end of its input")]
    StackUnderflow,
    /// A match was reported with a slot the rule reads still unbound.
    #[error("match left binding slot {slot} unbound")]
    UnboundSlot { slot: usize },
    /// The program finished with subterms still waiting to be matched.
    #[error("program finished with {0} unmatched subterms")]
    TrailingInput(usize),
    /// Engine-specific fault.
    #[error("{0}")]
    Engine(String),
}

/// The error type for parsing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input parsed, but text was left over.
    #[error("parse incomplete")]
    ParseIncomplete,
    /// The input could not be parsed.
    #[error("parse failed")]
    ParseFailed,
    /// The input parsed as a rule, but the rule is malformed.
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Returned when parsing an [`Order`] from a name other than `inner` or `outer`.
///
/// [`Order`]: enum.Order.html
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rewrite order `{0}` (expected `inner` or `outer`)")]
pub struct UnknownOrder(pub String);
