//! A [Rust][0] library for compiling and applying first-order [term rewriting][1] rules.
//!
//! # Example
//!
//! ```
//! use term_rules::{parse_rules, parse_term, rewrite, Order, Rule, Strategy, Term};
//!
//! // Rules can be parsed from a small arithmetic surface syntax,
//! let rules = parse_rules("
//!     x + 0 --> x;
//!     x * 1 --> x;
//!     x * 0 --> 0;
//! ").expect("parsed rules");
//!
//! // and so can terms.
//! let term = parse_term("(a * 1 + 0) * (b * 0 + 0)").expect("parsed term");
//! assert_eq!(term.display(), "mul(add(mul(a, 1), 0), add(mul(b, 0), 0))");
//!
//! // `rewrite` applies the rules everywhere until nothing changes.
//! assert_eq!(rewrite(&term, &rules, Order::Outer).expect("rewritten"), Term::int(0));
//!
//! // Rules can also be built by hand, including rules whose right-hand side is Rust code.
//! let fold = Rule::dynamic(&parse_term("a + b").expect("parsed"), |_, _, values| {
//!     let sum = values[0].as_int()?.checked_add(values[1].as_int()?)?;
//!     Some(Term::int(sum))
//! })
//! .expect("rule");
//!
//! // Strategies combine rules into whole-term rewrites.
//! let evaluate = Strategy::postwalk(Strategy::chain(vec![fold]));
//! let sum = parse_term("1 + 2 + 3").expect("parsed term");
//! assert_eq!(evaluate.apply(&sum).expect("rewritten"), Term::int(6));
//! ```
//!
//! # Rules
//!
//! A rule relates two *templates*: terms in which every bare identifier that is not a call head
//! is a pattern variable. Constructing a [`Rule`] numbers the variables of both sides into
//! binding slots (left side first, each name at its first preorder occurrence), annotates both
//! sides with those slots, and compiles the sides it matches with into a match [`Program`].
//! Applying a rule runs that program against a term through a [`MatchEngine`]; the default
//! engine, [`Matcher`], matches syntactically.
//!
//! A rule that does not match leaves its term alone. Rules never fail silently: a fault inside
//! the match engine surfaces as a [`RuleApplicationError`] naming the rule and the term.
//!
//! # Strategies
//!
//! [`Strategy`] values lift rules to whole terms: [`Strategy::Chain`] tries rules in order at one
//! node, [`Strategy::Prewalk`] and [`Strategy::Postwalk`] visit every node top-down or bottom-up,
//! and [`Strategy::Fixpoint`] repeats until the term stops changing. [`rewrite`] packages the two
//! usual combinations behind an [`Order`].
//!
//! ### Further Reading
//!
//! - Baader & Nipkow (1999). [Term rewriting and all that][2]. Cambridge University Press.
//! - [Rewriting][1]. Wikipedia.
//!
//! [0]: https://www.rust-lang.org
//!      "The Rust Programming Language"
//! [1]: https://en.wikipedia.org/wiki/Rewriting#Term_rewriting_systems
//!      "Wikipedia - Term Rewriting Systems"
//! [2]: http://www.cambridge.org/us/academic/subjects/computer-science/programming-languages-and-applied-logic/term-rewriting-and-all
//!      "Term Rewriting and All That"
//! [`Rule`]: enum.Rule.html
//! [`Program`]: matcher/struct.Program.html
//! [`MatchEngine`]: matcher/trait.MatchEngine.html
//! [`Matcher`]: matcher/struct.Matcher.html
//! [`RuleApplicationError`]: struct.RuleApplicationError.html
//! [`Strategy`]: enum.Strategy.html
//! [`Strategy::Chain`]: enum.Strategy.html#variant.Chain
//! [`Strategy::Prewalk`]: enum.Strategy.html#variant.Prewalk
//! [`Strategy::Postwalk`]: enum.Strategy.html#variant.Postwalk
//! [`Strategy::Fixpoint`]: enum.Strategy.html#variant.Fixpoint
//! [`rewrite`]: fn.rewrite.html
//! [`Order`]: enum.Order.html

mod error;
pub mod matcher;
mod parser;
mod pretty;
mod types;

pub use error::{MatchFault, ParseError, RuleApplicationError, RuleError, UnknownOrder};
pub use parser::{parse_rule, parse_rules, parse_term};
pub use types::*;
