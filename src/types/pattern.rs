use super::super::matcher::Bindings;
use super::super::pretty::Pretty;
use super::{Literal, RuleError, Term};
use itertools::Itertools;
use std::fmt;

/// Every pattern variable in a template, in preorder, each name once at its first occurrence.
///
/// Call heads and literals are never pattern variables; every other identifier is.
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_term, patvars};
/// let template = parse_term("f(b, g(a, :c, 1), b)").expect("parsed template");
///
/// assert_eq!(patvars(&template), vec!["b", "a"]);
/// ```
pub fn patvars(template: &Term) -> Vec<String> {
    template
        .preorder()
        .filter_map(Term::as_symbol)
        .unique()
        .map(str::to_string)
        .collect()
}

/// The left-first union of two variable orderings, keeping first-seen order.
pub fn union_vars(left: &[String], right: &[String]) -> Vec<String> {
    left.iter().chain(right).unique().cloned().collect()
}

/// Annotate a template with binding slots, producing a new [`Pattern`].
///
/// Each pattern variable gets the index of its name in `vars`. A variable missing from `vars`
/// is a [`RuleError::UnboundVariable`].
///
/// [`Pattern`]: enum.Pattern.html
/// [`RuleError::UnboundVariable`]: enum.RuleError.html#variant.UnboundVariable
///
/// # Examples
///
/// ```
/// # use term_rules::{assign_slots, parse_term, Pattern};
/// let template = parse_term("f(y, x)").expect("parsed template");
/// let vars = vec!["x".to_string(), "y".to_string()];
/// let pattern = assign_slots(&template, &vars).expect("annotated");
///
/// assert_eq!(pattern.slots(), vec![("y", 1), ("x", 0)]);
/// ```
pub fn assign_slots(template: &Term, vars: &[String]) -> Result<Pattern, RuleError> {
    match template {
        Term::Symbol(name) => match vars.iter().position(|v| v == name) {
            Some(slot) => Ok(Pattern::Variable {
                name: name.clone(),
                slot,
            }),
            None => Err(RuleError::UnboundVariable { name: name.clone() }),
        },
        Term::Literal(lit) => Ok(Pattern::Literal(lit.clone())),
        Term::Call { head, args } => Ok(Pattern::Call {
            head: head.clone(),
            args: args
                .iter()
                .map(|arg| assign_slots(arg, vars))
                .collect::<Result<_, _>>()?,
        }),
    }
}

/// A template whose pattern variables carry binding slots.
///
/// Build one with [`assign_slots`]; [`Rule`] constructors do this for both sides of a rule at
/// once so a variable shared by both sides has a single slot.
///
/// [`assign_slots`]: fn.assign_slots.html
/// [`Rule`]: enum.Rule.html
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches any subterm and records it at `slot`.
    Variable { name: String, slot: usize },
    /// Matches exactly this literal. A quoted atom `:k` in a template is a literal, so it
    /// matches only the atom `:k`.
    Literal(Literal),
    /// Matches a call with this head and arguments matching `args`.
    Call { head: String, args: Vec<Pattern> },
}
impl Pattern {
    /// Serialize a `Pattern` in canonical prefix form.
    pub fn display(&self) -> String {
        match self {
            Pattern::Variable { name, .. } => name.clone(),
            Pattern::Literal(lit) => lit.to_string(),
            Pattern::Call { head, args } => {
                format!("{}({})", head, args.iter().map(Pattern::display).join(", "))
            }
        }
    }
    pub fn pretty(&self) -> String {
        Pretty::pretty(self)
    }
    /// Every variable occurrence with its slot, in preorder, each name once.
    pub fn slots(&self) -> Vec<(&str, usize)> {
        let mut slots = vec![];
        self.collect_slots(&mut slots);
        slots.into_iter().unique().collect()
    }
    fn collect_slots<'a>(&'a self, slots: &mut Vec<(&'a str, usize)>) {
        match self {
            Pattern::Variable { name, slot } => slots.push((name, *slot)),
            Pattern::Call { args, .. } => args.iter().for_each(|arg| arg.collect_slots(slots)),
            Pattern::Literal(_) => (),
        }
    }
    /// The distinct variable names, in preorder.
    pub fn variables(&self) -> Vec<&str> {
        self.slots().into_iter().map(|(name, _)| name).collect()
    }
    /// One more than the largest slot used, or 0 for a ground pattern.
    pub fn slot_count(&self) -> usize {
        self.slots()
            .iter()
            .map(|&(_, slot)| slot + 1)
            .max()
            .unwrap_or(0)
    }
    pub fn is_ground(&self) -> bool {
        self.slots().is_empty()
    }
    /// Instantiate the `Pattern`, replacing each variable with the term bound at its slot and
    /// copying everything else.
    ///
    /// Returns `None` if some slot the `Pattern` uses is unbound.
    pub fn instantiate(&self, bindings: &Bindings) -> Option<Term> {
        match self {
            Pattern::Variable { slot, .. } => bindings.get(*slot).cloned(),
            Pattern::Literal(lit) => Some(Term::Literal(lit.clone())),
            Pattern::Call { head, args } => Some(Term::Call {
                head: head.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.instantiate(bindings))
                    .collect::<Option<_>>()?,
            }),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn patvars_skips_heads_and_literals() {
        let template = Term::call(
            "f",
            vec![
                Term::symbol("x"),
                Term::call("x", vec![Term::int(1), Term::string("y"), Term::atom("z")]),
                Term::symbol("w"),
                Term::symbol("x"),
            ],
        );
        assert_eq!(patvars(&template), names(&["x", "w"]));
    }

    #[test]
    fn union_keeps_left_then_right_order() {
        let left = names(&["b", "a"]);
        let right = names(&["c", "a", "d", "b"]);
        assert_eq!(union_vars(&left, &right), names(&["b", "a", "c", "d"]));
        assert_eq!(union_vars(&[], &right), right);
    }

    #[test]
    fn assign_slots_does_not_touch_template() {
        let template = Term::call("f", vec![Term::symbol("a"), Term::atom("k")]);
        let before = template.clone();
        let pattern = assign_slots(&template, &names(&["z", "a"])).expect("annotated");

        assert_eq!(template, before);
        assert_eq!(
            pattern,
            Pattern::Call {
                head: "f".to_string(),
                args: vec![
                    Pattern::Variable {
                        name: "a".to_string(),
                        slot: 1
                    },
                    Pattern::Literal(Literal::Atom("k".to_string())),
                ],
            }
        );
        assert_eq!(pattern.slot_count(), 2);
        assert_eq!(pattern.display(), "f(a, :k)");
    }

    #[test]
    fn assign_slots_rejects_unknown_variable() {
        let template = Term::call("f", vec![Term::symbol("a"), Term::symbol("b")]);
        assert_eq!(
            assign_slots(&template, &names(&["a"])),
            Err(RuleError::UnboundVariable {
                name: "b".to_string()
            })
        );
    }

    #[test]
    fn instantiate_needs_every_slot() {
        let vars = names(&["a", "b"]);
        let template = Term::call("g", vec![Term::symbol("b"), Term::int(0), Term::symbol("a")]);
        let pattern = assign_slots(&template, &vars).expect("annotated");

        let partial = Bindings::new(2).bind(0, Term::symbol("x")).expect("bound");
        assert_eq!(pattern.instantiate(&partial), None);

        let full = partial.bind(1, Term::int(7)).expect("bound");
        assert_eq!(
            pattern.instantiate(&full),
            Some(Term::call(
                "g",
                vec![Term::int(7), Term::int(0), Term::symbol("x")]
            ))
        );
    }

    #[test]
    fn ground_patterns_have_no_slots() {
        let pattern = assign_slots(&Term::call("f", vec![Term::int(1)]), &[]).expect("annotated");
        assert!(pattern.is_ground());
        assert_eq!(pattern.slot_count(), 0);
        assert_eq!(
            pattern.instantiate(&Bindings::new(0)),
            Some(Term::call("f", vec![Term::int(1)]))
        );
    }

    #[test]
    fn quoted_atoms_stay_literal() {
        let template = Term::call("f", vec![Term::atom("k"), Term::symbol("x")]);
        let pattern = assign_slots(&template, &patvars(&template)).expect("annotated");
        assert_eq!(pattern.variables(), vec!["x"]);

        let bound = Bindings::new(1).bind(0, Term::atom("j")).expect("bound");
        assert_eq!(
            pattern.instantiate(&bound),
            Some(Term::call("f", vec![Term::atom("k"), Term::atom("j")]))
        );
    }
}
