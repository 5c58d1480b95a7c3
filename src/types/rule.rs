use super::super::matcher::{Bindings, MatchEngine, Matcher, Program};
use super::{
    assign_slots, patvars, union_vars, MatchFault, Pattern, RuleApplicationError, RuleError, Term,
};
use std::collections::HashSet;
use std::fmt;
use std::slice;
use std::sync::Arc;
use tracing::{debug, trace};

/// The host code behind a [`DynamicRule`].
///
/// Called with the matched term, the match's [`Bindings`], and the bound values in slot order.
/// Whatever it returns is the rewrite, unchecked; `None` declines the match.
///
/// [`DynamicRule`]: struct.DynamicRule.html
/// [`Bindings`]: matcher/struct.Bindings.html
pub type Callback = dyn Fn(&Term, &Bindings, &[Term]) -> Option<Term> + Send + Sync;

/// A left-to-right rewrite: matches of `left` are replaced by an instantiation of `right`.
pub struct RewriteRule {
    left: Pattern,
    right: Pattern,
    vars: Vec<String>,
    program: Program,
    engine: Arc<dyn MatchEngine>,
}

/// A rule whose right-hand side is a host [`Callback`].
///
/// [`Callback`]: type.Callback.html
pub struct DynamicRule {
    left: Pattern,
    vars: Vec<String>,
    program: Program,
    engine: Arc<dyn MatchEngine>,
    callback: Arc<Callback>,
}

/// Both sides of an [`Rule::Equality`] or [`Rule::Unequal`], each compiled.
///
/// These rules state a fact about two patterns rather than a term-to-term function, so they are
/// read by a saturation backend through [`Rule::program`] and [`Rule::right_program`] and never
/// applied directly.
///
/// [`Rule::Equality`]: enum.Rule.html#variant.Equality
/// [`Rule::Unequal`]: enum.Rule.html#variant.Unequal
/// [`Rule::program`]: enum.Rule.html#method.program
/// [`Rule::right_program`]: enum.Rule.html#method.right_program
pub struct BidirectionalRule {
    left: Pattern,
    right: Pattern,
    vars: Vec<String>,
    left_program: Program,
    right_program: Program,
}

/// A compiled rule.
///
/// Construction analyzes both sides once: the pattern variables of the left side followed by
/// those new on the right side are numbered into binding slots, both sides are annotated with
/// those slots, and the sides a rule matches with are compiled into [`Program`]s. After that a
/// `Rule` never changes and can be shared freely between threads; cloning one shares the
/// compiled payload rather than copying it.
///
/// [`Program`]: matcher/struct.Program.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_term, Rule};
/// let left = parse_term("a * b").expect("parsed left");
/// let right = parse_term("b * a").expect("parsed right");
/// let commute = Rule::rewrite(&left, &right).expect("rule");
///
/// assert_eq!(commute.to_string(), "mul(a, b) --> mul(b, a)");
/// assert_eq!(commute.slot("a"), Some(0));
/// assert_eq!(commute.slot("b"), Some(1));
///
/// let term = parse_term("mul(x, y)").expect("parsed term");
/// let once = commute.apply(&term).expect("applied").expect("rewritten");
/// assert_eq!(once, parse_term("mul(y, x)").expect("parsed"));
/// assert_eq!(commute.apply(&once).expect("applied"), Some(term));
/// ```
#[derive(Clone)]
pub enum Rule {
    /// `left --> right`
    Rewrite(Arc<RewriteRule>),
    /// `left => callback`
    Dynamic(Arc<DynamicRule>),
    /// `left == right`
    Equality(Arc<BidirectionalRule>),
    /// `left != right`
    Unequal(Arc<BidirectionalRule>),
}

fn default_engine() -> Arc<dyn MatchEngine> {
    Arc::new(Matcher::default())
}

/// Number the variables of both sides and annotate both sides with those slots.
fn analyze(left: &Term, right: &Term) -> Result<(Pattern, Pattern, Vec<String>), RuleError> {
    let vars = union_vars(&patvars(left), &patvars(right));
    let left = assign_slots(left, &vars)?;
    let right = assign_slots(right, &vars)?;
    Ok((left, right, vars))
}

/// The first slot `pattern` uses that a match left unbound.
fn unbound_slot(pattern: &Pattern, bindings: &Bindings) -> Option<usize> {
    pattern
        .slots()
        .into_iter()
        .map(|(_, slot)| slot)
        .find(|&slot| bindings.get(slot).is_none())
}

/// The first name of `of` missing from `from`.
fn unbound(of: &Pattern, from: &Pattern) -> Option<String> {
    let bound: HashSet<&str> = from.variables().into_iter().collect();
    of.variables()
        .into_iter()
        .find(|name| !bound.contains(name))
        .map(str::to_string)
}

impl Rule {
    /// Construct a [`Rule::Rewrite`] matched by the default [`Matcher`].
    ///
    /// Every variable of `right` must occur in `left`.
    ///
    /// [`Rule::Rewrite`]: #variant.Rewrite
    /// [`Matcher`]: matcher/struct.Matcher.html
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::{parse_term, Rule, RuleError};
    /// let left = parse_term("f(a)").expect("parsed left");
    /// let right = parse_term("g(a, b)").expect("parsed right");
    ///
    /// assert_eq!(
    ///     Rule::rewrite(&left, &right).unwrap_err(),
    ///     RuleError::UnboundVariable { name: "b".to_string() },
    /// );
    /// ```
    pub fn rewrite(left: &Term, right: &Term) -> Result<Rule, RuleError> {
        Rule::rewrite_with(default_engine(), left, right)
    }
    /// Like [`Rule::rewrite`], compiled by and matched with `engine`.
    ///
    /// [`Rule::rewrite`]: #method.rewrite
    pub fn rewrite_with(
        engine: Arc<dyn MatchEngine>,
        left: &Term,
        right: &Term,
    ) -> Result<Rule, RuleError> {
        let (left, right, vars) = analyze(left, right)?;
        if let Some(name) = unbound(&right, &left) {
            return Err(RuleError::UnboundVariable { name });
        }
        let program = engine.compile(&left);
        Ok(Rule::Rewrite(Arc::new(RewriteRule {
            left,
            right,
            vars,
            program,
            engine,
        })))
    }
    /// Construct a [`Rule::Dynamic`] matched by the default [`Matcher`].
    ///
    /// [`Rule::Dynamic`]: #variant.Dynamic
    /// [`Matcher`]: matcher/struct.Matcher.html
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::{parse_term, Rule, Term};
    /// let fold = Rule::dynamic(&parse_term("a * b").expect("parsed left"), |_, _, values| {
    ///     Some(Term::int(values[0].as_int()? * values[1].as_int()?))
    /// })
    /// .expect("rule");
    ///
    /// let term = parse_term("mul(2, 3)").expect("parsed term");
    /// assert_eq!(fold.apply(&term).expect("applied"), Some(Term::int(6)));
    ///
    /// let symbolic = parse_term("mul(2, x)").expect("parsed term");
    /// assert_eq!(fold.apply(&symbolic).expect("applied"), None);
    /// ```
    pub fn dynamic<F>(left: &Term, callback: F) -> Result<Rule, RuleError>
    where
        F: Fn(&Term, &Bindings, &[Term]) -> Option<Term> + Send + Sync + 'static,
    {
        Rule::dynamic_with(default_engine(), left, callback)
    }
    /// Like [`Rule::dynamic`], compiled by and matched with `engine`.
    ///
    /// [`Rule::dynamic`]: #method.dynamic
    pub fn dynamic_with<F>(
        engine: Arc<dyn MatchEngine>,
        left: &Term,
        callback: F,
    ) -> Result<Rule, RuleError>
    where
        F: Fn(&Term, &Bindings, &[Term]) -> Option<Term> + Send + Sync + 'static,
    {
        let vars = patvars(left);
        let left = assign_slots(left, &vars)?;
        let program = engine.compile(&left);
        Ok(Rule::Dynamic(Arc::new(DynamicRule {
            left,
            vars,
            program,
            engine,
            callback: Arc::new(callback),
        })))
    }
    /// Construct a [`Rule::Equality`]. Both sides must mention exactly the same variables.
    ///
    /// [`Rule::Equality`]: #variant.Equality
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::{parse_term, Rule, RuleError};
    /// let left = parse_term("a + b").expect("parsed left");
    ///
    /// assert!(Rule::equality(&left, &parse_term("b + a").expect("parsed right")).is_ok());
    /// assert_eq!(
    ///     Rule::equality(&left, &parse_term("a").expect("parsed right")).unwrap_err(),
    ///     RuleError::UnboundVariable { name: "b".to_string() },
    /// );
    /// ```
    pub fn equality(left: &Term, right: &Term) -> Result<Rule, RuleError> {
        Rule::equality_with(default_engine(), left, right)
    }
    /// Like [`Rule::equality`], compiled by `engine`.
    ///
    /// [`Rule::equality`]: #method.equality
    pub fn equality_with(
        engine: Arc<dyn MatchEngine>,
        left: &Term,
        right: &Term,
    ) -> Result<Rule, RuleError> {
        let rule = BidirectionalRule::new(engine.as_ref(), left, right)?;
        Ok(Rule::Equality(Arc::new(rule)))
    }
    /// Construct a [`Rule::Unequal`]. Both sides must mention exactly the same variables.
    ///
    /// [`Rule::Unequal`]: #variant.Unequal
    pub fn unequal(left: &Term, right: &Term) -> Result<Rule, RuleError> {
        Rule::unequal_with(default_engine(), left, right)
    }
    /// Like [`Rule::unequal`], compiled by `engine`.
    ///
    /// [`Rule::unequal`]: #method.unequal
    pub fn unequal_with(
        engine: Arc<dyn MatchEngine>,
        left: &Term,
        right: &Term,
    ) -> Result<Rule, RuleError> {
        let rule = BidirectionalRule::new(engine.as_ref(), left, right)?;
        Ok(Rule::Unequal(Arc::new(rule)))
    }
    /// The annotated left-hand side.
    pub fn left(&self) -> &Pattern {
        match self {
            Rule::Rewrite(r) => &r.left,
            Rule::Dynamic(r) => &r.left,
            Rule::Equality(r) | Rule::Unequal(r) => &r.left,
        }
    }
    /// The annotated right-hand side; `None` for a [`Rule::Dynamic`].
    ///
    /// [`Rule::Dynamic`]: #variant.Dynamic
    pub fn right(&self) -> Option<&Pattern> {
        match self {
            Rule::Rewrite(r) => Some(&r.right),
            Rule::Dynamic(_) => None,
            Rule::Equality(r) | Rule::Unequal(r) => Some(&r.right),
        }
    }
    /// The rule's pattern variables; a variable's position is its slot.
    pub fn variables(&self) -> &[String] {
        match self {
            Rule::Rewrite(r) => &r.vars,
            Rule::Dynamic(r) => &r.vars,
            Rule::Equality(r) | Rule::Unequal(r) => &r.vars,
        }
    }
    /// The slot of the variable `name`, if the rule has one.
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.variables().iter().position(|v| v == name)
    }
    /// The compiled left-hand side.
    pub fn program(&self) -> &Program {
        match self {
            Rule::Rewrite(r) => &r.program,
            Rule::Dynamic(r) => &r.program,
            Rule::Equality(r) | Rule::Unequal(r) => &r.left_program,
        }
    }
    /// The compiled right-hand side, which only bidirectional rules have.
    pub fn right_program(&self) -> Option<&Program> {
        match self {
            Rule::Equality(r) | Rule::Unequal(r) => Some(&r.right_program),
            Rule::Rewrite(_) | Rule::Dynamic(_) => None,
        }
    }
    /// Whether this is a [`Rule::Equality`] or [`Rule::Unequal`].
    ///
    /// [`Rule::Equality`]: #variant.Equality
    /// [`Rule::Unequal`]: #variant.Unequal
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, Rule::Equality(_) | Rule::Unequal(_))
    }
    /// Apply the `Rule` to `term`.
    ///
    /// Only a match covering exactly the whole of `term` (a match count of 1) is accepted; the
    /// first one the engine offers wins. `Ok(None)` means the rule did not apply, and `term`
    /// stands. A fault in the match engine is reported as a [`RuleApplicationError`], as is an
    /// accepted match that leaves a slot the rule needs unbound, and any attempt to apply a
    /// [`Rule::Equality`] or [`Rule::Unequal`].
    ///
    /// [`RuleApplicationError`]: struct.RuleApplicationError.html
    /// [`Rule::Equality`]: #variant.Equality
    /// [`Rule::Unequal`]: #variant.Unequal
    ///
    /// # Examples
    ///
    /// ```
    /// # use term_rules::{parse_term, Rule};
    /// let rule = Rule::equality(
    ///     &parse_term("a + b").expect("parsed left"),
    ///     &parse_term("b + a").expect("parsed right"),
    /// )
    /// .expect("rule");
    /// let term = parse_term("x + y").expect("parsed term");
    ///
    /// let err = rule.apply(&term).unwrap_err();
    /// assert_eq!(err.rule(), &rule);
    /// assert_eq!(err.term(), &term);
    /// ```
    pub fn apply(&self, term: &Term) -> Result<Option<Term>, RuleApplicationError> {
        let mut unbound = None;
        let outcome = match self {
            Rule::Rewrite(r) => r.engine.run(
                &r.program,
                slice::from_ref(term),
                Bindings::new(r.vars.len()),
                &mut |bindings: &Bindings, count: usize| {
                    if !self.accepts(count) {
                        return None;
                    }
                    if let Some(slot) = unbound_slot(&r.right, bindings) {
                        unbound = Some(slot);
                        return None;
                    }
                    r.right.instantiate(bindings)
                },
            ),
            Rule::Dynamic(r) => r.engine.run(
                &r.program,
                slice::from_ref(term),
                Bindings::new(r.vars.len()),
                &mut |bindings: &Bindings, count: usize| {
                    if !self.accepts(count) {
                        return None;
                    }
                    if let Some(slot) = unbound_slot(&r.left, bindings) {
                        unbound = Some(slot);
                        return None;
                    }
                    let values = bindings.values()?;
                    (r.callback)(term, bindings, values.as_slice())
                },
            ),
            Rule::Equality(_) | Rule::Unequal(_) => {
                debug!(rule = %self, "bidirectional rules cannot rewrite a single term");
                return Err(RuleApplicationError::new(self, term));
            }
        };
        let outcome = outcome.and_then(|found| match unbound {
            Some(slot) => Err(MatchFault::UnboundSlot { slot }),
            None => Ok(found),
        });
        match outcome {
            Ok(Some(rewritten)) => {
                trace!(rule = %self, from = %term, to = %rewritten, "rewrote");
                Ok(Some(rewritten))
            }
            Ok(None) => Ok(None),
            Err(fault) => {
                debug!(rule = %self, term = %term, %fault, "match engine fault");
                Err(RuleApplicationError::new(self, term))
            }
        }
    }
    fn accepts(&self, count: usize) -> bool {
        if count != 1 {
            debug!(rule = %self, count, "declined a match not covering exactly one term");
        }
        count == 1
    }
}

impl BidirectionalRule {
    fn new(engine: &dyn MatchEngine, left: &Term, right: &Term) -> Result<Self, RuleError> {
        let (left, right, vars) = analyze(left, right)?;
        if let Some(name) = unbound(&right, &left).or_else(|| unbound(&left, &right)) {
            return Err(RuleError::UnboundVariable { name });
        }
        Ok(BidirectionalRule {
            left_program: engine.compile(&left),
            right_program: engine.compile(&right),
            left,
            right,
            vars,
        })
    }
}

/// Rules are equal when they are the same kind with equal sides. Compiled programs, engines and
/// slot tables are derived from the sides and do not take part; dynamic rules compare their
/// callbacks by identity.
impl PartialEq for Rule {
    fn eq(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::Rewrite(a), Rule::Rewrite(b)) => a.left == b.left && a.right == b.right,
            (Rule::Dynamic(a), Rule::Dynamic(b)) => {
                a.left == b.left && Arc::ptr_eq(&a.callback, &b.callback)
            }
            (Rule::Equality(a), Rule::Equality(b)) | (Rule::Unequal(a), Rule::Unequal(b)) => {
                a.left == b.left && a.right == b.right
            }
            _ => false,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rule::Rewrite(r) => write!(f, "{} --> {}", r.left, r.right),
            Rule::Dynamic(r) => write!(f, "{} => <dynamic>", r.left),
            Rule::Equality(r) => write!(f, "{} == {}", r.left, r.right),
            Rule::Unequal(r) => write!(f, "{} != {}", r.left, r.right),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            Rule::Rewrite(_) => "Rewrite",
            Rule::Dynamic(_) => "Dynamic",
            Rule::Equality(_) => "Equality",
            Rule::Unequal(_) => "Unequal",
        };
        f.debug_struct(kind)
            .field("left", self.left())
            .field("right", &self.right())
            .field("variables", &self.variables())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Term {
        Term::symbol(name)
    }

    #[test]
    fn slots_follow_left_then_right_discovery() {
        let left = Term::call("f", vec![sym("b"), sym("a")]);
        let right = Term::call("g", vec![sym("a"), sym("c"), sym("b")]);
        let rule = Rule::equality(
            &Term::call("h", vec![left.clone(), sym("c")]),
            &right,
        )
        .expect("rule");
        assert_eq!(rule.variables(), &["b", "a", "c"]);
        assert_eq!(
            rule.right().expect("right side").slots(),
            vec![("a", 1), ("c", 2), ("b", 0)]
        );
    }

    #[test]
    fn unequal_checks_both_directions() {
        let a_only = Term::call("f", vec![sym("a")]);
        let a_and_b = Term::call("f", vec![sym("a"), sym("b")]);
        for (left, right) in [(&a_only, &a_and_b), (&a_and_b, &a_only)] {
            assert_eq!(
                Rule::unequal(left, right).unwrap_err(),
                RuleError::UnboundVariable {
                    name: "b".to_string()
                }
            );
        }
    }

    #[test]
    fn only_bidirectional_rules_have_right_programs() {
        let left = Term::call("f", vec![sym("a")]);
        let rewrite = Rule::rewrite(&left, &sym("a")).expect("rule");
        let equality = Rule::equality(&left, &Term::call("g", vec![sym("a")])).expect("rule");
        assert!(rewrite.right_program().is_none());
        assert!(!rewrite.is_bidirectional());
        assert!(equality.is_bidirectional());
        assert_eq!(equality.program().len(), 2);
        assert_eq!(equality.right_program().map(Program::len), Some(2));
    }

    #[test]
    fn equality_ignores_engines() {
        let left = Term::call("f", vec![sym("a")]);
        let plain = Rule::rewrite(&left, &sym("a")).expect("rule");
        let commutative = Rule::rewrite_with(
            Arc::new(Matcher::with_commutative(vec!["f"])),
            &left,
            &sym("a"),
        )
        .expect("rule");
        let unequal = Rule::unequal(&left, &Term::call("g", vec![sym("a")])).expect("rule");
        let equality = Rule::equality(&left, &Term::call("g", vec![sym("a")])).expect("rule");
        assert_eq!(plain, commutative);
        assert_ne!(unequal, equality);
    }

    #[test]
    fn dynamic_rules_compare_callbacks_by_identity() {
        let left = Term::call("f", vec![sym("a")]);
        let a = Rule::dynamic(&left, |t, _, _| Some(t.clone())).expect("rule");
        let b = Rule::dynamic(&left, |t, _, _| Some(t.clone())).expect("rule");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "f(a) => <dynamic>");
        assert_eq!(a.right(), None);
    }
}
