//! Compile [`Pattern`]s into match [`Program`]s and run them against [`Term`]s.
//!
//! [`Rule`]s only talk to matching through the [`MatchEngine`] trait: `compile` once at
//! construction, `run` per application. [`Matcher`] is the engine rules use unless another is
//! supplied; it matches syntactically, optionally letting the arguments of binary commutative
//! heads match in either order.
//!
//! [`Pattern`]: ../enum.Pattern.html
//! [`Program`]: struct.Program.html
//! [`Term`]: ../enum.Term.html
//! [`Rule`]: ../enum.Rule.html
//! [`MatchEngine`]: trait.MatchEngine.html
//! [`Matcher`]: struct.Matcher.html

use smallvec::{smallvec, SmallVec};
use std::collections::BTreeSet;
use std::fmt;

use super::{Literal, MatchFault, Pattern, Term};

/// Called once per distinct match with the bindings and the number of candidate terms the match
/// covered. Returning `Some` ends the search with that result.
pub type OnMatch<'a> = dyn FnMut(&Bindings, usize) -> Option<Term> + 'a;

/// Something that can compile patterns and enumerate their matches.
pub trait MatchEngine: fmt::Debug + Send + Sync {
    /// Compile `pattern` into a reusable [`Program`].
    ///
    /// [`Program`]: struct.Program.html
    fn compile(&self, pattern: &Pattern) -> Program;
    /// Run `program` against `candidates`, starting from `bindings`.
    ///
    /// `on_match` is invoked once per distinct match found, in a deterministic order, until it
    /// returns `Some`; that value is the result. `Ok(None)` means no match was accepted.
    fn run(
        &self,
        program: &Program,
        candidates: &[Term],
        bindings: Bindings,
        on_match: &mut OnMatch<'_>,
    ) -> Result<Option<Term>, MatchFault>;
}

/// A slot-indexed binding environment for one match attempt.
///
/// `Bindings` are never updated in place: [`Bindings::bind`] returns a new environment, so an
/// environment handed to a continuation stays exactly as the match left it.
///
/// [`Bindings::bind`]: #method.bind
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    slots: Vec<Option<Term>>,
}
impl Bindings {
    /// An environment of `slots` unbound slots.
    pub fn new(slots: usize) -> Bindings {
        Bindings {
            slots: vec![None; slots],
        }
    }
    /// The number of slots, bound or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
    /// The term bound at `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<&Term> {
        self.slots.get(slot).and_then(Option::as_ref)
    }
    /// A copy of the environment with `term` bound at `slot`.
    pub fn bind(&self, slot: usize, term: Term) -> Result<Bindings, MatchFault> {
        if slot >= self.slots.len() {
            return Err(MatchFault::SlotOutOfRange {
                slot,
                capacity: self.slots.len(),
            });
        }
        let mut slots = self.slots.clone();
        slots[slot] = Some(term);
        Ok(Bindings { slots })
    }
    /// Every bound term in slot order, or `None` if some slot is unbound.
    pub fn values(&self) -> Option<Vec<Term>> {
        self.slots.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Instr {
    /// Bind the next subterm, or compare it against an earlier binding.
    Bind(usize),
    Literal(Literal),
    /// Check head and arity, then queue the arguments.
    Call {
        head: String,
        arity: usize,
        commutative: bool,
    },
}

/// A compiled pattern: a preorder sequence of match instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instrs: Vec<Instr>,
    slots: usize,
}
impl Program {
    /// The number of binding slots the program writes.
    pub fn slots(&self) -> usize {
        self.slots
    }
    /// The number of instructions.
    pub fn len(&self) -> usize {
        self.instrs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

type Work<'t> = SmallVec<[&'t Term; 16]>;

/// The default [`MatchEngine`]: syntactic matching, with repeated variables required to bind
/// equal subterms.
///
/// [`MatchEngine`]: trait.MatchEngine.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_term, Rule};
/// # use term_rules::matcher::Matcher;
/// # use std::sync::Arc;
/// let pattern = parse_term("add(a, 0)").expect("parsed pattern");
/// let identity = Rule::rewrite(&pattern, &parse_term("a").expect("parsed rhs")).expect("rule");
///
/// let term = parse_term("add(0, x)").expect("parsed term");
/// assert_eq!(identity.apply(&term).expect("applied"), None);
///
/// let commutative = Arc::new(Matcher::with_commutative(vec!["add"]));
/// let identity = Rule::rewrite_with(commutative, &pattern, &parse_term("a").expect("parsed rhs"))
///     .expect("rule");
/// assert_eq!(identity.apply(&term).expect("applied"), Some(parse_term("x").expect("parsed")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matcher {
    commutative: BTreeSet<String>,
}
impl Matcher {
    pub fn new() -> Matcher {
        Matcher::default()
    }
    /// A `Matcher` that tries both argument orders for binary calls with one of these `heads`.
    pub fn with_commutative<I, S>(heads: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Matcher {
            commutative: heads.into_iter().map(Into::into).collect(),
        }
    }
    pub fn is_commutative(&self, head: &str) -> bool {
        self.commutative.contains(head)
    }
    fn emit(&self, pattern: &Pattern, instrs: &mut Vec<Instr>) {
        match pattern {
            Pattern::Variable { slot, .. } => instrs.push(Instr::Bind(*slot)),
            Pattern::Literal(lit) => instrs.push(Instr::Literal(lit.clone())),
            Pattern::Call { head, args } => {
                instrs.push(Instr::Call {
                    head: head.clone(),
                    arity: args.len(),
                    commutative: args.len() == 2 && self.is_commutative(head),
                });
                args.iter().for_each(|arg| self.emit(arg, instrs));
            }
        }
    }
    fn exec<'t>(
        &self,
        program: &Program,
        mut pc: usize,
        mut work: Work<'t>,
        mut bindings: Bindings,
        on_match: &mut OnMatch<'_>,
    ) -> Result<Option<Term>, MatchFault> {
        while let Some(instr) = program.instrs.get(pc) {
            let term = work.pop().ok_or(MatchFault::StackUnderflow)?;
            match instr {
                Instr::Bind(slot) => match bindings.get(*slot) {
                    Some(bound) if bound != term => return Ok(None),
                    Some(_) => (),
                    None => bindings = bindings.bind(*slot, term.clone())?,
                },
                Instr::Literal(lit) => match term {
                    Term::Literal(l) if l == lit => (),
                    _ => return Ok(None),
                },
                Instr::Call {
                    head,
                    arity,
                    commutative,
                } => {
                    let args = match term.as_call() {
                        Some((h, args)) if h == head && args.len() == *arity => args,
                        _ => return Ok(None),
                    };
                    if *commutative && args[0] != args[1] {
                        let mut swapped = work.clone();
                        swapped.extend(args.iter());
                        work.extend(args.iter().rev());
                        let found =
                            self.exec(program, pc + 1, work, bindings.clone(), &mut *on_match)?;
                        if found.is_some() {
                            return Ok(found);
                        }
                        return self.exec(program, pc + 1, swapped, bindings, on_match);
                    }
                    work.extend(args.iter().rev());
                }
            }
            pc += 1;
        }
        if !work.is_empty() {
            return Err(MatchFault::TrailingInput(work.len()));
        }
        Ok(on_match(&bindings, 1))
    }
}
impl MatchEngine for Matcher {
    fn compile(&self, pattern: &Pattern) -> Program {
        let mut instrs = vec![];
        self.emit(pattern, &mut instrs);
        Program {
            instrs,
            slots: pattern.slot_count(),
        }
    }
    /// Matches the program against the first candidate; a match always covers exactly one term.
    fn run(
        &self,
        program: &Program,
        candidates: &[Term],
        bindings: Bindings,
        on_match: &mut OnMatch<'_>,
    ) -> Result<Option<Term>, MatchFault> {
        match candidates.first() {
            Some(term) => self.exec(program, 0, smallvec![term], bindings, on_match),
            None => Ok(None),
        }
    }
}
