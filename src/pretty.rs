use itertools::Itertools;

use super::{Pattern, Term};

/// Binding strength of the heads printed infix.
fn infix(head: &str) -> Option<(&'static str, u8)> {
    match head {
        "add" => Some(("+", 1)),
        "sub" => Some(("-", 1)),
        "mul" => Some(("*", 2)),
        "div" => Some(("/", 2)),
        _ => None,
    }
}

pub trait Pretty: Sized {
    fn as_call(&self) -> Option<(&str, &[Self])>;
    fn display(&self) -> String;

    fn pretty(&self) -> String {
        self.pretty_inner(0, false)
    }
    /// `min_prec` is the weakest operator that may print without parentheses; `strict` also
    /// parenthesizes an operator binding exactly as tightly, for right operands.
    fn pretty_inner(&self, min_prec: u8, strict: bool) -> String {
        if let Some((head, args)) = self.as_call() {
            if let (Some((op, prec)), 2) = (infix(head), args.len()) {
                let s = format!(
                    "{} {} {}",
                    args[0].pretty_inner(prec, false),
                    op,
                    args[1].pretty_inner(prec, true)
                );
                return if prec < min_prec || (strict && prec == min_prec) {
                    format!("({})", s)
                } else {
                    s
                };
            }
            let args_str = args.iter().map(|arg| arg.pretty_inner(0, false)).join(", ");
            format!("{}({})", head, args_str)
        } else {
            self.display()
        }
    }
}
impl Pretty for Term {
    fn as_call(&self) -> Option<(&str, &[Term])> {
        self.as_call()
    }
    fn display(&self) -> String {
        self.display()
    }
}
impl Pretty for Pattern {
    fn as_call(&self) -> Option<(&str, &[Pattern])> {
        match self {
            Pattern::Call { head, args } => Some((head, args)),
            _ => None,
        }
    }
    fn display(&self) -> String {
        self.display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(head: &str, args: Vec<Term>) -> Term {
        Term::call(head, args)
    }

    #[test]
    fn pretty_infix_minimal_parens() {
        let (a, b, c) = (Term::symbol("a"), Term::symbol("b"), Term::symbol("c"));

        let left_assoc = t("sub", vec![t("sub", vec![a.clone(), b.clone()]), c.clone()]);
        assert_eq!(left_assoc.pretty(), "a - b - c");

        let right_nested = t("sub", vec![a.clone(), t("sub", vec![b.clone(), c.clone()])]);
        assert_eq!(right_nested.pretty(), "a - (b - c)");

        let mixed = t("add", vec![a.clone(), t("mul", vec![b.clone(), c.clone()])]);
        assert_eq!(mixed.pretty(), "a + b * c");

        let grouped = t("mul", vec![t("add", vec![a.clone(), b.clone()]), c.clone()]);
        assert_eq!(grouped.pretty(), "(a + b) * c");
    }

    #[test]
    fn pretty_prefix_calls() {
        let term = t(
            "f",
            vec![t("add", vec![Term::int(1), Term::int(2)]), Term::atom("k")],
        );
        assert_eq!(term.pretty(), "f(1 + 2, :k)");
        assert_eq!(t("add", vec![Term::int(1)]).pretty(), "add(1)");
    }
}
