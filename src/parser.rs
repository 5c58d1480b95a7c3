use super::{Literal, ParseError, Rule, Term};

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag};
use nom::character::complete::{
    alpha1, alphanumeric1, char, digit1, multispace1, not_line_ending, one_of,
};
use nom::combinator::{map, map_res, opt, recognize, value};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

/// Parse a string as a [`Term`].
///
/// # Term syntax
///
/// ```text
/// term      = sum
/// sum       = product *( ("+" / "-") product )    ; add(...) / sub(...), left-associative
/// product   = primary *( ("*" / "/") primary )    ; mul(...) / div(...), left-associative
/// primary   = "(" term ")" / call / literal / identifier
/// call      = identifier "(" [ term *( "," term ) ] ")"
/// literal   = integer / string / ":" identifier
/// integer   = [ "-" ] 1*DIGIT
/// string    = DQUOTE *( char / "\" escape ) DQUOTE
/// identifier = ( ALPHA / "_" ) *( ALPHA / DIGIT / "_" )
/// ```
///
/// Whitespace and `#` line comments may appear between tokens.
///
/// [`Term`]: enum.Term.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_term, Term};
/// let term = parse_term("f(x, :y, -2) * \"s\"").expect("parsed term");
///
/// assert_eq!(
///     term,
///     Term::call(
///         "mul",
///         vec![
///             Term::call("f", vec![Term::symbol("x"), Term::atom("y"), Term::int(-2)]),
///             Term::string("s"),
///         ],
///     ),
/// );
/// ```
pub fn parse_term(input: &str) -> Result<Term, ParseError> {
    match delimited(sp, term, sp)(input) {
        Ok(("", t)) => Ok(t),
        Ok((_, _)) => Err(ParseError::ParseIncomplete),
        Err(_) => Err(ParseError::ParseFailed),
    }
}

/// Parse a string as a [`Rule`]: `lhs --> rhs`, `lhs == rhs`, or `lhs != rhs`.
///
/// [`Rule`]: enum.Rule.html
///
/// # Examples
///
/// ```
/// # use term_rules::{parse_rule, ParseError, RuleError};
/// let rule = parse_rule("a + b == b + a").expect("parsed rule");
/// assert_eq!(rule.to_string(), "add(a, b) == add(b, a)");
///
/// assert_eq!(
///     parse_rule("f(a) --> g(b)").unwrap_err(),
///     ParseError::Rule(RuleError::UnboundVariable { name: "b".to_string() }),
/// );
/// ```
pub fn parse_rule(input: &str) -> Result<Rule, ParseError> {
    match delimited(sp, rule, sp)(input) {
        Ok(("", r)) => r.build(),
        Ok((_, _)) => Err(ParseError::ParseIncomplete),
        Err(_) => Err(ParseError::ParseFailed),
    }
}

/// Parse a string as an ordered list of [`Rule`]s separated by `;`.
///
/// [`Rule`]: enum.Rule.html
///
/// # Examples
///
/// ```
/// # use term_rules::parse_rules;
/// let rules = parse_rules("
///     # identities
///     x + 0 --> x;
///     x * 1 --> x;
/// ").expect("parsed rules");
///
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[1].to_string(), "mul(x, 1) --> x");
/// ```
pub fn parse_rules(input: &str) -> Result<Vec<Rule>, ParseError> {
    let program = delimited(
        sp,
        pair(separated_list0(ws(char(';')), rule), opt(ws(char(';')))),
        sp,
    )(input);
    match program {
        Ok(("", (rules, _))) => rules.into_iter().map(RuleSyntax::build).collect(),
        Ok((_, _)) => Err(ParseError::ParseIncomplete),
        Err(_) => Err(ParseError::ParseFailed),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrow {
    Rewrite,
    Equality,
    Unequal,
}

#[derive(Debug)]
struct RuleSyntax {
    left: Term,
    arrow: Arrow,
    right: Term,
}
impl RuleSyntax {
    fn build(self) -> Result<Rule, ParseError> {
        match self.arrow {
            Arrow::Rewrite => Rule::rewrite(&self.left, &self.right),
            Arrow::Equality => Rule::equality(&self.left, &self.right),
            Arrow::Unequal => Rule::unequal(&self.left, &self.right),
        }
        .map_err(ParseError::from)
    }
}

/// Whitespace and `#` comments.
fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((multispace1, preceded(char('#'), not_line_ending)))),
    )(input)
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(sp, inner, sp)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn integer(input: &str) -> IResult<&str, Literal> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>().map(Literal::Int)
    })(input)
}

fn string(input: &str) -> IResult<&str, Literal> {
    let escapes = alt((
        value("\\", tag("\\")),
        value("\"", tag("\"")),
        value("\n", tag("n")),
        value("\t", tag("t")),
    ));
    map(
        delimited(
            char('"'),
            opt(escaped_transform(is_not("\\\""), '\\', escapes)),
            char('"'),
        ),
        |s: Option<String>| Literal::Str(s.unwrap_or_default()),
    )(input)
}

fn atom(input: &str) -> IResult<&str, Literal> {
    map(preceded(char(':'), identifier), |name: &str| {
        Literal::Atom(name.to_string())
    })(input)
}

fn literal(input: &str) -> IResult<&str, Term> {
    map(alt((integer, string, atom)), Term::Literal)(input)
}

fn call_or_symbol(input: &str) -> IResult<&str, Term> {
    let args = delimited(
        ws(char('(')),
        separated_list0(ws(char(',')), term),
        preceded(sp, char(')')),
    );
    map(pair(identifier, opt(args)), |(name, args)| match args {
        Some(args) => Term::call(name, args),
        None => Term::symbol(name),
    })(input)
}

fn primary(input: &str) -> IResult<&str, Term> {
    alt((
        delimited(ws(char('(')), term, preceded(sp, char(')'))),
        literal,
        call_or_symbol,
    ))(input)
}

fn binary_head(op: char) -> &'static str {
    match op {
        '+' => "add",
        '-' => "sub",
        '*' => "mul",
        _ => "div",
    }
}

fn fold_binary(first: Term, rest: Vec<(char, Term)>) -> Term {
    rest.into_iter().fold(first, |acc, (op, t)| {
        Term::call(binary_head(op), vec![acc, t])
    })
}

fn product(input: &str) -> IResult<&str, Term> {
    map(
        pair(primary, many0(pair(ws(one_of("*/")), primary))),
        |(first, rest)| fold_binary(first, rest),
    )(input)
}

fn term(input: &str) -> IResult<&str, Term> {
    map(
        pair(product, many0(pair(ws(one_of("+-")), product))),
        |(first, rest)| fold_binary(first, rest),
    )(input)
}

fn arrow(input: &str) -> IResult<&str, Arrow> {
    alt((
        value(Arrow::Rewrite, tag("-->")),
        value(Arrow::Equality, tag("==")),
        value(Arrow::Unequal, tag("!=")),
    ))(input)
}

fn rule(input: &str) -> IResult<&str, RuleSyntax> {
    map(tuple((term, ws(arrow), term)), |(left, arrow, right)| {
        RuleSyntax { left, arrow, right }
    })(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> Term {
        Term::symbol(name)
    }

    #[test]
    fn precedence_and_associativity() {
        let term = parse_term("a - b - c * d / e").expect("parsed");
        assert_eq!(
            term,
            Term::call(
                "sub",
                vec![
                    Term::call("sub", vec![sym("a"), sym("b")]),
                    Term::call(
                        "div",
                        vec![Term::call("mul", vec![sym("c"), sym("d")]), sym("e")]
                    ),
                ]
            )
        );
        assert_eq!(
            parse_term("(a - b) * c").expect("parsed").display(),
            "mul(sub(a, b), c)"
        );
    }

    #[test]
    fn negative_integers_and_subtraction() {
        assert_eq!(
            parse_term("x-1").expect("parsed"),
            Term::call("sub", vec![sym("x"), Term::int(1)])
        );
        assert_eq!(
            parse_term("x - -1").expect("parsed"),
            Term::call("sub", vec![sym("x"), Term::int(-1)])
        );
        assert_eq!(parse_term("-12").expect("parsed"), Term::int(-12));
    }

    #[test]
    fn strings_and_escapes() {
        assert_eq!(parse_term("\"\"").expect("parsed"), Term::string(""));
        assert_eq!(
            parse_term(r#""say \"hi\"\n""#).expect("parsed"),
            Term::string("say \"hi\"\n")
        );
    }

    #[test]
    fn calls_symbols_and_comments() {
        let term = parse_term("f( # first\n  g(), _tmp1 ,:k )").expect("parsed");
        assert_eq!(
            term,
            Term::call(
                "f",
                vec![Term::call("g", vec![]), sym("_tmp1"), Term::atom("k")]
            )
        );
    }

    #[test]
    fn display_round_trips() {
        for input in ["f(g(x, 1), \"s\", :a)", "mul(add(a, b), sub(c, -3))", "h()"] {
            let term = parse_term(input).expect("parsed");
            assert_eq!(term.display(), input);
            assert_eq!(parse_term(&term.pretty()).expect("parsed pretty"), term);
        }
    }

    #[test]
    fn failures() {
        assert_eq!(parse_term("f(x"), Err(ParseError::ParseIncomplete));
        assert_eq!(parse_term("+ x"), Err(ParseError::ParseFailed));
        assert_eq!(parse_term("f(x) g"), Err(ParseError::ParseIncomplete));
        assert_eq!(parse_term(""), Err(ParseError::ParseFailed));
        assert_eq!(parse_rule("f(x)").unwrap_err(), ParseError::ParseFailed);
        assert_eq!(parse_rule("f(x) --> x y").unwrap_err(), ParseError::ParseIncomplete);
        assert_eq!(parse_rules("a --> a; b").unwrap_err(), ParseError::ParseIncomplete);
    }

    #[test]
    fn rule_arrows() {
        let rules = parse_rules("x --> f(x); x == g(x); x != h(x)").expect("parsed");
        let kinds: Vec<_> = rules
            .iter()
            .map(|r| (r.is_bidirectional(), r.to_string()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (false, "x --> f(x)".to_string()),
                (true, "x == g(x)".to_string()),
                (true, "x != h(x)".to_string()),
            ]
        );
        assert_eq!(parse_rules("  # nothing here\n").expect("parsed"), vec![]);
    }
}
