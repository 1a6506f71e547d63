//! Text -> [`Expr`] parser for the Python-style syntax accepted by the derivative pipeline.
//!
//! Grammar, loosest binding first:
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := atom (('**' | '^') unary)?
//! atom    := number | name '(' sum ')' | name | '(' sum ')'
//! ```
//! so `-x**2` is `-(x**2)` and `2**-1` is accepted, as in Python. There is no implicit
//! multiplication: `2x` is rejected.
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{bracket_depth, operator_count};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{all_consuming, map, not, opt, recognize},
    error::{Error, ErrorKind},
    multi::many0,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, terminated},
};
use std::f64::consts::{E, PI};

/// Deepest bracket nesting the recursive descent will accept.
pub const MAX_NESTING: usize = 200;

/// Most operator tokens one expression may hold. Sign runs and operator chains each add a
/// tree level, so this bounds the depth of every later recursive walk.
pub const MAX_OPERATORS: usize = 200;

const FUNCTION_NAMES: [&str; 20] = [
    "sin", "cos", "tan", "tg", "cot", "ctg", "asin", "arcsin", "acos", "arccos", "atan",
    "arctan", "arctg", "acot", "arccot", "arcctg", "exp", "log", "ln", "sqrt",
];

fn apply_function(name: &str, arg: Expr) -> Option<Expr> {
    let arg = arg.boxed();
    let expr = match name {
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "cot" | "ctg" => Expr::ctg(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(arg),
        "exp" => Expr::Exp(arg),
        "log" | "ln" => Expr::Ln(arg),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        _ => return None,
    };
    Some(expr)
}

/// Unsigned decimal literal; signs belong to the unary rule.
fn parse_number(input: &str) -> IResult<&str, Expr> {
    if !input.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Float)));
    }
    let (rest, text) = recognize_float::<&str, Error<&str>>(input)?;
    match text.parse::<f64>() {
        Ok(value) => Ok((rest, Expr::Const(value))),
        Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
    }
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alpha1, many0(alt((alphanumeric1, tag("_")))))).parse(input)
}

/// Variable, named constant or function call.
fn parse_named(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    let (after_space, _) = multispace0(rest)?;
    if after_space.starts_with('(') {
        if !FUNCTION_NAMES.contains(&name) {
            return Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify)));
        }
        let (rest, arg) = parse_parenthesized(after_space)?;
        return match apply_function(name, arg) {
            Some(expr) => Ok((rest, expr)),
            None => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
        };
    }
    let expr = match name {
        "pi" => Expr::Const(PI),
        "E" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    };
    Ok((rest, expr))
}

fn parse_parenthesized(input: &str) -> IResult<&str, Expr> {
    delimited(char('('), parse_sum, preceded(multispace0, char(')'))).parse(input)
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((parse_number, parse_named, parse_parenthesized)).parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input)?;
    let power_operator = preceded(multispace0, alt((tag("**"), tag("^"))));
    let (input, exponent) = opt(preceded(power_operator, parse_unary)).parse(input)?;
    match exponent {
        Some(exponent) => Ok((input, base.pow(exponent))),
        None => Ok((input, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    alt((
        map(preceded(char('-'), parse_unary), |expr| -expr),
        preceded(char('+'), parse_unary),
        parse_power,
    ))
    .parse(input)
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_unary(input)?;
    let operator = preceded(
        multispace0,
        alt((terminated(char('*'), not(char('*'))), char('/'))),
    );
    let (input, rest) = many0(pair(operator, parse_unary)).parse(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| {
        if op == '*' { acc * rhs } else { acc / rhs }
    });
    Ok((input, expr))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_product(input)?;
    let operator = preceded(multispace0, one_of("+-"));
    let (input, rest) = many0(pair(operator, parse_product)).parse(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| {
        if op == '+' { acc + rhs } else { acc - rhs }
    });
    Ok((input, expr))
}

/// Character position of `rest` inside `input`, skipping leading blanks of `rest`.
fn error_position(input: &str, rest: &str) -> (usize, String) {
    let rest = rest.trim_start();
    let offset = input.len() - rest.len();
    let position = input[..offset].chars().count();
    let excerpt: String = rest.chars().take(12).collect();
    (position, excerpt)
}

/// Parses `input` into an expression tree.
///
/// # Errors
/// A message naming what was wrong: unbalanced or too deeply nested brackets, too many
/// operators, an unknown function, or the position of the first character that does not fit the grammar.
pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    if input.trim().is_empty() {
        return Err("empty expression".to_string());
    }
    let depth = bracket_depth(input)?;
    if depth > MAX_NESTING {
        return Err(format!(
            "brackets nested {} deep, at most {} allowed",
            depth, MAX_NESTING
        ));
    }
    let operators = operator_count(input);
    if operators > MAX_OPERATORS {
        return Err(format!(
            "expression has {} operators, at most {} allowed",
            operators, MAX_OPERATORS
        ));
    }
    let mut parser = all_consuming(terminated(parse_sum, multispace0));
    match parser.parse(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::Verify => {
            let name = parse_identifier(e.input).map_or("?", |(_, name)| name);
            Err(format!("unknown function '{}'", name))
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let (position, excerpt) = error_position(input, e.input);
            if excerpt.is_empty() {
                Err("unexpected end of expression".to_string())
            } else {
                Err(format!(
                    "invalid syntax at position {}: '{}'",
                    position, excerpt
                ))
            }
        }
        Err(nom::Err::Incomplete(_)) => Err("unexpected end of expression".to_string()),
    }
}

impl Expr {
    /// Parses a string into a symbolic expression, see [`parse_expression_func`].
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        parse_expression_func(input)
    }
}
