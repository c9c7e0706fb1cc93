//! Expression string grammar: `constant? (('+' | '-') term)*`, where a
//! `term` is either a bare number, a bare variable name, or
//! `number '*' name`. Whitespace is insignificant between tokens.
//!
//! Examples: `"10 + 2*a - b"`, `"-width"`, `"view.left * 0.5 + 4"`.

use indexmap::IndexMap;
use nom::{
    branch::alt,
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::error::SolverError;
use crate::expression::LinearExpression;
use crate::variable;

enum RawTerm {
    Constant(f64),
    Named { coefficient: f64, name: String },
}

fn ws(input: &str) -> IResult<&str, &str> {
    nom::bytes::complete::take_while(|c: char| c.is_whitespace())(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

/// A variable name: starts with a letter, may continue with letters,
/// digits, underscores, and dots (`view.left`-style qualified names from
/// an enclosing layer tree). A hyphen is never part of a name, so it is
/// always read as the subtraction operator.
fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        nom::bytes::complete::take_while1(|c: char| c.is_alphabetic()),
        nom::bytes::complete::take_while(|c: char| {
            c.is_alphanumeric() || c == '_' || c == '.'
        }),
    ))(input)
}

fn raw_term(input: &str) -> IResult<&str, RawTerm> {
    alt((
        // `number` or `number '*' name`
        map(
            tuple((
                number,
                opt(preceded(tuple((ws, char('*'), ws)), name)),
            )),
            |(value, maybe_name)| match maybe_name {
                Some(name) => RawTerm::Named {
                    coefficient: value,
                    name: name.to_string(),
                },
                None => RawTerm::Constant(value),
            },
        ),
        // `name` or `name '*' number`
        map(
            tuple((
                name,
                opt(preceded(tuple((ws, char('*'), ws)), number)),
            )),
            |(name, maybe_coefficient)| RawTerm::Named {
                coefficient: maybe_coefficient.unwrap_or(1.0),
                name: name.to_string(),
            },
        ),
    ))(input)
}

fn apply_signed_term(
    sign: Option<char>,
    term: RawTerm,
    constant: &mut f64,
    terms: &mut IndexMap<String, f64>,
) {
    let sign = if sign == Some('-') { -1.0 } else { 1.0 };
    match term {
        RawTerm::Constant(value) => *constant += sign * value,
        RawTerm::Named { coefficient, name } => {
            let entry = terms.entry(name).or_insert(0.0);
            *entry += sign * coefficient;
        }
    }
}

fn expression(input: &str) -> IResult<&str, LinearExpression> {
    let mut constant = 0.0;
    let mut terms: IndexMap<String, f64> = IndexMap::new();

    let (input, _) = ws(input)?;
    let (input, first_sign) = opt(one_of("+-"))(input)?;
    let (input, _) = ws(input)?;
    let (input, first_term) = raw_term(input)?;
    apply_signed_term(first_sign, first_term, &mut constant, &mut terms);

    let (input, rest) = many0(tuple((
        preceded(ws, one_of("+-")),
        preceded(ws, raw_term),
    )))(input)?;
    for (sign, term) in rest {
        apply_signed_term(Some(sign), term, &mut constant, &mut terms);
    }

    let (input, _) = ws(input)?;
    Ok((input, LinearExpression::with_terms(constant, terms)))
}

/// Parse a full expression string. Any unconsumed input after a
/// successful partial parse is itself a parse error. A name that
/// collides with a reserved prefix (`s_`, `d_`, `z_`) is rejected even
/// though the grammar itself would otherwise accept it, per §4.1.
pub fn parse(input: &str) -> Result<LinearExpression, SolverError> {
    let expr = match expression(input) {
        Ok((remaining, expr)) if remaining.is_empty() => expr,
        Ok((remaining, _)) => {
            return Err(SolverError::Parse {
                position: input.len() - remaining.len(),
                message: format!("unexpected trailing input {remaining:?}"),
            })
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(SolverError::Parse {
                position: input.len() - e.input.len(),
                message: "malformed expression".to_string(),
            })
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(SolverError::Parse {
                position: input.len(),
                message: "incomplete expression".to_string(),
            })
        }
    };
    for (name, _) in expr.terms() {
        variable::validate_external_name(name)?;
    }
    Ok(expr)
}
