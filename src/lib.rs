//! Reader and evaluator for a small S-expression language.
//!
//! Text is parsed into a [`Term`] tree by a predictive recursive-descent
//! parser, then evaluated under ten primitive forms: `QUOTE`, `CAR`, `CDR`,
//! `CONS`, `+`, `*`, `LENGTH`, `ATOM`, `LISTP` and `ZEROP`. Numbers are
//! arbitrary-precision integers; `NIL` is the empty list and false, `T` is
//! true.
//!
//! ```
//! let value = sexpr::run("(CONS (+ 1 2) (QUOTE (4 5)))").unwrap();
//! assert_eq!(value.to_string(), "(3 4 5)");
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod primitives;
pub mod printer;
pub mod symbol;
pub mod term;

pub use config::Limits;
pub use error::{Error, EvalError, ParseError};
pub use eval::{eval, Evaluator};
pub use parser::{parse, parse_with_limits, Parser};
pub use term::Term;

/// Parse `input` and evaluate the result.
pub fn run(input: &str) -> Result<Term, Error> {
    run_with_limits(input, &Limits::default())
}

pub fn run_with_limits(input: &str, limits: &Limits) -> Result<Term, Error> {
    let term = parse_with_limits(input, limits)?;
    Ok(Evaluator::with_limits(limits.clone()).eval(&term)?)
}
