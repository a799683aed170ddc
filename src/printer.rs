use std::fmt::{self, Write};

use crate::term::Term;

/// Print a term in list notation: `(1 2 3)`, `(1 . 2)`, `NIL`.
pub fn print_term(term: &Term) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = print_inner(term, &mut out, 0);
    out
}

fn print_inner(term: &Term, out: &mut impl Write, depth: usize) -> fmt::Result {
    if depth > 1000 {
        return out.write_str("...");
    }

    match term {
        Term::Symbol(name) => out.write_str(name),
        Term::Number(n) => write!(out, "{}", n),
        Term::Pair(first, rest) => {
            out.write_char('(')?;
            print_inner(first, out, depth + 1)?;

            let mut current: &Term = &**rest;
            loop {
                match current {
                    Term::Pair(first, rest) => {
                        out.write_char(' ')?;
                        print_inner(first, out, depth + 1)?;
                        current = &**rest;
                    }
                    tail if tail.is_nil() => break,
                    tail => {
                        out.write_str(" . ")?;
                        print_inner(tail, out, depth + 1)?;
                        break;
                    }
                }
            }
            out.write_char(')')
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_inner(self, f, 0)
    }
}
