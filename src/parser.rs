use tracing::debug;

use crate::config::Limits;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind, TokenSource};
use crate::symbol::Operator;
use crate::term::Term;

// Grammar, one token of lookahead:
//
//   sexpr = NUMBER | SYMBOL | QUOTE sexpr | LPAR pars RPAR
//   pars  = sexpr pars2 | ε          (ε only before RPAR)
//   pars2 = DOT sexpr | pars | ε
//
// FIRST(sexpr) = { NUMBER, SYMBOL, QUOTE, LPAR }, disjoint per production,
// so `sexpr` dispatches on the current token alone. `pars2` picks DOT,
// another element, or ε on RPAR.

/// Parse one complete expression from `input` with default limits.
pub fn parse(input: &str) -> ParseResult<Term> {
    parse_with_limits(input, &Limits::default())
}

pub fn parse_with_limits(input: &str, limits: &Limits) -> ParseResult<Term> {
    let result = check_opening(input)
        .and_then(|()| Parser::new(Lexer::new(input), limits.clone()).parse_complete());
    if let Err(e) = &result {
        debug!(offset = e.offset, "parse failed: {}", e.message);
    }
    result
}

/// Checks on the first tokens of the raw text, made before the descent.
///
/// Input longer than one byte must open with '(', a quote or a number; a
/// lone symbol is only accepted as a one-character input. `()` must be the
/// whole input.
fn check_opening(input: &str) -> ParseResult<()> {
    let mut lexer = Lexer::new(input);
    let first = lexer.next_token()?;
    if input.len() > 1
        && !matches!(
            first.kind,
            TokenKind::LPar | TokenKind::Quote | TokenKind::Number(_)
        )
    {
        return Err(ParseError::new(
            format!("input cannot begin with {}", first.describe()),
            first.offset,
        ));
    }

    let second = lexer.next_token()?;
    if first.kind == TokenKind::LPar && second.kind == TokenKind::RPar {
        let third = lexer.next_token()?;
        if third.kind != TokenKind::Eof {
            return Err(unexpected(&third, "after ()"));
        }
    }
    Ok(())
}

fn unexpected(tok: &Token, context: &str) -> ParseError {
    ParseError::new(format!("unexpected {} {}", tok.describe(), context), tok.offset)
}

/// Recursive-descent parser over a token source.
///
/// One parser value serves one parse: the one-token pushback buffer and the
/// "a list has been opened" flag both start fresh in `new`.
pub struct Parser<S> {
    source: S,
    peeked: Option<Token>,
    /// Set once any '(' has been read during this parse.
    seen_lpar: bool,
    depth: usize,
    limits: Limits,
}

impl<S: TokenSource> Parser<S> {
    pub fn new(source: S, limits: Limits) -> Self {
        Parser {
            source,
            peeked: None,
            seen_lpar: false,
            depth: 0,
            limits,
        }
    }

    /// Parse one `sexpr` and require that nothing but end of input follows.
    pub fn parse_complete(&mut self) -> ParseResult<Term> {
        let expr = self.sexpr()?;
        let rest = self.peek_token()?;
        if rest.kind != TokenKind::Eof {
            return Err(unexpected(rest, "after expression"));
        }
        Ok(expr)
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.source.next_token(),
        }
    }

    fn peek_token(&mut self) -> ParseResult<&Token> {
        let tok = self.next_token()?;
        Ok(self.peeked.insert(tok))
    }

    fn enter(&mut self, at: &Token) -> ParseResult<()> {
        if self.depth >= self.limits.max_depth {
            return Err(ParseError::new(
                format!("nesting deeper than {}", self.limits.max_depth),
                at.offset,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// sexpr = NUMBER | SYMBOL | QUOTE sexpr | LPAR pars RPAR
    fn sexpr(&mut self) -> ParseResult<Term> {
        let tok = self.next_token()?;
        let next_is_rpar = self.peek_token()?.kind == TokenKind::RPar;

        match tok.kind {
            TokenKind::Number(n) => {
                if next_is_rpar && !self.seen_lpar {
                    return Err(ParseError::new(
                        "number followed by ')' outside any list",
                        tok.offset,
                    ));
                }
                Ok(Term::Number(n))
            }
            TokenKind::Symbol(ref name) => {
                if next_is_rpar && Operator::from_name(name) == Some(Operator::Quote) {
                    return Err(ParseError::new("QUOTE requires an operand", tok.offset));
                }
                Ok(Term::symbol(name))
            }
            TokenKind::LPar => {
                self.seen_lpar = true;
                self.enter(&tok)?;
                let list = self.pars()?;
                let close = self.next_token()?;
                // A lexical error right after the ')' fails here, not later.
                self.peek_token()?;
                self.leave();
                if close.kind != TokenKind::RPar {
                    return Err(unexpected(&close, "where ')' was expected"));
                }
                Ok(list)
            }
            TokenKind::Quote => {
                if next_is_rpar {
                    return Err(ParseError::new("quote requires an operand", tok.offset));
                }
                self.enter(&tok)?;
                let quoted = self.sexpr()?;
                self.leave();
                Ok(Term::quote(quoted))
            }
            TokenKind::RPar | TokenKind::Dot | TokenKind::Eof => {
                Err(unexpected(&tok, "where an expression was expected"))
            }
        }
    }

    /// pars = sexpr pars2 | ε
    ///
    /// The right recursion through `pars2` is unrolled into a loop; the
    /// elements are paired up from the back once the list is closed.
    fn pars(&mut self) -> ParseResult<Term> {
        if self.peek_token()?.kind == TokenKind::RPar {
            return Ok(Term::nil());
        }

        let mut items = Vec::new();
        loop {
            items.push(self.sexpr()?);

            // pars2 = DOT sexpr | pars | ε
            let next = self.peek_token()?.clone();
            match next.kind {
                TokenKind::Dot => {
                    self.next_token()?;
                    let tail = self.sexpr()?;
                    return Ok(Term::dotted(items, tail));
                }
                TokenKind::RPar => return Ok(Term::list(items)),
                TokenKind::Number(_)
                | TokenKind::Symbol(_)
                | TokenKind::Quote
                | TokenKind::LPar => continue,
                TokenKind::Eof => return Err(unexpected(&next, "inside a list")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: i64) -> Term {
        Term::from(v)
    }

    fn s(name: &str) -> Term {
        Term::symbol(name)
    }

    /// Token source replaying a fixed sequence, for driving the parser
    /// without going through the lexer.
    struct Replay(std::vec::IntoIter<TokenKind>);

    impl TokenSource for Replay {
        fn next_token(&mut self) -> ParseResult<Token> {
            self.0
                .next()
                .map(|kind| Token { kind, offset: 0 })
                .ok_or_else(|| ParseError::new("exhausted", 0))
        }
    }

    fn parse_tokens(kinds: Vec<TokenKind>) -> ParseResult<Term> {
        Parser::new(Replay(kinds.into_iter()), Limits::default()).parse_complete()
    }

    #[test]
    fn proper_and_dotted_lists() {
        assert_eq!(parse("(1 2 3)").unwrap(), Term::list([n(1), n(2), n(3)]));
        assert_eq!(parse("(1 . 2)").unwrap(), Term::cons(n(1), n(2)));
        assert_eq!(
            parse("(1 2 . 3)").unwrap(),
            Term::dotted([n(1), n(2)], n(3))
        );
        assert_eq!(
            parse("((1) (2 . NIL))").unwrap(),
            Term::list([Term::list([n(1)]), Term::list([n(2)])])
        );
    }

    #[test]
    fn quote_desugars() {
        assert_eq!(parse("'1").unwrap(), Term::quote(n(1)));
        assert_eq!(
            parse("'(a b)").unwrap(),
            Term::quote(Term::list([s("A"), s("B")]))
        );
        assert_eq!(
            parse("(CAR '(1))").unwrap(),
            Term::list([s("CAR"), Term::quote(Term::list([n(1)]))])
        );
        assert_eq!(
            parse("(QUOTE (1 2))").unwrap(),
            Term::quote(Term::list([n(1), n(2)]))
        );
    }

    #[test]
    fn empty_parens() {
        assert_eq!(parse("()").unwrap(), Term::nil());
        assert_eq!(parse("(())").unwrap(), Term::list([Term::nil()]));
        assert!(parse("() 1").is_err());
        assert!(parse("()()").is_err());
    }

    #[test]
    fn opening_token_rules() {
        assert_eq!(parse("A").unwrap(), s("A"));
        assert_eq!(parse("+").unwrap(), s("+"));
        assert_eq!(parse("42").unwrap(), n(42));
        assert!(parse("AB").is_err());
        assert!(parse("NIL").is_err());
        assert!(parse(" A").is_err());
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn number_before_rpar_needs_an_open_list() {
        assert!(parse("1)").is_err());
        assert!(parse("'1)").is_err());
        assert_eq!(parse("(1)").unwrap(), Term::list([n(1)]));
    }

    #[test]
    fn quote_needs_an_operand() {
        assert!(parse("(QUOTE)").is_err());
        assert!(parse("(')").is_err());
        assert!(parse("(1 ')").is_err());
        assert!(parse("(CONS 1 QUOTE)").is_err());
    }

    #[test]
    fn malformed_lists() {
        for input in ["(", ")", "(1 2", "(. 1)", "(1 .)", "(1 . 2 3)", "(1 . . 2)", "((1)", "(1))", "(1) 2"] {
            assert!(parse(input).is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn lexical_errors_surface_as_parse_errors() {
        let err = parse("(1 # 2)").unwrap_err();
        assert_eq!(err.offset, 3);
        assert!(parse("(1)#").is_err());
    }

    #[test]
    fn depth_limit() {
        let limits = Limits::default().with_max_depth(3);
        assert!(parse_with_limits("(((1)))", &limits).is_ok());
        assert!(parse_with_limits("((((1))))", &limits).is_err());
        assert!(parse_with_limits("''''1", &limits).is_err());
    }

    #[test]
    fn long_lists_do_not_recurse_per_element() {
        let input = format!("({})", vec!["1"; 50_000].join(" "));
        let list = parse(&input).unwrap();
        assert_eq!(list.elements().count(), 50_000);
    }

    #[test]
    fn flag_is_fresh_for_each_parse() {
        assert!(parse("(1)").is_ok());
        assert!(parse("1)").is_err());
    }

    #[test]
    fn custom_token_source() {
        let term = parse_tokens(vec![
            TokenKind::LPar,
            TokenKind::Symbol("X".into()),
            TokenKind::Dot,
            TokenKind::Number(7.into()),
            TokenKind::RPar,
            TokenKind::Eof,
        ])
        .unwrap();
        assert_eq!(term, Term::cons(s("X"), n(7)));

        assert!(parse_tokens(vec![TokenKind::RPar, TokenKind::Eof]).is_err());
        assert!(parse_tokens(vec![TokenKind::LPar]).is_err());
    }
}
