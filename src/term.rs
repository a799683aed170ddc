use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;

use num_bigint::BigInt;

use crate::symbol::{Operator, NIL, TRUE};

/// A node of the term tree.
///
/// Terms are immutable once built. Pair children sit behind `Rc`, so the
/// evaluator can hand out sub-terms of its input (CAR, CDR, QUOTE) without
/// copying them.
///
/// Equality, hashing and `Debug` walk the tree with an explicit worklist,
/// like `Drop`, so a list of any length can be compared or formatted.
#[derive(Clone)]
pub enum Term {
    Symbol(Rc<str>),
    Number(BigInt),
    Pair(Rc<Term>, Rc<Term>),
}

impl Term {
    pub fn nil() -> Term {
        Term::Symbol(Rc::from(NIL))
    }

    pub fn t() -> Term {
        Term::Symbol(Rc::from(TRUE))
    }

    /// `T` for true, `NIL` for false.
    pub fn truth(value: bool) -> Term {
        if value {
            Term::t()
        } else {
            Term::nil()
        }
    }

    pub fn symbol(name: &str) -> Term {
        Term::Symbol(Rc::from(name))
    }

    pub fn number(n: impl Into<BigInt>) -> Term {
        Term::Number(n.into())
    }

    pub fn cons(first: Term, rest: Term) -> Term {
        Term::Pair(Rc::new(first), Rc::new(rest))
    }

    /// Build a proper list from the given elements.
    pub fn list(items: impl IntoIterator<Item = Term>) -> Term {
        Term::dotted(items, Term::nil())
    }

    /// Build a list whose last pair ends in `tail` instead of NIL.
    pub fn dotted(items: impl IntoIterator<Item = Term>, tail: Term) -> Term {
        let items: Vec<Term> = items.into_iter().collect();
        let mut result = tail;
        for item in items.into_iter().rev() {
            result = Term::cons(item, result);
        }
        result
    }

    /// `(QUOTE term)`
    pub fn quote(term: Term) -> Term {
        Term::list([Term::symbol(Operator::Quote.name()), term])
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Symbol(name) if &**name == NIL)
    }

    pub fn is_atom(&self) -> bool {
        !self.is_pair()
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Term::Pair(..))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Term::Number(_))
    }

    /// True for every symbol, NIL included.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Term::Symbol(_))
    }

    pub fn as_number(&self) -> Option<&BigInt> {
        match self {
            Term::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Term::Symbol(name) => Some(&**name),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<(&Term, &Term)> {
        match self {
            Term::Pair(first, rest) => Some((&**first, &**rest)),
            _ => None,
        }
    }

    /// The reserved operator this term names, if it is such a symbol.
    pub fn operator(&self) -> Option<Operator> {
        self.as_symbol().and_then(Operator::from_name)
    }

    /// Split an application form into its operator and operand list.
    /// Returns None unless this is a pair headed by a reserved operator symbol.
    pub fn application(&self) -> Option<(Operator, &Term)> {
        let (head, operands) = self.as_pair()?;
        Some((head.operator()?, operands))
    }

    pub fn is_application(&self) -> bool {
        self.application().is_some()
    }

    /// Iterate over the elements of a pair chain. After the iterator is
    /// exhausted, `tail()` returns the atom that ended the chain.
    pub fn elements(&self) -> Elements<'_> {
        Elements { current: self }
    }

    pub fn is_proper_list(&self) -> bool {
        let mut elements = self.elements();
        for _ in elements.by_ref() {}
        elements.tail().is_nil()
    }
}

// The derived drop would recurse once per pair, so a long list could
// exhaust the stack. Uniquely owned pair children are detached and torn
// down from an explicit worklist instead; shared children stay alive.
impl Drop for Term {
    fn drop(&mut self) {
        let Term::Pair(first, rest) = self else {
            return;
        };
        let mut pending = Vec::new();
        detach(first, &mut pending);
        detach(rest, &mut pending);
        while let Some(mut term) = pending.pop() {
            if let Term::Pair(first, rest) = &mut term {
                detach(first, &mut pending);
                detach(rest, &mut pending);
            }
        }
    }
}

fn detach(slot: &mut Rc<Term>, pending: &mut Vec<Term>) {
    if let Some(inner) = Rc::get_mut(slot) {
        if inner.is_pair() {
            pending.push(mem::replace(inner, Term::Number(BigInt::default())));
        }
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Term) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            match (a, b) {
                (Term::Symbol(x), Term::Symbol(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Term::Number(x), Term::Number(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Term::Pair(a_first, a_rest), Term::Pair(b_first, b_rest)) => {
                    if Rc::ptr_eq(a_first, b_first) && Rc::ptr_eq(a_rest, b_rest) {
                        continue;
                    }
                    pending.push((&**a_rest, &**b_rest));
                    pending.push((&**a_first, &**b_first));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending = vec![self];
        while let Some(term) = pending.pop() {
            mem::discriminant(term).hash(state);
            match term {
                Term::Symbol(name) => name.hash(state),
                Term::Number(n) => n.hash(state),
                Term::Pair(first, rest) => {
                    pending.push(&**rest);
                    pending.push(&**first);
                }
            }
        }
    }
}

// Pairs are shown as their element chain, `[a, b . tail]`, so only
// nesting through the first position recurses.
impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Symbol(name) => f.debug_tuple("Symbol").field(&&**name).finish(),
            Term::Number(n) => f.debug_tuple("Number").field(&format_args!("{}", n)).finish(),
            Term::Pair(..) => {
                f.write_str("[")?;
                let mut elements = self.elements();
                for (i, item) in elements.by_ref().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt::Debug::fmt(item, f)?;
                }
                let tail = elements.tail();
                if !tail.is_nil() {
                    f.write_str(" . ")?;
                    fmt::Debug::fmt(tail, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<BigInt> for Term {
    fn from(n: BigInt) -> Self {
        Term::Number(n)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Number(BigInt::from(n))
    }
}

/// Iterator over the `first` elements of a pair chain.
pub struct Elements<'a> {
    current: &'a Term,
}

impl<'a> Elements<'a> {
    /// What follows the elements yielded so far.
    pub fn tail(&self) -> &'a Term {
        self.current
    }
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Term;

    fn next(&mut self) -> Option<&'a Term> {
        let (first, rest) = self.current.as_pair()?;
        self.current = rest;
        Some(first)
    }
}
