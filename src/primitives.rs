use num_bigint::BigInt;
use num_traits::{One, Zero};

use crate::error::{EvalError, EvalResult};
use crate::eval::{expect_arity, Evaluator};
use crate::symbol::Operator;
use crate::term::Term;

// Each primitive receives its operands unevaluated, as a proper list
// already split into a slice. Operands that are application forms are
// evaluated through the evaluator; anything else is taken literally or
// rejected, depending on the primitive.

/// (QUOTE x): x, unevaluated.
pub fn prim_quote(args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Quote, args, 1)?;
    Ok(args[0].clone())
}

/// (CAR x): first element of the list x evaluates to; NIL of NIL.
pub fn prim_car(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    let list = list_operand(ev, Operator::Car, args)?;
    match list.as_pair() {
        Some((first, _)) => Ok(first.clone()),
        None => Ok(Term::nil()),
    }
}

/// (CDR x): the rest of the list x evaluates to; NIL of NIL.
pub fn prim_cdr(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    let list = list_operand(ev, Operator::Cdr, args)?;
    match list.as_pair() {
        Some((_, rest)) => Ok(rest.clone()),
        None => Ok(Term::nil()),
    }
}

/// The single operand of CAR/CDR: NIL itself, or an application form
/// whose value is a pair or NIL.
fn list_operand(ev: &mut Evaluator, op: Operator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(op, args, 1)?;
    let operand = args[0];
    let value = if operand.is_nil() {
        Term::nil()
    } else if operand.is_application() {
        ev.eval_term(operand)?
    } else {
        return Err(EvalError::new(format!(
            "{}: operand {} is neither NIL nor an application",
            op, operand
        )));
    };
    if value.is_atom() && !value.is_nil() {
        return Err(EvalError::new(format!("{} of non-list {}", op, value)));
    }
    Ok(value)
}

/// (CONS a b): a new pair.
///
/// When b is an application it is evaluated first, and a may then be an
/// application too. Otherwise both operands are taken literally and must be
/// NIL or numbers.
pub fn prim_cons(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Cons, args, 2)?;
    if args[1].is_application() {
        let rest = ev.eval_term(args[1])?;
        let first = cons_operand(ev, args[0])?;
        return Ok(Term::cons(first, rest));
    }
    let rest = cons_literal(args[1])?;
    let first = cons_literal(args[0])?;
    Ok(Term::cons(first, rest))
}

fn cons_operand(ev: &mut Evaluator, operand: &Term) -> EvalResult<Term> {
    if operand.is_nil() {
        Ok(Term::nil())
    } else {
        ev.operand_value(Operator::Cons, operand)
    }
}

fn cons_literal(operand: &Term) -> EvalResult<Term> {
    if operand.is_nil() || operand.is_number() {
        Ok(operand.clone())
    } else {
        Err(EvalError::new(format!(
            "CONS: operand {} must be NIL or a number unless the second operand is an application",
            operand
        )))
    }
}

/// (+ n ...): sum; 0 with no operands.
pub fn prim_add(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    fold_numbers(ev, Operator::Add, args, BigInt::zero(), |acc, n| acc + n)
}

/// (* n ...): product; 1 with no operands.
pub fn prim_mul(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    fold_numbers(ev, Operator::Mul, args, BigInt::one(), |acc, n| acc * n)
}

fn fold_numbers(
    ev: &mut Evaluator,
    op: Operator,
    args: &[&Term],
    identity: BigInt,
    combine: impl Fn(BigInt, &BigInt) -> BigInt,
) -> EvalResult<Term> {
    let mut acc = identity;
    for &operand in args {
        if let Some((Operator::Quote, _)) = operand.application() {
            return Err(EvalError::new(format!(
                "{}: quoted operand {}",
                op, operand
            )));
        }
        let value = ev.operand_value(op, operand)?;
        let n = value
            .as_number()
            .ok_or_else(|| EvalError::new(format!("{}: {} is not a number", op, value)))?;
        acc = combine(acc, n);
    }
    Ok(Term::Number(acc))
}

/// (LENGTH x): number of elements of the list x evaluates to.
///
/// x must be a QUOTE, CAR, CDR or CONS application. A quoted dotted list is
/// rejected; for the other forms counting stops at the first atom tail, so
/// a dotted tail is not an element.
pub fn prim_length(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Length, args, 1)?;
    let operand = args[0];
    let quoted = match operand.application() {
        Some((Operator::Quote, _)) => true,
        Some((Operator::Car | Operator::Cdr | Operator::Cons, _)) => false,
        _ => {
            return Err(EvalError::new(format!(
                "LENGTH: operand {} is not a QUOTE, CAR, CDR or CONS form",
                operand
            )))
        }
    };
    let list = ev.eval_term(operand)?;
    if list.is_atom() && !list.is_nil() {
        return Err(EvalError::new(format!("LENGTH of non-list {}", list)));
    }
    if quoted && !list.is_proper_list() {
        return Err(EvalError::new("LENGTH of a quoted dotted list"));
    }
    Ok(Term::number(list.elements().count()))
}

/// (ATOM x): T when x is NIL, a number, or an application whose value
/// is an atom; NIL when the application's value is a pair.
pub fn prim_atom(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Atom, args, 1)?;
    let operand = args[0];
    if operand.is_nil() || operand.is_number() {
        return Ok(Term::t());
    }
    if operand.is_application() {
        let value = ev.eval_term(operand)?;
        return Ok(Term::truth(value.is_atom()));
    }
    Err(EvalError::new(format!(
        "ATOM: operand {} is not NIL, a number or an application",
        operand
    )))
}

/// (LISTP x): T when x is NIL or an application whose value is a pair.
/// A CAR application whose value is NIL also counts; a bare number is NIL.
pub fn prim_listp(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Listp, args, 1)?;
    let operand = args[0];
    if operand.is_nil() {
        return Ok(Term::t());
    }
    if operand.is_number() {
        return Ok(Term::nil());
    }
    if let Some((op, _)) = operand.application() {
        let value = ev.eval_term(operand)?;
        let listp = value.is_pair() || (op == Operator::Car && value.is_nil());
        return Ok(Term::truth(listp));
    }
    Err(EvalError::new(format!(
        "LISTP: operand {} is not NIL, a number or an application",
        operand
    )))
}

/// (ZEROP n): T when n evaluates to 0, NIL for any other number.
pub fn prim_zerop(ev: &mut Evaluator, args: &[&Term]) -> EvalResult<Term> {
    expect_arity(Operator::Zerop, args, 1)?;
    let value = ev.operand_value(Operator::Zerop, args[0])?;
    let n = value
        .as_number()
        .ok_or_else(|| EvalError::new(format!("ZEROP: {} is not a number", value)))?;
    Ok(Term::truth(n.is_zero()))
}
