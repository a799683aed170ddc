use tracing::{debug, trace};

use crate::config::Limits;
use crate::error::{EvalError, EvalResult};
use crate::primitives;
use crate::symbol::Operator;
use crate::term::Term;

/// Evaluate a term with default limits.
pub fn eval(term: &Term) -> EvalResult<Term> {
    Evaluator::new().eval(term)
}

/// Evaluates terms under the primitive-form rules.
///
/// The evaluator holds no state between calls except its limits; the depth
/// counter is reset by every `eval`.
pub struct Evaluator {
    limits: Limits,
    depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Evaluator { limits, depth: 0 }
    }

    /// Evaluate a term to a new term. The input is never modified.
    pub fn eval(&mut self, term: &Term) -> EvalResult<Term> {
        self.depth = 0;
        let result = self.eval_term(term);
        if let Err(e) = &result {
            debug!("evaluation failed: {}", e.message);
        }
        result
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Evaluate a sub-form. Primitives call back in here for operands that
    /// are application forms.
    pub(crate) fn eval_term(&mut self, term: &Term) -> EvalResult<Term> {
        match term {
            Term::Number(_) => Ok(term.clone()),
            Term::Symbol(_) if term.is_nil() => Ok(Term::nil()),
            Term::Symbol(name) => match Operator::from_name(name) {
                Some(op) => Err(EvalError::new(format!("operator {} is not a value", op))),
                None => Err(EvalError::new(format!("unbound symbol {}", name))),
            },
            Term::Pair(head, operands) => match head.operator() {
                Some(op) => self.apply(op, operands),
                None => Err(EvalError::new(format!("{} is not an operator", head))),
            },
        }
    }

    fn apply(&mut self, op: Operator, operands: &Term) -> EvalResult<Term> {
        if self.depth >= self.limits.max_depth {
            return Err(EvalError::new(format!(
                "application nesting deeper than {}",
                self.limits.max_depth
            )));
        }
        self.depth += 1;
        trace!(operator = %op, depth = self.depth, "apply");

        let result = operand_list(op, operands).and_then(|args| match op {
            Operator::Quote => primitives::prim_quote(&args),
            Operator::Car => primitives::prim_car(self, &args),
            Operator::Cdr => primitives::prim_cdr(self, &args),
            Operator::Cons => primitives::prim_cons(self, &args),
            Operator::Add => primitives::prim_add(self, &args),
            Operator::Mul => primitives::prim_mul(self, &args),
            Operator::Length => primitives::prim_length(self, &args),
            Operator::Atom => primitives::prim_atom(self, &args),
            Operator::Listp => primitives::prim_listp(self, &args),
            Operator::Zerop => primitives::prim_zerop(self, &args),
        });

        self.depth -= 1;
        result
    }

    // ========================================================================
    // Operand rules shared by several primitives
    // ========================================================================

    /// A numeric operand: a number as written, or an application form
    /// evaluated. Bare symbols and plain lists are rejected. The result is
    /// not checked to be a number.
    pub(crate) fn operand_value(&mut self, op: Operator, operand: &Term) -> EvalResult<Term> {
        match operand {
            Term::Number(_) => Ok(operand.clone()),
            _ if operand.is_application() => self.eval_term(operand),
            _ => Err(EvalError::new(format!(
                "{}: operand {} is neither a number nor an application",
                op, operand
            ))),
        }
    }
}

/// Collect the operands of an application; a dotted operand list is malformed.
fn operand_list(op: Operator, operands: &Term) -> EvalResult<Vec<&Term>> {
    let mut elements = operands.elements();
    let args: Vec<&Term> = elements.by_ref().collect();
    if !elements.tail().is_nil() {
        return Err(EvalError::new(format!(
            "{}: dotted operand list ending in {}",
            op,
            elements.tail()
        )));
    }
    Ok(args)
}

/// Fail unless exactly `n` operands were supplied.
pub(crate) fn expect_arity(op: Operator, args: &[&Term], n: usize) -> EvalResult<()> {
    if args.len() != n {
        let plural = if n == 1 { "" } else { "s" };
        return Err(EvalError::new(format!(
            "{} takes {} operand{}, got {}",
            op,
            n,
            plural,
            args.len()
        )));
    }
    Ok(())
}
