use num_bigint::BigInt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sexpr::{eval, parse, run, Error, Term};

fn value(input: &str) -> Term {
    let term = parse(input).unwrap_or_else(|e| panic!("{input} should parse: {e}"));
    eval(&term).unwrap_or_else(|e| panic!("{input} should evaluate: {e}"))
}

fn random_number(rng: &mut StdRng) -> BigInt {
    let digits: String = (0..rng.gen_range(1..30))
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    let n: BigInt = digits.parse().unwrap();
    if rng.gen_bool(0.5) {
        -n
    } else {
        n
    }
}

#[test]
fn quote_is_identity_on_number_lists() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let items: Vec<Term> = (0..rng.gen_range(0..12))
            .map(|_| {
                if rng.gen_bool(0.2) {
                    Term::nil()
                } else {
                    Term::Number(random_number(&mut rng))
                }
            })
            .collect();
        let list = Term::list(items);
        let input = format!("(QUOTE {})", list);
        assert_eq!(value(&input), list, "{input}");
    }
}

#[test]
fn arithmetic_identities() {
    assert_eq!(value("(+)"), Term::from(0));
    assert_eq!(value("(*)"), Term::from(1));
}

#[test]
fn sum_and_product_ignore_operand_order() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let mut numbers: Vec<BigInt> = (0..rng.gen_range(1..10))
            .map(|_| random_number(&mut rng))
            .collect();
        let expected_sum: BigInt = numbers.iter().sum();
        let expected_product: BigInt = numbers.iter().product();

        numbers.shuffle(&mut rng);
        let operands: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
        // Nest the tail inside its own application to exercise evaluated operands.
        let (head, tail) = operands.split_at(1);
        let sum = format!("(+ {} (+ {}))", head[0], tail.join(" "));
        let product = format!("(* {} (* {}))", head[0], tail.join(" "));

        assert_eq!(value(&sum), Term::Number(expected_sum));
        assert_eq!(value(&product), Term::Number(expected_product));
    }
    assert_eq!(value("(+ 1 (+ 2 3))"), Term::from(6));
}

#[test]
fn car_and_cdr_of_nil() {
    assert_eq!(value("(CAR NIL)"), Term::nil());
    assert_eq!(value("(CDR NIL)"), Term::nil());
}

#[test]
fn length_counts_elements() {
    assert_eq!(value("(LENGTH (QUOTE (1 2 3)))"), Term::from(3));
    assert_eq!(value("(LENGTH (QUOTE NIL))"), Term::from(0));
}

#[test]
fn zerop_compares_exactly() {
    assert_eq!(value("(ZEROP 0)"), Term::t());
    assert_eq!(value("(ZEROP 1)"), Term::nil());
}

#[test]
fn documented_failures() {
    for input in ["(", ")", "(1 2", "(QUOTE)"] {
        assert!(parse(input).is_err(), "{input} should not parse");
    }
    for input in ["(CONS 1)", "(+ A)"] {
        let term = parse(input).unwrap();
        assert!(eval(&term).is_err(), "{input} should not evaluate");
    }
    assert!(matches!(run("(CONS 1)"), Err(Error::Eval(_))));
    assert!(matches!(run("(1 2"), Err(Error::Parse(_))));
}

#[test]
fn evaluated_values_are_fixed_points() {
    for term in [
        Term::from(0),
        Term::from(-17),
        Term::Number("98765432109876543210".parse().unwrap()),
        Term::nil(),
    ] {
        assert_eq!(eval(&term).unwrap(), term);
        assert_eq!(eval(&eval(&term).unwrap()).unwrap(), term);
    }
}

#[test]
fn parse_calls_do_not_share_state() {
    // A list opened by one parse must not license `NUMBER )` in the next.
    assert!(parse("(1 2)").is_ok());
    assert!(parse("5)").is_err());
    assert!(parse("(5)").is_ok());
}

#[test]
fn parsing_is_safe_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                for _ in 0..200 {
                    if i % 2 == 0 {
                        assert!(parse("(1 (2 . 3))").is_ok());
                    } else {
                        assert!(parse("7)").is_err());
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
