use std::fmt;

/// Literal of the distinguished nil symbol: empty list and false.
pub const NIL: &str = "NIL";

/// Literal of the symbol returned for true.
pub const TRUE: &str = "T";

/// The reserved operator symbols. Every primitive form is headed by one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Quote,
    Car,
    Cdr,
    Cons,
    Add,
    Mul,
    Length,
    Atom,
    Listp,
    Zerop,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Quote,
        Operator::Car,
        Operator::Cdr,
        Operator::Cons,
        Operator::Add,
        Operator::Mul,
        Operator::Length,
        Operator::Atom,
        Operator::Listp,
        Operator::Zerop,
    ];

    /// Look up the operator a symbol literal names, if any.
    pub fn from_name(name: &str) -> Option<Operator> {
        match name {
            "QUOTE" => Some(Operator::Quote),
            "CAR" => Some(Operator::Car),
            "CDR" => Some(Operator::Cdr),
            "CONS" => Some(Operator::Cons),
            "+" => Some(Operator::Add),
            "*" => Some(Operator::Mul),
            "LENGTH" => Some(Operator::Length),
            "ATOM" => Some(Operator::Atom),
            "LISTP" => Some(Operator::Listp),
            "ZEROP" => Some(Operator::Zerop),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Quote => "QUOTE",
            Operator::Car => "CAR",
            Operator::Cdr => "CDR",
            Operator::Cons => "CONS",
            Operator::Add => "+",
            Operator::Mul => "*",
            Operator::Length => "LENGTH",
            Operator::Atom => "ATOM",
            Operator::Listp => "LISTP",
            Operator::Zerop => "ZEROP",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
