use std::fmt;

use num_bigint::BigInt;

/// A runtime literal value carried by a schema node.
///
/// This is wider than a JSON primitive on purpose: schema libraries allow
/// literals that have no JSON representation (symbols, NaN, big integers).
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    BigInt(BigInt),
    /// Symbol with an optional description
    Symbol(Option<String>),
    Undefined,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) if x.is_nan() => f.write_str("NaN"),
            Literal::Float(x) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Literal::Float(x) => write!(f, "{x}"),
            Literal::String(s) => f.write_str(s),
            Literal::BigInt(n) => write!(f, "{n}n"),
            Literal::Symbol(Some(desc)) => write!(f, "Symbol({desc})"),
            Literal::Symbol(None) => f.write_str("Symbol()"),
            Literal::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Integer(i)
    }
}

impl From<f64> for Literal {
    fn from(x: f64) -> Self {
        Literal::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_source_notation() {
        assert_eq!(Literal::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Literal::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Literal::Symbol(None).to_string(), "Symbol()");
        assert_eq!(Literal::Symbol(Some("id".into())).to_string(), "Symbol(id)");
        assert_eq!(Literal::BigInt(BigInt::from(42)).to_string(), "42n");
        assert_eq!(Literal::from("bar").to_string(), "bar");
    }
}
