use serde_json::{Number, Value};
use sgraph_schema::Literal;

use crate::ConversionError;

/// Convert a literal to its JSON value, failing for values JSON cannot express
/// (symbols, big integers, `undefined`, NaN and infinities).
pub fn json_literal(literal: &Literal) -> Result<Value, ConversionError> {
    match literal {
        Literal::Null => Ok(Value::Null),
        Literal::Bool(b) => Ok(Value::Bool(*b)),
        Literal::Integer(i) => Ok(Value::Number((*i).into())),
        Literal::Float(x) => float_to_json(*x).map(Value::Number),
        Literal::String(s) => Ok(Value::String(s.clone())),
        Literal::BigInt(_) | Literal::Symbol(_) | Literal::Undefined => {
            Err(ConversionError::UnsupportedLiteral(literal.to_string()))
        }
    }
}

/// Finite float to JSON number
pub(crate) fn float_to_json(x: f64) -> Result<Number, ConversionError> {
    Number::from_f64(x)
        .ok_or_else(|| ConversionError::UnsupportedLiteral(Literal::Float(x).to_string()))
}
