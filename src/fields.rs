//! Decoding of numeric array fields from the parsed document.

use crate::config::ParseLimits;
use crate::error::FieldError;
use serde_json::Value;

/// Decode one JSON number as a decimal floating-point literal.
///
/// `index` is the element position reported back on failure. The length
/// limit applies to the literal exactly as it was written.
pub fn parse_float(
    value: Option<&Value>,
    index: usize,
    limits: &ParseLimits,
) -> Result<f64, FieldError> {
    let literal = match value {
        Some(Value::Number(n)) => n.to_string(),
        Some(v @ (Value::Bool(_) | Value::Null)) => {
            return Err(FieldError::BadNumber {
                literal: v.to_string(),
            })
        }
        _ => return Err(FieldError::NotNumeric { index }),
    };
    if literal.len() > limits.max_literal_len {
        return Err(FieldError::LiteralTooLong {
            len: literal.len(),
            limit: limits.max_literal_len,
        });
    }

    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(FieldError::BadNumber { literal }),
    }
}

/// Decode the first `count` elements into a new vector.
pub fn parse_float_array(
    items: &[Value],
    count: usize,
    limits: &ParseLimits,
) -> Result<Vec<f64>, FieldError> {
    (0..count)
        .map(|i| parse_float(items.get(i), i, limits))
        .collect()
}

/// Decode the first `out.len()` elements into caller storage.
///
/// `out` is only written once every element has decoded.
pub fn parse_float_array_in_place(
    items: &[Value],
    out: &mut [f64],
    limits: &ParseLimits,
) -> Result<(), FieldError> {
    let values = parse_float_array(items, out.len(), limits)?;
    out.copy_from_slice(&values);
    Ok(())
}

/// Decode an array of `[x, y, z]` triples into flat coordinates.
///
/// The shape of every element is checked before any number is decoded, so
/// a malformed list reports `BadSensorTriple` even when it also holds bad
/// literals.
pub fn parse_points(items: &[Value], limits: &ParseLimits) -> Result<Vec<f64>, FieldError> {
    let mut triples = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_array() {
            Some(triple) if triple.len() == 3 => triples.push(triple),
            _ => return Err(FieldError::BadSensorTriple { index }),
        }
    }

    let mut points = Vec::with_capacity(items.len() * 3);
    for triple in triples {
        points.extend(parse_float_array(triple, 3, limits)?);
    }
    Ok(points)
}
