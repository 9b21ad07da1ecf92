//! Primary-key extraction from row images.
//!
//! Every branch of the dispatcher and every reconstructor reads the key through
//! [`row_id`], so an id that is valid in one place is valid everywhere.

use serde_json::Value;

use crate::consumer::RowImage;
use crate::errors::IngestError;

/// Column holding the primary key in every tracked table.
pub const ID_COLUMN: &str = "id";

/// Coerce a JSON value to an integer primary key.
///
/// JSON integers are accepted as long as they fit in `i64`. Floats are
/// accepted only when integral and in range. Anything else is a decode error
/// naming `column`.
pub fn coerce_id(value: &Value, column: &str) -> Result<i64, IngestError> {
    let Value::Number(number) = value else {
        return Err(IngestError::decode(format!(
            "Column '{}' is not numeric: {}",
            column, value
        )));
    };

    if let Some(id) = number.as_i64() {
        return Ok(id);
    }

    if number.is_u64() {
        return Err(IngestError::decode(format!(
            "Column '{}' is out of range: {}",
            column, number
        )));
    }

    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(IngestError::decode(format!(
            "Column '{}' is not an integer: {}",
            column, number
        ))),
    }
}

/// Read the primary key of a row image.
pub fn row_id(image: &RowImage) -> Result<i64, IngestError> {
    let value = image
        .get(ID_COLUMN)
        .ok_or_else(|| IngestError::decode(format!("Row image is missing '{}'", ID_COLUMN)))?;
    coerce_id(value, ID_COLUMN)
}
