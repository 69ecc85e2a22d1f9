use crate::errors::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Opens a text input, decompressing it when the name ends in `.gz`.
pub(crate) fn open_text_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Rounds like Python 3 `round(value, ndigits)` for `ndigits >= 0`.
///
/// The decimal text of the value is rounded by the formatter, which
/// resolves ties against the exact binary value the way CPython does.
/// `NaN` and `±inf` are returned unchanged.
///
/// ```ignore
/// assert_eq!(py_round(2.675, 2), 2.67);
/// assert_eq!(py_round(2.5, 0), 2.0);
/// ```
pub(crate) fn py_round(value: f64, ndigits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if ndigits == 0 {
        return value.round_ties_even();
    }

    let repr = format!("{:.*}", ndigits as usize, value);
    match repr.parse::<f64>() {
        Ok(parsed) => parsed,
        Err(_) => {
            let scale = 10_f64.powi(ndigits as i32);
            (value * scale).round_ties_even() / scale
        }
    }
}

/// Two-decimal depth rounding used by every depth metric.
pub fn round_depth(value: f64) -> f64 {
    py_round(value, 2)
}

/// Renders a float the way Python's `str(float)` does for report values:
/// integral values keep one decimal (`5.0`), others use the shortest form.
pub fn format_py_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
