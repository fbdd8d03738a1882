use qpbench_types::{QpBenchError, Result};

/// Format a vector as a bracketed, space-separated list, e.g. `[1.0 2.5 -3.0]`
pub fn format_vector(values: &[f64]) -> String {
    let items: Vec<String> = values.iter().map(|v| format_float(*v)).collect();
    format!("[{}]", items.join(" "))
}

/// Parse a bracketed, whitespace-separated float list.
///
/// A bare scalar such as `inf` reads as a one-element vector; older files
/// backfilled missing solutions that way.
pub fn parse_vector(cell: &str) -> Result<Vec<f64>> {
    let trimmed = cell.trim();
    let inner = match trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => inner,
        None => {
            return trimmed.parse::<f64>().map(|v| vec![v]).map_err(|_| {
                QpBenchError::SerializationError(format!("vector cell not bracketed: {:?}", cell))
            })
        }
    };

    inner
        .split_whitespace()
        .map(|item| {
            item.parse::<f64>().map_err(|e| {
                QpBenchError::SerializationError(format!("invalid vector entry {:?}: {}", item, e))
            })
        })
        .collect()
}

/// Shortest representation that parses back to the same value
pub(crate) fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Float cell; empty cells read as NaN
pub(crate) fn parse_float(cell: &str, column: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse::<f64>().map_err(|e| {
        QpBenchError::SerializationError(format!(
            "invalid float {:?} in column \"{}\": {}",
            cell, column, e
        ))
    })
}

pub(crate) fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub(crate) fn parse_bool(cell: &str) -> Option<bool> {
    match cell.trim() {
        "True" | "true" => Some(true),
        "False" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_vector() {
        assert_eq!(format_vector(&[1.0, 2.5, -3.0]), "[1.0 2.5 -3.0]");
        assert_eq!(format_vector(&[f64::INFINITY]), "[inf]");
        assert_eq!(format_vector(&[]), "[]");
    }

    #[test]
    fn test_parse_numpy_style() {
        // numpy prints trailing dots, padding and line breaks
        let parsed = parse_vector("[ 1.   2.5\n -3. ]").unwrap();
        assert_eq!(parsed, vec![1.0, 2.5, -3.0]);
        assert_eq!(parse_vector("[inf]").unwrap(), vec![f64::INFINITY]);
        assert!(parse_vector("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bare_scalar() {
        assert_eq!(parse_vector("inf").unwrap(), vec![f64::INFINITY]);
        assert_eq!(parse_vector(" 2.5 ").unwrap(), vec![2.5]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_vector("1.0 2.0").is_err());
        assert!(parse_vector("").is_err());
        assert!(parse_vector("[1.0 abc]").is_err());
    }

    #[test]
    fn test_parse_float_cells() {
        assert!(parse_float("", "runtime").unwrap().is_nan());
        assert_eq!(parse_float("inf", "runtime").unwrap(), f64::INFINITY);
        assert_eq!(parse_float("-inf", "runtime").unwrap(), f64::NEG_INFINITY);
        assert!(parse_float("NaN", "runtime").unwrap().is_nan());
        assert_eq!(parse_float("1e-7", "runtime").unwrap(), 1e-7);
        assert!(parse_float("fast", "runtime").is_err());
    }

    #[test]
    fn test_bool_cells() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("1.0"), None);
        assert_eq!(format_bool(true), "True");
    }
}
