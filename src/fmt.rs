//! Number formatting for status and tooltip text.
//!
//! Values are printed in their shortest form (`50`, `0.75`, `68.75`), without
//! padding or forced decimals. Non-finite values are printed literally so a
//! degraded sample stays visible instead of being hidden.

/// Format a metric value in its shortest form.
///
/// `50.0` → `"50"`, `0.5` → `"0.5"`, `NaN` → `"NaN"`,
/// `+inf` → `"Infinity"`, `-0.0` → `"0"`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

/// Format load averages as a comma-separated list: `"1, 0.75, 0.5"`.
pub fn format_load(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_shortest_form() {
        assert_eq!(format_number(50.0), "50");
        assert_eq!(format_number(0.75), "0.75");
        assert_eq!(format_number(68.75), "68.75");
        assert_eq!(format_number(1.0), "1");
    }

    #[test]
    fn test_format_number_non_finite() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_load() {
        assert_eq!(format_load(&[1.0, 0.75, 0.5]), "1, 0.75, 0.5");
        assert_eq!(format_load(&[f64::NAN]), "NaN");
        assert_eq!(format_load(&[]), "");
    }
}
