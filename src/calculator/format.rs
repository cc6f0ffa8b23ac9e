//! Number formatting for the display and for stored operands.
//!
//! Stored operands keep full `f64` precision; exponential shortening only
//! happens when a value is rendered.

/// Magnitude above which values render in exponential notation.
const LARGE_MAGNITUDE: f64 = 1e15;
/// Non-zero magnitude below which values render in exponential notation.
const SMALL_MAGNITUDE: f64 = 1e-6;
/// Fraction digits used for exponential rendering.
const EXPONENT_DIGITS: usize = 6;

/// Parse an operand string. Accepts partial entries such as `"3."` and
/// `"-0."`; returns `None` for text that is not a number at all.
pub fn parse_operand(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whether `value` renders in exponential notation.
pub fn needs_exponent(value: f64) -> bool {
    let magnitude = value.abs();
    magnitude > LARGE_MAGNITUDE || (value != 0.0 && magnitude < SMALL_MAGNITUDE)
}

/// Format a numeric value for the display and for history results.
pub fn format_value(value: f64) -> String {
    if needs_exponent(value) {
        to_exponential(value, EXPONENT_DIGITS)
    } else {
        stringify(value)
    }
}

/// Format the raw current input for the display.
///
/// Entries in the normal range are shown as typed so a trailing `.` stays
/// visible; anything unparseable shows as `0`.
pub fn format_input(input: &str) -> String {
    match parse_operand(input) {
        Some(value) if needs_exponent(value) => to_exponential(value, EXPONENT_DIGITS),
        Some(_) => input.to_string(),
        None => "0".to_string(),
    }
}

/// Shortest decimal text that parses back to `value`.
///
/// Used for values written into the current input and history expressions.
/// Very large or very small magnitudes use `e` notation with an explicit
/// exponent sign, e.g. `1e+21`.
pub fn stringify(value: f64) -> String {
    if value == 0.0 {
        // Covers -0.0 as well
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < SMALL_MAGNITUDE {
        with_signed_exponent(&format!("{:e}", value))
    } else {
        format!("{}", value)
    }
}

/// Render `value` with `digits` fraction digits in exponential notation,
/// e.g. `1.234568e+21`.
pub fn to_exponential(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return stringify_non_finite(value);
    }
    with_signed_exponent(&format!("{:.*e}", digits, value))
}

fn stringify_non_finite(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_sign_positive() {
        "Infinity".to_string()
    } else {
        "-Infinity".to_string()
    }
}

/// Rust prints `1e21`; the display convention is `1e+21`.
fn with_signed_exponent(formatted: &str) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_entries() {
        assert_eq!(parse_operand("3."), Some(3.0));
        assert_eq!(parse_operand("0."), Some(0.0));
        assert_eq!(parse_operand("-12.5"), Some(-12.5));
        assert_eq!(parse_operand("1e+21"), Some(1e21));
        assert_eq!(parse_operand("-"), None);
        assert_eq!(parse_operand("Error"), None);
    }

    #[test]
    fn test_format_plain_values() {
        assert_eq!(format_value(120.0), "120");
        assert_eq!(format_value(-6.0), "-6");
        assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(1e15), "1000000000000000");
    }

    #[test]
    fn test_format_large_values() {
        assert_eq!(format_value(1e16), "1.000000e+16");
        assert_eq!(format_value(-123456789012345678.0), "-1.234568e+17");
    }

    #[test]
    fn test_format_small_values() {
        assert_eq!(format_value(0.0000001), "1.000000e-7");
        assert_eq!(format_value(0.000001), "0.000001");
    }

    #[test]
    fn test_format_input_keeps_typed_text() {
        assert_eq!(format_input("3."), "3.");
        assert_eq!(format_input("0.50"), "0.50");
        assert_eq!(format_input("12345678901234567"), "1.234568e+16");
        assert_eq!(format_input(""), "0");
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(8.0), "8");
        assert_eq!(stringify(std::f64::consts::PI), "3.141592653589793");
        assert_eq!(stringify(1e21), "1e+21");
        assert_eq!(stringify(2.5e-7), "2.5e-7");
        assert_eq!(parse_operand(&stringify(1.5e300)), Some(1.5e300));
    }

    #[test]
    fn test_to_exponential_non_finite() {
        assert_eq!(to_exponential(f64::INFINITY, 6), "Infinity");
        assert_eq!(to_exponential(f64::NAN, 6), "NaN");
    }
}
