//! Numeric value formatting
//!
//! Values are zero padded to a total width that includes the sign and the
//! decimal point, like `printf("%0*.*f")`: 12.3 at width 6 with one
//! decimal renders as `0012.3`, -1.5 as `-001.5`.

use core::fmt::Write;

use heapless::String;

/// Widest total width honored
pub const MAX_WIDTH: u8 = 16;

/// Most decimal places honored
pub const MAX_DECIMALS: u8 = 6;

/// Capacity of a formatted value (sign, 39 integer digits of f32::MAX,
/// point, decimals)
pub const VALUE_LEN: usize = 48;

pub type ValueString = String<VALUE_LEN>;

/// Format `value` zero padded to `width` with `decimals` places
///
/// `width` and `decimals` are clamped to [`MAX_WIDTH`] and [`MAX_DECIMALS`].
pub fn format_value(value: f32, width: u8, decimals: u8) -> ValueString {
    let width = usize::from(width.min(MAX_WIDTH));
    let decimals = usize::from(decimals.min(MAX_DECIMALS));

    let mut out = String::new();
    // Cannot overflow: the clamps keep every finite f32 within VALUE_LEN
    let _ = write!(out, "{:0width$.decimals$}", value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_padding() {
        assert_eq!(format_value(12.3, 6, 1).as_str(), "0012.3");
        assert_eq!(format_value(0.0, 6, 1).as_str(), "0000.0");
        assert_eq!(format_value(123.4, 6, 1).as_str(), "0123.4");
    }

    #[test]
    fn test_negative_sign_counts_toward_width() {
        assert_eq!(format_value(-1.5, 6, 1).as_str(), "-001.5");
    }

    #[test]
    fn test_wider_than_width() {
        assert_eq!(format_value(123456.7, 6, 1).as_str(), "123456.7");
    }

    #[test]
    fn test_rounding_and_decimals() {
        assert_eq!(format_value(7.25678, 6, 2).as_str(), "007.26");
        assert_eq!(format_value(2.4, 1, 0).as_str(), "2");
    }

    #[test]
    fn test_extremes_fit() {
        let s = format_value(-f32::MAX, 200, 200);
        assert!(s.starts_with('-'));
        assert!(s.ends_with(".000000"));
    }
}
