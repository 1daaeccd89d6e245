//! Degree ↔ pixel conversion.
//!
//! Calibration is optional: a degree value with no pixels-per-degree constant
//! is simply unconvertible and the caller falls back to its pixel default.

/// Converts a visual-angle value to pixels. `None` when either side is absent.
pub fn to_pixels(value_deg: Option<f64>, pixels_per_degree: Option<f64>) -> Option<f64> {
    match (value_deg, pixels_per_degree) {
        (Some(deg), Some(ppd)) if deg.is_finite() && ppd.is_finite() && ppd > 0.0 => {
            Some(deg * ppd)
        }
        _ => None,
    }
}

/// Resolves a length with precedence: explicit pixels, then degrees × ppd,
/// then `default_px`.
pub fn resolve_length(
    px: Option<f64>,
    deg: Option<f64>,
    pixels_per_degree: Option<f64>,
    default_px: f64,
) -> f64 {
    px.filter(|v| v.is_finite())
        .or_else(|| to_pixels(deg, pixels_per_degree))
        .unwrap_or(default_px)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_with_calibration() {
        assert_eq!(to_pixels(Some(2.0), Some(35.5)), Some(71.0));
    }

    #[test]
    fn missing_calibration_is_unconvertible() {
        assert_eq!(to_pixels(Some(2.0), None), None);
        assert_eq!(to_pixels(None, Some(30.0)), None);
        assert_eq!(to_pixels(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn pixels_win_over_degrees() {
        assert_eq!(resolve_length(Some(12.0), Some(1.0), Some(30.0), 40.0), 12.0);
        assert_eq!(resolve_length(None, Some(1.0), Some(30.0), 40.0), 30.0);
        assert_eq!(resolve_length(None, Some(1.0), None, 40.0), 40.0);
        assert_eq!(resolve_length(Some(f64::NAN), None, None, 40.0), 40.0);
    }
}
