//! Range checks against the software's engineering limits.

use super::{Findings, GeometryField, MAX_CARRIAGEWAY, MAX_SPAN, MIN_CARRIAGEWAY, MIN_SPAN, SKEW_LIMIT};

/// Check span, carriageway width and skew against fixed limits.
///
/// - span outside `[20, 45]` m is an error
/// - carriageway outside `[4.25, 24)` m is an error
/// - `|skew| > 15°` is a warning (IRC 24 detailed-analysis threshold)
///
/// Non-finite span or carriageway values fall outside every range and are
/// reported as errors.
pub fn validate_basic_range(span: f64, carriageway_width: f64, skew_angle: f64) -> Findings {
    let mut findings = Findings::default();

    if !(MIN_SPAN..=MAX_SPAN).contains(&span) {
        findings.errors.insert(
            GeometryField::Span,
            "Outside the software range (20 m to 45 m).".to_string(),
        );
    }

    if !(MIN_CARRIAGEWAY..MAX_CARRIAGEWAY).contains(&carriageway_width) {
        findings.errors.insert(
            GeometryField::CarriagewayWidth,
            "Carriageway width must be within 4.25 m to 24 m.".to_string(),
        );
    }

    if skew_angle.abs() > SKEW_LIMIT {
        findings.warnings.insert(
            GeometryField::SkewAngle,
            "IRC 24 (2010) requires detailed analysis for skew angles beyond ±15°.".to_string(),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_values_pass() {
        let findings = validate_basic_range(30.0, 8.5, 0.0);
        assert!(findings.errors.is_empty());
        assert!(findings.warnings.is_empty());
    }

    #[test]
    fn test_span_limits_are_inclusive() {
        assert!(validate_basic_range(20.0, 8.5, 0.0).errors.is_empty());
        assert!(validate_basic_range(45.0, 8.5, 0.0).errors.is_empty());
        assert!(validate_basic_range(19.99, 8.5, 0.0).errors.contains_key(&GeometryField::Span));
        assert!(validate_basic_range(45.01, 8.5, 0.0).errors.contains_key(&GeometryField::Span));
    }

    #[test]
    fn test_carriageway_upper_bound_is_exclusive() {
        assert!(validate_basic_range(30.0, 4.25, 0.0).errors.is_empty());
        assert!(validate_basic_range(30.0, 23.99, 0.0).errors.is_empty());

        let at_max = validate_basic_range(30.0, 24.0, 0.0);
        assert!(at_max.errors.contains_key(&GeometryField::CarriagewayWidth));

        let narrow = validate_basic_range(30.0, 4.0, 0.0);
        assert!(narrow.errors.contains_key(&GeometryField::CarriagewayWidth));
    }

    #[test]
    fn test_skew_warning_is_symmetric() {
        assert!(validate_basic_range(30.0, 8.5, 15.0).warnings.is_empty());
        assert!(validate_basic_range(30.0, 8.5, -15.5)
            .warnings
            .contains_key(&GeometryField::SkewAngle));

        let skewed = validate_basic_range(30.0, 8.5, 20.0);
        assert!(skewed.warnings.contains_key(&GeometryField::SkewAngle));
        assert!(skewed.errors.is_empty());
    }

    #[test]
    fn test_non_finite_values_are_errors() {
        let findings = validate_basic_range(f64::NAN, f64::INFINITY, 0.0);
        assert!(findings.errors.contains_key(&GeometryField::Span));
        assert!(findings.errors.contains_key(&GeometryField::CarriagewayWidth));
    }
}
