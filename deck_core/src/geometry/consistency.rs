//! Structural consistency of the spacing/count/overhang triple against the
//! deck width derived from the carriageway.
//!
//! Errors here block submission. Warnings only explain why the balanced
//! geometry differs from what was typed.

use super::{overall_width, Findings, GeometryField};

/// Mismatch (in girders, or in metres of width) tolerated before a warning
const BALANCE_TOLERANCE: f64 = 0.5;

const AUTO_BALANCED: &str =
    "Inputs were auto-balanced so that overall width = girders × spacing + 2 × overhang.";
const REBALANCING: &str = "Values are being rebalanced to satisfy the width equation.";

/// Detect conflicts between girder spacing, girder count and deck overhang.
///
/// Checks run in a fixed order; a later overhang error replaces an earlier
/// one, and spacing errors suppress the spacing warning.
pub fn detect_geometry_issues(
    carriageway_width: f64,
    girder_spacing: f64,
    girder_count: i64,
    deck_overhang: f64,
) -> Findings {
    let overall_width = overall_width(carriageway_width);
    let mut findings = Findings::default();
    let errors = &mut findings.errors;
    let warnings = &mut findings.warnings;

    if girder_count < 2 {
        errors.insert(
            GeometryField::GirderCount,
            "At least two girders are required.".to_string(),
        );
    }

    if girder_spacing <= 0.0 {
        errors.insert(
            GeometryField::GirderSpacing,
            "Girder spacing must be greater than zero.".to_string(),
        );
    }

    if deck_overhang * 2.0 >= overall_width {
        errors.insert(
            GeometryField::DeckOverhang,
            "Deck overhang must leave room for the girder bay.".to_string(),
        );
    }

    let effective_width = overall_width - 2.0 * deck_overhang;
    if girder_spacing >= effective_width && !errors.contains_key(&GeometryField::GirderSpacing) {
        errors.insert(
            GeometryField::GirderSpacing,
            "Girder spacing must be less than the usable deck width.".to_string(),
        );
    }

    if effective_width <= 0.0 {
        errors.insert(
            GeometryField::DeckOverhang,
            "Deck overhang consumes the deck width.".to_string(),
        );
    } else if girder_spacing > 0.0 {
        let computed_girders = effective_width / girder_spacing;
        if computed_girders <= 0.0 {
            errors.insert(
                GeometryField::GirderSpacing,
                "Spacing must allow for at least one girder bay.".to_string(),
            );
        } else if (computed_girders - girder_count as f64).abs() >= BALANCE_TOLERANCE
            && !errors.contains_key(&GeometryField::GirderSpacing)
        {
            warnings.insert(GeometryField::GirderSpacing, AUTO_BALANCED.to_string());
        }
    }

    let composed_width = girder_count as f64 * girder_spacing + 2.0 * deck_overhang;
    if (composed_width - overall_width).abs() >= BALANCE_TOLERANCE {
        warnings
            .entry(GeometryField::DeckOverhang)
            .or_insert_with(|| REBALANCING.to_string());
    }

    findings
}
