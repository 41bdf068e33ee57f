//! # Auto-Balancer
//!
//! Derives a girder layout that closes the width equation
//!
//! ```text
//! overall_width = girder_count × girder_spacing + 2 × deck_overhang
//! ```
//!
//! The field the user edited last is authoritative; the others are derived
//! from it. Inputs are never rejected here, only clamped:
//!
//! - girder count to `[2, max_girders]`
//! - girder spacing to at least `MIN_SPACING`
//! - deck overhang to `[MIN_OVERHANG, max_overhang(count)]`
//!
//! ## Pass Order
//!
//! 1. Clamp the raw inputs.
//! 2. Apply the edited field (spacing edits re-derive the count; count or
//!    overhang edits re-derive the spacing).
//! 3. Solve the overhang from the count/spacing pair, then the spacing from
//!    the clamped overhang.
//! 4. Round spacing to 0.1 m.
//! 5. Absorb the rounding drift into the overhang (rounded to 0.1 m).
//!
//! Counts, spacings and overhangs round ties to even: 4.5 bays is four
//! girders and a 2.25 m spacing is 2.2 m.
//!
//! The order decides which field absorbs drift and must not be rearranged.

use super::{clamp, overall_width, round_to, AdjustedGeometry, ChangedField, MIN_OVERHANG, MIN_SPACING};

/// Deck width budget shared by every balancing pass
#[derive(Debug, Clone, Copy)]
struct WidthBudget {
    overall_width: f64,
}

impl WidthBudget {
    /// Most girders that fit at minimum spacing between minimum overhangs
    fn max_girders(&self) -> i64 {
        let fit = ((self.overall_width - 2.0 * MIN_OVERHANG) / MIN_SPACING).floor();
        (fit as i64).max(2)
    }

    /// Largest overhang that still leaves minimum spacing for `count` girders
    fn max_overhang(&self, count: i64) -> f64 {
        MIN_OVERHANG.max((self.overall_width - count as f64 * MIN_SPACING) / 2.0)
    }

    /// Width available to the girder bays, never below minimum spacing per girder
    fn usable_width(&self, overhang: f64, count: i64) -> f64 {
        (self.overall_width - 2.0 * overhang).max(MIN_SPACING * count as f64)
    }

    fn clamp_overhang(&self, overhang: f64, count: i64) -> f64 {
        clamp(overhang, MIN_OVERHANG, self.max_overhang(count))
    }

    /// Spacing that fills the usable width exactly
    fn fill_spacing(&self, overhang: f64, count: i64) -> f64 {
        self.usable_width(overhang, count) / count as f64
    }
}

/// Balance a girder layout for the given carriageway.
///
/// # Arguments
///
/// * `carriageway_width` - clear carriageway (m); sets the overall width
/// * `girder_spacing` - spacing as entered (m)
/// * `girder_count` - count as entered
/// * `deck_overhang` - overhang as entered (m)
/// * `changed_field` - the input the user edited last, if any
///
/// # Example
///
/// ```rust
/// use deck_core::geometry::{auto_adjust_geometry, ChangedField};
///
/// let geometry = auto_adjust_geometry(8.5, 2.2, 4, 1.75, Some(ChangedField::GirderSpacing));
/// assert_eq!(geometry.overall_width, 13.5);
/// assert_eq!(geometry.girder_count, 5);
/// assert_eq!(geometry.girder_spacing, 2.0);
/// assert_eq!(geometry.deck_overhang, 1.8);
/// ```
pub fn auto_adjust_geometry(
    carriageway_width: f64,
    girder_spacing: f64,
    girder_count: i64,
    deck_overhang: f64,
    changed_field: Option<ChangedField>,
) -> AdjustedGeometry {
    let budget = WidthBudget {
        overall_width: overall_width(carriageway_width),
    };
    let overall = budget.overall_width;
    let max_girders = budget.max_girders();

    let mut count = girder_count.max(2).min(max_girders);
    let mut spacing = girder_spacing.max(MIN_SPACING);
    let mut overhang = budget.clamp_overhang(deck_overhang, count);

    match changed_field {
        Some(ChangedField::GirderSpacing) => {
            let bays = budget.usable_width(overhang, count) / spacing;
            count = (bays.round_ties_even() as i64).max(2).min(max_girders);
            overhang = budget.clamp_overhang(overhang, count);
            spacing = budget.fill_spacing(overhang, count);
        }
        Some(ChangedField::GirderCount) | Some(ChangedField::DeckOverhang) => {
            overhang = budget.clamp_overhang(overhang, count);
            spacing = budget.fill_spacing(overhang, count);
        }
        None => {}
    }

    // Solve the overhang from the count/spacing pair, then settle the spacing.
    let preliminary_overhang = (overall - count as f64 * spacing) / 2.0;
    overhang = budget.clamp_overhang(preliminary_overhang, count);
    spacing = budget.fill_spacing(overhang, count).max(MIN_SPACING);

    spacing = round_to(spacing, 1);
    let max_overhang = budget.max_overhang(count);

    // Spacing rounding can reopen a small gap; only the overhang absorbs it.
    let residual = (overall - count as f64 * spacing).max(0.0);
    overhang = round_to(clamp(residual / 2.0, MIN_OVERHANG, max_overhang), 1);

    log::trace!(
        "balanced {:?}: width {:.2} = {} x {:.1} + 2 x {:.1}",
        changed_field,
        overall,
        count,
        spacing,
        overhang
    );

    AdjustedGeometry {
        overall_width: round_to(overall, 2),
        girder_spacing: spacing,
        girder_count: count,
        deck_overhang: overhang,
    }
}
