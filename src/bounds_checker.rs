//! Default validity oracle: joint limit compliance.
//!
//! Direct user edits may push a bounded variable outside its limits; such
//! configurations are permitted upstream and flagged invalid here, which the
//! visualization renders in red.

use crate::kinematic_traits::{Validity, ValidityChecker};
use crate::model::KinematicModel;

/// Declares a configuration valid iff every bounded variable is within its
/// limits. A configuration of the wrong shape is `Unknown` rather than
/// invalid, as it cannot be meaningfully checked.
pub struct BoundsValidityChecker;

impl ValidityChecker for BoundsValidityChecker {
    fn check_validity(&self, model: &KinematicModel, positions: &[f64]) -> Validity {
        if positions.len() != model.variable_count() {
            return Validity::Unknown;
        }
        for (variable, &value) in positions.iter().enumerate() {
            if !model.variable_bounds(variable).contains(value) {
                return Validity::Invalid;
            }
        }
        Validity::Valid
    }
}
