//! Minimal-turn resolution of IK solutions against a seed configuration.
//!
//! An IK solver is free to return any angular representative for a continuous
//! joint; committing the raw value can make the robot visibly unwind through
//! whole rotations between two small drags of a handle. The resolver shifts
//! every angular variable of the solution by whole turns so that it lands
//! within half a turn of the seed, reverting per variable where the shifted
//! value would violate position bounds.

use std::f64::consts::PI;

use tracing::{debug, warn};

use crate::model::{JointGroup, KinematicModel};

/// Adjusts `raw` (an IK solution for `group`, one value per group variable)
/// toward `seed`. Non-angular variables pass through unchanged. For each
/// angular variable the returned value is the representative of the raw
/// angle nearest to the seed, unless that representative violates the
/// variable's bounds, in which case the raw value is kept.
///
/// Joint typing is read fresh from the model on every call; the resolver
/// holds no per-variable state.
pub fn resolve_toward_seed(
    model: &KinematicModel,
    group: &JointGroup,
    seed: &[f64],
    raw: &[f64],
) -> Vec<f64> {
    assert_eq!(seed.len(), group.variables.len());
    assert_eq!(raw.len(), group.variables.len());

    let mut adjusted = raw.to_vec();
    for (gv, &variable) in group.variables.iter().enumerate() {
        if !model.is_variable_angle(variable) {
            continue;
        }

        let solved = raw[gv];
        let diff = seed[gv] - solved;
        // Whole turns between the seed and the raw solution.
        let hops = (diff.abs() / (2.0 * PI)).floor();
        let mut npos = solved + 2.0 * PI * hops * 1.0_f64.copysign(diff);
        if (npos - seed[gv]).abs() > PI {
            npos += 2.0 * PI * 1.0_f64.copysign(diff);
        }

        if hops > 0.0 {
            debug!(
                "unwinding '{}' from {:.3} to {:.3} ({} turns from seed {:.3})",
                model.variable_names()[variable],
                solved,
                npos,
                hops,
                seed[gv]
            );
        }

        if npos != solved && !model.variable_bounds(variable).contains(npos) {
            warn!(
                "unwound value {:.3} for '{}' out of bounds, keeping {:.3}",
                npos,
                model.variable_names()[variable],
                solved
            );
            continue;
        }
        adjusted[gv] = npos;
    }
    adjusted
}
