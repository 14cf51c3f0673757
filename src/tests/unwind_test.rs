#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;

    use crate::kinematic_traits::JointType;
    use crate::model::{JointSpec, KinematicModel};
    use crate::tests::test_utils::sample_arm;
    use crate::unwind::resolve_toward_seed;

    // Group variables of "arm": joint1 (continuous), joint2 (revolute,
    // -2..2), joint3 (continuous).

    #[test]
    fn test_shorter_way_through_the_boundary() {
        // Seed at 170 degrees, solver answered -170 degrees: the correct
        // commit is 190 degrees, 20 degrees away, not 340 degrees back.
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        let seed = [170_f64.to_radians(), 0.0, 0.0];
        let raw = [(-170_f64).to_radians(), 0.0, 0.0];
        let adjusted = resolve_toward_seed(&model, group, &seed, &raw);

        assert_abs_diff_eq!(adjusted[0], 190_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_two_full_turns_unwound() {
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        let seed = [0.0, 0.0, 0.0];
        let raw = [720.1_f64.to_radians(), 0.0, 0.0];
        let adjusted = resolve_toward_seed(&model, group, &seed, &raw);

        assert_abs_diff_eq!(adjusted[0], 0.1_f64.to_radians(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_diff_means_no_adjustment() {
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        let seed = [1.25, 0.5, -0.75];
        let adjusted = resolve_toward_seed(&model, group, &seed, &seed);
        assert_eq!(adjusted, seed.to_vec());
    }

    #[test]
    fn test_bounded_revolute_reverts_instead_of_leaving_bounds() {
        // joint2 is limited to -2..2. The solution -1.8 is more than half a
        // turn from the seed 1.8, but the nearest representative 2 PI - 1.8
        // is far outside the limits; the raw value must be kept.
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        let seed = [0.0, 1.8, 0.0];
        let raw = [0.0, -1.8, 0.0];
        let adjusted = resolve_toward_seed(&model, group, &seed, &raw);

        assert_abs_diff_eq!(adjusted[1], -1.8, epsilon = 1e-12);
    }

    #[test]
    fn test_bounded_revolute_is_still_unwound_within_bounds() {
        // Within wide enough limits a bounded revolute is unwound like a
        // continuous joint.
        let model = KinematicModel::from_joints(
            "wide",
            vec![JointSpec::new("spin", JointType::Revolute, "base", "disk")
                .with_axis(nalgebra::Vector3::z_axis())
                .with_limits(-3.0 * PI, 3.0 * PI)],
        )
        .expect("valid model")
        .with_chain_group("disk", "base")
        .expect("valid group");
        let group = model.group("disk").expect("group defined");

        let adjusted = resolve_toward_seed(&model, group, &[0.2], &[0.2 - 2.0 * PI]);
        assert_abs_diff_eq!(adjusted[0], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_prismatic_passes_through() {
        let model = KinematicModel::from_joints(
            "slider",
            vec![JointSpec::new("slide", JointType::Prismatic, "base", "carriage")
                .with_axis(nalgebra::Vector3::x_axis())
                .with_limits(-10.0, 10.0)],
        )
        .expect("valid model")
        .with_chain_group("rail", "base")
        .expect("valid group");
        let group = model.group("rail").expect("group defined");

        // 7.0 is more than half a turn away from 0.0 but meters do not wrap.
        let adjusted = resolve_toward_seed(&model, group, &[0.0], &[7.0]);
        assert_eq!(adjusted, vec![7.0]);
    }

    #[test]
    fn test_result_is_within_half_turn_of_seed() {
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        for seed_deg in [-350, -180, -10, 0, 10, 170, 359, 720] {
            for raw_deg in [-725, -360, -170, -1, 0, 185, 360, 719] {
                let seed = [(seed_deg as f64).to_radians(), 0.0, 0.0];
                let raw = [(raw_deg as f64).to_radians(), 0.0, 0.0];
                let adjusted = resolve_toward_seed(&model, group, &seed, &raw);
                assert!(
                    (adjusted[0] - seed[0]).abs() <= PI + 1e-9,
                    "seed {} raw {} adjusted {}",
                    seed_deg,
                    raw_deg,
                    adjusted[0].to_degrees()
                );
                // Equivalent angle: unwinding only shifts by whole turns.
                let turns = (adjusted[0] - raw[0]) / (2.0 * PI);
                assert_abs_diff_eq!(turns, turns.round(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_idempotence() {
        let model = sample_arm();
        let group = model.group("arm").expect("group defined");

        let seed = [170_f64.to_radians(), 0.3, -3.0 * PI];
        let raw = [(-170_f64).to_radians(), 0.3, 3.0 * PI];

        let once = resolve_toward_seed(&model, group, &seed, &raw);
        let again = resolve_toward_seed(&model, group, &seed, &raw);
        assert_eq!(once, again);

        // A pass seeded with its own output finds zero hops to take.
        let settled = resolve_toward_seed(&model, group, &once, &once);
        assert_eq!(settled, once);
    }
}
