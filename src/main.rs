//! Demonstration binary: loads a URDF robot, selects a joint group and runs
//! one scripted handle drag through the complete pipeline (IK solve,
//! minimal-turn resolution, commit, handle and visualization refresh).
//!
//! The IK solver used here is a simple position-only coordinate descent,
//! sufficient to demonstrate the pipeline. A production setup injects a real
//! solver behind the same trait.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nalgebra::{Translation3, Vector3};

use rs_ik_command::bounds_checker::BoundsValidityChecker;
use rs_ik_command::feedback::{FeedbackEventKind, MarkerFeedback};
use rs_ik_command::kinematic_traits::{IkSolver, JointType, Pose};
use rs_ik_command::markers::{marker_name_from_tip_name, HandleDescriptor, MarkerHost};
use rs_ik_command::model::{JointGroup, KinematicModel};
use rs_ik_command::session::IkCommandSession;
use rs_ik_command::urdf;
use rs_ik_command::utils::dump_positions;
use rs_ik_command::visual::{LinkMarker, LinkMarkerSink};

#[derive(Parser)]
#[command(about = "Drive a robot's joint configuration by commanding a tip link pose")]
struct Cli {
    /// URDF file with the robot description
    urdf: PathBuf,

    /// Link whose joint subtree forms the controlled group
    #[arg(long, default_value = "base_link")]
    group_root: String,

    /// Name under which the joint group is registered
    #[arg(long, default_value = "arm")]
    group: String,

    /// Target position (x y z, meters) for the first tip link. Without it,
    /// the tip is dragged slightly away from its current position.
    #[arg(long, num_args = 3, allow_negative_numbers = true)]
    target: Option<Vec<f64>>,
}

/// Position-only cyclic coordinate descent over the group's revolute joints.
struct CcdSolver {
    max_sweeps: usize,
    tolerance: f64,
}

impl Default for CcdSolver {
    fn default() -> Self {
        CcdSolver { max_sweeps: 200, tolerance: 1e-4 }
    }
}

impl IkSolver for CcdSolver {
    fn solve(
        &self,
        model: &KinematicModel,
        group: &JointGroup,
        seed: &[f64],
        target: &Pose,
        _time_budget: Duration,
    ) -> Option<Vec<f64>> {
        let mut positions = model.default_positions();
        for (gv, &variable) in group.variables.iter().enumerate() {
            positions[variable] = seed[gv];
        }
        let tip = *model.group_tip_links(group).first()?;
        let tip_index = model.link_index(tip)?;
        let goal = target.translation.vector;

        for _ in 0..self.max_sweeps {
            let reached = model
                .link_transform_by_index(&positions, tip_index)
                .translation
                .vector;
            if (reached - goal).norm() < self.tolerance {
                return Some(group.variables.iter().map(|&v| positions[v]).collect());
            }

            for &joint_index in group.joints.iter().rev() {
                let joint = &model.joints()[joint_index];
                if !matches!(joint.joint_type, JointType::Revolute | JointType::Continuous) {
                    continue;
                }
                let joint_frame =
                    model.link_transform_by_index(&positions, joint.parent_link) * joint.origin;
                let axis = joint_frame.rotation * joint.axis.into_inner();
                let pivot = joint_frame.translation.vector;
                let tip_now = model
                    .link_transform_by_index(&positions, tip_index)
                    .translation
                    .vector;

                // Project both directions into the joint's rotation plane.
                let to_tip = tip_now - pivot;
                let to_goal = goal - pivot;
                let w1 = to_tip - axis * to_tip.dot(&axis);
                let w2 = to_goal - axis * to_goal.dot(&axis);
                if w1.norm() < 1e-9 || w2.norm() < 1e-9 {
                    continue;
                }
                let delta = w1.cross(&w2).dot(&axis).atan2(w1.dot(&w2));

                let variable = joint.first_variable;
                let bounds = model.variable_bounds(variable);
                let mut value = positions[variable] + delta;
                if bounds.bounded {
                    value = value.clamp(bounds.lower, bounds.upper);
                }
                positions[variable] = value;
            }
        }

        let reached = model
            .link_transform_by_index(&positions, tip_index)
            .translation
            .vector;
        if (reached - goal).norm() < self.tolerance * 100.0 {
            Some(group.variables.iter().map(|&v| positions[v]).collect())
        } else {
            None
        }
    }
}

/// Handle host that narrates what a 3D scene would display.
struct ConsoleHandleHost;

impl MarkerHost for ConsoleHandleHost {
    fn create_handle(&mut self, descriptor: HandleDescriptor) {
        println!("handle created: {} ({})", descriptor.name, descriptor.description);
    }

    fn set_handle_pose(&mut self, name: &str, pose: &Pose) -> bool {
        let t = pose.translation.vector;
        println!("handle {} moved to [{:.3} {:.3} {:.3}]", name, t.x, t.y, t.z);
        true
    }

    fn remove_all_handles(&mut self) {
        println!("all handles removed");
    }

    fn apply_changes(&mut self) {}
}

struct ConsoleMarkerSink;

impl LinkMarkerSink for ConsoleMarkerSink {
    fn publish(&mut self, markers: Vec<LinkMarker>) {
        if let Some(first) = markers.first() {
            println!(
                "phantom robot: {} link markers in '{}', color [{:.1} {:.1} {:.1}]",
                markers.len(),
                first.ns,
                first.color[0],
                first.color[1],
                first.color[2]
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let model = urdf::load_model_file(&cli.urdf)
        .with_context(|| format!("reading {}", cli.urdf.display()))?
        .with_chain_group(&cli.group, &cli.group_root)?;
    let model = Arc::new(model);

    let mut session = IkCommandSession::new(
        Box::new(CcdSolver::default()),
        Box::new(ConsoleHandleHost),
        Box::new(ConsoleMarkerSink),
        Box::new(BoundsValidityChecker),
    );
    session.load_model(model.clone());
    session.set_active_group(Some(&cli.group));

    let group = model.group(&cli.group).context("group was just defined")?;
    let tips = model.group_tip_links(group);
    let Some(&tip) = tips.first() else {
        bail!("group '{}' has no tip links", cli.group);
    };

    let current = model
        .link_global_transform(session.command().positions(), tip)
        .context("tip transform")?;
    let goal = match &cli.target {
        Some(t) => Translation3::new(t[0], t[1], t[2]),
        None => Translation3::from(current.translation.vector + Vector3::new(0.05, 0.0, -0.05)),
    };
    let target = Pose::from_parts(goal, current.rotation);

    println!("Joints before the drag:");
    dump_positions(session.command().positions());

    session.process_feedback(&MarkerFeedback {
        marker_name: marker_name_from_tip_name(tip),
        event_kind: FeedbackEventKind::PoseUpdate,
        pose: target,
    });

    println!("Joints after the drag:");
    dump_positions(session.command().positions());

    let reached = model
        .link_global_transform(session.command().positions(), tip)
        .context("tip transform")?;
    println!(
        "Tip '{}' now at [{:.3} {:.3} {:.3}], target was [{:.3} {:.3} {:.3}]",
        tip,
        reached.translation.x,
        reached.translation.y,
        reached.translation.z,
        goal.x,
        goal.y,
        goal.z
    );
    Ok(())
}
