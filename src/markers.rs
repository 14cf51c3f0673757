//! Interactive control handles anchored at the active group's end-effectors.
//!
//! The session manager owns the handle set exclusively: the visualization
//! host only mirrors what is pushed through [`MarkerHost`]. Handles are
//! rebuilt wholesale when the model or the active group changes and
//! pose-refreshed on every state change; a refresh never recreates handles.

use bitflags::bitflags;
use tracing::{error, info, warn};

use crate::kinematic_traits::Pose;
use crate::model::KinematicModel;

bitflags! {
    /// Which 6 DOF controls a handle exposes to the operator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DofControls: u8 {
        const ROTATE_X = 0b00000001;
        const MOVE_X   = 0b00000010;
        const ROTATE_Y = 0b00000100;
        const MOVE_Y   = 0b00001000;
        const ROTATE_Z = 0b00010000;
        const MOVE_Z   = 0b00100000;

        const FULL_6DOF = Self::ROTATE_X.bits() | Self::MOVE_X.bits()
            | Self::ROTATE_Y.bits() | Self::MOVE_Y.bits()
            | Self::ROTATE_Z.bits() | Self::MOVE_Z.bits();
    }
}

/// Everything the host needs to create one interactive handle.
#[derive(Clone, Debug)]
pub struct HandleDescriptor {
    pub name: String,
    pub description: String,
    /// Visual size of the handle rings and arrows, meters.
    pub scale: f32,
    pub pose: Pose,
    pub controls: DofControls,
}

/// Host side of the interactive handles: a 3D visualization capable of
/// displaying 6 DOF manipulators and routing operator drags back as
/// feedback events. Mutations are batched; nothing is displayed until
/// `apply_changes` is called.
pub trait MarkerHost {
    fn create_handle(&mut self, descriptor: HandleDescriptor);
    /// Returns false if the host does not know the handle.
    fn set_handle_pose(&mut self, name: &str, pose: &Pose) -> bool;
    fn remove_all_handles(&mut self);
    fn apply_changes(&mut self);
}

/// Handle name for a tip link. The inverse is
/// [`tip_name_from_marker_name`]; both are pure so the mapping survives
/// handle recreation.
pub fn marker_name_from_tip_name(tip_name: &str) -> String {
    format!("{}_controls", tip_name)
}

/// Extracts the tip link name back out of a handle name.
pub fn tip_name_from_marker_name(marker_name: &str) -> &str {
    match marker_name.rfind("_control") {
        Some(position) => &marker_name[..position],
        None => marker_name,
    }
}

/// Owns the mapping between the active group's tip links and the interactive
/// handles shown by the host.
pub struct MarkerSessionManager {
    host: Box<dyn MarkerHost>,
    handle_names: Vec<String>,
}

impl MarkerSessionManager {
    pub fn new(host: Box<dyn MarkerHost>) -> Self {
        MarkerSessionManager { host, handle_names: Vec::new() }
    }

    /// Names of the currently existing handles, in tip link order.
    pub fn handle_names(&self) -> &[String] {
        &self.handle_names
    }

    /// Discards all handles and, if both a model and a valid active group
    /// are present, creates one handle per tip link of the group at the
    /// identity pose. Called on model load and on active group change.
    pub fn reinit(&mut self, model: Option<&KinematicModel>, active_group: Option<&str>) {
        info!("setting up interactive handles");

        self.host.remove_all_handles();
        self.handle_names.clear();

        let model = match model {
            Some(model) => model,
            None => {
                warn!("no robot model to initialize interactive handles from");
                self.host.apply_changes();
                return;
            }
        };
        let group_name = match active_group {
            Some(name) => name,
            None => {
                warn!("no active joint group to initialize interactive handles from");
                self.host.apply_changes();
                return;
            }
        };
        let group = match model.group(group_name) {
            Some(group) => group,
            None => {
                error!("failed to retrieve joint group '{}'", group_name);
                self.host.apply_changes();
                return;
            }
        };

        for tip_link in model.group_tip_links(group) {
            info!("adding interactive handle for controlling pose of link {}", tip_link);
            let name = marker_name_from_tip_name(tip_link);
            self.host.create_handle(HandleDescriptor {
                name: name.clone(),
                description: format!("ik control of link {}", tip_link),
                scale: 0.2,
                pose: Pose::identity(),
                controls: DofControls::FULL_6DOF,
            });
            self.handle_names.push(name);
        }

        self.host.apply_changes();
    }

    /// Pushes the current world pose of every handle's tip link to the host.
    /// Idempotent; never creates or removes handles.
    pub fn refresh(&mut self, model: &KinematicModel, positions: &[f64]) {
        for marker_name in &self.handle_names {
            let tip_link = tip_name_from_marker_name(marker_name);
            match model.link_global_transform(positions, tip_link) {
                Some(pose) => {
                    if !self.host.set_handle_pose(marker_name, &pose) {
                        error!("failed to set pose of interactive handle '{}'", marker_name);
                    }
                }
                None => {
                    error!("no transform for tip link '{}' of handle '{}'", tip_link, marker_name);
                }
            }
        }
        self.host.apply_changes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_name_round_trip() {
        for tip in ["tool0", "gripper_link", "left_control_arm_tip"] {
            let marker = marker_name_from_tip_name(tip);
            assert_eq!(tip_name_from_marker_name(&marker), tip);
        }
    }

    #[test]
    fn test_tip_name_of_foreign_marker() {
        // A name without the suffix passes through unchanged.
        assert_eq!(tip_name_from_marker_name("free_floating"), "free_floating");
    }

    #[test]
    fn test_full_6dof_covers_all_controls() {
        let all = DofControls::ROTATE_X
            | DofControls::MOVE_X
            | DofControls::ROTATE_Y
            | DofControls::MOVE_Y
            | DofControls::ROTATE_Z
            | DofControls::MOVE_Z;
        assert_eq!(DofControls::FULL_6DOF, all);
    }
}
