extern crate nalgebra as na;

use std::time::Duration;

use na::Isometry3;

use crate::model::{JointGroup, KinematicModel};

/// Pose of a link or of a command target. It contains both Cartesian position
/// and rotation quaternion
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// let translation = Translation3::new(1.0, 0.0, 0.0);
/// // The quaternion should be normalized to represent a valid rotation.
/// let rotation = UnitQuaternion::from_quaternion(na::Quaternion::new(1.0, 0.0, 0.0, 1.0).normalize());
/// let transform = Pose::from_parts(translation, rotation);
/// ```
pub type Pose = Isometry3<f64>;

/// Kind of a joint as defined in the robot description. The kind decides how
/// many position variables the joint contributes and whether those variables
/// wrap around a full turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointType {
    /// Rigid connection, no variables.
    Fixed,
    /// Rotation about the axis, position bounded by limits.
    Revolute,
    /// Rotation about the axis with no position limits. The value is only
    /// meaningful modulo a full turn.
    Continuous,
    /// Translation along the axis, position bounded by limits.
    Prismatic,
    /// Planar motion: translation in the joint plane plus rotation about the
    /// plane normal (variables x, y, theta).
    Planar,
    /// Free 6 DOF motion (variables x, y, z, roll, pitch, yaw).
    Floating,
}

impl JointType {
    /// How many position variables this joint contributes to the configuration.
    pub fn variable_count(&self) -> usize {
        match self {
            JointType::Fixed => 0,
            JointType::Revolute | JointType::Continuous | JointType::Prismatic => 1,
            JointType::Planar => 3,
            JointType::Floating => 6,
        }
    }

    pub(crate) fn variable_suffixes(&self) -> &'static [&'static str] {
        match self {
            JointType::Fixed => &[],
            JointType::Revolute | JointType::Continuous | JointType::Prismatic => &[""],
            JointType::Planar => &["/x", "/y", "/theta"],
            JointType::Floating => &["/x", "/y", "/z", "/roll", "/pitch", "/yaw"],
        }
    }
}

/// Position limits of a single joint variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: f64,
    /// False for variables that may take any value (continuous rotation).
    pub bounded: bool,
}

impl VariableBounds {
    pub fn bounded(lower: f64, upper: f64) -> Self {
        VariableBounds { lower, upper, bounded: true }
    }

    pub fn unbounded() -> Self {
        VariableBounds { lower: f64::NEG_INFINITY, upper: f64::INFINITY, bounded: false }
    }

    /// True if the value satisfies these bounds. Unbounded variables accept
    /// any finite value.
    pub fn contains(&self, value: f64) -> bool {
        !self.bounded || (value >= self.lower && value <= self.upper)
    }
}

/// Outcome of a configuration validity check. `Unknown` stands for
/// "not checked or not checkable", not for failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    Unknown,
}

/// Event emitted by the command state after a mutation. Consumers receive
/// notifications strictly in the order the mutations occurred.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    /// A new kinematic model replaced the previous one and the configuration
    /// was reset to defaults.
    ModelLoaded,
    /// One joint variable changed.
    StateChanged,
    /// The active joint group changed; `None` means no group is selected.
    ActiveGroupChanged(Option<String>),
}

/// External inverse kinematics solver. Implementations receive the seed
/// configuration of the group (one value per group variable, in group order)
/// and must return a solution of the same shape, or `None` if no solution was
/// found within the time budget.
pub trait IkSolver {
    fn solve(
        &self,
        model: &KinematicModel,
        group: &JointGroup,
        seed: &[f64],
        target: &Pose,
        time_budget: Duration,
    ) -> Option<Vec<f64>>;
}

/// External validity oracle for a full robot configuration.
pub trait ValidityChecker {
    fn check_validity(&self, model: &KinematicModel, positions: &[f64]) -> Validity;
}
