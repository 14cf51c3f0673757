//! Interactive 6 DOF pose command for robot arms.
//!
//! An operator drags a 6 DOF handle in a 3D scene; this crate turns the
//! resulting pose feedback into a valid joint configuration and keeps the
//! on-screen handles synchronized with the live robot state. Inverse
//! kinematics runs from the current configuration as seed, and the
//! solution's angular joints are shifted by whole turns to stay close to the
//! seed without violating position limits, so the commanded robot never
//! visibly unwinds through full rotations between two small drags.
//!
//! # Features
//!
//! - Minimal-turn resolution of continuous joints: the committed value is
//!   always the representative of the IK solution nearest to the seed,
//!   within half a turn, with a per-variable fallback to the raw solution
//!   where limits would be violated.
//! - One interactive handle per end-effector of the selected joint group,
//!   rebuilt automatically when the model or the group selection changes and
//!   pose-refreshed on every state change.
//! - IK failure (unreachable pose) never corrupts the configuration: the
//!   pre-solve state stays authoritative and no refresh is triggered.
//! - Phantom robot visualization colored by a pluggable validity oracle.
//! - The IK solver, the validity oracle and the 3D host are injected behind
//!   traits, so the whole pipeline runs against fixtures in tests.
//! - Experimental support for reading the robot description from URDF.
//!
//! All work is synchronous on the caller's thread: a feedback event, a model
//! load or a direct joint edit runs the complete pipeline (solve, resolve,
//! commit, refresh) before returning.

pub mod kinematic_traits;
pub mod model;
pub mod model_error;

pub mod command_state;
pub mod unwind;
pub mod markers;
pub mod feedback;
pub mod visual;
pub mod bounds_checker;
pub mod session;

#[path = "utils/utils.rs"]
pub mod utils;

#[cfg(feature = "allow_filesystem")]
pub mod urdf;

#[cfg(test)]
#[cfg(feature = "allow_filesystem")]
mod tests;
