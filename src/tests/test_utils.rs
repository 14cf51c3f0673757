//! Shared fixtures: a small sample arm, a scripted IK solver and recording
//! doubles for the handle host and the marker sink.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::bounds_checker::BoundsValidityChecker;
use crate::kinematic_traits::{IkSolver, JointType, Pose};
use crate::markers::{HandleDescriptor, MarkerHost};
use crate::model::{JointGroup, JointSpec, KinematicModel};
use crate::session::IkCommandSession;
use crate::visual::{LinkMarker, LinkMarkerSink};

/// Arm with a continuous base swivel, a bounded elbow, a continuous wrist
/// roll and a fixed camera bracket. Two groups: "arm" covers everything,
/// "forearm" only the wrist.
pub fn sample_arm() -> KinematicModel {
    KinematicModel::from_joints(
        "sample",
        vec![
            JointSpec::new("joint1", JointType::Continuous, "base_link", "link1")
                .with_translation(0.0, 0.0, 0.3)
                .with_axis(nalgebra::Vector3::z_axis()),
            JointSpec::new("joint2", JointType::Revolute, "link1", "link2")
                .with_translation(0.0, 0.0, 0.2)
                .with_axis(nalgebra::Vector3::y_axis())
                .with_limits(-2.0, 2.0),
            JointSpec::new("joint3", JointType::Continuous, "link2", "tool0")
                .with_translation(0.1, 0.0, 0.0)
                .with_axis(nalgebra::Vector3::x_axis()),
            JointSpec::new("camera_mount", JointType::Fixed, "link1", "camera_link"),
        ],
    )
    .expect("sample model is well formed")
    .with_chain_group("arm", "base_link")
    .expect("arm group is well formed")
    .with_chain_group("forearm", "link2")
    .expect("forearm group is well formed")
}

/// IK solver double returning scripted responses in order; an exhausted
/// script keeps answering "no solution".
pub struct FakeSolver {
    responses: RefCell<VecDeque<Option<Vec<f64>>>>,
}

impl FakeSolver {
    pub fn with_responses(responses: Vec<Option<Vec<f64>>>) -> Self {
        FakeSolver { responses: RefCell::new(responses.into()) }
    }

    pub fn failing() -> Self {
        FakeSolver::with_responses(Vec::new())
    }
}

impl IkSolver for FakeSolver {
    fn solve(
        &self,
        _model: &KinematicModel,
        _group: &JointGroup,
        _seed: &[f64],
        _target: &Pose,
        _time_budget: Duration,
    ) -> Option<Vec<f64>> {
        self.responses.borrow_mut().pop_front().flatten()
    }
}

/// Everything the session did to the handle host, in call order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    Create(String),
    SetPose(String),
    RemoveAll,
    Apply,
}

pub struct RecordingHost {
    log: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> (Box<dyn MarkerHost>, Rc<RefCell<Vec<HostCall>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Box::new(RecordingHost { log: log.clone() }), log)
    }
}

impl MarkerHost for RecordingHost {
    fn create_handle(&mut self, descriptor: HandleDescriptor) {
        self.log.borrow_mut().push(HostCall::Create(descriptor.name));
    }

    fn set_handle_pose(&mut self, name: &str, _pose: &Pose) -> bool {
        self.log.borrow_mut().push(HostCall::SetPose(name.to_string()));
        true
    }

    fn remove_all_handles(&mut self) {
        self.log.borrow_mut().push(HostCall::RemoveAll);
    }

    fn apply_changes(&mut self) {
        self.log.borrow_mut().push(HostCall::Apply);
    }
}

pub struct RecordingSink {
    published: Rc<RefCell<Vec<Vec<LinkMarker>>>>,
}

impl RecordingSink {
    pub fn new() -> (Box<dyn LinkMarkerSink>, Rc<RefCell<Vec<Vec<LinkMarker>>>>) {
        let published = Rc::new(RefCell::new(Vec::new()));
        (Box::new(RecordingSink { published: published.clone() }), published)
    }
}

impl LinkMarkerSink for RecordingSink {
    fn publish(&mut self, markers: Vec<LinkMarker>) {
        self.published.borrow_mut().push(markers);
    }
}

/// Session over the recording doubles, with the bounds oracle installed.
pub fn recorded_session(
    solver: FakeSolver,
) -> (
    IkCommandSession,
    Rc<RefCell<Vec<HostCall>>>,
    Rc<RefCell<Vec<Vec<LinkMarker>>>>,
) {
    let (host, host_log) = RecordingHost::new();
    let (sink, published) = RecordingSink::new();
    let session = IkCommandSession::new(
        Box::new(solver),
        host,
        sink,
        Box::new(BoundsValidityChecker),
    );
    (session, host_log, published)
}

/// Names of the handles created so far, in creation order.
pub fn created_handles(log: &Rc<RefCell<Vec<HostCall>>>) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|call| match call {
            HostCall::Create(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}
