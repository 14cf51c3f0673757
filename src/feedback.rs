//! Dispatch of pose feedback events coming back from interactive handles.
//!
//! One drag of a handle becomes one pose-update event; the dispatcher runs
//! the IK solve and minimal-turn resolution pipeline and commits the result
//! variable by variable. IK failure is an expected outcome of unreachable
//! poses: the configuration is left untouched and no notification is
//! emitted.

use tracing::{debug, error};

use crate::command_state::RobotCommandState;
use crate::kinematic_traits::Pose;
use crate::markers::tip_name_from_marker_name;
use crate::unwind::resolve_toward_seed;

/// Kind of a feedback event delivered by the handle host. Menu and button
/// events are reserved; the dispatcher ignores them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackEventKind {
    KeepAlive,
    PoseUpdate,
    MenuSelect,
    ButtonClick,
}

/// One feedback event from one handle.
#[derive(Clone, Debug)]
pub struct MarkerFeedback {
    pub marker_name: String,
    pub event_kind: FeedbackEventKind,
    pub pose: Pose,
}

/// Processes one feedback event against the command state. All failure
/// modes degrade to "configuration unchanged"; nothing here panics.
pub fn dispatch_feedback(state: &mut RobotCommandState, feedback: &MarkerFeedback) {
    debug!(
        "interactive handle feedback: handle '{}', event {:?}",
        feedback.marker_name, feedback.event_kind
    );

    match feedback.event_kind {
        FeedbackEventKind::PoseUpdate => pose_update(state, feedback),
        FeedbackEventKind::KeepAlive
        | FeedbackEventKind::MenuSelect
        | FeedbackEventKind::ButtonClick => {}
    }
}

fn pose_update(state: &mut RobotCommandState, feedback: &MarkerFeedback) {
    let group_name = match state.active_group() {
        Some(name) => name.to_string(),
        None => {
            error!("pose feedback with no active joint group");
            return;
        }
    };
    let model = match state.model() {
        Some(model) => model.clone(),
        None => {
            error!("pose feedback with no robot model loaded");
            return;
        }
    };
    let group = match model.group(&group_name) {
        Some(group) => group,
        None => {
            error!("failed to retrieve joint group '{}'", group_name);
            return;
        }
    };

    let tip_link = tip_name_from_marker_name(&feedback.marker_name);
    debug!("running IK from tip link '{}'", tip_link);

    // The seed is captured before the solve; the resolver measures turns
    // against it.
    let seed = state.group_positions(group);

    let solution = match state.solve_ik(&group_name, &feedback.pose) {
        Some(solution) => solution,
        None => {
            debug!("no IK solution for handle '{}', keeping configuration", feedback.marker_name);
            return;
        }
    };

    let adjusted = resolve_toward_seed(&model, group, &seed, &solution);
    for (gv, &variable) in group.variables.iter().enumerate() {
        state.set_variable(variable, adjusted[gv]);
    }
}
