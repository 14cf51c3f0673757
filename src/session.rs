//! The session ties the command state, the handle manager and the
//! visualization together and is the single fan-out point for
//! notifications.
//!
//! Every public operation runs the underlying mutation first, then drains
//! the notification queue in mutation order. Handle recreation therefore
//! always completes, including its `apply_changes`, before any later pose
//! refresh is processed. Everything is synchronous on the caller's thread;
//! a multi-threaded host must serialize calls into the session.

use std::sync::Arc;

use crate::command_state::RobotCommandState;
use crate::feedback::{dispatch_feedback, MarkerFeedback};
use crate::kinematic_traits::{IkSolver, Notification, ValidityChecker};
use crate::markers::{MarkerHost, MarkerSessionManager};
use crate::model::KinematicModel;
#[cfg(feature = "allow_filesystem")]
use crate::model_error::ModelError;
use crate::visual::{LinkMarkerSink, RobotVisualization};

pub struct IkCommandSession {
    command: RobotCommandState,
    markers: MarkerSessionManager,
    visualization: RobotVisualization,
}

impl IkCommandSession {
    pub fn new(
        solver: Box<dyn IkSolver>,
        host: Box<dyn MarkerHost>,
        sink: Box<dyn LinkMarkerSink>,
        validity: Box<dyn ValidityChecker>,
    ) -> Self {
        IkCommandSession {
            command: RobotCommandState::new(solver),
            markers: MarkerSessionManager::new(host),
            visualization: RobotVisualization::new(sink, validity),
        }
    }

    /// Installs a new kinematic model; the configuration resets to the
    /// model's defaults and the handle set is rebuilt.
    pub fn load_model(&mut self, model: Arc<KinematicModel>) {
        self.command.load_model(model);
        self.pump();
    }

    /// Parses a URDF robot description and installs the resulting model with
    /// the given chain group defined. On failure the prior model, handles and
    /// configuration are left untouched.
    #[cfg(feature = "allow_filesystem")]
    pub fn load_model_description(
        &mut self,
        xml: &str,
        group_name: &str,
        group_root: &str,
    ) -> Result<(), ModelError> {
        let model = crate::urdf::load_model(xml)?.with_chain_group(group_name, group_root)?;
        self.load_model(Arc::new(model));
        Ok(())
    }

    /// Selects (or clears) the active joint group, rebuilding the handles.
    pub fn set_active_group(&mut self, group: Option<&str>) {
        self.command.set_active_group(group);
        self.pump();
    }

    /// Direct write of one joint variable, as the panel's per-joint spin
    /// boxes would do it.
    pub fn set_variable(&mut self, variable: usize, value: f64) {
        self.command.set_variable(variable, value);
        self.pump();
    }

    /// Entry point for feedback events delivered by the handle host.
    pub fn process_feedback(&mut self, feedback: &MarkerFeedback) {
        dispatch_feedback(&mut self.command, feedback);
        self.pump();
    }

    pub fn command(&self) -> &RobotCommandState {
        &self.command
    }

    pub fn markers(&self) -> &MarkerSessionManager {
        &self.markers
    }

    // Notification fan-out. The components react to state only; nothing in
    // here mutates the command state, so the drain cannot grow.
    fn pump(&mut self) {
        for notification in self.command.take_notifications() {
            match notification {
                Notification::ModelLoaded => {
                    self.markers.reinit(
                        self.command.model().map(|m| m.as_ref()),
                        self.command.active_group(),
                    );
                    if let Some(model) = self.command.model() {
                        self.visualization.refresh(model, self.command.positions());
                    }
                }
                Notification::ActiveGroupChanged(_) => {
                    self.markers.reinit(
                        self.command.model().map(|m| m.as_ref()),
                        self.command.active_group(),
                    );
                }
                Notification::StateChanged => {
                    if let Some(model) = self.command.model() {
                        self.markers.refresh(model, self.command.positions());
                        self.visualization.refresh(model, self.command.positions());
                    }
                }
            }
        }
    }
}
