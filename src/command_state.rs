//! Ownership of the commanded robot configuration.
//!
//! [`RobotCommandState`] is the only writer of the live joint configuration.
//! Every mutation queues a [`Notification`]; the session drains the queue
//! after each operation and fans the notifications out to the marker manager
//! and the visualization, in mutation order.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::kinematic_traits::{IkSolver, Notification, Pose};
use crate::model::{JointGroup, KinematicModel};
use crate::utils::is_valid;

/// Default time budget handed to the IK solver for one interactive update.
pub const DEFAULT_IK_TIME_BUDGET: Duration = Duration::from_millis(50);

/// Owns the loaded kinematic model, the live configuration, the active group
/// selection and the injected IK solver.
pub struct RobotCommandState {
    model: Option<Arc<KinematicModel>>,
    positions: Vec<f64>,
    active_group: Option<String>,
    solver: Box<dyn IkSolver>,
    ik_time_budget: Duration,
    pending: Vec<Notification>,
}

impl RobotCommandState {
    pub fn new(solver: Box<dyn IkSolver>) -> Self {
        RobotCommandState {
            model: None,
            positions: Vec::new(),
            active_group: None,
            solver,
            ik_time_budget: DEFAULT_IK_TIME_BUDGET,
            pending: Vec::new(),
        }
    }

    /// Replaces the kinematic model and resets the configuration to the
    /// model's defaults. The active group selection is kept; if the new
    /// model does not define it, the handle set collapses to empty on the
    /// next reinitialization.
    pub fn load_model(&mut self, model: Arc<KinematicModel>) {
        self.positions = model.default_positions();
        self.model = Some(model);
        self.pending.push(Notification::ModelLoaded);
    }

    /// Unconditional write of one joint variable. Bounds are not enforced
    /// here; callers that care (the resolver, the validity oracle) check
    /// them. Out-of-range indices and writes without a model are reported
    /// and ignored.
    pub fn set_variable(&mut self, variable: usize, value: f64) {
        if self.model.is_none() {
            warn!("no model loaded, ignoring write of variable {}", variable);
            return;
        }
        if variable >= self.positions.len() {
            error!(
                "variable index {} out of range ({} variables)",
                variable,
                self.positions.len()
            );
            return;
        }
        self.positions[variable] = value;
        self.pending.push(Notification::StateChanged);
    }

    /// Selects the active joint group; `None` clears the selection. Emits
    /// a notification only when the selection actually changes.
    pub fn set_active_group(&mut self, group: Option<&str>) {
        let new = group.map(str::to_string);
        if new != self.active_group {
            self.active_group = new.clone();
            self.pending.push(Notification::ActiveGroupChanged(new));
        }
    }

    /// Solves IK for the named group, seeding the solver with the group's
    /// current configuration. The solution is returned, not committed; the
    /// caller decides what to do with it. `None` is an expected outcome for
    /// unreachable poses and is only logged at debug level.
    pub fn solve_ik(&self, group_name: &str, target: &Pose) -> Option<Vec<f64>> {
        let model = match &self.model {
            Some(model) => model,
            None => {
                warn!("no model loaded, cannot solve IK");
                return None;
            }
        };
        let group = match model.group(group_name) {
            Some(group) => group,
            None => {
                error!("failed to retrieve joint group '{}'", group_name);
                return None;
            }
        };
        let seed = self.group_positions(group);
        let solution = self
            .solver
            .solve(model, group, &seed, target, self.ik_time_budget)?;
        if solution.len() != group.variables.len() || !is_valid(&solution) {
            error!(
                "solver returned a malformed solution for group '{}' ({} values for {} variables)",
                group_name,
                solution.len(),
                group.variables.len()
            );
            return None;
        }
        debug!("IK solved for group '{}'", group_name);
        Some(solution)
    }

    pub fn is_variable_continuous(&self, variable: usize) -> bool {
        self.model
            .as_ref()
            .is_some_and(|model| model.is_variable_continuous(variable))
    }

    pub fn model(&self) -> Option<&Arc<KinematicModel>> {
        self.model.as_ref()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active_group.as_deref()
    }

    /// Current values of the group's variables, in group order.
    pub fn group_positions(&self, group: &JointGroup) -> Vec<f64> {
        group.variables.iter().map(|&v| self.positions[v]).collect()
    }

    pub fn set_ik_time_budget(&mut self, budget: Duration) {
        self.ik_time_budget = budget;
    }

    /// Drains the queued notifications, in the order the mutations occurred.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
