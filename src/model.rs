//! Kinematic model: links, joints, named joint groups and forward transforms.
//!
//! The model is immutable once assembled. All mutable state (the live joint
//! configuration) lives in [`crate::command_state::RobotCommandState`]; the
//! model is shared read-only between the components that need joint typing,
//! bounds or link transforms.

use std::collections::{HashMap, HashSet};

use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};

use crate::kinematic_traits::{JointType, Pose, VariableBounds};
use crate::model_error::ModelError;

/// One rigid body of the robot. The root link has no parent joint.
#[derive(Clone, Debug)]
pub struct Link {
    pub name: String,
    pub parent_joint: Option<usize>,
}

/// One joint connecting a parent link to a child link. `origin` is the
/// transform from the parent link frame to the joint frame; the variable
/// motion is applied after it, about or along `axis`.
#[derive(Clone, Debug)]
pub struct Joint {
    pub name: String,
    pub joint_type: JointType,
    pub parent_link: usize,
    pub child_link: usize,
    pub origin: Pose,
    pub axis: Unit<Vector3<f64>>,
    /// Index of this joint's first variable in the model-wide configuration.
    pub first_variable: usize,
}

/// A named kinematic sub-chain: the joints in the subtree under a chosen root
/// link, with their child links and configuration variables in model order.
#[derive(Clone, Debug)]
pub struct JointGroup {
    pub name: String,
    pub joints: Vec<usize>,
    pub links: Vec<usize>,
    /// Model-wide variable indices of the group, in group order. Group-local
    /// vectors (seeds, IK solutions) are indexed parallel to this.
    pub variables: Vec<usize>,
}

/// Specification of one joint, used to assemble a [`KinematicModel`] either
/// programmatically or from a parsed robot description. Links are created
/// implicitly from the parent and child names.
#[derive(Clone, Debug)]
pub struct JointSpec {
    pub name: String,
    pub joint_type: JointType,
    pub parent_link: String,
    pub child_link: String,
    pub origin: Pose,
    pub axis: Unit<Vector3<f64>>,
    /// Position limits, required for revolute and prismatic joints.
    pub limits: Option<(f64, f64)>,
}

impl JointSpec {
    pub fn new(name: &str, joint_type: JointType, parent_link: &str, child_link: &str) -> Self {
        JointSpec {
            name: name.to_string(),
            joint_type,
            parent_link: parent_link.to_string(),
            child_link: child_link.to_string(),
            origin: Pose::identity(),
            // URDF default axis
            axis: Vector3::x_axis(),
            limits: None,
        }
    }

    pub fn with_origin(mut self, origin: Pose) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_translation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.origin = Pose::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity());
        self
    }

    pub fn with_axis(mut self, axis: Unit<Vector3<f64>>) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.limits = Some((lower, upper));
        self
    }
}

/// Immutable-once-loaded description of the robot: link tree, joint typing,
/// per-variable bounds and named joint groups.
pub struct KinematicModel {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    root_link: usize,
    variable_names: Vec<String>,
    variable_joint: Vec<usize>,
    variable_bounds: Vec<VariableBounds>,
    groups: Vec<JointGroup>,
}

fn intern_link(
    name: &str,
    links: &mut Vec<Link>,
    index: &mut HashMap<String, usize>,
) -> usize {
    if let Some(&i) = index.get(name) {
        return i;
    }
    let i = links.len();
    links.push(Link { name: name.to_string(), parent_joint: None });
    index.insert(name.to_string(), i);
    i
}

impl KinematicModel {
    /// Assembles a model from joint specifications. Links are interned from
    /// the parent/child names; the topology must form a single tree.
    ///
    /// # Parameters
    /// - `name`: model name, also used as the marker namespace prefix by the
    ///   visualization.
    /// - `specs`: one entry per joint, in description order. The variable
    ///   indexing of the model follows this order.
    ///
    /// # Returns
    /// - The assembled model with no groups defined yet; chain groups are
    ///   added with [`KinematicModel::with_chain_group`].
    pub fn from_joints(name: &str, specs: Vec<JointSpec>) -> Result<Self, ModelError> {
        if specs.is_empty() {
            return Err(ModelError::MissingField("at least one joint".to_string()));
        }

        let mut links: Vec<Link> = Vec::new();
        let mut link_index: HashMap<String, usize> = HashMap::new();
        let mut joints: Vec<Joint> = Vec::with_capacity(specs.len());
        let mut joint_names: HashSet<String> = HashSet::new();
        let mut variable_names: Vec<String> = Vec::new();
        let mut variable_joint: Vec<usize> = Vec::new();
        let mut variable_bounds: Vec<VariableBounds> = Vec::new();

        for spec in specs {
            if !joint_names.insert(spec.name.clone()) {
                return Err(ModelError::DuplicateJoint(spec.name));
            }
            let bounds = match (spec.joint_type, spec.limits) {
                (JointType::Revolute | JointType::Prismatic, Some((lower, upper))) => {
                    VariableBounds::bounded(lower, upper)
                }
                (JointType::Revolute | JointType::Prismatic, None) => {
                    return Err(ModelError::MissingField(format!(
                        "limit for joint '{}'",
                        spec.name
                    )));
                }
                _ => VariableBounds::unbounded(),
            };
            if let Some((lower, upper)) = spec.limits {
                if lower > upper {
                    return Err(ModelError::ParseError(format!(
                        "joint '{}' has lower limit {} above upper limit {}",
                        spec.name, lower, upper
                    )));
                }
            }

            let parent_link = intern_link(&spec.parent_link, &mut links, &mut link_index);
            let child_link = intern_link(&spec.child_link, &mut links, &mut link_index);
            if links[child_link].parent_joint.is_some() {
                return Err(ModelError::NotATree(format!(
                    "link '{}' is the child of more than one joint",
                    spec.child_link
                )));
            }

            let joint_index = joints.len();
            links[child_link].parent_joint = Some(joint_index);

            let first_variable = variable_names.len();
            for suffix in spec.joint_type.variable_suffixes() {
                variable_names.push(format!("{}{}", spec.name, suffix));
                variable_joint.push(joint_index);
                variable_bounds.push(bounds);
            }

            joints.push(Joint {
                name: spec.name,
                joint_type: spec.joint_type,
                parent_link,
                child_link,
                origin: spec.origin,
                axis: spec.axis,
                first_variable,
            });
        }

        let roots: Vec<usize> = links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.parent_joint.is_none())
            .map(|(i, _)| i)
            .collect();
        if roots.len() != 1 {
            return Err(ModelError::NotATree(format!(
                "expected exactly one root link, found {}",
                roots.len()
            )));
        }

        Ok(KinematicModel {
            name: name.to_string(),
            links,
            joints,
            root_link: roots[0],
            variable_names,
            variable_joint,
            variable_bounds,
            groups: Vec::new(),
        })
    }

    /// Defines a named chain group: all joints in the subtree under
    /// `root_link`, in model order. Groups are part of the immutable model,
    /// so this consumes and returns the model.
    pub fn with_chain_group(mut self, group_name: &str, root_link: &str) -> Result<Self, ModelError> {
        if self.groups.iter().any(|g| g.name == group_name) {
            return Err(ModelError::DuplicateGroup(group_name.to_string()));
        }
        let root = self
            .link_index(root_link)
            .ok_or_else(|| ModelError::UnknownLink(root_link.to_string()))?;

        let mut in_subtree = vec![false; self.links.len()];
        in_subtree[root] = true;
        // Joint order is not guaranteed topological, iterate to a fixed point.
        let mut changed = true;
        while changed {
            changed = false;
            for joint in &self.joints {
                if in_subtree[joint.parent_link] && !in_subtree[joint.child_link] {
                    in_subtree[joint.child_link] = true;
                    changed = true;
                }
            }
        }

        let mut group = JointGroup {
            name: group_name.to_string(),
            joints: Vec::new(),
            links: Vec::new(),
            variables: Vec::new(),
        };
        for (joint_index, joint) in self.joints.iter().enumerate() {
            if in_subtree[joint.parent_link] {
                group.joints.push(joint_index);
                group.links.push(joint.child_link);
                for k in 0..joint.joint_type.variable_count() {
                    group.variables.push(joint.first_variable + k);
                }
            }
        }
        if group.joints.is_empty() {
            return Err(ModelError::EmptyGroup(group_name.to_string()));
        }

        self.groups.push(group);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_link(&self) -> &str {
        &self.links[self.root_link].name
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn groups(&self) -> &[JointGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&JointGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn link_index(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|link| link.name == name)
    }

    pub fn variable_count(&self) -> usize {
        self.variable_names.len()
    }

    pub fn variable_names(&self) -> &[String] {
        &self.variable_names
    }

    pub fn variable_bounds(&self, variable: usize) -> &VariableBounds {
        &self.variable_bounds[variable]
    }

    pub fn joint_of_variable(&self, variable: usize) -> &Joint {
        &self.joints[self.variable_joint[variable]]
    }

    /// True iff the variable belongs to a continuous rotation: a continuous
    /// revolute joint, or an unbounded variable of a planar or floating
    /// joint. These are the variables whose value is only meaningful modulo
    /// a full turn.
    pub fn is_variable_continuous(&self, variable: usize) -> bool {
        match self.joint_of_variable(variable).joint_type {
            JointType::Continuous => true,
            JointType::Planar | JointType::Floating => !self.variable_bounds[variable].bounded,
            _ => false,
        }
    }

    /// True iff the variable is angular: any revolute variable (bounded or
    /// continuous), or an unbounded variable of a planar or floating joint.
    /// This is the set the minimal-turn resolver sweeps; it subsumes
    /// [`KinematicModel::is_variable_continuous`].
    pub fn is_variable_angle(&self, variable: usize) -> bool {
        match self.joint_of_variable(variable).joint_type {
            JointType::Revolute | JointType::Continuous => true,
            JointType::Planar | JointType::Floating => !self.variable_bounds[variable].bounded,
            _ => false,
        }
    }

    /// Default configuration: zero for every variable, clamped into bounds
    /// where zero itself is not admissible.
    pub fn default_positions(&self) -> Vec<f64> {
        self.variable_bounds
            .iter()
            .map(|b| if b.bounded { 0.0_f64.clamp(b.lower, b.upper) } else { 0.0 })
            .collect()
    }

    /// The kinematic leaves of the group: every link reachable from the
    /// group root that is not itself the parent of another link in the
    /// group. Order follows the model's joint order, so the result is
    /// deterministic across recomputations.
    pub fn group_tip_links<'a>(&'a self, group: &'a JointGroup) -> Vec<&'a str> {
        group
            .links
            .iter()
            .filter(|&&link| !group.joints.iter().any(|&j| self.joints[j].parent_link == link))
            .map(|&link| self.links[link].name.as_str())
            .collect()
    }

    // Transform contributed by one joint at the given configuration,
    // including the fixed origin offset.
    fn joint_transform(&self, joint: &Joint, positions: &[f64]) -> Pose {
        let v = joint.first_variable;
        let local = match joint.joint_type {
            JointType::Fixed => Pose::identity(),
            JointType::Revolute | JointType::Continuous => Pose::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&joint.axis, positions[v]),
            ),
            JointType::Prismatic => Pose::from_parts(
                Translation3::from(joint.axis.into_inner() * positions[v]),
                UnitQuaternion::identity(),
            ),
            JointType::Planar => Pose::from_parts(
                Translation3::new(positions[v], positions[v + 1], 0.0),
                UnitQuaternion::from_axis_angle(&joint.axis, positions[v + 2]),
            ),
            JointType::Floating => Pose::from_parts(
                Translation3::new(positions[v], positions[v + 1], positions[v + 2]),
                UnitQuaternion::from_euler_angles(
                    positions[v + 3],
                    positions[v + 4],
                    positions[v + 5],
                ),
            ),
        };
        joint.origin * local
    }

    /// World (model-frame) transform of the link with the given index.
    /// `positions` must be a full model configuration.
    pub fn link_transform_by_index(&self, positions: &[f64], link: usize) -> Pose {
        let mut chain = Vec::new();
        let mut current = link;
        while let Some(joint_index) = self.links[current].parent_joint {
            chain.push(joint_index);
            current = self.joints[joint_index].parent_link;
        }
        let mut transform = Pose::identity();
        for &joint_index in chain.iter().rev() {
            transform *= self.joint_transform(&self.joints[joint_index], positions);
        }
        transform
    }

    /// World transform of the named link, or `None` if the link does not
    /// exist or the configuration has the wrong length.
    pub fn link_global_transform(&self, positions: &[f64], link_name: &str) -> Option<Pose> {
        if positions.len() != self.variable_count() {
            return None;
        }
        let link = self.link_index(link_name)?;
        Some(self.link_transform_by_index(positions, link))
    }
}
