//! Loads the kinematic model from a URDF robot description (optional)

extern crate sxd_document;

use std::fs::read_to_string;
use std::path::Path;

use nalgebra::{Translation3, Unit, UnitQuaternion, Vector3};
use regex::Regex;
use sxd_document::{dom, parser, QName};

use crate::kinematic_traits::{JointType, Pose};
use crate::model::{JointSpec, KinematicModel};
use crate::model_error::ModelError;

/// Reads a kinematic model from a URDF file. XACRO files may also work as
/// long as the joint tree itself is not generated by macros: macro
/// constructs (`${prefix}` and the like) are stripped from names, and angle
/// attributes in the `${radians(<number>)}` form are understood.
///
/// # Parameters
/// - `path`: the location of the URDF or XACRO file to load from.
///
/// # Returns
/// - The assembled [`KinematicModel`] with no joint groups defined. Use
///   [`KinematicModel::with_chain_group`] to declare the controllable
///   sub-chains before handing the model to a session.
///
/// # Example
/// ```no_run
/// let model = rs_ik_command::urdf::load_model_file("robot.urdf")
///     .and_then(|model| model.with_chain_group("arm", "base_link"));
/// match model {
///     Ok(model) => println!("{} links", model.links().len()),
///     Err(e) => println!("Error processing URDF: {}", e),
/// }
/// ```
pub fn load_model_file<P: AsRef<Path>>(path: P) -> Result<KinematicModel, ModelError> {
    let xml = read_to_string(path)?;
    load_model(&xml)
}

/// Parses URDF XML content into a [`KinematicModel`]. See
/// [`load_model_file`] for the accepted content.
pub fn load_model(xml: &str) -> Result<KinematicModel, ModelError> {
    let package = parser::parse(xml)
        .map_err(|e| ModelError::XmlProcessingError(format!("{}", e)))?;
    let document = package.as_document();

    // Access the root element
    let root_element = document
        .root()
        .children()
        .into_iter()
        .find_map(|e| e.element())
        .ok_or_else(|| ModelError::ParseError("no root element in robot description".to_string()))?;
    if root_element.name() != QName::new("robot") {
        return Err(ModelError::ParseError(format!(
            "root element is <{}>, expected <robot>",
            root_element.name().local_part()
        )));
    }

    let name = root_element
        .attribute("name")
        .map(|a| sanitize_name(a.value()))
        .unwrap_or_else(|| "robot".to_string());

    let mut specs = Vec::new();
    collect_joints(root_element, &mut specs)?;

    KinematicModel::from_joints(&name, specs)
}

/// Strips macro constructs like `${prefix}` out of a name coming from a
/// XACRO-flavored description.
fn sanitize_name(name: &str) -> String {
    // Create a regex to find the ${prefix} pattern
    let re_prefix = Regex::new(r"\$\{[^}]+\}").unwrap();
    re_prefix.replace_all(name, "").trim().to_string()
}

// Recursive function to collect joint specifications. Joints may sit below
// macro wrappers, so the whole element tree is visited.
fn collect_joints(element: dom::Element, specs: &mut Vec<JointSpec>) -> Result<(), ModelError> {
    let joint_tag = QName::new("joint");
    for child in element.children().into_iter().filter_map(|e| e.element()) {
        if child.name() == joint_tag {
            if let Some(spec) = read_joint(child)? {
                specs.push(spec);
            }
        }
        collect_joints(child, specs)?;
    }
    Ok(())
}

fn read_joint(element: dom::Element) -> Result<Option<JointSpec>, ModelError> {
    let parent = child_element(element, "parent")
        .and_then(|e| e.attribute("link").map(|a| a.value().to_string()));
    let child = child_element(element, "child")
        .and_then(|e| e.attribute("link").map(|a| a.value().to_string()));
    // <transmission> and <gazebo> blocks contain <joint> references without
    // parent/child; those are not kinematic joints.
    let (Some(parent), Some(child)) = (parent, child) else {
        return Ok(None);
    };

    let name = element
        .attribute("name")
        .map(|a| a.value().to_string())
        .ok_or_else(|| ModelError::MissingField("joint name".to_string()))?;
    let type_attr = element
        .attribute("type")
        .ok_or_else(|| ModelError::MissingField(format!("type of joint '{}'", name)))?;
    let joint_type = match type_attr.value() {
        "fixed" => JointType::Fixed,
        "revolute" => JointType::Revolute,
        "continuous" => JointType::Continuous,
        "prismatic" => JointType::Prismatic,
        "planar" => JointType::Planar,
        "floating" => JointType::Floating,
        other => {
            return Err(ModelError::UnknownJointType(format!(
                "'{}' of joint '{}'",
                other, name
            )));
        }
    };

    let mut spec = JointSpec::new(
        &sanitize_name(&name),
        joint_type,
        &sanitize_name(&parent),
        &sanitize_name(&child),
    );
    if let Some(origin) = child_element(element, "origin") {
        spec = spec.with_origin(read_origin(origin)?);
    }
    if let Some(axis) = child_element(element, "axis") {
        spec = spec.with_axis(read_axis(axis)?);
    }
    if let Some(limit) = child_element(element, "limit") {
        let (lower, upper) = read_limits(limit)?;
        spec = spec.with_limits(lower, upper);
    }
    Ok(Some(spec))
}

fn child_element<'d>(element: dom::Element<'d>, tag: &str) -> Option<dom::Element<'d>> {
    let tag = QName::new(tag);
    element
        .children()
        .into_iter()
        .find_map(|e| e.element().filter(|el| el.name() == tag))
}

fn read_origin(element: dom::Element) -> Result<Pose, ModelError> {
    let xyz = read_triplet(element, "xyz")?.unwrap_or([0.0; 3]);
    let rpy = read_triplet(element, "rpy")?.unwrap_or([0.0; 3]);
    Ok(Pose::from_parts(
        Translation3::new(xyz[0], xyz[1], xyz[2]),
        UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]),
    ))
}

fn read_axis(element: dom::Element) -> Result<Unit<Vector3<f64>>, ModelError> {
    let xyz = read_triplet(element, "xyz")?.ok_or_else(|| {
        ModelError::MissingField("'xyz' attribute of the axis element".to_string())
    })?;
    Unit::try_new(Vector3::new(xyz[0], xyz[1], xyz[2]), 1e-9)
        .ok_or_else(|| ModelError::ParseError("axis must not be zero length".to_string()))
}

fn read_triplet(element: dom::Element, attribute: &str) -> Result<Option<[f64; 3]>, ModelError> {
    let attr = match element.attribute(attribute) {
        Some(attr) => attr,
        None => return Ok(None),
    };
    let values: Vec<f64> = attr
        .value()
        .split_whitespace()
        .map(parse_value)
        .collect::<Result<_, _>>()?;
    if values.len() != 3 {
        return Err(ModelError::ParseError(format!(
            "attribute '{}' does not contain exactly three values",
            attribute
        )));
    }
    Ok(Some([values[0], values[1], values[2]]))
}

fn parse_value(attr_value: &str) -> Result<f64, ModelError> {
    // Regular expression to match the ${radians(<number>)} format that is common in xacro
    let re = Regex::new(r"^\$\{radians\((-?\d+(\.\d+)?)\)\}$")
        .map_err(|_| ModelError::ParseError("Invalid regex pattern".to_string()))?;

    // Check if the input matches the special format
    if let Some(caps) = re.captures(attr_value) {
        let degrees_str = caps
            .get(1)
            .ok_or(ModelError::WrongAngle(format!(
                "Bad representation: {}",
                attr_value
            )))?
            .as_str();
        let degrees: f64 = degrees_str
            .parse()
            .map_err(|_| ModelError::WrongAngle(attr_value.to_string()))?;
        Ok(degrees.to_radians())
    } else {
        // Try to parse the input as a plain number in that case it is in radians
        let value: f64 = attr_value
            .parse()
            .map_err(|_| ModelError::WrongAngle(attr_value.to_string()))?;
        Ok(value)
    }
}

fn read_limits(element: dom::Element) -> Result<(f64, f64), ModelError> {
    let lower_attr = element
        .attribute("lower")
        .ok_or_else(|| ModelError::MissingField("lower limit not found".into()))?
        .value();
    let lower_limit = parse_value(lower_attr)?;

    let upper_attr = element
        .attribute("upper")
        .ok_or_else(|| ModelError::MissingField("upper limit not found".into()))?
        .value();
    let upper_limit = parse_value(upper_attr)?;

    Ok((lower_limit, upper_limit))
}
