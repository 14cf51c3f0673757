//! Error handling for model description loading

use std::io;

/// Unified error to report failures while reading and assembling a kinematic
/// model from a robot description.
#[derive(Debug)]
pub enum ModelError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    WrongAngle(String),
    UnknownJointType(String),
    UnknownLink(String),
    DuplicateJoint(String),
    DuplicateGroup(String),
    EmptyGroup(String),
    NotATree(String),
    XmlProcessingError(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ModelError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ModelError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ModelError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ModelError::WrongAngle(ref msg) =>
                write!(f, "Wrong angle representation: {}", msg),
            ModelError::UnknownJointType(ref msg) =>
                write!(f, "Unknown joint type: {}", msg),
            ModelError::UnknownLink(ref msg) =>
                write!(f, "Unknown link: {}", msg),
            ModelError::DuplicateJoint(ref msg) =>
                write!(f, "Duplicate joint: {}", msg),
            ModelError::DuplicateGroup(ref msg) =>
                write!(f, "Duplicate group: {}", msg),
            ModelError::EmptyGroup(ref msg) =>
                write!(f, "Group contains no joints: {}", msg),
            ModelError::NotATree(ref msg) =>
                write!(f, "Link topology is not a tree: {}", msg),
            ModelError::XmlProcessingError(ref err) =>
                write!(f, "XML Processing Error: {}", err),
        }
    }
}

impl std::error::Error for ModelError {}

impl From<io::Error> for ModelError {
    fn from(err: io::Error) -> Self {
        ModelError::IoError(err)
    }
}
