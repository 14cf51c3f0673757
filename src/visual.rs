//! Phantom robot visualization: one marker per link, colored by validity.
//!
//! This is a pure read of the current state, regenerated on every state
//! change. The markers go to an external sink (typically the same 3D host
//! that displays the interactive handles); nothing is retained here.

use tracing::{debug, warn};

use crate::kinematic_traits::{Pose, Validity, ValidityChecker};
use crate::model::KinematicModel;

/// One displayable marker for one robot link.
#[derive(Clone, Debug)]
pub struct LinkMarker {
    pub link_name: String,
    /// Marker namespace, `<model_name>_phantom`.
    pub ns: String,
    pub id: usize,
    pub pose: Pose,
    /// RGBA, each component in 0..=1.
    pub color: [f32; 4],
}

/// Consumer of regenerated link marker sets.
pub trait LinkMarkerSink {
    fn publish(&mut self, markers: Vec<LinkMarker>);
}

/// Regenerates the link markers of the phantom robot from the current
/// configuration, colored green when the configuration is valid, red when
/// invalid and neutral gray when validity is indeterminate.
pub struct RobotVisualization {
    sink: Box<dyn LinkMarkerSink>,
    validity: Box<dyn ValidityChecker>,
}

impl RobotVisualization {
    pub fn new(sink: Box<dyn LinkMarkerSink>, validity: Box<dyn ValidityChecker>) -> Self {
        RobotVisualization { sink, validity }
    }

    pub fn refresh(&mut self, model: &KinematicModel, positions: &[f64]) {
        debug!("updating robot visualization");

        if positions.len() != model.variable_count() {
            warn!(
                "configuration has {} values for {} variables, skipping visualization",
                positions.len(),
                model.variable_count()
            );
            return;
        }

        let color = match self.validity.check_validity(model, positions) {
            Validity::Valid => [0.4, 1.0, 0.4, 0.8],
            Validity::Invalid => [1.0, 0.4, 0.4, 0.8],
            Validity::Unknown => [0.4, 0.4, 0.4, 0.8],
        };

        let ns = format!("{}_phantom", model.name());
        let markers = model
            .links()
            .iter()
            .enumerate()
            .map(|(id, link)| LinkMarker {
                link_name: link.name.clone(),
                ns: ns.clone(),
                id,
                pose: model.link_transform_by_index(positions, id),
                color,
            })
            .collect();

        self.sink.publish(markers);
    }
}
