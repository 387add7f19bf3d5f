use super::node::ActionKind;
use crate::geometry;
use glam::DVec2;
use itertools::Itertools;

/// Heading changes below this are folded into the preceding segment instead
/// of emitting a turn node.
const HEADING_TOLERANCE_DEG: f64 = 0.5;

/// Converts a freehand-drawn point list into discrete movement actions.
///
/// The stroke is first thinned with Ramer-Douglas-Peucker at `epsilon`
/// inches, then every surviving segment becomes a `TurnToHeading` (when the
/// direction actually changes) followed by a `Forward` of the segment
/// length. The authoring surface turns these into regular nodes.
pub fn freehand_to_actions(points: &[DVec2], epsilon: f64) -> Vec<ActionKind> {
    let simplified = geometry::simplify_path(points, epsilon);
    let mut actions = Vec::new();
    let mut last_heading: Option<f64> = None;

    for (a, b) in simplified.iter().tuple_windows() {
        let delta = *b - *a;
        let length = delta.length();
        if length < f64::EPSILON {
            continue;
        }
        let heading = delta.y.atan2(delta.x).to_degrees();
        let turn_needed = match last_heading {
            Some(prev) => (heading - prev).abs() > HEADING_TOLERANCE_DEG,
            None => heading.abs() > HEADING_TOLERANCE_DEG,
        };
        if turn_needed {
            actions.push(ActionKind::TurnToHeading { heading });
        }
        actions.push(ActionKind::Forward {
            distance: Some(length),
        });
        last_heading = Some(heading);
    }

    actions
}
