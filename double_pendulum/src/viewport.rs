use serde::{Deserialize, Serialize};

use crate::{model::Point, pendulum::DoublePendulum};

/// Pixels per meter used by `Viewport::for_canvas`.
pub const DEFAULT_SCALE: f64 = 100.0;

/// Affine map from simulation coordinates to drawing-surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub origin: Point,
}

impl Viewport {
    pub fn new(scale: f64, origin: Point) -> Self {
        Self { scale, origin }
    }

    /// Pivot centered horizontally, a third of the way down.
    pub fn for_canvas(width: f64, height: f64) -> Self {
        Self::new(DEFAULT_SCALE, Point::new(width / 2.0, height / 3.0))
    }

    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            self.origin.x + p.x * self.scale,
            self.origin.y + p.y * self.scale,
        )
    }
}

/// Everything a renderer needs for one frame, already in canvas coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub pivot: Point,
    pub bob1: Point,
    pub bob2: Point,
    /// Oldest first. Empty when the trail is hidden.
    pub trail: Vec<Point>,
}

impl Frame {
    pub fn capture(pendulum: &DoublePendulum, viewport: &Viewport, show_trail: bool) -> Self {
        let positions = pendulum.positions();
        let trail = if show_trail {
            pendulum
                .tip_history()
                .iter()
                .map(|p| viewport.to_canvas(*p))
                .collect()
        } else {
            Vec::new()
        };
        Self {
            pivot: viewport.origin,
            bob1: viewport.to_canvas(positions.bob1()),
            bob2: viewport.to_canvas(positions.tip()),
            trail,
        }
    }
}
