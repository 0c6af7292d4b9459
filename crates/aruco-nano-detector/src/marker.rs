use crate::detector::quad_perimeter;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One decoded marker.
///
/// `corners[0]` is the marker's top-left in its canonical orientation, followed
/// by top-right, bottom-right and bottom-left.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Dictionary id.
    pub id: u32,
    /// Image coordinates (x right, y down), sub-pixel refined when enabled.
    pub corners: [Point2<f32>; 4],
    /// Clockwise quarter turns the sampled grid needed before it matched (`0..4`).
    pub rotation: u8,
}

impl Marker {
    pub fn perimeter(&self) -> f32 {
        quad_perimeter(&self.corners)
    }

    /// Mean of the four corners.
    pub fn center(&self) -> Point2<f32> {
        let sum = self
            .corners
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / 4.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_corners_as_pairs() {
        let m = Marker {
            id: 7,
            corners: [
                Point2::new(1.0, 2.0),
                Point2::new(5.0, 2.0),
                Point2::new(5.0, 6.0),
                Point2::new(1.0, 6.0),
            ],
            rotation: 2,
        };
        let json = serde_json::to_string(&m).expect("json");
        assert_eq!(
            json,
            r#"{"id":7,"corners":[[1.0,2.0],[5.0,2.0],[5.0,6.0],[1.0,6.0]],"rotation":2}"#
        );
        assert_eq!(m.center(), Point2::new(3.0, 4.0));
        assert!((m.perimeter() - 16.0).abs() < 1e-6);
    }
}
