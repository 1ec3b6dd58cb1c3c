use std::fmt;

/// Axis-aligned rectangle in frame pixel coordinates.
///
/// Detectors may report regions that overhang the frame; consumers clamp
/// with [`Region::clamp_to`] before touching pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a region from floating-point corners `(x1, y1)`-`(x2, y2)`.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let x = x1.floor() as i32;
        let y = y1.floor() as i32;
        Self {
            x,
            y,
            width: (x2.round() as i32 - x).max(0),
            height: (y2.round() as i32 - y).max(0),
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection with a `frame_width` x `frame_height` frame, or `None`
    /// when the two do not overlap.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<Region> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(frame_width as i32);
        let y2 = self.bottom().min(frame_height as i32);
        let clamped = Region::new(x1, y1, x2 - x1, y2 - y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_edges() {
        let r = Region::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let r = Region::new(10, 10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(r));
    }

    #[test]
    fn test_clamp_overhanging_bottom_right() {
        // Second placeholder rectangle on a 220x210 frame
        let r = Region::new(200, 200, 50, 50);
        assert_eq!(r.clamp_to(220, 210), Some(Region::new(200, 200, 20, 10)));
    }

    #[test]
    fn test_clamp_negative_origin() {
        let r = Region::new(-5, -10, 20, 20);
        assert_eq!(r.clamp_to(100, 100), Some(Region::new(0, 0, 15, 10)));
    }

    #[rstest]
    #[case::right_of_frame(Region::new(100, 0, 10, 10))]
    #[case::below_frame(Region::new(0, 100, 10, 10))]
    #[case::zero_width(Region::new(5, 5, 0, 10))]
    #[case::negative_height(Region::new(5, 5, 10, -3))]
    fn test_clamp_without_overlap_is_none(#[case] r: Region) {
        assert_eq!(r.clamp_to(100, 100), None);
    }

    #[test]
    fn test_from_corners() {
        let r = Region::from_corners(10.4, 20.9, 50.6, 60.2);
        assert_eq!(r, Region::new(10, 20, 41, 40));
    }

    #[test]
    fn test_from_corners_inverted_is_empty() {
        assert!(Region::from_corners(50.0, 50.0, 10.0, 10.0).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Region::new(1, 2, 3, 4).to_string(), "3x4+1+2");
    }
}
