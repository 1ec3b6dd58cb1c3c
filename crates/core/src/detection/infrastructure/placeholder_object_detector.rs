use crate::detection::domain::object_detector::ObjectDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// The two rectangles reported for every frame.
pub const PLACEHOLDER_REGIONS: [Region; 2] = [
    Region::new(50, 50, 100, 100),
    Region::new(200, 200, 50, 50),
];

/// Stand-in for a real object detector: reports fixed rectangles
/// regardless of frame content.
///
/// Exists so the object overlay and the `detected_objects` snapshot path
/// have something to exercise until an actual model is wired in.
pub struct PlaceholderObjectDetector {
    regions: Vec<Region>,
}

impl PlaceholderObjectDetector {
    pub fn new() -> Self {
        Self::with_regions(PLACEHOLDER_REGIONS.to_vec())
    }

    pub fn with_regions(regions: Vec<Region>) -> Self {
        log::warn!(
            "Object detection is a placeholder: {} fixed regions, not a real detector",
            regions.len()
        );
        Self { regions }
    }
}

impl Default for PlaceholderObjectDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectDetector for PlaceholderObjectDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        Ok(self.regions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::object_detector::NoObjectDetector;

    fn blank(w: u32, h: u32) -> Frame {
        Frame::new(vec![0; (w * h * 3) as usize], w, h, 3, 0)
    }

    #[test]
    fn test_reports_fixed_regions_for_any_frame() {
        let mut det = PlaceholderObjectDetector::new();
        let small = det.detect(&blank(8, 8)).unwrap();
        let large = det.detect(&blank(320, 240)).unwrap();
        assert_eq!(small, large);
        assert_eq!(
            small,
            vec![Region::new(50, 50, 100, 100), Region::new(200, 200, 50, 50)]
        );
    }

    #[test]
    fn test_custom_regions() {
        let mut det = PlaceholderObjectDetector::with_regions(vec![Region::new(1, 2, 3, 4)]);
        assert_eq!(det.detect(&blank(8, 8)).unwrap(), vec![Region::new(1, 2, 3, 4)]);
    }

    #[test]
    fn test_no_object_detector_is_empty() {
        assert!(NoObjectDetector.detect(&blank(8, 8)).unwrap().is_empty());
    }
}
