use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for the "objects" overlay category.
pub trait ObjectDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}

/// Reports no objects. Used when the placeholder overlay is switched off.
pub struct NoObjectDetector;

impl ObjectDetector for NoObjectDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        Ok(Vec::new())
    }
}
