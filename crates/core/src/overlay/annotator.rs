use crate::shared::constants::{BOX_THICKNESS, FACE_BOX_COLOR, OBJECT_BOX_COLOR};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Draws detection boxes onto frames.
#[derive(Clone, Debug)]
pub struct Annotator {
    pub face_color: [u8; 3],
    pub object_color: [u8; 3],
    pub thickness: u32,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            face_color: FACE_BOX_COLOR,
            object_color: OBJECT_BOX_COLOR,
            thickness: BOX_THICKNESS,
        }
    }
}

impl Annotator {
    /// Faces first, then objects, so objects win where boxes overlap.
    pub fn annotate(&self, frame: &mut Frame, faces: &[Region], objects: &[Region]) {
        for r in faces {
            draw_rectangle(frame, r, self.face_color, self.thickness);
        }
        for r in objects {
            draw_rectangle(frame, r, self.object_color, self.thickness);
        }
    }
}

/// Outlines `region` with a border `thickness` pixels wide and clipped to
/// the frame.
///
/// The stroke lies inside the region rather than centred on its edge, so
/// the outermost pixels of the box are `region.x`, `region.right() - 1` and
/// likewise vertically. A crop of the same region therefore shows the whole
/// border when taken from an annotated frame.
pub fn draw_rectangle(frame: &mut Frame, region: &Region, color: [u8; 3], thickness: u32) {
    let Some(r) = region.clamp_to(frame.width(), frame.height()) else {
        return;
    };
    let t = thickness.max(1) as i32;
    let mut pixels = frame.as_ndarray_mut();

    let mut paint = |x: i32, y: i32| {
        for (c, &value) in color.iter().enumerate() {
            pixels[[y as usize, x as usize, c]] = value;
        }
    };

    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            let on_border = x - region.x < t
                || region.right() - 1 - x < t
                || y - region.y < t
                || region.bottom() - 1 - y < t;
            if on_border {
                paint(x, y);
            }
        }
    }
}
