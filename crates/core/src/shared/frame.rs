use ndarray::{s, ArrayView3, ArrayViewMut3};

use crate::shared::region::Region;

/// One captured camera image: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the capture and encode boundaries;
/// everything in between works on RGB24.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of this frame in the capture stream.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the part of the frame covered by `region`.
    ///
    /// The region is clamped to the frame first; `None` if nothing is left.
    pub fn crop(&self, region: &Region) -> Option<Frame> {
        let r = region.clamp_to(self.width, self.height)?;
        let (x, y) = (r.x as usize, r.y as usize);
        let (w, h) = (r.width as usize, r.height as usize);

        let view = self.as_ndarray();
        let roi = view.slice(s![y..y + h, x..x + w, ..]);
        let data: Vec<u8> = roi.iter().copied().collect();
        Some(Frame::new(
            data,
            w as u32,
            h as u32,
            self.channels,
            self.index,
        ))
    }

    /// RGBA copy of an RGB frame, as GUI image handles expect.
    pub fn to_rgba(&self) -> Vec<u8> {
        if self.channels == 4 {
            return self.data.clone();
        }
        let pixels = (self.width as usize) * (self.height as usize);
        let mut out = Vec::with_capacity(pixels * 4);
        for px in self.data.chunks_exact(self.channels as usize) {
            out.extend_from_slice(&px[..3]);
            out.push(255);
        }
        out
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
