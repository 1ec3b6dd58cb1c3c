use crate::capture::domain::frame_source::FrameGrabber;
use crate::capture::infrastructure::camera_config::CameraConfig;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Captures frames from a camera through libavdevice.
///
/// `grab` blocks until the device delivers the next frame, so this type is
/// normally driven from a worker thread (see `ThreadedCamera`).
pub struct FfmpegCamera {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    metadata: VideoMetadata,
    frame_index: usize,
}

// Safety: FfmpegCamera is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCamera {}

impl FfmpegCamera {
    pub fn open(config: &CameraConfig) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let input_format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == config.format)
            .ok_or_else(|| format!("capture format '{}' is not available", config.format))?;

        let mut options = ffmpeg_next::Dictionary::new();
        for (key, value) in config.options() {
            options.set(key, &value);
        }

        log::info!("Opening camera {} ({})", config.device, config.format);
        let ictx = ffmpeg_next::format::open_with(
            &config.device,
            &ffmpeg_next::format::format::Format::Input(input_format),
            options,
        )?
        .input();

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("camera has no video stream")?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let width = decoder.width();
        let height = decoder.height();
        let metadata = VideoMetadata {
            width,
            height,
            fps,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
        };

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::info!(
            "Camera ready: {}x{} @ {:.1} fps ({})",
            width,
            height,
            fps,
            metadata.codec
        );

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            metadata,
            frame_index: 0,
        })
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut rgb_frame)?;

        let pixels = extract_rgb_pixels(&rgb_frame, self.metadata.width, self.metadata.height);
        let frame = Frame::new(
            pixels,
            self.metadata.width,
            self.metadata.height,
            3,
            self.frame_index,
        );
        self.frame_index += 1;
        Ok(Some(frame))
    }
}

impl FrameGrabber for FfmpegCamera {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        loop {
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }

            let Some((stream, packet)) = self.ictx.packets().next() else {
                return Ok(None);
            };
            if stream.index() != self.stream_index {
                continue;
            }
            self.decoder.send_packet(&packet)?;
        }
    }
}

/// Names of the video capture formats compiled into libavdevice.
pub fn available_formats() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;
    ffmpeg_next::device::register_all();
    Ok(ffmpeg_next::device::input::video()
        .map(|f| f.name().to_string())
        .collect())
}

/// Copies tightly packed RGB rows out of a possibly padded ffmpeg frame.
fn extract_rgb_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let row_bytes = width as usize * 3;
    let src = frame.data(0);
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&src[start..start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_unknown_format_fails() {
        let config = CameraConfig {
            format: "no-such-capture-format".to_string(),
            device: "nowhere".to_string(),
            width: None,
            height: None,
            framerate: None,
        };
        assert!(FfmpegCamera::open(&config).is_err());
    }

    #[test]
    fn test_extract_rgb_pixels_drops_stride_padding() {
        ffmpeg_next::init().unwrap();
        let mut frame =
            ffmpeg_next::util::frame::video::Video::new(ffmpeg_next::format::Pixel::RGB24, 3, 2);
        let stride = frame.stride(0);
        {
            let data = frame.data_mut(0);
            for row in 0..2 {
                for b in 0..9 {
                    data[row * stride + b] = (row * 100 + b) as u8;
                }
            }
        }
        let pixels = extract_rgb_pixels(&frame, 3, 2);
        assert_eq!(pixels.len(), 18);
        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[8], 8);
        assert_eq!(pixels[9], 100);
        assert_eq!(pixels[17], 108);
    }
}
