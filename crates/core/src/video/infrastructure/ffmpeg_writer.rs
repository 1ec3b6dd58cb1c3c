use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Fallback when the requested frame rate rounds to zero.
const FALLBACK_FPS: i32 = 30;

/// `XVID` fourcc, as `MKTAG('X','V','I','D')`.
const XVID_FOURCC: u32 = u32::from_le_bytes(*b"XVID");

/// Encodes RGB frames via ffmpeg-next.
///
/// Uses the MPEG-4 Part 2 encoder (the XVID family), which every container
/// we write (AVI, MP4, MKV) accepts.
pub struct FfmpegWriter {
    encoding: Option<Encoding>,
}

/// Everything that only exists between `open` and `close`.
struct Encoding {
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    time_base: ffmpeg_next::Rational,
    stream_time_base: ffmpeg_next::Rational,
    frame_count: i64,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self { encoding: None }
    }

    /// Number of frames encoded since `open`, or 0 when closed.
    pub fn frames_written(&self) -> usize {
        self.encoding
            .as_ref()
            .map_or(0, |e| e.frame_count as usize)
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.encoding.is_some() {
            return Err("FfmpegWriter: already open".into());
        }
        ffmpeg_next::init()?;

        let mut octx = ffmpeg_next::format::output(path)?;

        let codec_tag = codec_tag_for(octx.format().name());
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);

        let fps_i = metadata.fps.round() as i32;
        let fps_i = if fps_i <= 0 { FALLBACK_FPS } else { fps_i };
        let time_base = ffmpeg_next::Rational(1, fps_i);

        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps_i, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        if let Some(tag) = codec_tag {
            // Safety: the context is exclusively owned and not yet opened.
            unsafe {
                (*encoder_ctx.as_mut_ptr()).codec_tag = tag;
            }
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        // The muxer may pick its own stream time base during write_header.
        let stream_time_base = octx.stream(0).ok_or("output stream missing")?.time_base();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Opened {} ({}x{} @ {} fps)",
            path.display(),
            metadata.width,
            metadata.height,
            fps_i
        );

        self.encoding = Some(Encoding {
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            time_base,
            stream_time_base,
            frame_count: 0,
        });

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let enc = self.encoding.as_mut().ok_or("FfmpegWriter: not opened")?;

        if frame.width() != enc.width || frame.height() != enc.height {
            return Err(format!(
                "frame is {}x{}, recording is {}x{}",
                frame.width(),
                frame.height(),
                enc.width,
                enc.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            enc.width,
            enc.height,
        );

        let stride = rgb_frame.stride(0);
        let row_bytes = enc.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..enc.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        enc.scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(enc.frame_count));

        enc.encoder.send_frame(&yuv_frame)?;
        enc.drain()?;

        enc.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut enc) = self.encoding.take() else {
            return Ok(());
        };

        enc.encoder.send_eof()?;
        enc.drain()?;
        enc.octx.write_trailer()?;

        log::debug!("Closed recording after {} frames", enc.frame_count);
        Ok(())
    }
}

impl Encoding {
    fn drain(&mut self) -> Result<(), ffmpeg_next::Error> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(self.time_base, self.stream_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }
}

/// AVI files carry the `XVID` fourcc; other containers keep the muxer's
/// default tag for MPEG-4.
fn codec_tag_for(format_name: &str) -> Option<u32> {
    match format_name {
        "avi" => Some(XVID_FOURCC),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(w: u32, h: u32, fps: f64) -> VideoMetadata {
        VideoMetadata {
            width: w,
            height: h,
            fps,
            codec: String::new(),
        }
    }

    fn solid_frame(index: usize, w: u32, h: u32, value: u8) -> Frame {
        let data = vec![value; (w * h * 3) as usize];
        Frame::new(data, w, h, 3, index)
    }

    #[test]
    fn test_write_creates_avi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorded_video_test.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 20.0)).unwrap();
        for i in 0..3 {
            writer.write(&solid_frame(i, 160, 120, 128)).unwrap();
        }
        assert_eq!(writer.frames_written(), 3);
        writer.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_written_video_has_correct_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 20.0)).unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();

        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 160);
        assert_eq!(decoder.height(), 120);
    }

    #[test]
    fn test_avi_is_tagged_xvid() {
        assert_eq!(XVID_FOURCC, 0x4449_5658);
        assert_eq!(codec_tag_for("avi"), Some(XVID_FOURCC));
        assert_eq!(codec_tag_for("mp4"), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.avi");
        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 20.0)).unwrap();
        writer.write(&solid_frame(0, 160, 120, 64)).unwrap();
        writer.close().unwrap();

        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let tag = unsafe { (*stream.parameters().as_ptr()).codec_tag };
        assert_eq!(tag, XVID_FOURCC);
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.write(&solid_frame(0, 160, 120, 128)).is_err());
    }

    #[test]
    fn test_write_rejects_mismatched_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 20.0)).unwrap();
        assert!(writer.write(&solid_frame(0, 80, 60, 0)).is_err());
        writer.close().unwrap();
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.avi");

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(160, 120, 20.0)).unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();
        assert!(writer.close().is_ok());
        assert_eq!(writer.frames_written(), 0);
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.close().is_ok());
    }
}
