use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::timestamp::unique_path;
use crate::video::domain::image_writer::ImageWriter;

const CROP_EXTENSION: &str = "png";

/// Files written by one snapshot, per category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub faces: Vec<PathBuf>,
    pub objects: Vec<PathBuf>,
}

impl SnapshotReport {
    pub fn total(&self) -> usize {
        self.faces.len() + self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Crops every region out of `frame` and writes it as
/// `dir/<prefix>_<stamp>_<i>.png`, where `i` is the region's index in
/// `regions`. Regions that fall entirely outside the frame are skipped
/// without shifting the indices of the rest.
pub fn save_crops(
    writer: &dyn ImageWriter,
    frame: &Frame,
    regions: &[Region],
    dir: &Path,
    prefix: &str,
    stamp: &str,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut written = Vec::with_capacity(regions.len());
    for (i, region) in regions.iter().enumerate() {
        let Some(crop) = frame.crop(region) else {
            log::debug!("Skipping {prefix} {i}: {region} lies outside the frame");
            continue;
        };
        let path = unique_path(dir, &format!("{prefix}_{stamp}_{i}"), CROP_EXTENSION);
        writer.write(&path, &crop)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;
    use rstest::rstest;

    const STAMP: &str = "20240101_120000";

    fn gradient(w: u32, h: u32) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[x as u8, y as u8, 7]);
            }
        }
        Frame::new(data, w, h, 3, 0)
    }

    #[rstest]
    #[case::none(vec![], 0)]
    #[case::one(vec![Region::new(1, 1, 4, 4)], 1)]
    #[case::three(vec![Region::new(0, 0, 2, 2), Region::new(5, 5, 3, 3), Region::new(8, 0, 2, 6)], 3)]
    fn test_one_file_per_region(#[case] regions: Vec<Region>, #[case] expected: usize) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = save_crops(
            &ImageFileWriter::new(),
            &gradient(10, 10),
            &regions,
            tmp.path(),
            "face",
            STAMP,
        )
        .unwrap();
        assert_eq!(paths.len(), expected);
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_names_use_prefix_stamp_and_index() {
        let tmp = tempfile::tempdir().unwrap();
        let regions = [Region::new(0, 0, 2, 2), Region::new(2, 2, 2, 2)];
        let paths = save_crops(
            &ImageFileWriter::new(),
            &gradient(8, 8),
            &regions,
            tmp.path(),
            "object",
            STAMP,
        )
        .unwrap();
        assert_eq!(paths[0], tmp.path().join("object_20240101_120000_0.png"));
        assert_eq!(paths[1], tmp.path().join("object_20240101_120000_1.png"));
    }

    #[test]
    fn test_crop_content_is_clamped_region() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = save_crops(
            &ImageFileWriter::new(),
            &gradient(10, 10),
            &[Region::new(7, 8, 10, 10)],
            tmp.path(),
            "face",
            STAMP,
        )
        .unwrap();
        let img = image::open(&paths[0]).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [7, 8, 7]);
    }

    #[test]
    fn test_region_outside_frame_is_skipped_keeping_indices() {
        let tmp = tempfile::tempdir().unwrap();
        let regions = [Region::new(100, 100, 5, 5), Region::new(1, 1, 3, 3)];
        let paths = save_crops(
            &ImageFileWriter::new(),
            &gradient(10, 10),
            &regions,
            tmp.path(),
            "face",
            STAMP,
        )
        .unwrap();
        assert_eq!(paths, vec![tmp.path().join("face_20240101_120000_1.png")]);
    }

    #[test]
    fn test_second_snapshot_in_same_second_does_not_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ImageFileWriter::new();
        let frame = gradient(6, 6);
        let regions = [Region::new(0, 0, 3, 3)];

        let first = save_crops(&writer, &frame, &regions, tmp.path(), "face", STAMP).unwrap();
        let second = save_crops(&writer, &frame, &regions, tmp.path(), "face", STAMP).unwrap();
        assert_eq!(first[0], tmp.path().join("face_20240101_120000_0.png"));
        assert_eq!(second[0], tmp.path().join("face_20240101_120000_0_1.png"));
    }

    #[test]
    fn test_report_counts() {
        let report = SnapshotReport {
            faces: vec![PathBuf::from("a.png")],
            objects: vec![PathBuf::from("b.png"), PathBuf::from("c.png")],
        };
        assert_eq!(report.total(), 3);
        assert!(!report.is_empty());
        assert!(SnapshotReport::default().is_empty());
    }
}
