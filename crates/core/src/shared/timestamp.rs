use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Second-resolution local timestamp used in output file names.
pub fn file_stamp(now: DateTime<Local>) -> String {
    now.format(STAMP_FORMAT).to_string()
}

pub fn now_stamp() -> String {
    file_stamp(Local::now())
}

/// `dir/<stem>.<ext>`, or `dir/<stem>_<n>.<ext>` with the smallest `n >= 1`
/// that does not exist yet.
pub fn unique_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_stamp_format() {
        let t = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(file_stamp(t), "20240307_090501");
    }

    #[test]
    fn test_now_stamp_shape() {
        let stamp = now_stamp();
        assert_eq!(stamp.len(), 15);
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unique_path_free_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = unique_path(dir.path(), "face_20240101_000000_0", "png");
        assert_eq!(path, dir.path().join("face_20240101_000000_0.png"));
    }

    #[test]
    fn test_unique_path_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a_1.png"), b"x").unwrap();
        let path = unique_path(dir.path(), "a", "png");
        assert_eq!(path, dir.path().join("a_2.png"));
    }
}
