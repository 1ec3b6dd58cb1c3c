use std::path::PathBuf;

use crate::shared::constants::{FACES_OUTPUT_DIR, OBJECTS_OUTPUT_DIR};

/// Where snapshots and recordings land.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDirs {
    pub faces: PathBuf,
    pub objects: PathBuf,
    pub recordings: PathBuf,
}

impl Default for OutputDirs {
    /// Relative to the working directory.
    fn default() -> Self {
        Self {
            faces: PathBuf::from(FACES_OUTPUT_DIR),
            objects: PathBuf::from(OBJECTS_OUTPUT_DIR),
            recordings: PathBuf::from("."),
        }
    }
}

impl OutputDirs {
    /// All three directories under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            faces: root.join(FACES_OUTPUT_DIR),
            objects: root.join(OBJECTS_OUTPUT_DIR),
            recordings: root,
        }
    }

    /// Creates any missing directory.
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [&self.faces, &self.objects, &self.recordings] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
