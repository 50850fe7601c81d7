use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions accepted for the video source
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "m4v"];

/// Extensions accepted for the DICOM source without probing the header
const DICOM_EXTENSIONS: &[&str] = &["dcm", "dicom"];

/// Which media variant a labeling session runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum MediaKind {
    Video,
    Dicom,
}

impl MediaKind {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Dicom => "dicom",
        }
    }

    /// File extensions recognised for this kind (lowercase)
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Dicom => DICOM_EXTENSIONS,
        }
    }

    /// Checks the extension of `path` against [`MediaKind::extensions`]
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// A media file found by the enumerator
///
/// Identity is the basename, which doubles as the annotation store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Full path to the file
    pub path: PathBuf,

    /// Basename of the file
    pub name: String,
}

impl MediaItem {
    /// Creates an item, taking the name from the last path component
    ///
    /// Returns `None` for paths without a UTF-8 file name.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        Some(Self { path, name })
    }
}
