//! Session configuration
//!
//! Defaults follow a fixed desktop layout: media under `<Desktop>/videos`
//! or `<Desktop>/dicom`, annotations next to them in one workbook per
//! variant. Command-line arguments override individual entries.

use crate::navigation::ResumePolicy;
use crate::types::{CategoryTaxonomy, MediaKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Redraw interval for video playback
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Font files tried, in order, when none is configured
pub const CJK_FONT_CANDIDATES: &[&str] = &[
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
];

/// Everything a labeling session needs to start
#[derive(Debug, Clone)]
pub struct LabelerConfig {
    pub kind: MediaKind,
    pub media_dir: PathBuf,
    pub store_path: PathBuf,
    pub taxonomy: CategoryTaxonomy,
    pub resume_policy: ResumePolicy,
    pub frame_interval: Duration,
    pub font_path: Option<PathBuf>,
}

impl LabelerConfig {
    /// Defaults for `kind` under the desktop directory
    pub fn for_kind(kind: MediaKind) -> Self {
        Self::for_kind_in(kind, &workspace_root())
    }

    /// Defaults for `kind` under an explicit root
    pub fn for_kind_in(kind: MediaKind, root: &Path) -> Self {
        Self {
            kind,
            media_dir: default_media_dir(kind, root),
            store_path: default_store_path(kind, root),
            taxonomy: CategoryTaxonomy::default(),
            resume_policy: ResumePolicy::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            font_path: None,
        }
    }

    /// Configured font, else the first candidate that exists
    pub fn resolve_font(&self) -> Option<PathBuf> {
        self.font_path.clone().or_else(|| {
            CJK_FONT_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
        })
    }
}

/// Desktop directory, falling back to home, then the working directory
pub fn workspace_root() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn default_media_dir(kind: MediaKind, root: &Path) -> PathBuf {
    match kind {
        MediaKind::Video => root.join("videos"),
        MediaKind::Dicom => root.join("dicom"),
    }
}

pub fn default_store_path(kind: MediaKind, root: &Path) -> PathBuf {
    root.join(format!("{}_names.xlsx", kind.simple_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_per_kind() {
        let root = Path::new("/home/op/Desktop");

        let video = LabelerConfig::for_kind_in(MediaKind::Video, root);
        assert_eq!(video.media_dir, root.join("videos"));
        assert_eq!(video.store_path, root.join("video_names.xlsx"));
        assert_eq!(video.frame_interval, Duration::from_millis(30));
        assert_eq!(video.resume_policy, ResumePolicy::ForwardOnly);

        let dicom = LabelerConfig::for_kind_in(MediaKind::Dicom, root);
        assert_eq!(dicom.media_dir, root.join("dicom"));
        assert_eq!(dicom.store_path, root.join("dicom_names.xlsx"));
    }

    #[test]
    fn test_configured_font_wins() {
        let mut config = LabelerConfig::for_kind_in(MediaKind::Video, Path::new("."));
        config.font_path = Some(PathBuf::from("/fonts/custom.ttf"));
        assert_eq!(config.resolve_font(), Some(PathBuf::from("/fonts/custom.ttf")));
    }
}
