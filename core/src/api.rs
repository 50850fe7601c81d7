use crate::config::LabelerConfig;
use crate::error::{Result, ViewtagError};
use crate::frames::{CineLibrary, FrameSource};
use crate::scan::enumerate;
use crate::session::Session;
use crate::store::AnnotationStore;
use crate::types::{MediaItem, MediaKind};
use log::info;

/// Outcome of scanning the media directory into the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Files found on disk
    pub discovered: usize,
    /// Records in the store after the scan
    pub records: usize,
    /// Records already carrying a label
    pub classified: usize,
}

/// Enumerates media and creates or extends the annotation store
///
/// # Errors
///
/// Returns [`ViewtagError::NoPlayableMedia`] when nothing is found, and
/// propagates duplicate-name and spreadsheet errors.
pub fn scan(config: &LabelerConfig) -> Result<(Vec<MediaItem>, AnnotationStore, ScanReport)> {
    let items = enumerate(&config.media_dir, config.kind)?;
    if items.is_empty() {
        return Err(ViewtagError::NoPlayableMedia(config.media_dir.clone()));
    }

    let store = AnnotationStore::load_or_init(&config.store_path, &items)?;
    let (classified, records) = store.progress();
    let report = ScanReport {
        discovered: items.len(),
        records,
        classified,
    };
    Ok((items, store, report))
}

/// Scans, decodes and positions a session on the first unclassified file
pub fn open_session(config: &LabelerConfig) -> Result<Session> {
    let (items, store, report) = scan(config)?;
    info!(
        "{} of {} files already classified",
        report.classified, report.records
    );

    let source = build_source(config, &items)?;
    Session::start(items, store, source, config.resume_policy)
}

fn build_source(config: &LabelerConfig, items: &[MediaItem]) -> Result<Box<dyn FrameSource>> {
    match config.kind {
        MediaKind::Dicom => Ok(Box::new(CineLibrary::load(items)?)),
        MediaKind::Video => video_source(config, items),
    }
}

#[cfg(feature = "video")]
fn video_source(config: &LabelerConfig, items: &[MediaItem]) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(crate::frames::video::player(
        items,
        config.frame_interval,
    )))
}

#[cfg(not(feature = "video"))]
fn video_source(_config: &LabelerConfig, _items: &[MediaItem]) -> Result<Box<dyn FrameSource>> {
    Err(ViewtagError::VideoError(
        "video playback requires the 'video' feature".to_string(),
    ))
}
