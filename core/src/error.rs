use std::path::PathBuf;
use thiserror::Error;

/// Result type for viewtag operations
pub type Result<T> = std::result::Result<T, ViewtagError>;

/// Error types for viewtag operations
#[derive(Error, Debug)]
pub enum ViewtagError {
    /// DICOM reading or pixel decoding error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Video decoding error
    #[error("Video error: {0}")]
    VideoError(String),

    /// Annotation spreadsheet read/write error
    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(String),

    /// Invalid category taxonomy file
    #[error("Taxonomy error: {0}")]
    TaxonomyError(String),

    /// Windowing toolkit error
    #[error("GUI error: {0}")]
    GuiError(String),

    /// Scan found nothing that can be played
    #[error("No playable media files found in {}", .0.display())]
    NoPlayableMedia(PathBuf),

    /// Every DICOM file was single-frame or unreadable
    #[error("No multi-frame DICOM cine loops found")]
    NoCineFrames,

    /// Two files in the scanned tree share a basename
    #[error(
        "Duplicate file name {name}: {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Classification requested without a chosen label
    #[error("No classification label selected")]
    NoLabelSelected,

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for ViewtagError {
    fn from(e: dicom_object::ReadError) -> Self {
        ViewtagError::DicomError(format!("{}", e))
    }
}

impl From<dicom_pixeldata::Error> for ViewtagError {
    fn from(e: dicom_pixeldata::Error) -> Self {
        ViewtagError::DicomError(format!("{}", e))
    }
}

impl From<calamine::XlsxError> for ViewtagError {
    fn from(e: calamine::XlsxError) -> Self {
        ViewtagError::SpreadsheetError(format!("{}", e))
    }
}

impl From<rust_xlsxwriter::XlsxError> for ViewtagError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ViewtagError::SpreadsheetError(format!("{}", e))
    }
}

impl From<toml::de::Error> for ViewtagError {
    fn from(e: toml::de::Error) -> Self {
        ViewtagError::TaxonomyError(format!("{}", e))
    }
}

#[cfg(feature = "video")]
impl From<ffmpeg_next::Error> for ViewtagError {
    fn from(e: ffmpeg_next::Error) -> Self {
        ViewtagError::VideoError(format!("{}", e))
    }
}

#[cfg(feature = "gui")]
impl From<eframe::Error> for ViewtagError {
    fn from(e: eframe::Error) -> Self {
        ViewtagError::GuiError(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_message() {
        let err = ViewtagError::DuplicateName {
            name: "a.mp4".to_string(),
            first: PathBuf::from("x/a.mp4"),
            second: PathBuf::from("y/a.mp4"),
        };
        assert_eq!(
            err.to_string(),
            "Duplicate file name a.mp4: x/a.mp4 and y/a.mp4"
        );
    }

    #[test]
    fn test_no_media_message() {
        let err = ViewtagError::NoPlayableMedia(PathBuf::from("/data/videos"));
        assert_eq!(
            err.to_string(),
            "No playable media files found in /data/videos"
        );
    }
}
