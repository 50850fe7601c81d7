//! Media enumeration
//!
//! Walks a directory tree and collects the files a labeling session can
//! play, in a stable order.

use crate::error::{Result, ViewtagError};
use crate::types::{MediaItem, MediaKind};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Collects all supported files of `kind` below `root`
///
/// Entries are visited depth-first, sorted by file name within each
/// directory. Unreadable entries and files that do not match are skipped.
///
/// # Errors
///
/// Returns [`ViewtagError::DuplicateName`] if two files share a basename,
/// since the annotation store is keyed by basename.
pub fn enumerate(root: &Path, kind: MediaKind) -> Result<Vec<MediaItem>> {
    let mut items = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if !is_supported(&path, kind) {
            continue;
        }

        let Some(item) = MediaItem::from_path(path) else {
            debug!("Skipping file with non UTF-8 name");
            continue;
        };

        if let Some(first) = seen.get(&item.name) {
            return Err(ViewtagError::DuplicateName {
                name: item.name.clone(),
                first: first.clone(),
                second: item.path,
            });
        }
        seen.insert(item.name.clone(), item.path.clone());
        items.push(item);
    }

    info!(
        "Found {} {} files under {}",
        items.len(),
        kind,
        root.display()
    );
    Ok(items)
}

fn is_supported(path: &Path, kind: MediaKind) -> bool {
    if kind.matches_extension(path) {
        return true;
    }
    match kind {
        MediaKind::Video => false,
        MediaKind::Dicom if path.extension().is_none() => {
            let found = is_dicom_file(path);
            if found {
                debug!("Found headerless DICOM file: {}", path.display());
            }
            found
        }
        MediaKind::Dicom => false,
    }
}

/// Checks if a file has a DICOM header
///
/// DICOM files typically have:
/// - 128-byte preamble
/// - 4-byte "DICM" magic string at offset 128
pub fn is_dicom_file(path: &Path) -> bool {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => &buffer[128..132] == b"DICM",
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn write_dicom_header(path: &Path) {
        let mut file = File::create(path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"DICM").unwrap();
        file.write_all(b"additional data").unwrap();
    }

    #[test]
    fn test_is_dicom_file_with_valid_header() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test_dicom");
        write_dicom_header(&file_path);

        assert!(is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_too_small() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("small_file");
        File::create(&file_path)
            .unwrap()
            .write_all(b"small")
            .unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_is_dicom_file_wrong_magic() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("wrong_magic");
        let mut file = File::create(&file_path).unwrap();
        file.write_all(&[0u8; 128]).unwrap();
        file.write_all(b"NOTM").unwrap();

        assert!(!is_dicom_file(&file_path));
    }

    #[test]
    fn test_enumerate_videos_recursively() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.mp4"));
        touch(&root.join("a.MP4"));
        touch(&root.join("notes.txt"));
        touch(&root.join("patient1/c.avi"));
        touch(&root.join("patient1/deeper/d.mov"));
        touch(&root.join("patient1/deeper/e.flv"));

        let items = enumerate(root, MediaKind::Video).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["a.MP4", "b.mp4", "c.avi", "d.mov", "e.flv"]);
    }

    #[test]
    fn test_enumerate_dicom_with_headerless() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("IM1.dcm"));
        write_dicom_header(&root.join("IM2"));
        fs::write(root.join("README"), b"not dicom").unwrap();
        touch(&root.join("clip.mp4"));

        let items = enumerate(root, MediaKind::Dicom).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();

        assert_eq!(names, vec!["IM1.dcm", "IM2"]);
    }

    #[test]
    fn test_enumerate_rejects_duplicate_names() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("x/a.mp4"));
        touch(&root.join("y/a.mp4"));

        let err = enumerate(root, MediaKind::Video).unwrap_err();
        assert!(matches!(err, ViewtagError::DuplicateName { ref name, .. } if name == "a.mp4"));
    }

    #[test]
    fn test_enumerate_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let items = enumerate(temp_dir.path(), MediaKind::Video).unwrap();
        assert!(items.is_empty());
    }
}
