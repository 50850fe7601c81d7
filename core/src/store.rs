//! Spreadsheet-backed annotation store
//!
//! The backing `.xlsx` file has two sheets:
//! - `Annotations`: header `(FileName, Classification)`, one row per file
//! - `Classification Summary`: header `(Classification, Count)`, one row
//!   per used label
//!
//! Workbooks without an `Annotations` sheet are read from their first sheet.
//!
//! Every mutation rewrites the whole workbook immediately.

use crate::error::{Result, ViewtagError};
use crate::types::{AnnotationRecord, MediaItem, Summary, UNCLASSIFIED};
use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::{debug, info, warn};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};

pub const RECORDS_SHEET: &str = "Annotations";
pub const SUMMARY_SHEET: &str = "Classification Summary";

const NAME_HEADER: &str = "FileName";
const LABEL_HEADER: &str = "Classification";
const COUNT_HEADER: &str = "Count";

/// Persisted mapping from file name to category label
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    path: PathBuf,
    records: Vec<AnnotationRecord>,
    /// Whether the Summary sheet is part of the workbook
    summary_written: bool,
}

impl AnnotationStore {
    /// Opens the store at `path`, creating it from `items` if needed
    ///
    /// A missing, unreadable or malformed file is replaced by a fresh store
    /// with one unclassified record per item. An existing store gains
    /// unclassified records for items it does not know yet; nothing is
    /// ever removed.
    pub fn load_or_init(path: &Path, items: &[MediaItem]) -> Result<Self> {
        let mut store = if path.exists() {
            match Self::open(path) {
                Ok(store) => store,
                Err(e) => {
                    warn!(
                        "Could not read annotation store {} ({}), creating a new one",
                        path.display(),
                        e
                    );
                    Self::empty(path)
                }
            }
        } else {
            info!("Creating annotation store {}", path.display());
            Self::empty(path)
        };

        let before = store.records.len();
        for item in items {
            if store.find(&item.name).is_none() {
                store
                    .records
                    .push(AnnotationRecord::unclassified(item.name.clone()));
            }
        }
        let added = store.records.len() - before;

        if added > 0 || !path.exists() {
            debug!("Adding {} new records", added);
            store.save()?;
        }
        Ok(store)
    }

    /// Reads an existing store
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or contains no sheet.
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;

        let range = match workbook
            .worksheet_range(RECORDS_SHEET)
            .or_else(|| workbook.worksheet_range_at(0))
        {
            Some(range) => range?,
            None => {
                return Err(ViewtagError::SpreadsheetError(format!(
                    "{} has no worksheet",
                    path.display()
                )))
            }
        };

        let mut records = Vec::new();
        for row in range.rows().skip(1) {
            let name = cell_text(row.first());
            if name.is_empty() {
                continue;
            }
            let label = cell_text(row.get(1));
            records.push(AnnotationRecord {
                name,
                label: if label.is_empty() {
                    UNCLASSIFIED.to_string()
                } else {
                    label
                },
            });
        }

        let summary_written = workbook.worksheet_range(SUMMARY_SHEET).is_some();

        debug!(
            "Loaded {} records from {}",
            records.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            records,
            summary_written,
        })
    }

    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            records: Vec::new(),
            summary_written: false,
        }
    }

    /// Path of the backing workbook
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by file name
    pub fn find(&self, name: &str) -> Option<&AnnotationRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Whether `name` is known and still unclassified
    pub fn is_unclassified(&self, name: &str) -> bool {
        self.find(name).map(|r| r.is_unclassified()).unwrap_or(false)
    }

    /// Sets the label of `name` and saves
    ///
    /// A name with no record is silently ignored and `false` is returned.
    pub fn set_label(&mut self, name: &str, label: &str) -> Result<bool> {
        let Some(record) = self.records.iter_mut().find(|r| r.name == name) else {
            debug!("No record for {}, ignoring label {}", name, label);
            return Ok(false);
        };
        record.label = label.to_string();
        info!("Classified {} as {}", name, label);
        self.save()?;
        Ok(true)
    }

    /// Resets `name` to unclassified and saves
    ///
    /// A name with no record is silently ignored and `false` is returned.
    pub fn clear_label(&mut self, name: &str) -> Result<bool> {
        let Some(record) = self.records.iter_mut().find(|r| r.name == name) else {
            debug!("No record for {}, nothing to clear", name);
            return Ok(false);
        };
        record.label = UNCLASSIFIED.to_string();
        info!("Cleared classification of {}", name);
        self.save()?;
        Ok(true)
    }

    /// Label -> count over classified records
    pub fn summarize(&self) -> Summary {
        Summary::from_records(&self.records)
    }

    /// Writes the Summary sheet
    ///
    /// Later saves keep refreshing it from the current records.
    pub fn write_summary(&mut self) -> Result<Summary> {
        self.summary_written = true;
        self.save()?;
        let summary = self.summarize();
        info!(
            "Wrote summary of {} classified files to {}",
            summary.total(),
            self.path.display()
        );
        Ok(summary)
    }

    /// Number of classified records and total records
    pub fn progress(&self) -> (usize, usize) {
        let done = self.records.iter().filter(|r| !r.is_unclassified()).count();
        (done, self.records.len())
    }

    /// First unclassified record in store order
    pub fn first_unclassified(&self) -> Option<&AnnotationRecord> {
        self.records.iter().find(|r| r.is_unclassified())
    }

    /// Rewrites the workbook from memory
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(RECORDS_SHEET)?;
        sheet.write_string(0, 0, NAME_HEADER)?;
        sheet.write_string(0, 1, LABEL_HEADER)?;
        for (i, record) in self.records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, &record.name)?;
            sheet.write_string(row, 1, &record.label)?;
        }

        if self.summary_written {
            let summary = self.summarize();
            let sheet = workbook.add_worksheet();
            sheet.set_name(SUMMARY_SHEET)?;
            sheet.write_string(0, 0, LABEL_HEADER)?;
            sheet.write_string(0, 1, COUNT_HEADER)?;
            for (i, row) in summary.rows.iter().enumerate() {
                let r = (i + 1) as u32;
                sheet.write_string(r, 0, &row.label)?;
                sheet.write_number(r, 1, row.count as f64)?;
            }
        }

        workbook.save(&self.path)?;
        Ok(())
    }
}

/// Reads the Summary sheet of the workbook at `path`
///
/// Returns `None` if no summary has been written yet.
pub fn read_summary(path: &Path) -> Result<Option<Summary>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range(SUMMARY_SHEET) {
        Some(range) => range?,
        None => return Ok(None),
    };

    let mut summary = Summary::default();
    for row in range.rows() {
        let label = cell_text(row.first());
        if label.is_empty() || label == LABEL_HEADER {
            continue;
        }
        let count = match row.get(1) {
            Some(DataType::Int(n)) => *n as usize,
            Some(DataType::Float(n)) => *n as usize,
            Some(DataType::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };
        summary.add(&label, count);
    }
    Ok(Some(summary))
}

fn cell_text(cell: Option<&DataType>) -> String {
    match cell {
        None | Some(DataType::Empty) => String::new(),
        Some(DataType::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn items(names: &[&str]) -> Vec<MediaItem> {
        names
            .iter()
            .map(|n| MediaItem {
                path: PathBuf::from("/media").join(n),
                name: n.to_string(),
            })
            .collect()
    }

    fn labels(store: &AnnotationStore) -> Vec<(String, String)> {
        store
            .records()
            .iter()
            .map(|r| (r.name.clone(), r.label.clone()))
            .collect()
    }

    #[test]
    fn test_init_creates_unclassified_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");

        let store =
            AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4", "c.mp4"])).unwrap();

        assert!(path.exists());
        assert_eq!(store.len(), 3);
        assert!(store.records().iter().all(|r| r.is_unclassified()));

        let reloaded = AnnotationStore::open(&path).unwrap();
        assert_eq!(labels(&reloaded), labels(&store));
    }

    #[test]
    fn test_set_label_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store =
            AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4", "c.mp4"])).unwrap();

        assert!(store.set_label("b.mp4", "心尖四腔").unwrap());

        let reloaded = AnnotationStore::open(&path).unwrap();
        assert_eq!(reloaded.find("b.mp4").unwrap().label, "心尖四腔");
        assert!(reloaded.is_unclassified("a.mp4"));
        assert!(reloaded.is_unclassified("c.mp4"));
    }

    #[test]
    fn test_clear_label_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store = AnnotationStore::load_or_init(&path, &items(&["a.mp4"])).unwrap();
        store.set_label("a.mp4", "心尖两腔切面").unwrap();

        assert!(store.clear_label("a.mp4").unwrap());

        let reloaded = AnnotationStore::open(&path).unwrap();
        assert_eq!(reloaded.find("a.mp4").unwrap().label, UNCLASSIFIED);
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store = AnnotationStore::load_or_init(&path, &items(&["a.mp4"])).unwrap();

        assert!(!store.set_label("zzz.mp4", "心尖四腔").unwrap());
        assert!(!store.clear_label("zzz.mp4").unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.is_unclassified("a.mp4"));
    }

    #[test]
    fn test_existing_store_keeps_labels_and_gains_new_items() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store = AnnotationStore::load_or_init(&path, &items(&["a.mp4"])).unwrap();
        store.set_label("a.mp4", "剑突下四腔切面").unwrap();

        let store = AnnotationStore::load_or_init(&path, &items(&["a.mp4", "d.mp4"])).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.find("a.mp4").unwrap().label, "剑突下四腔切面");
        assert!(store.is_unclassified("d.mp4"));
    }

    #[test]
    fn test_reads_first_sheet_of_foreign_workbook() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("video_names.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Video Names").unwrap();
        sheet.write_string(0, 0, "视频文件名").unwrap();
        sheet.write_string(0, 1, "分类").unwrap();
        sheet.write_string(1, 0, "a.mp4").unwrap();
        sheet.write_string(1, 1, "心尖四腔").unwrap();
        sheet.write_string(2, 0, "b.mp4").unwrap();
        sheet.write_string(2, 1, UNCLASSIFIED).unwrap();
        workbook.save(&path).unwrap();

        let store = AnnotationStore::open(&path).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.find("a.mp4").unwrap().label, "心尖四腔");
        assert!(store.is_unclassified("b.mp4"));
    }

    #[test]
    fn test_corrupt_store_is_recreated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        std::fs::write(&path, b"definitely not a workbook").unwrap();

        let store = AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4"])).unwrap();

        assert_eq!(store.len(), 2);
        let reloaded = AnnotationStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_summary_sheet_matches_labels() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store =
            AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4", "c.mp4"])).unwrap();
        store.set_label("a.mp4", "胸骨旁长轴切面").unwrap();
        store.set_label("c.mp4", "心尖四腔").unwrap();

        assert_eq!(read_summary(&path).unwrap(), None);

        store.write_summary().unwrap();
        let summary = read_summary(&path).unwrap().unwrap();

        let rows: Vec<_> = summary
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.count))
            .collect();
        assert_eq!(rows, vec![("胸骨旁长轴切面", 1), ("心尖四腔", 1)]);
    }

    #[test]
    fn test_summary_refreshed_after_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store = AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4"])).unwrap();
        store.set_label("a.mp4", "心尖四腔").unwrap();
        store.write_summary().unwrap();

        store.set_label("b.mp4", "心尖四腔").unwrap();

        let summary = read_summary(&path).unwrap().unwrap();
        assert_eq!(summary.count("心尖四腔"), 2);
    }

    #[test]
    fn test_progress() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("labels.xlsx");
        let mut store =
            AnnotationStore::load_or_init(&path, &items(&["a.mp4", "b.mp4", "c.mp4"])).unwrap();
        store.set_label("a.mp4", "右室流出道切面").unwrap();

        assert_eq!(store.progress(), (1, 3));
        assert_eq!(store.first_unclassified().unwrap().name, "b.mp4");
    }
}
