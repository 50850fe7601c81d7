use crate::store::AnnotationStore;
use crate::types::{MediaKind, Summary};
use std::fmt;

/// Text report of labeling progress for one annotation store
pub struct TextReport<'a> {
    kind: MediaKind,
    store: &'a AnnotationStore,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(kind: MediaKind, store: &'a AnnotationStore) -> Self {
        Self { kind, store }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (done, total) = self.store.progress();

        writeln!(f, "Labeling Progress")?;
        writeln!(f, "=================")?;
        writeln!(f)?;
        writeln!(f, "Source:       {}", self.kind)?;
        writeln!(f, "Store:        {}", self.store.path().display())?;
        writeln!(f, "Classified:   {} / {}", done, total)?;
        writeln!(
            f,
            "Next:         {}",
            self.store
                .first_unclassified()
                .map(|r| r.name.as_str())
                .unwrap_or("none")
        )?;
        writeln!(f)?;
        write!(f, "{}", SummaryReport(&self.store.summarize()))
    }
}

/// Text table of label counts
pub struct SummaryReport<'a>(pub &'a Summary);

impl<'a> fmt::Display for SummaryReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classification Summary")?;
        writeln!(f, "----------------------")?;
        if self.0.is_empty() {
            return writeln!(f, "(no classified files)");
        }
        for row in &self.0.rows {
            writeln!(f, "{}\t{}", row.label, row.count)?;
        }
        writeln!(f, "Total\t{}", self.0.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaItem;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_text_report_format() {
        let temp_dir = TempDir::new().unwrap();
        let items: Vec<_> = ["a.mp4", "b.mp4", "c.mp4"]
            .iter()
            .map(|n| MediaItem::from_path(PathBuf::from(n)).unwrap())
            .collect();
        let mut store =
            AnnotationStore::load_or_init(&temp_dir.path().join("labels.xlsx"), &items).unwrap();
        store.set_label("a.mp4", "胸骨旁长轴切面").unwrap();
        store.set_label("c.mp4", "心尖四腔").unwrap();

        let output = TextReport::new(MediaKind::Video, &store).to_string();

        assert!(output.contains("Labeling Progress"));
        assert!(output.contains("Source:       video"));
        assert!(output.contains("Classified:   2 / 3"));
        assert!(output.contains("Next:         b.mp4"));
        assert!(output.contains("胸骨旁长轴切面\t1\n心尖四腔\t1\nTotal\t2"));
    }

    #[test]
    fn test_empty_summary_report() {
        let output = SummaryReport(&Summary::default()).to_string();
        assert!(output.contains("(no classified files)"));
    }
}
