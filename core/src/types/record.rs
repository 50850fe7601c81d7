use std::fmt;

/// Label value marking a record as not yet annotated
pub const UNCLASSIFIED: &str = "未分类";

/// One row of the annotation store
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct AnnotationRecord {
    /// Media file basename
    pub name: String,

    /// Category label, or [`UNCLASSIFIED`]
    pub label: String,
}

impl AnnotationRecord {
    /// Creates an unclassified record
    pub fn unclassified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: UNCLASSIFIED.to_string(),
        }
    }

    pub fn is_unclassified(&self) -> bool {
        self.label == UNCLASSIFIED
    }
}

/// Count of records carrying one label
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct SummaryRow {
    pub label: String,
    pub count: usize,
}

/// Label -> count over classified records
///
/// Rows keep the order in which each label first appears among the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    /// Tallies labels, skipping unclassified records
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AnnotationRecord>) -> Self {
        let mut summary = Summary::default();
        for record in records.into_iter().filter(|r| !r.is_unclassified()) {
            summary.add(&record.label, 1);
        }
        summary
    }

    /// Adds `count` to `label`, appending a new row if needed
    pub fn add(&mut self, label: &str, count: usize) {
        match self.rows.iter_mut().find(|row| row.label == label) {
            Some(row) => row.count += count,
            None => self.rows.push(SummaryRow {
                label: label.to_string(),
                count,
            }),
        }
    }

    /// Count for `label`, zero when absent
    pub fn count(&self, label: &str) -> usize {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.count)
            .unwrap_or(0)
    }

    /// Total number of classified records
    pub fn total(&self) -> usize {
        self.rows.iter().map(|row| row.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}: {}", row.label, row.count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, label: &str) -> AnnotationRecord {
        AnnotationRecord {
            name: name.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_summary_skips_unclassified() {
        let records = vec![
            record("a.mp4", "心尖四腔"),
            record("b.mp4", UNCLASSIFIED),
            record("c.mp4", "胸骨旁长轴切面"),
            record("d.mp4", "心尖四腔"),
        ];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].label, "心尖四腔");
        assert_eq!(summary.count("心尖四腔"), 2);
        assert_eq!(summary.count("胸骨旁长轴切面"), 1);
        assert_eq!(summary.count(UNCLASSIFIED), 0);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_unclassified_record() {
        let r = AnnotationRecord::unclassified("x.dcm");
        assert!(r.is_unclassified());
        assert_eq!(r.label, "未分类");
    }
}
