use crate::error::{Result, ViewtagError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// One named group of view labels
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub labels: Vec<String>,
}

/// Fixed two-level set of allowed classifications (group -> ordered labels)
///
/// Read-only once loaded. The built-in default covers 32 transthoracic
/// echocardiography views in five series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryTaxonomy {
    #[serde(rename = "group")]
    groups: Vec<CategoryGroup>,
}

const DEFAULT_GROUPS: &[(&str, &[&str])] = &[
    (
        "剑突下系列",
        &[
            "剑突下四腔切面",
            "剑突下双房切面",
            "剑突下五腔切面",
            "剑突下主动脉瓣短轴切面",
            "剑突下右室流入-流出道切面",
            "下腔静脉长轴切面",
            "腹主动脉长轴切面",
            "腹主动脉-下腔静脉短轴切面",
        ],
    ),
    (
        "胸骨旁长轴系列",
        &[
            "胸骨旁长轴切面",
            "胸骨旁升主动脉长轴切面",
            "右室流入道切面",
            "右室流出道切面",
        ],
    ),
    (
        "心尖系列",
        &[
            "心尖四腔",
            "心尖四腔（遮挡（部分）房室腔）",
            "心尖四腔 （非标准，聚焦冠状静脉窦）",
            "心尖五腔 （标准切面，聚焦LVOT、AV）",
            "心尖五腔 （非标准，聚焦VSD）",
            "心尖两腔切面",
            "心尖三腔切面（聚焦二尖瓣）",
            "心尖三腔切面（聚焦LVOT）",
        ],
    ),
    (
        "胸骨旁短轴系列",
        &[
            "胸骨旁短轴（聚焦三尖瓣、RVOT、主动脉瓣、VSD、肺动脉瓣）",
            "胸骨旁短轴（聚焦右冠）",
            "胸骨旁短轴（聚焦左主干+LAD）",
            "胸骨旁短轴（聚焦LCX）",
            "胸骨旁肺动脉长轴 （聚焦肺动脉及分支）",
            "胸骨旁肺动脉长轴（聚焦PDA）",
            "胸骨旁短轴（二尖瓣水平）",
            "胸骨旁短轴（乳头肌水平）",
            "胸骨旁短轴（心尖水平）",
        ],
    ),
    (
        "胸骨上窝系列",
        &[
            "胸骨上窝主动脉弓短轴",
            "胸骨上窝主动脉弓短轴（非标准，聚焦肺静脉左房入口）",
            "胸骨上窝主动脉弓长轴",
        ],
    ),
];

impl CategoryTaxonomy {
    /// Builds a taxonomy from explicit groups
    ///
    /// # Errors
    ///
    /// Fails if there are no labels at all, a group is empty, or a label
    /// appears twice.
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self> {
        let taxonomy = Self { groups };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Loads a taxonomy from a TOML file of `[[group]]` tables
    ///
    /// ```toml
    /// [[group]]
    /// name = "心尖系列"
    /// labels = ["心尖四腔", "心尖两腔切面"]
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parses a taxonomy from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let taxonomy: CategoryTaxonomy = toml::from_str(text)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(ViewtagError::TaxonomyError("no groups defined".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for group in &self.groups {
            if group.labels.is_empty() {
                return Err(ViewtagError::TaxonomyError(format!(
                    "group {} has no labels",
                    group.name
                )));
            }
            for label in &group.labels {
                if label == super::UNCLASSIFIED {
                    return Err(ViewtagError::TaxonomyError(format!(
                        "{} is reserved for unclassified records",
                        label
                    )));
                }
                if !seen.insert(label.as_str()) {
                    return Err(ViewtagError::TaxonomyError(format!(
                        "label {} appears more than once",
                        label
                    )));
                }
            }
        }
        Ok(())
    }

    /// Groups in display order
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// All leaf labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .flat_map(|g| g.labels.iter().map(String::as_str))
    }

    /// Number of leaf labels
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.labels.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels().any(|l| l == label)
    }

    /// Name of the group holding `label`
    pub fn group_of(&self, label: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.labels.iter().any(|l| l == label))
            .map(|g| g.name.as_str())
    }
}

impl Default for CategoryTaxonomy {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS
                .iter()
                .map(|(name, labels)| CategoryGroup {
                    name: name.to_string(),
                    labels: labels.iter().map(|l| l.to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for CategoryTaxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            writeln!(f, "{}", group.name)?;
            for label in &group.labels {
                writeln!(f, "  {}", label)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomy() {
        let taxonomy = CategoryTaxonomy::default();
        assert_eq!(taxonomy.len(), 32);
        assert_eq!(taxonomy.groups().len(), 5);
        assert!(taxonomy.validate().is_ok());
        assert!(taxonomy.contains("胸骨旁长轴切面"));
        assert!(taxonomy.contains("心尖四腔"));
        assert!(!taxonomy.contains("未分类"));
        assert_eq!(taxonomy.group_of("心尖四腔"), Some("心尖系列"));
    }

    #[test]
    fn test_default_labels_match_legacy_workbooks() {
        let taxonomy = CategoryTaxonomy::default();
        for label in [
            "剑突下四腔切面",
            "剑突下双房切面",
            "下腔静脉长轴切面",
            "右室流入道切面",
            "心尖两腔切面",
            "心尖三腔切面（聚焦二尖瓣）",
            "心尖四腔 （非标准，聚焦冠状静脉窦）",
            "胸骨旁短轴（二尖瓣水平）",
            "胸骨旁短轴（聚焦左主干+LAD）",
            "胸骨上窝主动脉弓短轴（非标准，聚焦肺静脉左房入口）",
        ] {
            assert!(taxonomy.contains(label), "missing {}", label);
        }
        let names: Vec<_> = taxonomy.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["剑突下系列", "胸骨旁长轴系列", "心尖系列", "胸骨旁短轴系列", "胸骨上窝系列"]
        );
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
            [[group]]
            name = "Apical"
            labels = ["A4C", "A2C"]

            [[group]]
            name = "Parasternal"
            labels = ["PLAX"]
        "#;
        let taxonomy = CategoryTaxonomy::from_toml_str(text).unwrap();
        assert_eq!(taxonomy.len(), 3);
        assert_eq!(
            taxonomy.labels().collect::<Vec<_>>(),
            vec!["A4C", "A2C", "PLAX"]
        );
    }

    #[test]
    fn test_rejects_duplicate_label() {
        let text = r#"
            [[group]]
            name = "Apical"
            labels = ["A4C", "A4C"]
        "#;
        assert!(matches!(
            CategoryTaxonomy::from_toml_str(text),
            Err(ViewtagError::TaxonomyError(_))
        ));
    }

    #[test]
    fn test_rejects_sentinel_label() {
        let groups = vec![CategoryGroup {
            name: "bad".to_string(),
            labels: vec!["未分类".to_string()],
        }];
        assert!(CategoryTaxonomy::new(groups).is_err());
    }

    #[test]
    fn test_display_lists_groups() {
        let output = CategoryTaxonomy::default().to_string();
        assert!(output.starts_with("剑突下系列\n  剑突下四腔切面\n"));
    }
}
