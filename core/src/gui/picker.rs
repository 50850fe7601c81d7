use crate::types::CategoryTaxonomy;
use eframe::egui;

/// Button pressed in the category window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Classify the current file with the selection, if any
    Classify(Option<String>),
    /// Reset the current file to unclassified
    Clear,
}

/// Grouped single-choice list of view labels
#[derive(Debug, Default)]
pub struct CategoryPicker {
    selected: Option<String>,
}

impl CategoryPicker {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Draws the buttons and the scrollable label list
    pub fn show(&mut self, ui: &mut egui::Ui, taxonomy: &CategoryTaxonomy) -> Option<PickerAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            if ui.button("分类").clicked() {
                action = Some(PickerAction::Classify(self.selected.clone()));
            }
            if ui.button("删除分类").clicked() {
                action = Some(PickerAction::Clear);
            }
        });
        ui.label(format!(
            "已选: {}",
            self.selected.as_deref().unwrap_or("无")
        ));
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for group in taxonomy.groups() {
                    egui::CollapsingHeader::new(group.name.as_str())
                        .default_open(true)
                        .show(ui, |ui| {
                            for label in &group.labels {
                                ui.radio_value(&mut self.selected, Some(label.clone()), label.as_str());
                            }
                        });
                }
            });

        action
    }
}
