//! Labeling window
//!
//! The central panel plays the current file; a floating window holds the
//! category picker. All state changes go through [`Session`].

mod picker;

pub use picker::{CategoryPicker, PickerAction};

use crate::config::LabelerConfig;
use crate::error::{Result, ViewtagError};
use crate::session::{ClassifyOutcome, Session};
use crate::types::{CategoryTaxonomy, Summary};
use eframe::egui;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const CJK_FONT: &str = "cjk";

/// Modal message; input is ignored while one is open
enum Dialog {
    Warning(String),
    Completed(Summary),
}

struct LabelerApp {
    session: Session,
    taxonomy: CategoryTaxonomy,
    picker: CategoryPicker,
    texture: Option<egui::TextureHandle>,
    shown_revision: Option<u64>,
    last_tick: Instant,
    dialog: Option<Dialog>,
    status: Option<String>,
}

/// Opens the labeling window and blocks until it is closed
pub fn run(config: LabelerConfig, session: Session) -> Result<()> {
    let title = format!("viewtag - {}", config.kind);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_title(title.as_str()),
        ..Default::default()
    };
    let font = config.resolve_font();
    let taxonomy = config.taxonomy;

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            match &font {
                Some(path) => install_font(&cc.egui_ctx, path),
                None => warn!("No CJK font found; category names may not render"),
            }
            Ok(Box::new(LabelerApp::new(session, taxonomy)))
        }),
    )?;
    Ok(())
}

/// Adds `path` as fallback font for both families
fn install_font(ctx: &egui::Context, path: &Path) {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            warn!("Cannot read font {}: {}", path.display(), e);
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        CJK_FONT.to_owned(),
        Arc::new(egui::FontData::from_owned(data)),
    );
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT.to_owned());
    }
    ctx.set_fonts(fonts);
    info!("Loaded font {}", path.display());
}

impl LabelerApp {
    fn new(session: Session, taxonomy: CategoryTaxonomy) -> Self {
        Self {
            session,
            taxonomy,
            picker: CategoryPicker::default(),
            texture: None,
            shown_revision: None,
            last_tick: Instant::now(),
            dialog: None,
            status: None,
        }
    }

    fn report(&mut self, e: ViewtagError) {
        error!("{}", e);
        self.status = Some(e.to_string());
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (left, right, space) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::ArrowLeft),
                i.key_pressed(egui::Key::ArrowRight),
                i.key_pressed(egui::Key::Space),
            )
        });
        if left || right || space {
            // keep the keys from also activating a focused button
            ctx.memory_mut(|m| {
                if let Some(id) = m.focused() {
                    m.surrender_focus(id);
                }
            });
        }

        let result = if left {
            self.session.previous()
        } else if right {
            self.session.next()
        } else {
            Ok(())
        };
        if let Err(e) = result {
            self.report(e);
        }
        if space {
            self.session.toggle_pause();
        }
    }

    fn advance_playback(&mut self, ctx: &egui::Context) {
        let Some(interval) = self.session.interval() else {
            return;
        };
        if !self.session.is_paused() && self.last_tick.elapsed() >= interval {
            self.last_tick = Instant::now();
            if let Err(e) = self.session.tick() {
                self.report(e);
            }
        }
        ctx.request_repaint_after(interval);
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let revision = self.session.revision();
        if self.shown_revision == Some(revision) {
            return;
        }
        self.shown_revision = Some(revision);

        let Some(frame) = self.session.current_frame() else {
            self.texture = None;
            return;
        };
        let image = egui::ColorImage::from_gray(frame.size(), &frame.pixels);
        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
            return;
        }
        self.texture = Some(ctx.load_texture("frame", image, egui::TextureOptions::LINEAR));
    }

    fn apply(&mut self, action: PickerAction) {
        match action {
            PickerAction::Classify(label) => match self.session.classify(label.as_deref()) {
                Ok(ClassifyOutcome::Completed(summary)) => {
                    self.dialog = Some(Dialog::Completed(summary));
                }
                Ok(_) => self.status = None,
                Err(ViewtagError::NoLabelSelected) => {
                    self.dialog = Some(Dialog::Warning("请先选择一个分类".to_string()));
                }
                Err(e) => self.report(e),
            },
            PickerAction::Clear => match self.session.clear() {
                Ok(()) => self.status = None,
                Err(e) => self.report(e),
            },
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let (done, total) = self.session.progress();
        ui.horizontal(|ui| {
            ui.strong(self.session.current_item().name.as_str());
            ui.separator();
            ui.label(format!("分类: {}", self.session.current_label()));
            ui.separator();
            ui.label(format!("进度: {}/{}", done, total));
            if let Some((frame, count)) = self.session.frame_position() {
                ui.separator();
                ui.label(format!("帧: {}/{}", frame, count));
            }
            if self.session.is_paused() {
                ui.separator();
                ui.label("已暂停");
            }
        });
        if let Some(status) = &self.status {
            ui.colored_label(egui::Color32::LIGHT_RED, status.as_str());
        }
    }

    fn frame_view(&self, ui: &mut egui::Ui) {
        match &self.texture {
            Some(texture) => {
                ui.centered_and_justified(|ui| {
                    ui.add(
                        egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                            .shrink_to_fit(),
                    )
                });
            }
            None => {
                ui.centered_and_justified(|ui| ui.label("无法显示当前文件"));
            }
        }
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else {
            return;
        };
        let title = match dialog {
            Dialog::Warning(_) => "警告",
            Dialog::Completed(_) => "完成",
        };

        let mut close = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match dialog {
                    Dialog::Warning(message) => {
                        ui.label(message.as_str());
                    }
                    Dialog::Completed(summary) => {
                        ui.label("所有文件均已分类，统计已写入表格。");
                        ui.separator();
                        for row in &summary.rows {
                            ui.label(format!("{}: {}", row.label, row.count));
                        }
                    }
                }
                if ui.button("确定").clicked() {
                    close = true;
                }
            });
        if close {
            self.dialog = None;
        }
    }
}

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let modal = self.dialog.is_some();
        if !modal {
            self.handle_keys(ctx);
        }
        self.advance_playback(ctx);
        self.refresh_texture(ctx);

        egui::TopBottomPanel::top("status").show(ctx, |ui| self.status_bar(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.frame_view(ui));

        let mut action = None;
        egui::Window::new("分类")
            .default_pos([960.0, 60.0])
            .default_width(280.0)
            .default_height(640.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!modal, |ui| {
                    action = self.picker.show(ui, &self.taxonomy);
                });
            });
        if let Some(action) = action {
            self.apply(action);
        }

        self.show_dialog(ctx);
    }
}
