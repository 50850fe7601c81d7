//! Labeling session
//!
//! Ties the media list, annotation store, cursor and frame source together.
//! The UI only forwards events here; nothing in this module knows about
//! the windowing toolkit.

use crate::error::{Result, ViewtagError};
use crate::frames::FrameSource;
use crate::navigation::{Navigator, Resume, ResumePolicy};
use crate::store::AnnotationStore;
use crate::types::{Frame, MediaItem, Summary, UNCLASSIFIED};
use log::{debug, info};
use std::time::Duration;

/// What happened after a classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyOutcome {
    /// Moved on to the next unclassified position
    Advanced(usize),

    /// Nothing left to classify; the summary sheet was written
    Completed(Summary),

    /// Already complete; the label was stored and nothing else changed
    AlreadyComplete,
}

/// Single-operator labeling session
pub struct Session {
    items: Vec<MediaItem>,
    store: AnnotationStore,
    navigator: Navigator,
    source: Box<dyn FrameSource>,
    paused: bool,
    revision: u64,
}

impl Session {
    /// Starts on the first position whose file is still unclassified
    ///
    /// # Errors
    ///
    /// Fails with [`ViewtagError::NoPlayableMedia`] if the source is empty,
    /// or if the first frame cannot be prepared.
    pub fn start(
        items: Vec<MediaItem>,
        store: AnnotationStore,
        source: Box<dyn FrameSource>,
        policy: ResumePolicy,
    ) -> Result<Self> {
        let mut navigator = Navigator::new(source.len(), policy).map_err(|_| {
            ViewtagError::NoPlayableMedia(
                store
                    .path()
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_default(),
            )
        })?;

        let first = navigator.first_pending(|p| {
            items
                .get(source.item_at(p))
                .map(|item| store.is_unclassified(&item.name))
                .unwrap_or(false)
        });
        navigator.jump_to(first);

        let mut session = Self {
            items,
            store,
            navigator,
            source,
            paused: false,
            revision: 0,
        };
        session.show(first)?;
        info!("Session starts at position {}", first);
        Ok(session)
    }

    /// Loads `position` and restarts playback
    fn show(&mut self, position: usize) -> Result<()> {
        self.source.seek(position)?;
        self.paused = false;
        self.revision += 1;
        Ok(())
    }

    /// Item under the cursor
    pub fn current_item(&self) -> &MediaItem {
        &self.items[self.source.item_at(self.navigator.current())]
    }

    /// Label of the item under the cursor
    pub fn current_label(&self) -> &str {
        self.store
            .find(&self.current_item().name)
            .map(|r| r.label.as_str())
            .unwrap_or(UNCLASSIFIED)
    }

    pub fn position(&self) -> usize {
        self.navigator.current()
    }

    pub fn len(&self) -> usize {
        self.navigator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.navigator.is_empty()
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.source.current_frame()
    }

    /// Frame number within the clip, for frame-stepped sources
    pub fn frame_position(&self) -> Option<(usize, usize)> {
        self.source.frame_position()
    }

    /// Changes whenever the displayed frame may have changed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn interval(&self) -> Option<Duration> {
        self.source.interval()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_completed(&self) -> bool {
        self.navigator.is_completed()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Number of classified files and total files
    pub fn progress(&self) -> (usize, usize) {
        self.store.progress()
    }

    pub fn next(&mut self) -> Result<()> {
        let position = self.navigator.next();
        self.show(position)
    }

    pub fn previous(&mut self) -> Result<()> {
        let position = self.navigator.previous();
        self.show(position)
    }

    /// Flips the pause flag; returns the new state
    ///
    /// Sources without timed playback ignore the toggle.
    pub fn toggle_pause(&mut self) -> bool {
        if self.source.supports_pause() {
            self.paused = !self.paused;
            debug!("Paused: {}", self.paused);
        }
        self.paused
    }

    /// Playback step; does nothing while paused
    pub fn tick(&mut self) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        self.source.tick()?;
        self.revision += 1;
        Ok(())
    }

    /// Stores `label` for the current item and moves on
    ///
    /// # Errors
    ///
    /// Returns [`ViewtagError::NoLabelSelected`] without touching any state
    /// when `label` is `None`.
    pub fn classify(&mut self, label: Option<&str>) -> Result<ClassifyOutcome> {
        let label = label.ok_or(ViewtagError::NoLabelSelected)?;
        let name = self.current_item().name.clone();
        self.store.set_label(&name, label)?;

        let Self {
            items,
            store,
            navigator,
            source,
            ..
        } = self;
        let resume = navigator.resume(|p| {
            items
                .get(source.item_at(p))
                .map(|item| store.is_unclassified(&item.name))
                .unwrap_or(false)
        });

        match resume {
            Resume::Moved(position) => {
                self.show(position)?;
                Ok(ClassifyOutcome::Advanced(position))
            }
            Resume::Completed => {
                info!("All files classified");
                let summary = self.store.write_summary()?;
                Ok(ClassifyOutcome::Completed(summary))
            }
            Resume::StillComplete => Ok(ClassifyOutcome::AlreadyComplete),
        }
    }

    /// Resets the current item to unclassified
    pub fn clear(&mut self) -> Result<()> {
        let name = self.current_item().name.clone();
        self.store.clear_label(&name)?;
        self.navigator.reopen();
        Ok(())
    }
}
