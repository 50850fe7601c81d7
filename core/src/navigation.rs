//! Cursor over the navigable positions of a session
//!
//! Positions are files for the video source and frames for the DICOM
//! source. Stepping is circular; resuming after a classification looks
//! for the next position whose file is still unclassified.

use crate::error::{Result, ViewtagError};
use std::path::PathBuf;

/// Where [`Navigator::resume`] looks for the next pending position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResumePolicy {
    /// Scan from the position after the cursor to the end, never wrapping.
    /// Pending positions before the cursor wait for the next pass.
    #[default]
    ForwardOnly,

    /// Scan to the end, then from the start up to the cursor
    Wrap,
}

/// Result of [`Navigator::resume`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Cursor moved to this pending position
    Moved(usize),

    /// Nothing pending; reported once when the session becomes complete
    Completed,

    /// Nothing pending and completion was already reported
    StillComplete,
}

/// Circular cursor with a completion state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    len: usize,
    current: usize,
    completed: bool,
    policy: ResumePolicy,
}

impl Navigator {
    /// Creates a cursor at position 0
    ///
    /// # Errors
    ///
    /// Returns [`ViewtagError::NoPlayableMedia`] when `len` is zero.
    pub fn new(len: usize, policy: ResumePolicy) -> Result<Self> {
        if len == 0 {
            return Err(ViewtagError::NoPlayableMedia(PathBuf::new()));
        }
        Ok(Self {
            len,
            current: 0,
            completed: false,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn policy(&self) -> ResumePolicy {
        self.policy
    }

    /// Whether the last resume found nothing left to classify
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Moves one position forward, wrapping to 0 after the last
    pub fn next(&mut self) -> usize {
        self.completed = false;
        self.current = (self.current + 1) % self.len;
        self.current
    }

    /// Moves one position back, wrapping to the last from 0
    pub fn previous(&mut self) -> usize {
        self.completed = false;
        self.current = (self.current + self.len - 1) % self.len;
        self.current
    }

    /// Places the cursor on `position` (clamped into range)
    pub fn jump_to(&mut self, position: usize) -> usize {
        self.current = position.min(self.len - 1);
        self.current
    }

    /// First position for which `is_pending` holds, else 0
    pub fn first_pending(&self, is_pending: impl Fn(usize) -> bool) -> usize {
        (0..self.len).find(|&i| is_pending(i)).unwrap_or(0)
    }

    /// Advances to the next pending position after the cursor
    pub fn resume(&mut self, is_pending: impl Fn(usize) -> bool) -> Resume {
        let forward = (self.current + 1)..self.len;
        let found = match self.policy {
            ResumePolicy::ForwardOnly => forward.into_iter().find(|&i| is_pending(i)),
            ResumePolicy::Wrap => forward
                .chain(0..=self.current)
                .find(|&i| is_pending(i)),
        };

        match found {
            Some(position) => {
                self.completed = false;
                self.current = position;
                Resume::Moved(position)
            }
            None if self.completed => Resume::StillComplete,
            None => {
                self.completed = true;
                Resume::Completed
            }
        }
    }

    /// Leaves the completed state, e.g. after a label was cleared
    pub fn reopen(&mut self) {
        self.completed = false;
    }
}
