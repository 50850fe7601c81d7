pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod frames;
#[cfg(feature = "gui")]
pub mod gui;
pub mod navigation;
pub mod scan;
pub mod session;
pub mod store;
pub mod types;

pub use api::{open_session, scan, ScanReport};
pub use cli::report::{SummaryReport, TextReport};
pub use config::LabelerConfig;
pub use error::{Result, ViewtagError};
pub use frames::{CineLibrary, FrameSource};
pub use navigation::{Navigator, Resume, ResumePolicy};
pub use session::{ClassifyOutcome, Session};
pub use store::AnnotationStore;
pub use types::*;
